use crate::task::{task, Task};

/// The callback a [`nodeback_to_task`]-wrapped function receives: invoked
/// once with the operation's result.
pub type Nodeback<E, V> = Box<dyn FnOnce(Result<V, E>)>;

/// Wraps a callback-style function into a [`Task`] producer.
///
/// The error-first `(err, data)` callback convention collapses to `Result`:
/// `Err` rejects the run, `Ok` resolves it. The callback may fire
/// synchronously or from a later timer/reactor event; either way the usual
/// first-transition-wins rule applies.
///
/// ```
/// use fable::convert::nodeback_to_task;
/// use fable::future::Listener;
///
/// let parse = nodeback_to_task(|input: String, done| {
///     done(input.parse::<i32>().map_err(|e| e.to_string()));
/// });
/// let execution = parse("42".to_string()).run();
/// execution.listen(Listener::new().on_resolved(|n| assert_eq!(n, 42)));
/// ```
pub fn nodeback_to_task<A, E, V, F>(f: F) -> impl Fn(A) -> Task<E, V>
where
    A: Clone + 'static,
    E: Clone + 'static,
    V: Clone + 'static,
    F: Fn(A, Nodeback<E, V>) + Clone + 'static,
{
    move |arg: A| {
        let f = f.clone();
        task(move |resolver| {
            f(
                arg.clone(),
                Box::new(move |result| match result {
                    Ok(value) => resolver.resolve(value),
                    Err(reason) => resolver.reject(reason),
                }),
            );
        })
    }
}
