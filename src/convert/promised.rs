use crate::runtime::Reactor;
use crate::task::{task, Task};

/// Wraps a function returning a native future into a [`Task`] producer.
///
/// Each run of a produced task calls `f` afresh and drives the resulting
/// future on the current reactor. Both arms are guarded by
/// [`Resolver::is_cancelled`][crate::task::Resolver::is_cancelled], so a
/// native future that settles after the run was cancelled cannot clobber the
/// cancelled outcome.
///
/// ```no_run
/// use fable::convert::promised_to_task;
///
/// async fn fetch(name: String) -> Result<usize, String> {
///     Ok(name.len())
/// }
///
/// let producer = promised_to_task(|name: String| fetch(name));
/// let execution = producer("hello".to_string()).run();
/// ```
///
/// # Panics
///
/// Running a produced task panics outside
/// [`block_on`][crate::runtime::block_on].
pub fn promised_to_task<A, E, V, F, Fut>(f: F) -> impl Fn(A) -> Task<E, V>
where
    A: Clone + 'static,
    E: Clone + 'static,
    V: Clone + 'static,
    F: Fn(A) -> Fut + Clone + 'static,
    Fut: std::future::Future<Output = Result<V, E>> + 'static,
{
    move |arg: A| {
        let f = f.clone();
        task(move |resolver| {
            let future = f(arg.clone());
            Reactor::current().spawn(async move {
                let result = future.await;
                if resolver.is_cancelled() {
                    return;
                }
                match result {
                    Ok(value) => resolver.resolve(value),
                    Err(reason) => resolver.reject(reason),
                }
            });
        })
    }
}
