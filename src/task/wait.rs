use super::Task;

/// Runs every task and resolves with all values, in input order, once all
/// runs resolve. The first rejection or cancellation wins and cancels the
/// remaining runs.
///
/// Built by pairwise [`Task::and`] reduction.
///
/// # Panics
///
/// Panics immediately if `tasks` is empty: an empty join would either hang
/// forever or invent a value, and both hide programmer error.
pub fn wait_all<E: Clone + 'static, V: Clone + 'static>(tasks: Vec<Task<E, V>>) -> Task<E, Vec<V>> {
    assert!(
        !tasks.is_empty(),
        "wait_all requires a non-empty vector of tasks"
    );
    let mut tasks = tasks.into_iter();
    let mut all = match tasks.next() {
        Some(first) => first.map(|value| vec![value]),
        None => unreachable!("checked non-empty above"),
    };
    for next in tasks {
        all = all.and(&next).map(|(mut values, value)| {
            values.push(value);
            values
        });
    }
    all
}

/// Runs every task and settles with the first run to settle, cancelling the
/// rest. Built by pairwise [`Task::or`] reduction.
///
/// # Panics
///
/// Panics immediately if `tasks` is empty, rather than returning a run that
/// never settles.
pub fn wait_any<E: Clone + 'static, V: Clone + 'static>(tasks: Vec<Task<E, V>>) -> Task<E, V> {
    assert!(
        !tasks.is_empty(),
        "wait_any requires a non-empty vector of tasks"
    );
    let mut tasks = tasks.into_iter();
    let mut any = match tasks.next() {
        Some(first) => first,
        None => unreachable!("checked non-empty above"),
    };
    for next in tasks {
        any = any.or(&next);
    }
    any
}
