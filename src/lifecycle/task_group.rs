//! Supervised task group sharing one lifecycle.

use std::future::Future;

use tokio::task::{JoinError, JoinSet};

use crate::lifecycle::context::{CancelReason, Lifecycle};

/// A fixed set of tasks joined together. The first task to fail cancels the
/// shared lifecycle; [`wait`](Self::wait) joins every task and returns the
/// first error.
pub struct TaskGroup<E> {
    tasks: JoinSet<Result<(), E>>,
    lifecycle: Lifecycle,
}

impl<E> TaskGroup<E>
where
    E: From<JoinError> + Send + 'static,
{
    pub fn new(lifecycle: Lifecycle) -> Self {
        Self {
            tasks: JoinSet::new(),
            lifecycle,
        }
    }

    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
    {
        let lifecycle = self.lifecycle.clone();
        self.tasks.spawn(async move {
            let result = task.await;
            if result.is_err() {
                tracing::debug!(task = name, "task failed; canceling lifecycle");
                lifecycle.cancel(CancelReason::TaskFailed);
            }
            result
        });
    }

    /// Join all tasks. Returns the first error in completion order.
    pub async fn wait(mut self) -> Result<(), E> {
        let mut first = None;
        while let Some(joined) = self.tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(join_err) => {
                    self.lifecycle.cancel(CancelReason::TaskFailed);
                    Err(E::from(join_err))
                }
            };
            if let Err(e) = result {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
