use futures::future::LocalBoxFuture;
use futures::task::SpawnError;

use crate::traits::Runtime;

/// Runs delivery tasks on the browser's microtask queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserRuntime;

impl Runtime for BrowserRuntime {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError> {
        leptos::task::spawn_local(task);
        Ok(())
    }
}
