use std::future::Future;

use futures::{executor::LocalSpawner, task::LocalSpawnExt};

use super::{run_step, Recurse, Scheduler, TaskHandle, YieldNow};
use crate::subscription::Subscription;

/// Schedules work onto a `futures` `LocalPool`.
///
/// Each recursive iteration yields back to the pool, so other local tasks
/// make progress between values.
#[derive(Clone)]
pub struct LocalPoolScheduler {
  spawner: LocalSpawner,
}

impl LocalPoolScheduler {
  pub fn new(spawner: LocalSpawner) -> Self { Self { spawner } }

  fn spawn(&self, fut: impl Future<Output = ()> + 'static, handle: &TaskHandle) {
    if let Err(err) = self.spawner.spawn_local(fut) {
      tracing::error!(%err, "local pool refused a scheduled task");
      handle.clone().unsubscribe();
    }
  }
}

impl Scheduler for LocalPoolScheduler {
  fn schedule(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
    let handle = TaskHandle::new();
    let h = handle.clone();
    self.spawn(
      async move {
        if !h.is_closed() {
          task();
          h.finish();
        }
      },
      &handle,
    );
    handle
  }

  fn schedule_recursive(&self, mut task: Box<dyn FnMut(&mut Recurse)>) -> TaskHandle {
    let handle = TaskHandle::new();
    let h = handle.clone();
    self.spawn(
      async move {
        while run_step(&mut *task, &h) {
          YieldNow::new().await;
        }
        h.finish();
      },
      &handle,
    );
    handle
  }
}
