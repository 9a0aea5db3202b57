use super::{run_step, Recurse, Scheduler, TaskHandle};
use crate::subscription::Subscription;

/// Schedules work with `tokio::task::spawn_local`.
///
/// Must be used from inside a `tokio::task::LocalSet`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioLocalScheduler;

impl Scheduler for TokioLocalScheduler {
  fn schedule(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
    let handle = TaskHandle::new();
    let h = handle.clone();
    tokio::task::spawn_local(async move {
      if !h.is_closed() {
        task();
        h.finish();
      }
    });
    handle
  }

  fn schedule_recursive(&self, mut task: Box<dyn FnMut(&mut Recurse)>) -> TaskHandle {
    let handle = TaskHandle::new();
    let h = handle.clone();
    tokio::task::spawn_local(async move {
      while run_step(&mut *task, &h) {
        tokio::task::yield_now().await;
      }
      h.finish();
    });
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;
  use crate::scheduler::SchedulerExt;

  #[rxlite_macro::test]
  async fn runs_on_local_set() {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let handle = TokioLocalScheduler.schedule_recursive_fn(move |r| {
      c.set(c.get() + 1);
      if c.get() < 3 {
        r.again();
      }
    });
    while !handle.is_closed() {
      tokio::task::yield_now().await;
    }
    assert_eq!(count.get(), 3);
  }
}
