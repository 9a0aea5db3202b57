use super::{run_step, Recurse, Scheduler, TaskHandle};

/// Runs work synchronously on the caller's stack.
///
/// Recursive tasks are driven by a loop, so a source emitting a million values
/// uses constant stack depth.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
    task();
    TaskHandle::finished()
  }

  fn schedule_recursive(&self, mut task: Box<dyn FnMut(&mut Recurse)>) -> TaskHandle {
    let handle = TaskHandle::new();
    while run_step(&mut *task, &handle) {}
    handle.finish();
    handle
  }
}
