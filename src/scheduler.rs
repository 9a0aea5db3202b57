//! Schedulers decide when (and on which queue) work runs.
//!
//! A scheduler is always passed explicitly: `subscribe` uses a fresh
//! [`ImmediateScheduler`] and `subscribe_with_scheduler` takes any other one.
//! There is no process-wide default.
//!
//! Recursive work goes through [`Scheduler::schedule_recursive`]. The task
//! receives a [`Recurse`] continuation and calls [`Recurse::again`] to ask for
//! another iteration; schedulers run the iterations from a loop or a queue, so
//! the call stack stays flat no matter how many iterations a source needs.

mod immediate;
#[cfg(feature = "tokio-scheduler")]
mod tokio_local;
mod local_pool;
mod test_scheduler;
mod trampoline;

use std::{
  cell::Cell,
  future::Future,
  pin::Pin,
  rc::Rc,
  task::{Context, Poll},
};

pub use immediate::ImmediateScheduler;
pub use local_pool::LocalPoolScheduler;
pub use test_scheduler::TestScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_local::TokioLocalScheduler;
pub use trampoline::TrampolineScheduler;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};
#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

use crate::subscription::Subscription;

pub trait Scheduler {
  /// Run `task` once. The returned handle cancels it if it has not run yet.
  fn schedule(&self, task: Box<dyn FnOnce()>) -> TaskHandle;

  /// Run `task` repeatedly for as long as each iteration calls
  /// [`Recurse::again`] and the handle stays open.
  fn schedule_recursive(&self, task: Box<dyn FnMut(&mut Recurse)>) -> TaskHandle;

  /// The scheduler's clock.
  fn now(&self) -> Instant { Instant::now() }
}

pub type SchedulerRef = Rc<dyn Scheduler>;

/// Closure-friendly entry points for any scheduler.
pub trait SchedulerExt: Scheduler {
  fn schedule_fn(&self, task: impl FnOnce() + 'static) -> TaskHandle {
    self.schedule(Box::new(task))
  }

  fn schedule_recursive_fn(&self, task: impl FnMut(&mut Recurse) + 'static) -> TaskHandle {
    self.schedule_recursive(Box::new(task))
  }
}

impl<S: Scheduler + ?Sized> SchedulerExt for S {}

/// Continuation handed to each iteration of a recursive task.
#[derive(Default)]
pub struct Recurse {
  again: bool,
}

impl Recurse {
  /// Request one more iteration after the current one returns.
  #[inline]
  pub fn again(&mut self) { self.again = true }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskState {
  #[default]
  Pending,
  Finished,
  Cancelled,
}

/// Handle to scheduled work. Clones observe the same task.
#[derive(Clone, Default)]
pub struct TaskHandle(Rc<Cell<TaskState>>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// A handle for work that already ran.
  pub fn finished() -> Self { Self(Rc::new(Cell::new(TaskState::Finished))) }

  #[inline]
  pub fn state(&self) -> TaskState { self.0.get() }

  pub(crate) fn finish(&self) {
    if self.0.get() == TaskState::Pending {
      self.0.set(TaskState::Finished)
    }
  }
}

impl Subscription for TaskHandle {
  fn unsubscribe(&mut self) {
    if self.0.get() == TaskState::Pending {
      self.0.set(TaskState::Cancelled)
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.get() != TaskState::Pending }
}

/// Runs a single iteration of a recursive task and reports whether another
/// one should follow.
pub(crate) fn run_step(task: &mut dyn FnMut(&mut Recurse), handle: &TaskHandle) -> bool {
  if handle.is_closed() {
    return false;
  }
  let mut recurse = Recurse::default();
  task(&mut recurse);
  recurse.again && !handle.is_closed()
}

/// Work waiting in a queue-based scheduler.
pub(crate) enum Job {
  Once(Box<dyn FnOnce()>, TaskHandle),
  Recursive(Box<dyn FnMut(&mut Recurse)>, TaskHandle),
}

impl Job {
  /// Runs the job; a recursive job that asked for another iteration comes
  /// back so the caller can queue it behind the work already waiting.
  pub(crate) fn run(self) -> Option<Job> {
    match self {
      Job::Once(task, handle) => {
        if !handle.is_closed() {
          task();
          handle.finish();
        }
        None
      }
      Job::Recursive(mut task, handle) => {
        if run_step(&mut *task, &handle) {
          Some(Job::Recursive(task, handle))
        } else {
          handle.finish();
          None
        }
      }
    }
  }
}

/// Yields once to the executor so other local tasks get a turn between
/// iterations of a recursive task.
pub(crate) struct YieldNow(bool);

impl YieldNow {
  pub(crate) fn new() -> Self { Self(false) }
}

impl Future for YieldNow {
  type Output = ();

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    if self.0 {
      Poll::Ready(())
    } else {
      self.0 = true;
      cx.waker().wake_by_ref();
      Poll::Pending
    }
  }
}
