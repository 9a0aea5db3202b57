//! Deterministic scheduler for tests.
//!
//! Nothing runs until the test asks for it: `flush` drains the queue,
//! `run_next` executes a single job. The clock is virtual and only moves with
//! `advance_by`, which makes time-windowed replay testable without sleeping.
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let seen = MutRc::own(vec![]);
//! let s = seen.clone();
//! Observable::<i32, ()>::from_array(vec![1, 2, 3])
//!   .subscribe_with_scheduler(
//!     FnMutObserver(move |v| s.rc_deref_mut().push(v)),
//!     &scheduler.scheduler_ref(),
//!   );
//! assert!(seen.rc_deref().is_empty());
//! scheduler.flush();
//! assert_eq!(*seen.rc_deref(), vec![1, 2, 3]);
//! ```

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use super::{Duration, Instant, Job, Recurse, Scheduler, SchedulerRef, TaskHandle};

struct TestState {
  base: Instant,
  elapsed: Duration,
  queue: VecDeque<Job>,
}

/// Instance-scoped virtual-time scheduler. Clones share one queue and clock.
#[derive(Clone)]
pub struct TestScheduler(Rc<RefCell<TestState>>);

impl Default for TestScheduler {
  fn default() -> Self { Self::new() }
}

impl TestScheduler {
  pub fn new() -> Self {
    Self(Rc::new(RefCell::new(TestState {
      base: Instant::now(),
      elapsed: Duration::ZERO,
      queue: VecDeque::new(),
    })))
  }

  /// This scheduler as a [`SchedulerRef`].
  pub fn scheduler_ref(&self) -> SchedulerRef { Rc::new(self.clone()) }

  /// Run exactly one queued job. Returns false when the queue was empty.
  pub fn run_next(&self) -> bool {
    let job = self.0.borrow_mut().queue.pop_front();
    match job {
      Some(job) => {
        if let Some(again) = job.run() {
          self.0.borrow_mut().queue.push_back(again);
        }
        true
      }
      None => false,
    }
  }

  /// Run jobs until the queue is empty, including jobs queued while running.
  pub fn flush(&self) { while self.run_next() {} }

  pub fn pending_count(&self) -> usize { self.0.borrow().queue.len() }

  /// Move the virtual clock forward.
  pub fn advance_by(&self, duration: Duration) { self.0.borrow_mut().elapsed += duration; }

  pub fn elapsed(&self) -> Duration { self.0.borrow().elapsed }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
    let handle = TaskHandle::new();
    self.0.borrow_mut().queue.push_back(Job::Once(task, handle.clone()));
    handle
  }

  fn schedule_recursive(&self, task: Box<dyn FnMut(&mut Recurse)>) -> TaskHandle {
    let handle = TaskHandle::new();
    self.0.borrow_mut().queue.push_back(Job::Recursive(task, handle.clone()));
    handle
  }

  fn now(&self) -> Instant {
    let state = self.0.borrow();
    state.base + state.elapsed
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;
  use crate::{scheduler::SchedulerExt, subscription::Subscription};

  #[rxlite_macro::test]
  fn work_waits_for_flush() {
    let scheduler = TestScheduler::new();
    let hit = Rc::new(Cell::new(0));
    let h = hit.clone();
    scheduler.schedule_fn(move || h.set(h.get() + 1));
    assert_eq!(hit.get(), 0);
    assert_eq!(scheduler.pending_count(), 1);
    scheduler.flush();
    assert_eq!(hit.get(), 1);
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[rxlite_macro::test]
  fn cancelled_work_never_runs() {
    let scheduler = TestScheduler::new();
    let hit = Rc::new(Cell::new(false));
    let h = hit.clone();
    let mut handle = scheduler.schedule_fn(move || h.set(true));
    handle.unsubscribe();
    scheduler.flush();
    assert!(!hit.get());
  }

  #[rxlite_macro::test]
  fn recursive_task_runs_one_iteration_per_step() {
    let scheduler = TestScheduler::new();
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let mut handle = scheduler.schedule_recursive_fn(move |r| {
      c.set(c.get() + 1);
      r.again();
    });
    scheduler.run_next();
    scheduler.run_next();
    assert_eq!(count.get(), 2);
    handle.unsubscribe();
    scheduler.flush();
    assert_eq!(count.get(), 2);
  }

  #[rxlite_macro::test]
  fn clock_moves_only_when_advanced() {
    let scheduler = TestScheduler::new();
    let start = scheduler.now();
    assert_eq!(scheduler.now(), start);
    scheduler.advance_by(Duration::from_millis(250));
    assert_eq!(scheduler.now() - start, Duration::from_millis(250));
    assert_eq!(scheduler.elapsed(), Duration::from_millis(250));
  }
}
