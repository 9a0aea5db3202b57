use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use super::{Job, Recurse, Scheduler, TaskHandle};

/// A current-thread queue.
///
/// Work scheduled while the queue is idle runs immediately; work scheduled
/// from inside a running job waits its turn. Each iteration of a recursive
/// task goes to the back of the queue, so several recursive sources sharing a
/// trampoline interleave instead of running one after another.
#[derive(Clone, Default)]
pub struct TrampolineScheduler(Rc<RefCell<TrampolineState>>);

#[derive(Default)]
struct TrampolineState {
  queue: VecDeque<Job>,
  draining: bool,
}

impl TrampolineScheduler {
  pub fn new() -> Self { Self::default() }

  fn enqueue(&self, job: Job) {
    let idle = {
      let mut state = self.0.borrow_mut();
      state.queue.push_back(job);
      !std::mem::replace(&mut state.draining, true)
    };
    if idle {
      self.drain();
    }
  }

  fn drain(&self) {
    loop {
      let job = {
        let mut state = self.0.borrow_mut();
        match state.queue.pop_front() {
          Some(job) => job,
          None => {
            state.draining = false;
            return;
          }
        }
      };
      if let Some(again) = job.run() {
        self.0.borrow_mut().queue.push_back(again);
      }
    }
  }
}

impl Scheduler for TrampolineScheduler {
  fn schedule(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
    let handle = TaskHandle::new();
    self.enqueue(Job::Once(task, handle.clone()));
    handle
  }

  fn schedule_recursive(&self, task: Box<dyn FnMut(&mut Recurse)>) -> TaskHandle {
    let handle = TaskHandle::new();
    self.enqueue(Job::Recursive(task, handle.clone()));
    handle
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{rc::MutRc, scheduler::SchedulerExt};

  #[rxlite_macro::test]
  fn nested_work_runs_after_current_job() {
    let log = MutRc::own(vec![]);
    let trampoline = TrampolineScheduler::new();
    let (l, t) = (log.clone(), trampoline.clone());
    trampoline.schedule_fn(move || {
      let inner = l.clone();
      t.schedule_fn(move || inner.rc_deref_mut().push("inner"));
      l.rc_deref_mut().push("outer");
    });
    assert_eq!(*log.rc_deref(), vec!["outer", "inner"]);
  }

  #[rxlite_macro::test]
  fn recursive_tasks_interleave() {
    let log = MutRc::own(vec![]);
    let trampoline = TrampolineScheduler::new();
    let t = trampoline.clone();
    let l = log.clone();
    trampoline.schedule_fn(move || {
      for name in ["a", "b"] {
        let l = l.clone();
        let mut n = 0;
        t.schedule_recursive_fn(move |r| {
          n += 1;
          l.rc_deref_mut().push(format!("{name}{n}"));
          if n < 2 {
            r.again();
          }
        });
      }
    });
    assert_eq!(*log.rc_deref(), vec!["a1", "b1", "a2", "b2"]);
  }
}
