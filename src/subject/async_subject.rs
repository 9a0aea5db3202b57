use std::{cell::Cell, rc::Rc};

use super::{Subject, SubjectLike};
use crate::{
  observable::{Observable, Subscribable},
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

/// A subject that emits only its last value, and only once it completes.
pub struct AsyncSubject<Item, Err> {
  subject: Subject<Item, Err>,
  last: MutRc<Option<Item>>,
  /// Set when `complete` is accepted, before the last value goes out.
  finished: Rc<Cell<bool>>,
}

impl<Item, Err> Clone for AsyncSubject<Item, Err> {
  fn clone(&self) -> Self {
    Self { subject: self.subject.clone(), last: self.last.clone(), finished: self.finished.clone() }
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Default for AsyncSubject<Item, Err> {
  fn default() -> Self {
    Self { subject: Subject::new(), last: MutRc::own(None), finished: Rc::new(Cell::new(false)) }
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> AsyncSubject<Item, Err> {
  pub fn new() -> Self { Self::default() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observer<Item, Err> for AsyncSubject<Item, Err> {
  fn next(&mut self, value: Item) {
    if !self.is_closed() {
      *self.last.rc_deref_mut() = Some(value);
    }
  }

  fn error(&mut self, err: Err) {
    if !self.finished.get() {
      self.subject.error(err)
    }
  }

  fn complete(&mut self) {
    if self.is_closed() {
      return;
    }
    self.finished.set(true);
    let last = self.last.rc_deref().clone();
    if let Some(value) = last {
      self.subject.next(value);
    }
    self.subject.complete();
  }

  fn is_closed(&self) -> bool { self.finished.get() || self.subject.is_stopped() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Subscribable<Item, Err>
  for AsyncSubject<Item, Err>
{
  fn actual_subscribe(
    self: Rc<Self>, mut observer: BoxedObserver<Item, Err>, _: &SchedulerRef,
  ) -> BoxedSubscription {
    // Observers arriving while the last value is still queued get it from the
    // queue instead.
    if self.finished.get() && self.subject.queued_values() == 0 {
      let last = self.last.rc_deref().clone();
      if let Some(value) = last {
        observer.next(value);
      }
    }
    self.subject.register(observer)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> SubjectLike<Item, Err>
  for AsyncSubject<Item, Err>
{
  fn as_observable(&self) -> Observable<Item, Err> { Observable::from_subscribable(self.clone()) }

  fn is_stopped(&self) -> bool { self.finished.get() || self.subject.is_stopped() }

  fn observer_count(&self) -> usize { self.subject.observer_count() }
}
