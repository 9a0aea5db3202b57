use std::rc::Rc;

use super::{Subject, SubjectLike};
use crate::{
  observable::{Observable, Subscribable},
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

/// A subject that always holds a current value and hands it to every new
/// subscriber before anything else.
pub struct BehaviorSubject<Item, Err> {
  subject: Subject<Item, Err>,
  value: MutRc<Item>,
}

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self { Self { subject: self.subject.clone(), value: self.value.clone() } }
}

impl<Item: Clone + 'static, Err: Clone + 'static> BehaviorSubject<Item, Err> {
  pub fn new(value: Item) -> Self { Self { subject: Subject::new(), value: MutRc::own(value) } }

  /// The most recent value.
  pub fn value(&self) -> Item { self.value.rc_deref().clone() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observer<Item, Err>
  for BehaviorSubject<Item, Err>
{
  fn next(&mut self, value: Item) {
    if self.subject.is_stopped() {
      return;
    }
    *self.value.rc_deref_mut() = value.clone();
    self.subject.next(value);
  }

  fn error(&mut self, err: Err) { self.subject.error(err) }

  fn complete(&mut self) { self.subject.complete() }

  fn is_closed(&self) -> bool { self.subject.is_stopped() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Subscribable<Item, Err>
  for BehaviorSubject<Item, Err>
{
  fn actual_subscribe(
    self: Rc<Self>, mut observer: BoxedObserver<Item, Err>, _: &SchedulerRef,
  ) -> BoxedSubscription {
    // A value still queued behind the current broadcast reaches the new
    // observer through the queue.
    if !self.subject.is_stopped() && self.subject.queued_values() == 0 {
      observer.next(self.value());
    }
    self.subject.register(observer)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> SubjectLike<Item, Err>
  for BehaviorSubject<Item, Err>
{
  fn as_observable(&self) -> Observable<Item, Err> { Observable::from_subscribable(self.clone()) }

  fn is_stopped(&self) -> bool { self.subject.is_stopped() }

  fn observer_count(&self) -> usize { self.subject.observer_count() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn new_subscriber_gets_current_value_first() {
    let mut subject = BehaviorSubject::<i32, ()>::new(0);
    let seen = MutRc::own(vec![]);
    subject.next(1);
    let s = seen.clone();
    subject.as_observable().subscribe_next(move |v| s.rc_deref_mut().push(v));
    subject.next(2);
    assert_eq!(*seen.rc_deref(), vec![1, 2]);
    assert_eq!(subject.value(), 2);
  }

  #[rxlite_macro::test]
  fn completed_subject_only_completes() {
    let mut subject = BehaviorSubject::<i32, ()>::new(5);
    subject.complete();
    subject.next(6);
    assert_eq!(subject.value(), 5);
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    subject.as_observable().subscribe_all(
      move |v| l1.rc_deref_mut().push(v.to_string()),
      |_| {},
      move || l2.rc_deref_mut().push("complete".to_string()),
    );
    assert_eq!(*log.rc_deref(), vec!["complete"]);
  }

  #[rxlite_macro::test]
  fn observer_joining_mid_broadcast_sees_queued_value_once() {
    let mut subject = BehaviorSubject::<i32, ()>::new(0);
    let late = MutRc::own(vec![]);
    let (inner, l) = (subject.clone(), late.clone());
    subject.as_observable().subscribe_next(move |v| {
      if v == 1 {
        let mut inner = inner.clone();
        inner.next(2);
        let l = l.clone();
        inner.as_observable().subscribe_next(move |v| l.rc_deref_mut().push(v));
      }
    });
    subject.next(1);
    assert_eq!(*late.rc_deref(), vec![2]);
    assert_eq!(subject.value(), 2);
  }
}
