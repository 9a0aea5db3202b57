use std::rc::Rc;

use super::SubjectLike;
use crate::{
  observable::{Observable, Subscribable},
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  scheduler::SchedulerRef,
  subscriber::{RegistrySubscription, Subscribers},
  subscription::BoxedSubscription,
};

/// A plain multicast subject: subscribers only see what is emitted after they
/// subscribed.
///
/// ```
/// use rxlite::prelude::*;
///
/// let mut subject = Subject::<i32, ()>::new();
/// let seen = MutRc::own(vec![]);
/// let s = seen.clone();
/// subject.as_observable().subscribe_next(move |v| s.rc_deref_mut().push(v));
/// subject.next(1);
/// subject.next(2);
/// assert_eq!(*seen.rc_deref(), vec![1, 2]);
/// ```
pub struct Subject<Item, Err> {
  pub(crate) subscribers: MutRc<Subscribers<Item, Err>>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Self { subscribers: self.subscribers.clone() } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self { subscribers: MutRc::own(Subscribers::default()) } }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Register `observer`, or hand it the stored terminal notification.
  pub(crate) fn register(&self, observer: BoxedObserver<Item, Err>) -> BoxedSubscription {
    match Subscribers::subscribe(&self.subscribers, observer) {
      Some(id) => BoxedSubscription::new(RegistrySubscription::new(self.subscribers.clone(), id)),
      None => BoxedSubscription::closed(),
    }
  }

  /// Values still queued behind the broadcast in progress.
  pub(crate) fn queued_values(&self) -> usize { self.subscribers.rc_deref().queued_values() }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Subject<Item, Err> {
  fn next(&mut self, value: Item) { Subscribers::next(&self.subscribers, value); }

  fn error(&mut self, err: Err) { Subscribers::error(&self.subscribers, err); }

  fn complete(&mut self) { Subscribers::complete(&self.subscribers); }

  fn is_closed(&self) -> bool { self.subscribers.rc_deref().is_stopped() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Subscribable<Item, Err> for Subject<Item, Err> {
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Item, Err>, _: &SchedulerRef,
  ) -> BoxedSubscription {
    self.register(observer)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> SubjectLike<Item, Err> for Subject<Item, Err> {
  fn as_observable(&self) -> Observable<Item, Err> { Observable::from_subscribable(self.clone()) }

  fn is_stopped(&self) -> bool { self.subscribers.rc_deref().is_stopped() }

  fn observer_count(&self) -> usize { self.subscribers.rc_deref().len() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn late_subscriber_misses_earlier_values() {
    let mut subject = Subject::<i32, ()>::new();
    let seen = MutRc::own(vec![]);
    subject.next(1);
    let s = seen.clone();
    subject.as_observable().subscribe_next(move |v| s.rc_deref_mut().push(v));
    subject.next(2);
    assert_eq!(*seen.rc_deref(), vec![2]);
  }

  #[rxlite_macro::test]
  fn unsubscribe_detaches_one_observer() {
    let mut subject = Subject::<i32, ()>::new();
    let a = MutRc::own(vec![]);
    let b = MutRc::own(vec![]);
    let (a1, b1) = (a.clone(), b.clone());
    let mut sa = subject.as_observable().subscribe_next(move |v| a1.rc_deref_mut().push(v));
    subject.as_observable().subscribe_next(move |v| b1.rc_deref_mut().push(v));
    assert_eq!(subject.observer_count(), 2);
    subject.next(1);
    sa.unsubscribe();
    sa.unsubscribe();
    subject.next(2);
    assert_eq!(subject.observer_count(), 1);
    assert_eq!(*a.rc_deref(), vec![1]);
    assert_eq!(*b.rc_deref(), vec![1, 2]);
  }

  #[rxlite_macro::test]
  fn same_callback_subscribed_twice_is_removed_by_handle() {
    let mut subject = Subject::<i32, ()>::new();
    let count = MutRc::own(0);
    let observer = {
      let count = count.clone();
      move |_: i32| *count.rc_deref_mut() += 1
    };
    let mut first = subject.as_observable().subscribe_next(observer.clone());
    subject.as_observable().subscribe_next(observer);
    first.unsubscribe();
    subject.next(1);
    assert_eq!(*count.rc_deref(), 1);
  }

  #[rxlite_macro::test]
  fn terminal_is_remembered() {
    let mut subject = Subject::<i32, &str>::new();
    subject.error("boom");
    subject.next(1);
    assert!(subject.is_stopped());
    let err = MutRc::own(None);
    let e = err.clone();
    let sub = subject.as_observable().subscribe_err(|_| {}, move |x| *e.rc_deref_mut() = Some(x));
    assert!(sub.is_closed());
    assert_eq!(*err.rc_deref(), Some("boom"));
  }

  #[rxlite_macro::test]
  fn emitting_from_inside_a_subscriber_is_ordered() {
    let subject = Subject::<i32, ()>::new();
    let mut inner = subject.clone();
    subject.as_observable().subscribe_next(move |v| {
      if v < 3 {
        inner.next(v + 1);
      }
    });
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    subject.as_observable().subscribe_next(move |v| s.rc_deref_mut().push(v));
    subject.clone().next(1);
    assert_eq!(*seen.rc_deref(), vec![1, 2, 3]);
  }
}
