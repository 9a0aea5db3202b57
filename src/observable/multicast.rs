use std::rc::Rc;

use super::{Observable, Subscribable};
use crate::{
  observer::BoxedObserver,
  scheduler::SchedulerRef,
  subject::SubjectLike,
  subscription::{BoxedSubscription, LocalSubscription},
};

/// Per subscription: makes a subject, lets a selector build a pipeline over
/// it, subscribes the observer to that pipeline and only then connects the
/// source to the subject.
pub struct MulticastObservable<Item, Err, S, Out, OutErr> {
  source: Observable<Item, Err>,
  factory: Rc<dyn Fn() -> S>,
  selector: Rc<dyn Fn(Observable<Item, Err>) -> Observable<Out, OutErr>>,
}

impl<Item, Err, S, Out, OutErr> MulticastObservable<Item, Err, S, Out, OutErr> {
  pub fn new(
    source: Observable<Item, Err>, factory: impl Fn() -> S + 'static,
    selector: impl Fn(Observable<Item, Err>) -> Observable<Out, OutErr> + 'static,
  ) -> Self {
    Self { source, factory: Rc::new(factory), selector: Rc::new(selector) }
  }
}

impl<Item, Err, S, Out, OutErr> Subscribable<Out, OutErr>
  for MulticastObservable<Item, Err, S, Out, OutErr>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  S: SubjectLike<Item, Err>,
  Out: 'static,
  OutErr: 'static,
{
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Out, OutErr>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let subject = (self.factory)();
    let selected = (self.selector)(subject.as_observable());
    let subscription = LocalSubscription::default();
    subscription.add(selected.actual_subscribe(observer, scheduler));
    subscription.add(self.source.subscribe_with_scheduler(subject, scheduler).into_inner());
    BoxedSubscription::new(subscription)
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[rxlite_macro::test]
  fn selector_sees_one_source_run() {
    let starts = Rc::new(Cell::new(0));
    let s = starts.clone();
    let source = Observable::<i32, ()>::defer(move || {
      s.set(s.get() + 1);
      Observable::from_array(vec![1, 2, 3])
    });
    let seen = MutRc::own(vec![]);
    let v = seen.clone();
    source
      .publish_with(|shared| shared.zip(&shared.map(|x| x * 10)))
      .subscribe_next(move |pair| v.rc_deref_mut().push(pair));
    assert_eq!(starts.get(), 1);
    assert_eq!(*seen.rc_deref(), vec![(1, 10), (2, 20), (3, 30)]);
  }

  #[rxlite_macro::test]
  fn every_subscription_gets_its_own_subject() {
    let source = Observable::<i32, ()>::defer(|| Observable::from_array(vec![1, 2]));
    let multicast = source.multicast_with_selector(Subject::<i32, ()>::new, |s| s.map(|v| v + 1));
    let seen = MutRc::own(vec![]);
    for _ in 0..2 {
      let v = seen.clone();
      multicast.subscribe_next(move |x| v.rc_deref_mut().push(x));
    }
    assert_eq!(*seen.rc_deref(), vec![2, 3, 2, 3]);
  }
}
