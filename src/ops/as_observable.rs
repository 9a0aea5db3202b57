use std::rc::Rc;

use crate::{
  observable::{Observable, Subscribable},
  observer::BoxedObserver,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

/// Forwards subscriptions to the wrapped observable without exposing it.
struct Hidden<Item, Err>(Observable<Item, Err>);

impl<Item, Err> Subscribable<Item, Err> for Hidden<Item, Err> {
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    self.0.actual_subscribe(observer, scheduler)
  }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// A new handle that forwards to this observable but is a distinct
  /// instance, hiding the identity of whatever produced it (a subject, for
  /// instance).
  pub fn as_observable(&self) -> Self { Observable::from_subscribable(Hidden(self.clone())) }
}
