use std::rc::Rc;

use super::{Observable, Subscribable};
use crate::{observer::BoxedObserver, scheduler::SchedulerRef, subscription::BoxedSubscription};

struct DeferObservable<Item, Err> {
  factory: Box<dyn Fn() -> Observable<Item, Err>>,
}

impl<Item, Err> Subscribable<Item, Err> for DeferObservable<Item, Err> {
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    (self.factory)().actual_subscribe(observer, scheduler)
  }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Calls `factory` on every subscription and subscribes to the observable
  /// it returns, so each subscriber gets its own run.
  pub fn defer(factory: impl Fn() -> Observable<Item, Err> + 'static) -> Self {
    Observable::from_subscribable(DeferObservable { factory: Box::new(factory) })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[rxlite_macro::test]
  fn factory_runs_per_subscription() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let source = Observable::<_, ()>::defer(move || {
      c.set(c.get() + 1);
      Observable::just(c.get())
    });
    assert_eq!(calls.get(), 0);
    let seen = MutRc::own(vec![]);
    for _ in 0..2 {
      let s = seen.clone();
      source.subscribe_next(move |v| s.rc_deref_mut().push(v));
    }
    assert_eq!(calls.get(), 2);
    assert_eq!(*seen.rc_deref(), vec![1, 2]);
  }
}
