use std::{cell::Cell, rc::Rc};

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::{BoxedSubscription, LocalSubscription, Subscription},
};

pub struct SkipUntilOp<N, Err> {
  notifier: Observable<N, Err>,
}

struct SkipUntilObserver<Item, Err> {
  downstream: Emitter<Item, Err>,
  open: Rc<Cell<bool>>,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for SkipUntilObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.open.get() {
      self.downstream.next(value)
    }
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

/// Opens the gate on the notifier's first value and then detaches from it.
struct NotifierObserver<Item, Err> {
  downstream: Emitter<Item, Err>,
  open: Rc<Cell<bool>>,
  subscription: LocalSubscription,
}

impl<N, Item: Clone, Err: Clone> Observer<N, Err> for NotifierObserver<Item, Err> {
  fn next(&mut self, _: N) {
    self.open.set(true);
    self.subscription.unsubscribe();
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) {}

  fn is_closed(&self) -> bool { self.open.get() || self.downstream.is_closed() }
}

impl<Item, Err, N> Operator<Item, Err> for SkipUntilOp<N, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  N: 'static,
{
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let open = Rc::new(Cell::new(false));
    let notifier_subscription = LocalSubscription::default();
    let notifier = NotifierObserver {
      downstream: downstream.clone(),
      open: open.clone(),
      subscription: notifier_subscription.clone(),
    };
    notifier_subscription.add(self.notifier.actual_subscribe(Box::new(notifier), scheduler));

    let all = LocalSubscription::default();
    all.add(notifier_subscription);
    all.add(source.actual_subscribe(Box::new(SkipUntilObserver { downstream, open }), scheduler));
    BoxedSubscription::new(all)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Drop values until `notifier` emits its first value.
  ///
  /// A notifier that completes without emitting keeps the gate shut; a
  /// notifier error is forwarded downstream.
  pub fn skip_until<N: 'static>(&self, notifier: &Observable<N, Err>) -> Self {
    let notifier = notifier.clone();
    self.lift(move || SkipUntilOp { notifier: notifier.clone() })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn forwards_after_notifier_fires() {
    let mut source = Subject::<i32, ()>::new();
    let mut notifier = Subject::<(), ()>::new();
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    source
      .as_observable()
      .skip_until(&notifier.as_observable())
      .subscribe_next(move |v| s.rc_deref_mut().push(v));
    source.next(1);
    source.next(2);
    notifier.next(());
    assert_eq!(notifier.observer_count(), 0);
    source.next(3);
    source.next(4);
    assert_eq!(*seen.rc_deref(), vec![3, 4]);
  }

  #[rxlite_macro::test]
  fn silent_notifier_keeps_gate_shut() {
    let mut source = Subject::<i32, ()>::new();
    let completed = MutRc::own(false);
    let c = completed.clone();
    source.as_observable().skip_until(&Observable::<(), ()>::empty()).subscribe_all(
      |_| panic!("no value expected"),
      |_| {},
      move || *c.rc_deref_mut() = true,
    );
    source.next(1);
    source.complete();
    assert!(*completed.rc_deref());
  }

  #[rxlite_macro::test]
  fn notifier_error_is_forwarded() {
    let mut source = Subject::<i32, &str>::new();
    let err = MutRc::own(None);
    let e = err.clone();
    source
      .as_observable()
      .skip_until(&Observable::<(), &str>::throw_err("boom"))
      .subscribe_err(|_| {}, move |x| *e.rc_deref_mut() = Some(x));
    assert_eq!(*err.rc_deref(), Some("boom"));
    assert_eq!(source.observer_count(), 0);
    source.next(1);
  }
}
