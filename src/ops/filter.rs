use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct FilterOp<F> {
  predicate: F,
}

struct FilterObserver<Item, Err, F> {
  downstream: Emitter<Item, Err>,
  predicate: F,
}

impl<Item, Err, F> Observer<Item, Err> for FilterObserver<Item, Err, F>
where
  Item: Clone,
  Err: Clone,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.downstream.next(value)
    }
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item, Err, F> Operator<Item, Err> for FilterOp<F>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  F: FnMut(&Item) -> bool + 'static,
{
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let observer = FilterObserver { downstream, predicate: self.predicate };
    source.actual_subscribe(Box::new(observer), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Forward only the values `predicate` accepts.
  pub fn filter<F>(&self, predicate: F) -> Self
  where
    F: FnMut(&Item) -> bool + Clone + 'static,
  {
    self.lift(move || FilterOp { predicate: predicate.clone() })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn keeps_matching_values() {
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    Observable::<_, ()>::from_iter(0..10)
      .filter(|v| v % 3 == 0)
      .subscribe_next(move |v| s.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![0, 3, 6, 9]);
  }

  #[rxlite_macro::test]
  fn terminal_passes_through_when_nothing_matches() {
    let completed = MutRc::own(false);
    let c = completed.clone();
    Observable::<_, ()>::from_array(vec![1, 3, 5])
      .filter(|v| v % 2 == 0)
      .subscribe_all(|_| panic!("no value expected"), |_| {}, move || *c.rc_deref_mut() = true);
    assert!(*completed.rc_deref());
  }
}
