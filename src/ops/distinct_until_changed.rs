use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct DistinctUntilChangedOp<F> {
  key: F,
}

struct DistinctUntilChangedObserver<Item, Err, F, K> {
  downstream: Emitter<Item, Err>,
  key: F,
  last: Option<K>,
}

impl<Item, Err, F, K> Observer<Item, Err> for DistinctUntilChangedObserver<Item, Err, F, K>
where
  Item: Clone,
  Err: Clone,
  F: FnMut(&Item) -> K,
  K: PartialEq,
{
  fn next(&mut self, value: Item) {
    let key = (self.key)(&value);
    if self.last.as_ref() != Some(&key) {
      self.last = Some(key);
      self.downstream.next(value);
    }
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item, Err, F, K> Operator<Item, Err> for DistinctUntilChangedOp<F>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  F: FnMut(&Item) -> K + 'static,
  K: PartialEq + 'static,
{
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let observer = DistinctUntilChangedObserver { downstream, key: self.key, last: None };
    source.actual_subscribe(Box::new(observer), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Suppress values equal to the one emitted right before them.
  pub fn distinct_until_changed(&self) -> Self
  where
    Item: PartialEq,
  {
    self.distinct_until_key_changed(Item::clone)
  }

  /// Suppress values whose key equals the key of the value emitted right
  /// before them.
  pub fn distinct_until_key_changed<K, F>(&self, key: F) -> Self
  where
    K: PartialEq + 'static,
    F: FnMut(&Item) -> K + Clone + 'static,
  {
    self.lift(move || DistinctUntilChangedOp { key: key.clone() })
  }
}
