//! Accumulate a whole stream into a single value.
//!
//! `reduce` without a seed starts from the first value and emits nothing for an
//! empty source; `reduce_initial` always emits, even for an empty source.

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

/// How one value is folded into the accumulator.
pub trait ReduceStrategy<Acc, Item> {
  /// `acc` is `None` only before the first value of an unseeded fold.
  fn apply(&mut self, acc: Option<Acc>, value: Item) -> Option<Acc>;
}

/// Unseeded fold: the first value becomes the accumulator.
#[derive(Clone)]
pub struct ReduceFn<F>(F);

impl<F, Item> ReduceStrategy<Item, Item> for ReduceFn<F>
where
  F: FnMut(Item, Item) -> Item,
{
  fn apply(&mut self, acc: Option<Item>, value: Item) -> Option<Item> {
    match acc {
      Some(acc) => Some((self.0)(acc, value)),
      None => Some(value),
    }
  }
}

/// Seeded fold.
#[derive(Clone)]
pub struct ReduceInitialFn<F>(F);

impl<F, Acc, Item> ReduceStrategy<Acc, Item> for ReduceInitialFn<F>
where
  F: FnMut(Acc, Item) -> Acc,
{
  fn apply(&mut self, acc: Option<Acc>, value: Item) -> Option<Acc> {
    acc.map(|acc| (self.0)(acc, value))
  }
}

pub struct ReduceOp<S, Acc> {
  strategy: S,
  initial: Option<Acc>,
}

struct ReduceObserver<S, Acc, Err> {
  downstream: Emitter<Acc, Err>,
  strategy: S,
  acc: Option<Acc>,
}

impl<Item, Err, Acc, S> Observer<Item, Err> for ReduceObserver<S, Acc, Err>
where
  Acc: Clone,
  Err: Clone,
  S: ReduceStrategy<Acc, Item>,
{
  fn next(&mut self, value: Item) { self.acc = self.strategy.apply(self.acc.take(), value); }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) {
    if let Some(acc) = self.acc.take() {
      self.downstream.next(acc);
    }
    self.downstream.complete()
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item, Err, Acc, S> Operator<Item, Err> for ReduceOp<S, Acc>
where
  Item: 'static,
  Err: Clone + 'static,
  Acc: Clone + 'static,
  S: ReduceStrategy<Acc, Item> + 'static,
{
  type Item = Acc;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Acc, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let observer = ReduceObserver { downstream, strategy: self.strategy, acc: self.initial };
    source.actual_subscribe(Box::new(observer), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Fold the stream with `func`, using the first value as the starting point.
  pub fn reduce<F>(&self, func: F) -> Self
  where
    F: FnMut(Item, Item) -> Item + Clone + 'static,
  {
    self.lift(move || ReduceOp { strategy: ReduceFn(func.clone()), initial: None })
  }

  /// Fold the stream with `func`, starting from `seed`.
  pub fn reduce_initial<Acc, F>(&self, seed: Acc, func: F) -> Observable<Acc, Err>
  where
    Acc: Clone + 'static,
    F: FnMut(Acc, Item) -> Acc + Clone + 'static,
  {
    self.lift(move || ReduceOp {
      strategy: ReduceInitialFn(func.clone()),
      initial: Some(seed.clone()),
    })
  }

  /// Emit the number of values once the source completes.
  pub fn count(&self) -> Observable<usize, Err> { self.reduce_initial(0, |acc, _| acc + 1) }
}
