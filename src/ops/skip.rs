use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct SkipOp {
  count: usize,
}

struct SkipObserver<Item, Err> {
  downstream: Emitter<Item, Err>,
  remaining: usize,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for SkipObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      self.downstream.next(value);
    } else {
      self.remaining -= 1;
    }
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Operator<Item, Err> for SkipOp {
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    source.actual_subscribe(Box::new(SkipObserver { downstream, remaining: self.count }), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Drop the first `count` values.
  pub fn skip(&self, count: usize) -> Self { self.lift(move || SkipOp { count }) }
}
