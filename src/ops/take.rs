use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct TakeOp {
  count: usize,
}

struct TakeObserver<Item, Err> {
  downstream: Emitter<Item, Err>,
  remaining: usize,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for TakeObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
      self.downstream.next(value);
      if self.remaining == 0 {
        self.downstream.complete();
      }
    }
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }

  fn is_closed(&self) -> bool { self.remaining == 0 || self.downstream.is_closed() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Operator<Item, Err> for TakeOp {
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    if self.count == 0 {
      downstream.complete();
      return BoxedSubscription::closed();
    }
    source.actual_subscribe(Box::new(TakeObserver { downstream, remaining: self.count }), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Forward the first `count` values, then complete and release the source.
  ///
  /// `take(0)` completes without subscribing to the source at all.
  pub fn take(&self, count: usize) -> Self { self.lift(move || TakeOp { count }) }
}
