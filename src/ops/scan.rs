use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct ScanOp<Acc, F> {
  seed: Acc,
  func: F,
}

struct ScanObserver<Acc, Err, F> {
  downstream: Emitter<Acc, Err>,
  acc: Acc,
  func: F,
}

impl<Item, Err, Acc, F> Observer<Item, Err> for ScanObserver<Acc, Err, F>
where
  Acc: Clone,
  Err: Clone,
  F: FnMut(Acc, Item) -> Acc,
{
  fn next(&mut self, value: Item) {
    self.acc = (self.func)(self.acc.clone(), value);
    self.downstream.next(self.acc.clone());
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item, Err, Acc, F> Operator<Item, Err> for ScanOp<Acc, F>
where
  Item: 'static,
  Err: Clone + 'static,
  Acc: Clone + 'static,
  F: FnMut(Acc, Item) -> Acc + 'static,
{
  type Item = Acc;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Acc, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let observer = ScanObserver { downstream, acc: self.seed, func: self.func };
    source.actual_subscribe(Box::new(observer), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Emit every intermediate accumulation of `func`, starting from `seed`.
  pub fn scan<Acc, F>(&self, seed: Acc, func: F) -> Observable<Acc, Err>
  where
    Acc: Clone + 'static,
    F: FnMut(Acc, Item) -> Acc + Clone + 'static,
  {
    self.lift(move || ScanOp { seed: seed.clone(), func: func.clone() })
  }
}
