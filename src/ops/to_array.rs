use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct ToArrayOp;

struct ToArrayObserver<Item, Err> {
  downstream: Emitter<Vec<Item>, Err>,
  buffer: Vec<Item>,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for ToArrayObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.buffer.push(value) }

  fn error(&mut self, err: Err) {
    self.buffer.clear();
    self.downstream.error(err)
  }

  fn complete(&mut self) {
    self.downstream.next(std::mem::take(&mut self.buffer));
    self.downstream.complete()
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Operator<Item, Err> for ToArrayOp {
  type Item = Vec<Item>;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Vec<Item>, Err>,
    scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    source.actual_subscribe(Box::new(ToArrayObserver { downstream, buffer: vec![] }), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Collect every value and emit them as one `Vec` when the source completes.
  #[doc(alias = "collect")]
  pub fn to_array(&self) -> Observable<Vec<Item>, Err> { self.lift(|| ToArrayOp) }
}
