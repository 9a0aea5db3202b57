use std::collections::VecDeque;

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct SkipLastOp {
  count: usize,
}

struct SkipLastObserver<Item, Err> {
  downstream: Emitter<Item, Err>,
  count: usize,
  queue: VecDeque<Item>,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for SkipLastObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    self.queue.push_back(value);
    if self.queue.len() > self.count {
      if let Some(oldest) = self.queue.pop_front() {
        self.downstream.next(oldest);
      }
    }
  }

  fn error(&mut self, err: Err) {
    self.queue.clear();
    self.downstream.error(err)
  }

  fn complete(&mut self) {
    self.queue.clear();
    self.downstream.complete()
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Operator<Item, Err> for SkipLastOp {
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let queue = VecDeque::with_capacity(self.count);
    let observer = SkipLastObserver { downstream, count: self.count, queue };
    source.actual_subscribe(Box::new(observer), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Drop the last `count` values.
  ///
  /// Values are held back `count` positions and released as newer ones
  /// arrive; whatever is still held when the source terminates is discarded.
  pub fn skip_last(&self, count: usize) -> Self { self.lift(move || SkipLastOp { count }) }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn drops_trailing_values() {
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    Observable::<_, ()>::from_iter(0..10).skip_last(5).subscribe_all(
      move |v| l1.rc_deref_mut().push(v.to_string()),
      |_| {},
      move || l2.rc_deref_mut().push("complete".into()),
    );
    assert_eq!(*log.rc_deref(), vec!["0", "1", "2", "3", "4", "complete"]);
  }

  #[rxlite_macro::test]
  fn emits_while_source_is_running() {
    let mut subject = Subject::<i32, ()>::new();
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    subject.as_observable().skip_last(1).subscribe_next(move |v| s.rc_deref_mut().push(v));
    subject.next(1);
    assert!(seen.rc_deref().is_empty());
    subject.next(2);
    assert_eq!(*seen.rc_deref(), vec![1]);
  }

  #[rxlite_macro::test]
  fn fewer_values_than_count() {
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    Observable::<_, ()>::from_iter(0..3)
      .skip_last(5)
      .subscribe_next(move |v| s.rc_deref_mut().push(v));
    assert!(seen.rc_deref().is_empty());
  }
}
