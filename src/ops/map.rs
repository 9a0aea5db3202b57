use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

#[derive(Clone)]
pub struct MapOp<F> {
  func: F,
}

struct MapObserver<Out, Err, F> {
  downstream: Emitter<Out, Err>,
  func: F,
}

impl<Item, Err, Out, F> Observer<Item, Err> for MapObserver<Out, Err, F>
where
  Out: Clone,
  Err: Clone,
  F: FnMut(Item) -> Out,
{
  fn next(&mut self, value: Item) { self.downstream.next((self.func)(value)) }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item, Err, Out, F> Operator<Item, Err> for MapOp<F>
where
  Item: 'static,
  Err: Clone + 'static,
  Out: Clone + 'static,
  F: FnMut(Item) -> Out + 'static,
{
  type Item = Out;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Out, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    source.actual_subscribe(Box::new(MapObserver { downstream, func: self.func }), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Transform every value with `func`.
  ///
  /// `func` is cloned for every run, so any state it captures by value is
  /// private to that run.
  pub fn map<Out, F>(&self, func: F) -> Observable<Out, Err>
  where
    Out: Clone + 'static,
    F: FnMut(Item) -> Out + Clone + 'static,
  {
    self.lift(move || MapOp { func: func.clone() })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn maps_values_and_forwards_completion() {
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    Observable::<_, ()>::from_array(vec![1, 2, 3]).map(|v| v * 2).subscribe_all(
      move |v| l1.rc_deref_mut().push(v.to_string()),
      |_| {},
      move || l2.rc_deref_mut().push("complete".into()),
    );
    assert_eq!(*log.rc_deref(), vec!["2", "4", "6", "complete"]);
  }

  #[rxlite_macro::test]
  fn forwards_errors() {
    let err = MutRc::own(None);
    let e = err.clone();
    Observable::<i32, &str>::throw_err("boom")
      .map(|v| v + 1)
      .subscribe_err(|_| {}, move |x| *e.rc_deref_mut() = Some(x));
    assert_eq!(*err.rc_deref(), Some("boom"));
  }

  #[rxlite_macro::test]
  fn map_types() {
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    Observable::<_, ()>::just(3).map(|v: i32| format!("#{v}")).subscribe_next(move |v| {
      s.rc_deref_mut().push(v);
    });
    assert_eq!(*seen.rc_deref(), vec!["#3".to_string()]);
  }

  #[rxlite_macro::test]
  fn deferred_chain_gets_fresh_state_per_run() {
    let numbered = Observable::<_, ()>::defer(|| {
      let mut counter = 0;
      Observable::from_array(vec![10, 20]).map(move |v| {
        counter += 1;
        (counter, v)
      })
    });
    let seen = MutRc::own(vec![]);
    for _ in 0..2 {
      let s = seen.clone();
      numbered.subscribe_next(move |p| s.rc_deref_mut().push(p));
    }
    assert_eq!(*seen.rc_deref(), vec![(1, 10), (2, 20), (1, 10), (2, 20)]);
  }

  #[test]
  fn bench() { do_bench(); }

  bencher::benchmark_group!(do_bench, bench_map);

  fn bench_map(b: &mut bencher::Bencher) {
    b.iter(|| {
      let sum = MutRc::own(0);
      let s = sum.clone();
      Observable::<_, ()>::from_iter(0..1000).map(|v| v * 2).subscribe_next(move |v| {
        *s.rc_deref_mut() += v;
      });
      assert_eq!(*sum.rc_deref(), 999_000);
    });
  }
}
