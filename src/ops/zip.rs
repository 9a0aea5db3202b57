//! Pair up values from several observables by position.
//!
//! Values are buffered per source until every source has one to contribute.
//! The result completes as soon as a source has completed and its buffer is
//! empty, since no further tuple can be formed.

use std::collections::VecDeque;

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  rc::MutRc,
  scheduler::SchedulerRef,
  subscription::{BoxedSubscription, LocalSubscription},
};

struct Side<T> {
  buffer: VecDeque<T>,
  completed: bool,
}

impl<T> Default for Side<T> {
  fn default() -> Self { Self { buffer: VecDeque::new(), completed: false } }
}

impl<T> Side<T> {
  fn exhausted(&self) -> bool { self.completed && self.buffer.is_empty() }
}

struct ZipState<A, B> {
  left: Side<A>,
  right: Side<B>,
}

pub struct ZipOp<B, Err, F> {
  other: Observable<B, Err>,
  selector: F,
}

struct ZipShared<A, B, Out, Err, F> {
  state: MutRc<ZipState<A, B>>,
  selector: MutRc<F>,
  downstream: Emitter<Out, Err>,
}

impl<A, B, Out, Err, F> Clone for ZipShared<A, B, Out, Err, F> {
  fn clone(&self) -> Self {
    Self {
      state: self.state.clone(),
      selector: self.selector.clone(),
      downstream: self.downstream.clone(),
    }
  }
}

impl<A, B, Out, Err, F> ZipShared<A, B, Out, Err, F>
where
  Out: Clone,
  Err: Clone,
  F: FnMut(A, B) -> Out,
{
  fn push(&self, add: impl FnOnce(&mut ZipState<A, B>)) {
    let (pair, done) = {
      let mut state = self.state.rc_deref_mut();
      add(&mut state);
      let pair = if !state.left.buffer.is_empty() && !state.right.buffer.is_empty() {
        state.left.buffer.pop_front().zip(state.right.buffer.pop_front())
      } else {
        None
      };
      (pair, state.left.exhausted() || state.right.exhausted())
    };
    if let Some((a, b)) = pair {
      let value = {
        let mut selector = self.selector.rc_deref_mut();
        (*selector)(a, b)
      };
      self.downstream.next(value);
    }
    if done {
      self.downstream.complete();
    }
  }

  fn finish(&self, side: impl FnOnce(&mut ZipState<A, B>) -> bool) {
    if side(&mut self.state.rc_deref_mut()) {
      self.downstream.complete();
    }
  }
}

struct LeftObserver<A, B, Out, Err, F>(ZipShared<A, B, Out, Err, F>);

struct RightObserver<A, B, Out, Err, F>(ZipShared<A, B, Out, Err, F>);

impl<A, B, Out, Err, F> Observer<A, Err> for LeftObserver<A, B, Out, Err, F>
where
  Out: Clone,
  Err: Clone,
  F: FnMut(A, B) -> Out,
{
  fn next(&mut self, value: A) { self.0.push(|state| state.left.buffer.push_back(value)) }

  fn error(&mut self, err: Err) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.finish(|state| {
      state.left.completed = true;
      state.left.buffer.is_empty()
    })
  }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

impl<A, B, Out, Err, F> Observer<B, Err> for RightObserver<A, B, Out, Err, F>
where
  Out: Clone,
  Err: Clone,
  F: FnMut(A, B) -> Out,
{
  fn next(&mut self, value: B) { self.0.push(|state| state.right.buffer.push_back(value)) }

  fn error(&mut self, err: Err) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.finish(|state| {
      state.right.completed = true;
      state.right.buffer.is_empty()
    })
  }

  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

impl<A, B, Out, Err, F> Operator<A, Err> for ZipOp<B, Err, F>
where
  A: 'static,
  B: 'static,
  Out: Clone + 'static,
  Err: Clone + 'static,
  F: FnMut(A, B) -> Out + 'static,
{
  type Item = Out;
  type Err = Err;

  fn call(
    self, source: &Observable<A, Err>, downstream: Emitter<Out, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let shared = ZipShared {
      state: MutRc::own(ZipState { left: Side::default(), right: Side::default() }),
      selector: MutRc::own(self.selector),
      downstream,
    };
    let subscription = LocalSubscription::default();
    subscription.add(source.actual_subscribe(Box::new(LeftObserver(shared.clone())), scheduler));
    subscription.add(self.other.actual_subscribe(Box::new(RightObserver(shared)), scheduler));
    BoxedSubscription::new(subscription)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Pair the n-th value of this observable with the n-th value of `other`.
  pub fn zip<B: Clone + 'static>(&self, other: &Observable<B, Err>) -> Observable<(Item, B), Err> {
    self.zip_with(other, |a, b| (a, b))
  }

  /// Combine the n-th values of this observable and `other` with `selector`.
  pub fn zip_with<B, Out, F>(
    &self, other: &Observable<B, Err>, selector: F,
  ) -> Observable<Out, Err>
  where
    B: Clone + 'static,
    Out: Clone + 'static,
    F: FnMut(Item, B) -> Out + Clone + 'static,
  {
    let other = other.clone();
    self.lift(move || ZipOp { other: other.clone(), selector: selector.clone() })
  }

  /// Zip any number of same-typed observables into vectors.
  ///
  /// An empty list completes at once.
  pub fn zip_all(
    sources: impl IntoIterator<Item = Observable<Item, Err>>,
  ) -> Observable<Vec<Item>, Err> {
    let sources: Vec<_> = sources.into_iter().collect();
    if sources.is_empty() {
      return Observable::empty();
    }
    Observable::create(move |downstream, scheduler| {
      let state = MutRc::own((0..sources.len()).map(|_| Side::default()).collect::<Vec<_>>());
      let subscription = LocalSubscription::default();
      for (index, source) in sources.into_iter().enumerate() {
        let observer =
          ZipAllObserver { state: state.clone(), downstream: downstream.clone(), index };
        subscription.add(source.actual_subscribe(Box::new(observer), scheduler));
      }
      subscription
    })
  }
}

struct ZipAllObserver<Item, Err> {
  state: MutRc<Vec<Side<Item>>>,
  downstream: Emitter<Vec<Item>, Err>,
  index: usize,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for ZipAllObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    let (row, done) = {
      let mut sides = self.state.rc_deref_mut();
      sides[self.index].buffer.push_back(value);
      let row = if sides.iter().all(|side| !side.buffer.is_empty()) {
        sides.iter_mut().map(|side| side.buffer.pop_front()).collect::<Option<Vec<_>>>()
      } else {
        None
      };
      (row, sides.iter().any(Side::exhausted))
    };
    if let Some(row) = row {
      self.downstream.next(row);
    }
    if done {
      self.downstream.complete();
    }
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) {
    let done = {
      let mut sides = self.state.rc_deref_mut();
      sides[self.index].completed = true;
      sides[self.index].buffer.is_empty()
    };
    if done {
      self.downstream.complete();
    }
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn pairs_by_position_and_drops_the_surplus() {
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    Observable::<_, ()>::from_array(vec![1, 2, 3])
      .zip(&Observable::from_array(vec!['a', 'b']))
      .subscribe_all(
        move |(n, c)| l1.rc_deref_mut().push(format!("{n}{c}")),
        |_| {},
        move || l2.rc_deref_mut().push("complete".into()),
      );
    assert_eq!(*log.rc_deref(), vec!["1a", "2b", "complete"]);
  }

  #[rxlite_macro::test]
  fn waits_for_the_slower_side() {
    let mut left = Subject::<i32, ()>::new();
    let mut right = Subject::<i32, ()>::new();
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    left
      .as_observable()
      .zip_with(&right.as_observable(), |a, b| a + b)
      .subscribe_next(move |v| s.rc_deref_mut().push(v));
    left.next(1);
    left.next(2);
    assert!(seen.rc_deref().is_empty());
    right.next(10);
    right.next(20);
    assert_eq!(*seen.rc_deref(), vec![11, 22]);
  }

  #[rxlite_macro::test]
  fn completed_side_with_pending_buffer_keeps_zip_open() {
    let mut left = Subject::<i32, ()>::new();
    let mut right = Subject::<i32, ()>::new();
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    left.as_observable().zip(&right.as_observable()).subscribe_all(
      move |(a, b)| l1.rc_deref_mut().push(format!("{a}-{b}")),
      |_| {},
      move || l2.rc_deref_mut().push("complete".into()),
    );
    left.next(1);
    left.complete();
    assert!(log.rc_deref().is_empty());
    right.next(2);
    assert_eq!(*log.rc_deref(), vec!["1-2", "complete"]);
    assert_eq!(right.observer_count(), 0);
  }

  #[rxlite_macro::test]
  fn error_from_either_side() {
    let left = Subject::<i32, &str>::new();
    let mut right = Subject::<i32, &str>::new();
    let err = MutRc::own(None);
    let e = err.clone();
    left
      .as_observable()
      .zip(&right.as_observable())
      .subscribe_err(|_| {}, move |x| *e.rc_deref_mut() = Some(x));
    right.error("boom");
    assert_eq!(*err.rc_deref(), Some("boom"));
    assert_eq!(left.observer_count(), 0);
  }

  #[rxlite_macro::test]
  fn zip_all_rows() {
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    Observable::<_, ()>::zip_all(vec![
      Observable::from_array(vec![1, 2]),
      Observable::from_array(vec![3, 4]),
      Observable::from_array(vec![5, 6, 7]),
    ])
    .subscribe_next(move |row| s.rc_deref_mut().push(row));
    assert_eq!(*seen.rc_deref(), vec![vec![1, 3, 5], vec![2, 4, 6]]);
  }
}
