//! Subscribe to observables one after another.
//!
//! The next source is subscribed only once the previous one has completed.
//! Sources that complete synchronously are chained from a loop, not from
//! inside the completion callback, so a long chain of them keeps the stack
//! flat.

use std::collections::VecDeque;

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  rc::MutRc,
  scheduler::SchedulerRef,
  subscription::{BoxedSubscription, Subscription},
};

pub struct ConcatOp<Item, Err> {
  rest: Vec<Observable<Item, Err>>,
}

struct ConcatState<Item, Err> {
  queue: VecDeque<Observable<Item, Err>>,
  current: Option<BoxedSubscription>,
  /// Position of the running source; completions from older ones are stale.
  index: usize,
  subscribing: bool,
  advance: bool,
  disposed: bool,
}

struct ConcatDriver<Item, Err> {
  state: MutRc<ConcatState<Item, Err>>,
  downstream: Emitter<Item, Err>,
  scheduler: SchedulerRef,
}

impl<Item, Err> Clone for ConcatDriver<Item, Err> {
  fn clone(&self) -> Self {
    Self {
      state: self.state.clone(),
      downstream: self.downstream.clone(),
      scheduler: self.scheduler.clone(),
    }
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> ConcatDriver<Item, Err> {
  /// Subscribe to queued sources for as long as each one completes before
  /// its subscribe call returns.
  fn drive(&self) {
    loop {
      let (source, index, previous) = {
        let mut state = self.state.rc_deref_mut();
        if state.disposed || !state.advance {
          state.subscribing = false;
          return;
        }
        state.advance = false;
        match state.queue.pop_front() {
          Some(source) => {
            state.index += 1;
            state.subscribing = true;
            (source, state.index, state.current.take())
          }
          None => {
            state.subscribing = false;
            drop(state);
            self.downstream.complete();
            return;
          }
        }
      };
      if let Some(mut previous) = previous {
        previous.unsubscribe();
      }
      let observer = ConcatObserver { driver: self.clone(), index };
      let subscription = source.actual_subscribe(Box::new(observer), &self.scheduler);
      let disposed = {
        let mut state = self.state.rc_deref_mut();
        if state.disposed {
          Some(subscription)
        } else {
          state.current = Some(subscription);
          None
        }
      };
      if let Some(mut subscription) = disposed {
        subscription.unsubscribe();
      }
    }
  }
}

struct ConcatObserver<Item, Err> {
  driver: ConcatDriver<Item, Err>,
  index: usize,
}

impl<Item, Err> Observer<Item, Err> for ConcatObserver<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  fn next(&mut self, value: Item) { self.driver.downstream.next(value) }

  fn error(&mut self, err: Err) { self.driver.downstream.error(err) }

  fn complete(&mut self) {
    let run = {
      let mut state = self.driver.state.rc_deref_mut();
      if state.index != self.index || state.disposed {
        return;
      }
      state.advance = true;
      !state.subscribing
    };
    if run {
      self.driver.state.rc_deref_mut().subscribing = true;
      self.driver.drive();
    }
  }

  fn is_closed(&self) -> bool { self.driver.downstream.is_closed() }
}

struct ConcatSubscription<Item, Err>(MutRc<ConcatState<Item, Err>>);

impl<Item, Err> Subscription for ConcatSubscription<Item, Err> {
  fn unsubscribe(&mut self) {
    let current = {
      let mut state = self.0.rc_deref_mut();
      if state.disposed {
        return;
      }
      state.disposed = true;
      state.queue.clear();
      state.current.take()
    };
    if let Some(mut current) = current {
      current.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().disposed }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Operator<Item, Err> for ConcatOp<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let mut queue = VecDeque::with_capacity(self.rest.len() + 1);
    queue.push_back(source.clone());
    queue.extend(self.rest);
    let state = MutRc::own(ConcatState {
      queue,
      current: None,
      index: 0,
      subscribing: true,
      advance: true,
      disposed: false,
    });
    ConcatDriver { state: state.clone(), downstream, scheduler: scheduler.clone() }.drive();
    BoxedSubscription::new(ConcatSubscription(state))
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Emit all values of this observable, then all values of `other`.
  pub fn concat(&self, other: &Observable<Item, Err>) -> Self {
    let other = other.clone();
    self.lift(move || ConcatOp { rest: vec![other.clone()] })
  }

  /// Chain `sources` one after another. An empty list completes at once.
  pub fn concat_all(sources: impl IntoIterator<Item = Observable<Item, Err>>) -> Self {
    let mut sources = sources.into_iter();
    match sources.next() {
      Some(first) => {
        let rest: Vec<_> = sources.collect();
        first.lift(move || ConcatOp { rest: rest.clone() })
      }
      None => Observable::empty(),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[rxlite_macro::test]
  fn runs_sources_in_sequence() {
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    Observable::<_, ()>::from_array(vec![1, 2])
      .concat(&Observable::from_array(vec![3, 4]))
      .subscribe_all(
        move |v| l1.rc_deref_mut().push(v.to_string()),
        |_| {},
        move || l2.rc_deref_mut().push("complete".into()),
      );
    assert_eq!(*log.rc_deref(), vec!["1", "2", "3", "4", "complete"]);
  }

  #[rxlite_macro::test]
  fn second_source_waits_for_first() {
    let mut first = Subject::<i32, ()>::new();
    let subscribed = Rc::new(Cell::new(false));
    let s = subscribed.clone();
    let second = Observable::<i32, ()>::defer(move || {
      s.set(true);
      Observable::just(9)
    });
    let seen = MutRc::own(vec![]);
    let v = seen.clone();
    first.as_observable().concat(&second).subscribe_next(move |x| v.rc_deref_mut().push(x));
    first.next(1);
    assert!(!subscribed.get());
    first.complete();
    assert!(subscribed.get());
    assert_eq!(*seen.rc_deref(), vec![1, 9]);
  }

  #[rxlite_macro::test]
  fn error_stops_the_chain() {
    let subscribed = Rc::new(Cell::new(false));
    let s = subscribed.clone();
    let tail = Observable::<i32, &str>::defer(move || {
      s.set(true);
      Observable::empty()
    });
    let err = MutRc::own(None);
    let e = err.clone();
    Observable::concat_all(vec![Observable::throw_err("boom"), tail])
      .subscribe_err(|_| {}, move |x| *e.rc_deref_mut() = Some(x));
    assert_eq!(*err.rc_deref(), Some("boom"));
    assert!(!subscribed.get());
  }

  #[rxlite_macro::test]
  fn long_synchronous_chain_keeps_stack_flat() {
    let sources = (0..10_000).map(|v| Observable::<_, ()>::just(v));
    let sum = MutRc::own(0u64);
    let s = sum.clone();
    Observable::concat_all(sources).subscribe_next(move |v| *s.rc_deref_mut() += v as u64);
    assert_eq!(*sum.rc_deref(), (0..10_000u64).sum::<u64>());
  }

  #[rxlite_macro::test]
  fn unsubscribe_cancels_pending_sources() {
    let first = Subject::<i32, ()>::new();
    let subscribed = Rc::new(Cell::new(false));
    let s = subscribed.clone();
    let second = Observable::<i32, ()>::defer(move || {
      s.set(true);
      Observable::never()
    });
    let mut subscription = first.as_observable().concat(&second).subscribe_next(|_| {});
    subscription.unsubscribe();
    assert_eq!(first.observer_count(), 0);
    first.clone().complete();
    assert!(!subscribed.get());
  }

  #[rxlite_macro::test]
  fn empty_list_completes() {
    let completed = Rc::new(Cell::new(false));
    let c = completed.clone();
    Observable::<i32, ()>::concat_all(vec![]).subscribe_all(|_| {}, |_| {}, move || c.set(true));
    assert!(completed.get());
  }
}
