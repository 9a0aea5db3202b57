//! Resubscribe to a source when it errors.
//!
//! A [`RetryPolicy`] decides, for every error, whether to try again. The
//! source is resubscribed from a loop, so a source that errors synchronously
//! on every attempt does not grow the stack.
//!
//! Resubscribing runs the source again only if the source runs per
//! subscription. Build re-runnable sources with [`Observable::defer`].
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use rxlite::prelude::*;
//!
//! let attempts = Rc::new(Cell::new(0));
//! let a = attempts.clone();
//! let source = Observable::<i32, &str>::defer(move || {
//!   a.set(a.get() + 1);
//!   if a.get() < 3 { Observable::throw_err("flaky") } else { Observable::just(1) }
//! });
//!
//! let seen = MutRc::own(vec![]);
//! let s = seen.clone();
//! source.retry(3).subscribe_next(move |v| s.rc_deref_mut().push(v));
//! assert_eq!(*seen.rc_deref(), vec![1]);
//! assert_eq!(attempts.get(), 3);
//! ```

use std::rc::Rc;

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  rc::MutRc,
  scheduler::SchedulerRef,
  subscription::{BoxedSubscription, Subscription},
};

/// Decides whether an error should lead to another subscription.
pub trait RetryPolicy<Err> {
  /// `attempt` is the number of subscriptions made so far, starting at 1.
  fn should_retry(&self, err: &Err, attempt: usize) -> bool;

  /// Whether a successfully delivered value resets the attempt count.
  fn reset_on_success(&self) -> bool { false }
}

/// At most this many subscriptions in total; `0` behaves like `1`.
impl<Err> RetryPolicy<Err> for usize {
  fn should_retry(&self, _: &Err, attempt: usize) -> bool { attempt < *self }
}

/// Bounded or unbounded retrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryLimit {
  Unbounded,
  Attempts(usize),
  /// Like `Attempts`, but every value the source delivers starts the count
  /// over.
  AttemptsBetweenValues(usize),
}

impl<Err> RetryPolicy<Err> for RetryLimit {
  fn should_retry(&self, err: &Err, attempt: usize) -> bool {
    match self {
      RetryLimit::Unbounded => true,
      RetryLimit::Attempts(n) | RetryLimit::AttemptsBetweenValues(n) => {
        RetryPolicy::<Err>::should_retry(n, err, attempt)
      }
    }
  }

  fn reset_on_success(&self) -> bool { matches!(self, RetryLimit::AttemptsBetweenValues(_)) }
}

/// Retry while the predicate accepts the error and attempt number.
impl<Err, F> RetryPolicy<Err> for F
where
  F: Fn(&Err, usize) -> bool,
{
  fn should_retry(&self, err: &Err, attempt: usize) -> bool { self(err, attempt) }
}

pub struct RetryOp<P> {
  policy: Rc<P>,
}

struct RetryState {
  attempt: usize,
  current: Option<BoxedSubscription>,
  /// Another subscription was requested while one was being made.
  again: bool,
  subscribing: bool,
  disposed: bool,
}

struct RetryDriver<Item, Err, P> {
  source: Observable<Item, Err>,
  downstream: Emitter<Item, Err>,
  scheduler: SchedulerRef,
  policy: Rc<P>,
  state: MutRc<RetryState>,
}

impl<Item, Err, P> Clone for RetryDriver<Item, Err, P> {
  fn clone(&self) -> Self {
    Self {
      source: self.source.clone(),
      downstream: self.downstream.clone(),
      scheduler: self.scheduler.clone(),
      policy: self.policy.clone(),
      state: self.state.clone(),
    }
  }
}

impl<Item, Err, P> RetryDriver<Item, Err, P>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  P: RetryPolicy<Err> + 'static,
{
  fn subscribe_loop(&self) {
    loop {
      let (attempt, previous) = {
        let mut state = self.state.rc_deref_mut();
        if state.disposed || !state.again {
          state.subscribing = false;
          return;
        }
        state.again = false;
        state.subscribing = true;
        state.attempt += 1;
        (state.attempt, state.current.take())
      };
      if let Some(mut previous) = previous {
        previous.unsubscribe();
      }
      let observer = RetryObserver { driver: self.clone(), attempt };
      let subscription = self.source.actual_subscribe(Box::new(observer), &self.scheduler);
      let stale = {
        let mut state = self.state.rc_deref_mut();
        if state.disposed {
          Some(subscription)
        } else {
          state.current = Some(subscription);
          None
        }
      };
      if let Some(mut stale) = stale {
        stale.unsubscribe();
      }
    }
  }
}

struct RetryObserver<Item, Err, P> {
  driver: RetryDriver<Item, Err, P>,
  /// The subscription this observer belongs to; errors from older ones are
  /// ignored.
  attempt: usize,
}

impl<Item, Err, P> Observer<Item, Err> for RetryObserver<Item, Err, P>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  P: RetryPolicy<Err> + 'static,
{
  fn next(&mut self, value: Item) {
    if self.driver.policy.reset_on_success() {
      let mut state = self.driver.state.rc_deref_mut();
      state.attempt = 0;
      self.attempt = 0;
    }
    self.driver.downstream.next(value)
  }

  fn error(&mut self, err: Err) {
    let current = {
      let state = self.driver.state.rc_deref();
      !state.disposed && state.attempt == self.attempt
    };
    if !current {
      return;
    }
    let attempt = self.attempt.max(1);
    if !self.driver.policy.should_retry(&err, attempt) {
      self.driver.downstream.error(err);
      return;
    }
    tracing::debug!(attempt, "retrying after error");
    let run = {
      let mut state = self.driver.state.rc_deref_mut();
      state.again = true;
      !state.subscribing
    };
    if run {
      self.driver.subscribe_loop();
    }
  }

  fn complete(&mut self) { self.driver.downstream.complete() }

  fn is_closed(&self) -> bool { self.driver.downstream.is_closed() }
}

struct RetrySubscription(MutRc<RetryState>);

impl Subscription for RetrySubscription {
  fn unsubscribe(&mut self) {
    let current = {
      let mut state = self.0.rc_deref_mut();
      state.disposed = true;
      state.current.take()
    };
    if let Some(mut current) = current {
      current.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().disposed }
}

impl<Item, Err, P> Operator<Item, Err> for RetryOp<P>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  P: RetryPolicy<Err> + 'static,
{
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let state = MutRc::own(RetryState {
      attempt: 0,
      current: None,
      again: true,
      subscribing: false,
      disposed: false,
    });
    RetryDriver {
      source: source.clone(),
      downstream,
      scheduler: scheduler.clone(),
      policy: self.policy,
      state: state.clone(),
    }
    .subscribe_loop();
    BoxedSubscription::new(RetrySubscription(state))
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Resubscribe to this observable after errors the policy accepts.
  ///
  /// `retry(3)` subscribes at most three times and then forwards the last
  /// error; `retry(RetryLimit::Unbounded)` never gives up. Completion is
  /// forwarded and never retried.
  pub fn retry<P: RetryPolicy<Err> + 'static>(&self, policy: P) -> Self {
    let policy = Rc::new(policy);
    self.lift(move || RetryOp { policy: policy.clone() })
  }
}
