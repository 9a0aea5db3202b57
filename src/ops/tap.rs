//! Side effects on the notifications passing through a stream.
//!
//! Every `do_on_*` operator runs its callback before forwarding the
//! notification downstream. Callbacks only observe; the stream is unchanged.

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  rc::MutRc,
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

pub struct TapOp<N, E, C> {
  on_next: N,
  on_error: E,
  on_complete: C,
}

struct TapObserver<Item, Err, N, E, C> {
  downstream: Emitter<Item, Err>,
  on_next: N,
  on_error: E,
  on_complete: C,
}

impl<Item, Err, N, E, C> Observer<Item, Err> for TapObserver<Item, Err, N, E, C>
where
  Item: Clone,
  Err: Clone,
  N: FnMut(&Item),
  E: FnMut(&Err),
  C: FnMut(),
{
  fn next(&mut self, value: Item) {
    (self.on_next)(&value);
    self.downstream.next(value)
  }

  fn error(&mut self, err: Err) {
    (self.on_error)(&err);
    self.downstream.error(err)
  }

  fn complete(&mut self) {
    (self.on_complete)();
    self.downstream.complete()
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Item, Err, N, E, C> Operator<Item, Err> for TapOp<N, E, C>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  N: FnMut(&Item) + 'static,
  E: FnMut(&Err) + 'static,
  C: FnMut() + 'static,
{
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let observer = TapObserver {
      downstream,
      on_next: self.on_next,
      on_error: self.on_error,
      on_complete: self.on_complete,
    };
    source.actual_subscribe(Box::new(observer), scheduler)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Run `on_next`, `on_error` and `on_complete` for the matching
  /// notifications.
  pub fn tap<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Self
  where
    N: FnMut(&Item) + Clone + 'static,
    E: FnMut(&Err) + Clone + 'static,
    C: FnMut() + Clone + 'static,
  {
    self.lift(move || TapOp {
      on_next: on_next.clone(),
      on_error: on_error.clone(),
      on_complete: on_complete.clone(),
    })
  }

  /// Feed a copy of every notification to `observer`. Each run gets its own
  /// clone of `observer`.
  pub fn do_on_each<O>(&self, observer: O) -> Self
  where
    O: Observer<Item, Err> + Clone + 'static,
  {
    self.lift(move || {
      let shared = MutRc::own(observer.clone());
      let (n, e, c) = (shared.clone(), shared.clone(), shared);
      TapOp {
        on_next: move |v: &Item| n.rc_deref_mut().next(v.clone()),
        on_error: move |err: &Err| e.rc_deref_mut().error(err.clone()),
        on_complete: move || c.rc_deref_mut().complete(),
      }
    })
  }

  pub fn do_on_next<F>(&self, on_next: F) -> Self
  where
    F: FnMut(&Item) + Clone + 'static,
  {
    self.tap(on_next, |_| {}, || {})
  }

  pub fn do_on_error<F>(&self, on_error: F) -> Self
  where
    F: FnMut(&Err) + Clone + 'static,
  {
    self.tap(|_| {}, on_error, || {})
  }

  pub fn do_on_completed<F>(&self, on_complete: F) -> Self
  where
    F: FnMut() + Clone + 'static,
  {
    self.tap(|_| {}, |_| {}, on_complete)
  }
}
