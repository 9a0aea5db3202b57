//! Flatten a stream of streams by subscribing to every inner stream as it
//! arrives and interleaving their values.
//!
//! The result completes once the outer stream and every inner stream have
//! completed. The first error from any of them is forwarded and tears the
//! whole merge down.

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  rc::MutRc,
  scheduler::SchedulerRef,
  subscription::{BoxedSubscription, DynamicSubscriptions, Subscription},
};

#[derive(Default)]
struct MergeState {
  /// One entry per running inner stream. The handle is `None` while the inner
  /// subscribe call is still on the stack.
  inners: DynamicSubscriptions<Option<BoxedSubscription>>,
  outer_done: bool,
  disposed: bool,
}

impl MergeState {
  fn finished(&self) -> bool { self.outer_done && self.inners.is_empty() }
}

pub struct MergeAllOp;

struct OuterObserver<Item, Err> {
  downstream: Emitter<Item, Err>,
  state: MutRc<MergeState>,
  scheduler: SchedulerRef,
}

impl<Item, Err> Observer<Observable<Item, Err>, Err> for OuterObserver<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  fn next(&mut self, inner: Observable<Item, Err>) {
    let id = {
      let mut state = self.state.rc_deref_mut();
      if state.disposed {
        return;
      }
      let id = state.inners.reserve_id();
      state.inners.insert(id, None);
      id
    };
    let observer =
      InnerObserver { downstream: self.downstream.clone(), state: self.state.clone(), id };
    let subscription = inner.actual_subscribe(Box::new(observer), &self.scheduler);
    let finished_early = match self.state.rc_deref_mut().inners.get_mut(id) {
      Some(slot) => {
        *slot = Some(subscription);
        None
      }
      None => Some(subscription),
    };
    if let Some(mut subscription) = finished_early {
      subscription.unsubscribe();
    }
  }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) {
    let finished = {
      let mut state = self.state.rc_deref_mut();
      state.outer_done = true;
      state.finished()
    };
    if finished {
      self.downstream.complete();
    }
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

struct InnerObserver<Item, Err> {
  downstream: Emitter<Item, Err>,
  state: MutRc<MergeState>,
  id: usize,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for InnerObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.downstream.next(value) }

  fn error(&mut self, err: Err) { self.downstream.error(err) }

  fn complete(&mut self) {
    let finished = {
      let mut state = self.state.rc_deref_mut();
      state.inners.remove(self.id);
      state.finished()
    };
    if finished {
      self.downstream.complete();
    }
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

struct MergeSubscription {
  outer: BoxedSubscription,
  state: MutRc<MergeState>,
}

impl Subscription for MergeSubscription {
  fn unsubscribe(&mut self) {
    self.outer.unsubscribe();
    let inners = {
      let mut state = self.state.rc_deref_mut();
      state.disposed = true;
      state.inners.take_all()
    };
    for (_, mut inner) in inners {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.state.rc_deref().disposed }
}

impl<Item, Err> Operator<Observable<Item, Err>, Err> for MergeAllOp
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn call(
    self, source: &Observable<Observable<Item, Err>, Err>, downstream: Emitter<Item, Err>,
    scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let state = MutRc::own(MergeState::default());
    let outer = OuterObserver { downstream, state: state.clone(), scheduler: scheduler.clone() };
    let outer = source.actual_subscribe(Box::new(outer), scheduler);
    BoxedSubscription::new(MergeSubscription { outer, state })
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Observable<Item, Err>, Err> {
  /// Subscribe to every emitted observable and forward all of their values.
  #[doc(alias = "flatten")]
  pub fn merge_all(&self) -> Observable<Item, Err> { self.lift(|| MergeAllOp) }
}

/// Merge a fixed set of observables into one.
///
/// ```
/// use rxlite::{ops::merge_all::merge_all, prelude::*};
///
/// let merged = merge_all(vec![
///   Observable::<_, ()>::from_array(vec![1, 2]),
///   Observable::from_array(vec![3]),
/// ]);
/// let seen = MutRc::own(vec![]);
/// let s = seen.clone();
/// merged.subscribe_next(move |v| s.rc_deref_mut().push(v));
/// assert_eq!(*seen.rc_deref(), vec![1, 2, 3]);
/// ```
pub fn merge_all<Item, Err>(
  sources: impl IntoIterator<Item = Observable<Item, Err>>,
) -> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  let sources: Vec<_> = sources.into_iter().collect();
  Observable::from_iter(sources).merge_all()
}
