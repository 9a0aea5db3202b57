//! The run-once observable engine.
//!
//! A [`LazyObservable`] keeps a registry of observers and a production
//! routine. The routine runs once, on the first subscription, and everything
//! it emits through its [`Emitter`] is broadcast to the registry. When the
//! last observer leaves, or the stream terminates, the upstream subscription
//! the routine returned is disposed; if that happens while the routine is
//! still running, the handle is disposed as soon as the routine returns it.
//! Afterwards the instance is inert.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use super::{Observable, Subscribable};
use crate::{
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  scheduler::SchedulerRef,
  subscriber::Subscribers,
  subscription::{BoxedSubscription, Subscription},
};

type Producer<Item, Err> = Box<dyn FnOnce(Emitter<Item, Err>, &SchedulerRef) -> BoxedSubscription>;

enum Upstream {
  Idle,
  Starting,
  Attached(BoxedSubscription),
  Released,
}

pub struct LazyObservable<Item, Err> {
  producer: RefCell<Option<Producer<Item, Err>>>,
  started: Cell<bool>,
  subscribers: MutRc<Subscribers<Item, Err>>,
  upstream: RefCell<Upstream>,
}

impl<Item: Clone + 'static, Err: Clone + 'static> LazyObservable<Item, Err> {
  pub fn new<F, S>(producer: F) -> Self
  where
    F: FnOnce(Emitter<Item, Err>, &SchedulerRef) -> S + 'static,
    S: Subscription + 'static,
  {
    let producer: Producer<Item, Err> =
      Box::new(move |emitter, scheduler| BoxedSubscription::new(producer(emitter, scheduler)));
    Self {
      producer: RefCell::new(Some(producer)),
      started: Cell::new(false),
      subscribers: MutRc::own(Subscribers::default()),
      upstream: RefCell::new(Upstream::Idle),
    }
  }

  fn start(self: &Rc<Self>, scheduler: &SchedulerRef) {
    let producer = self.producer.borrow_mut().take();
    let Some(producer) = producer else { return };
    tracing::trace!("observable started");
    *self.upstream.borrow_mut() = Upstream::Starting;
    let mut subscription = producer(Emitter { source: self.clone() }, scheduler);
    let mut upstream = self.upstream.borrow_mut();
    if matches!(*upstream, Upstream::Released) {
      drop(upstream);
      subscription.unsubscribe();
    } else {
      *upstream = Upstream::Attached(subscription);
    }
  }
}

impl<Item, Err> LazyObservable<Item, Err> {
  fn release(&self) {
    let previous = std::mem::replace(&mut *self.upstream.borrow_mut(), Upstream::Released);
    if let Upstream::Attached(mut subscription) = previous {
      tracing::trace!("observable released");
      subscription.unsubscribe();
    }
  }

  fn is_released(&self) -> bool { matches!(*self.upstream.borrow(), Upstream::Released) }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Subscribable<Item, Err>
  for LazyObservable<Item, Err>
{
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    if self.is_released() && self.subscribers.rc_deref().terminal().is_none() {
      tracing::debug!("subscribed to a released observable; nothing will be delivered");
      return BoxedSubscription::closed();
    }
    let Some(id) = Subscribers::subscribe(&self.subscribers, observer) else {
      return BoxedSubscription::closed();
    };
    if !self.started.replace(true) {
      self.start(scheduler);
    }
    BoxedSubscription::new(LazySubscription { source: self, id: Some(id) })
  }
}

struct LazySubscription<Item, Err> {
  source: Rc<LazyObservable<Item, Err>>,
  id: Option<usize>,
}

impl<Item, Err> Subscription for LazySubscription<Item, Err> {
  fn unsubscribe(&mut self) {
    if let Some(id) = self.id.take() {
      let emptied = {
        let mut subscribers = self.source.subscribers.rc_deref_mut();
        subscribers.remove(id) && subscribers.is_empty()
      };
      if emptied {
        self.source.release();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.id.map_or(true, |id| !self.source.subscribers.rc_deref().contains(id))
  }
}

/// The producer's side of a [`LazyObservable`]: everything emitted here is
/// broadcast to the current observers.
pub struct Emitter<Item, Err> {
  source: Rc<LazyObservable<Item, Err>>,
}

impl<Item, Err> Clone for Emitter<Item, Err> {
  fn clone(&self) -> Self { Self { source: self.source.clone() } }
}

impl<Item: Clone, Err: Clone> Emitter<Item, Err> {
  pub fn next(&self, value: Item) { Subscribers::next(&self.source.subscribers, value); }

  pub fn error(&self, err: Err) {
    if Subscribers::error(&self.source.subscribers, err) {
      self.source.release();
    }
  }

  pub fn complete(&self) {
    if Subscribers::complete(&self.source.subscribers) {
      self.source.release();
    }
  }

  /// True once nothing emitted here can reach an observer any more.
  pub fn is_closed(&self) -> bool {
    if self.source.is_released() {
      return true;
    }
    let subscribers = self.source.subscribers.rc_deref();
    subscribers.is_stopped() || subscribers.all_closed()
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Emitter<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Emitter::next(self, value) }
  #[inline]
  fn error(&mut self, err: Err) { Emitter::error(self, err) }
  #[inline]
  fn complete(&mut self) { Emitter::complete(self) }
  #[inline]
  fn is_closed(&self) -> bool { Emitter::is_closed(self) }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Build an instance from a production routine.
  ///
  /// `producer` runs once, when the first observer subscribes. It receives the
  /// emitter and the subscriber's scheduler and returns whatever must be
  /// disposed to stop production.
  ///
  /// ```
  /// use rxlite::prelude::*;
  ///
  /// let source = Observable::<i32, ()>::create(|emitter, _| {
  ///   emitter.next(1);
  ///   emitter.complete();
  /// });
  /// let seen = MutRc::own(vec![]);
  /// let s = seen.clone();
  /// source.subscribe_next(move |v| s.rc_deref_mut().push(v));
  /// assert_eq!(*seen.rc_deref(), vec![1]);
  /// ```
  pub fn create<F, S>(producer: F) -> Self
  where
    F: FnOnce(Emitter<Item, Err>, &SchedulerRef) -> S + 'static,
    S: Subscription + 'static,
  {
    Observable::from_subscribable(LazyObservable::new(producer))
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;
  use crate::{
    observer::CallbackObserver,
    scheduler::{SchedulerExt, TestScheduler},
    subscription::Teardown,
  };

  fn counting_source(starts: &Rc<Cell<u32>>) -> Observable<i32, String> {
    let starts = starts.clone();
    Observable::create(move |emitter: Emitter<i32, String>, scheduler: &SchedulerRef| {
      starts.set(starts.get() + 1);
      scheduler.schedule_fn(move || {
        emitter.next(1);
        emitter.next(2);
        emitter.complete();
      })
    })
  }

  #[rxlite_macro::test]
  fn starts_once_for_concurrent_subscribers() {
    let starts = Rc::new(Cell::new(0));
    let scheduler = TestScheduler::new();
    let source = counting_source(&starts);
    let a = MutRc::own(vec![]);
    let b = MutRc::own(vec![]);
    let (a1, b1) = (a.clone(), b.clone());
    source.subscribe_with_scheduler(
      CallbackObserver::new().on_next(move |v| a1.rc_deref_mut().push(v)),
      &scheduler.scheduler_ref(),
    );
    source.subscribe_with_scheduler(
      CallbackObserver::new().on_next(move |v| b1.rc_deref_mut().push(v)),
      &scheduler.scheduler_ref(),
    );
    scheduler.flush();
    assert_eq!(starts.get(), 1);
    assert_eq!(*a.rc_deref(), vec![1, 2]);
    assert_eq!(*b.rc_deref(), vec![1, 2]);
  }

  #[rxlite_macro::test]
  fn late_subscriber_sees_terminal_only() {
    let starts = Rc::new(Cell::new(0));
    let source = counting_source(&starts);
    source.subscribe_next(|_| {});
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    let sub = source.subscribe(
      CallbackObserver::new()
        .on_next(move |v: i32| l1.rc_deref_mut().push(v.to_string()))
        .on_complete(move || l2.rc_deref_mut().push("complete".into())),
    );
    assert_eq!(starts.get(), 1);
    assert_eq!(*log.rc_deref(), vec!["complete"]);
    assert!(sub.is_closed());
  }

  #[rxlite_macro::test]
  fn last_unsubscribe_disposes_upstream_once() {
    let disposed = Rc::new(Cell::new(0));
    let d = disposed.clone();
    let source = Observable::<i32, ()>::create(move |_, _| {
      Teardown::new(move || d.set(d.get() + 1))
    });
    let mut a = source.subscribe_next(|_| {});
    let mut b = source.subscribe_next(|_| {});
    a.unsubscribe();
    assert_eq!(disposed.get(), 0);
    b.unsubscribe();
    b.unsubscribe();
    assert_eq!(disposed.get(), 1);
  }

  #[rxlite_macro::test]
  fn disposed_instance_is_not_revived() {
    let starts = Rc::new(Cell::new(0));
    let s = starts.clone();
    let source = Observable::<i32, ()>::create(move |emitter, _| {
      s.set(s.get() + 1);
      emitter.next(1);
    });
    source.subscribe_next(|_| {}).unsubscribe();
    let hit = Rc::new(Cell::new(false));
    let h = hit.clone();
    let sub = source.subscribe_next(move |_| h.set(true));
    assert!(sub.is_closed());
    assert!(!hit.get());
    assert_eq!(starts.get(), 1);
  }

  #[rxlite_macro::test]
  fn synchronous_terminal_disposes_returned_handle() {
    let disposed = Rc::new(Cell::new(false));
    let d = disposed.clone();
    Observable::<i32, ()>::create(move |emitter, _| {
      emitter.complete();
      Teardown::new(move || d.set(true))
    })
    .subscribe_next(|_| {});
    assert!(disposed.get());
  }

  #[rxlite_macro::test]
  fn emitter_ignores_notifications_after_terminal() {
    let log = MutRc::own(vec![]);
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    Observable::<i32, &str>::create(|emitter, _| {
      emitter.next(1);
      emitter.error("boom");
      emitter.next(2);
      emitter.complete();
      assert!(emitter.is_closed());
    })
    .subscribe_all(
      move |v| l1.rc_deref_mut().push(format!("next {v}")),
      move |e| l2.rc_deref_mut().push(format!("error {e}")),
      move || l3.rc_deref_mut().push("complete".to_string()),
    );
    assert_eq!(*log.rc_deref(), vec!["next 1", "error boom"]);
  }

  #[rxlite_macro::test]
  fn producer_sees_subscribers_scheduler() {
    let scheduler = TestScheduler::new();
    let hit = Rc::new(Cell::new(false));
    let h = hit.clone();
    counting_source(&Rc::new(Cell::new(0)))
      .subscribe_with_scheduler(FnObserverProbe(h), &scheduler.scheduler_ref());
    assert!(!hit.get());
    assert_eq!(scheduler.pending_count(), 1);
    scheduler.flush();
    assert!(hit.get());
  }

  struct FnObserverProbe(Rc<Cell<bool>>);

  impl Observer<i32, String> for FnObserverProbe {
    fn next(&mut self, _: i32) { self.0.set(true) }
    fn error(&mut self, _: String) {}
    fn complete(&mut self) {}
  }
}
