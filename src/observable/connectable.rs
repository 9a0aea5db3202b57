//! Bridge between a source and a subject.
//!
//! Subscribers of a [`ConnectableObservable`] listen to its subject; nothing
//! reaches them until [`ConnectableObservable::connect`] subscribes the
//! subject to the source.
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! let connectable = Observable::<_, ()>::from_array(vec![1, 2]).publish();
//! let seen = MutRc::own(vec![]);
//! for _ in 0..2 {
//!   let s = seen.clone();
//!   connectable.fork().subscribe_next(move |v| s.rc_deref_mut().push(v));
//! }
//! assert!(seen.rc_deref().is_empty());
//! connectable.connect();
//! assert_eq!(*seen.rc_deref(), vec![1, 1, 2, 2]);
//! ```

use std::rc::Rc;

use super::{Observable, RefCountObservable, Subscribable};
use crate::{
  observer::BoxedObserver,
  rc::MutRc,
  scheduler::{ImmediateScheduler, SchedulerRef},
  subject::SubjectLike,
  subscription::{BoxedSubscription, LocalSubscription, Subscription, Teardown},
};

struct ConnectState<S> {
  subject: S,
  connection: Option<LocalSubscription>,
}

pub struct ConnectableObservable<Item, Err, S> {
  source: Observable<Item, Err>,
  state: MutRc<ConnectState<S>>,
  /// Supplies a fresh subject once the current one has terminated. Absent when
  /// the caller handed in a specific subject.
  factory: Option<Rc<dyn Fn() -> S>>,
}

impl<Item, Err, S> Clone for ConnectableObservable<Item, Err, S> {
  fn clone(&self) -> Self {
    Self { source: self.source.clone(), state: self.state.clone(), factory: self.factory.clone() }
  }
}

impl<Item, Err, S> ConnectableObservable<Item, Err, S>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  S: SubjectLike<Item, Err>,
{
  /// Multicast through `subject` for the whole life of this connectable.
  pub fn new(source: Observable<Item, Err>, subject: S) -> Self {
    Self { source, state: MutRc::own(ConnectState { subject, connection: None }), factory: None }
  }

  /// Multicast through subjects made by `factory`; a terminated subject is
  /// replaced before the next subscription or connection.
  pub fn with_factory(source: Observable<Item, Err>, factory: impl Fn() -> S + 'static) -> Self {
    let subject = factory();
    Self {
      source,
      state: MutRc::own(ConnectState { subject, connection: None }),
      factory: Some(Rc::new(factory)),
    }
  }

  /// The subject new subscribers are attached to. Replacing a terminated
  /// subject also closes the connection that fed it.
  pub fn subject(&self) -> S {
    let (subject, stale) = {
      let mut state = self.state.rc_deref_mut();
      let mut stale = None;
      if let Some(factory) = &self.factory {
        if state.subject.is_stopped() {
          state.subject = factory();
          stale = state.connection.take();
        }
      }
      (state.subject.clone(), stale)
    };
    if let Some(mut connection) = stale {
      connection.unsubscribe();
    }
    subject
  }

  /// An observable over the current subject.
  pub fn fork(&self) -> Observable<Item, Err> { self.subject().as_observable() }

  pub fn is_connected(&self) -> bool {
    self.state.rc_deref().connection.as_ref().map_or(false, |c| !c.is_closed())
  }

  /// Subscribe the subject to the source on a fresh immediate scheduler.
  pub fn connect(&self) -> LocalSubscription {
    let scheduler: SchedulerRef = Rc::new(ImmediateScheduler);
    self.connect_with_scheduler(&scheduler)
  }

  /// Subscribe the subject to the source, once per connection. While a
  /// connection is open, calling this again returns the same handle.
  pub fn connect_with_scheduler(&self, scheduler: &SchedulerRef) -> LocalSubscription {
    let subject = self.subject();
    let connection = {
      let mut state = self.state.rc_deref_mut();
      if let Some(open) = state.connection.as_ref().filter(|c| !c.is_closed()) {
        return open.clone();
      }
      let connection = LocalSubscription::default();
      state.connection = Some(connection.clone());
      connection
    };
    tracing::debug!("connectable connected");
    connection.add(Teardown::new(|| tracing::debug!("connectable disconnected")));
    let upstream = self.source.subscribe_with_scheduler(subject, scheduler);
    connection.add(upstream.into_inner());
    connection
  }

  /// An observable that connects when its first observer subscribes and
  /// disconnects when the last one leaves.
  pub fn ref_count(&self) -> Observable<Item, Err> {
    Observable::from_subscribable(RefCountObservable::new(self.clone()))
  }
}

impl<Item, Err, S> Subscribable<Item, Err> for ConnectableObservable<Item, Err, S>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  S: SubjectLike<Item, Err>,
{
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    self.fork().actual_subscribe(observer, scheduler)
  }
}
