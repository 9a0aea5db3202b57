use std::{cell::Cell, rc::Rc};

use super::{ConnectableObservable, Subscribable};
use crate::{
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  scheduler::SchedulerRef,
  subject::SubjectLike,
  subscription::{BoxedSubscription, LocalSubscription, Subscription},
};

#[derive(Default)]
struct RefCountState {
  count: usize,
  connection: Option<LocalSubscription>,
}

/// Connects its connectable for the first subscriber and disconnects once
/// every subscriber has unsubscribed or seen the stream terminate.
pub struct RefCountObservable<Item, Err, S> {
  connectable: ConnectableObservable<Item, Err, S>,
  state: MutRc<RefCountState>,
}

impl<Item, Err, S> RefCountObservable<Item, Err, S> {
  pub fn new(connectable: ConnectableObservable<Item, Err, S>) -> Self {
    Self { connectable, state: MutRc::own(RefCountState::default()) }
  }

  /// Number of subscribers currently counted.
  pub fn count(&self) -> usize { self.state.rc_deref().count }

  fn release_one(&self) {
    let connection = {
      let mut state = self.state.rc_deref_mut();
      state.count = state.count.saturating_sub(1);
      if state.count == 0 {
        state.connection.take()
      } else {
        None
      }
    };
    if let Some(mut connection) = connection {
      tracing::debug!("ref count reached zero");
      connection.unsubscribe();
    }
  }
}

/// One counted subscriber. Released at most once, by whichever comes first:
/// an explicit unsubscribe or a terminal notification.
struct Ticket<Item, Err, S> {
  owner: Rc<RefCountObservable<Item, Err, S>>,
  active: Cell<bool>,
}

impl<Item, Err, S> Ticket<Item, Err, S> {
  fn release(&self) {
    if self.active.replace(false) {
      self.owner.release_one();
    }
  }
}

struct RefCountObserver<Item, Err, S> {
  observer: BoxedObserver<Item, Err>,
  ticket: Rc<Ticket<Item, Err, S>>,
}

impl<Item, Err, S> Observer<Item, Err> for RefCountObserver<Item, Err, S> {
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) {
    self.observer.error(err);
    self.ticket.release();
  }

  fn complete(&mut self) {
    self.observer.complete();
    self.ticket.release();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

struct RefCountSubscription<Item, Err, S> {
  inner: BoxedSubscription,
  ticket: Rc<Ticket<Item, Err, S>>,
}

impl<Item, Err, S> Subscription for RefCountSubscription<Item, Err, S> {
  fn unsubscribe(&mut self) {
    self.inner.unsubscribe();
    self.ticket.release();
  }

  fn is_closed(&self) -> bool { !self.ticket.active.get() }
}

impl<Item, Err, S> Subscribable<Item, Err> for RefCountObservable<Item, Err, S>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
  S: SubjectLike<Item, Err>,
{
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let ticket = Rc::new(Ticket { owner: self.clone(), active: Cell::new(true) });
    let first = {
      let mut state = self.state.rc_deref_mut();
      state.count += 1;
      state.count == 1 && state.connection.is_none()
    };
    let inner = self
      .connectable
      .fork()
      .actual_subscribe(Box::new(RefCountObserver { observer, ticket: ticket.clone() }), scheduler);
    if first {
      tracing::debug!("ref count connecting");
      let mut connection = self.connectable.connect_with_scheduler(scheduler);
      let mut state = self.state.rc_deref_mut();
      if state.count == 0 {
        // Everyone left (or the source finished) while connecting.
        drop(state);
        connection.unsubscribe();
      } else {
        state.connection = Some(connection);
      }
    }
    BoxedSubscription::new(RefCountSubscription { inner, ticket })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[rxlite_macro::test]
  fn connects_once_and_disconnects_at_zero() {
    let starts = Rc::new(Cell::new(0));
    let disposed = Rc::new(Cell::new(0));
    let (s, d) = (starts.clone(), disposed.clone());
    let source = Observable::<i32, ()>::defer(move || {
      s.set(s.get() + 1);
      let d = d.clone();
      Observable::create(move |_, _| Teardown::new(move || d.set(d.get() + 1)))
    });
    let shared = source.publish().ref_count();
    let mut a = shared.subscribe_next(|_| {});
    let mut b = shared.subscribe_next(|_| {});
    assert_eq!(starts.get(), 1);
    a.unsubscribe();
    assert_eq!(disposed.get(), 0);
    b.unsubscribe();
    assert_eq!(disposed.get(), 1);
    let mut c = shared.subscribe_next(|_| {});
    assert_eq!(starts.get(), 2);
    c.unsubscribe();
    assert_eq!(disposed.get(), 2);
  }

  #[rxlite_macro::test]
  fn terminal_releases_the_count() {
    let starts = Rc::new(Cell::new(0));
    let s = starts.clone();
    let shared = Observable::<i32, ()>::defer(move || {
      s.set(s.get() + 1);
      Observable::from_array(vec![1, 2])
    })
    .share();
    let seen = MutRc::own(vec![]);
    let s1 = seen.clone();
    let sub = shared.subscribe_next(move |v| s1.rc_deref_mut().push(v));
    assert!(sub.is_closed());
    let s2 = seen.clone();
    shared.subscribe_next(move |v| s2.rc_deref_mut().push(v));
    assert_eq!(starts.get(), 2);
    assert_eq!(*seen.rc_deref(), vec![1, 2, 1, 2]);
  }
}
