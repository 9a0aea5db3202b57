//! Observer registries shared by observable instances and subjects.
//!
//! A registry multicasts every notification to its registered observers. It
//! is the only place that mutates membership, and it never holds its own
//! borrow while an observer runs, so observers may subscribe, unsubscribe or
//! emit from inside a callback.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  subscription::{DynamicSubscriptions, Subscription},
};

/// Wraps an observer and stops forwarding after the first terminal
/// notification.
pub struct Subscriber<Item, Err> {
  observer: BoxedObserver<Item, Err>,
  stopped: bool,
}

impl<Item, Err> Subscriber<Item, Err> {
  pub fn new(observer: BoxedObserver<Item, Err>) -> Self { Self { observer, stopped: false } }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  fn next(&mut self, value: Item) {
    if !self.stopped {
      self.observer.next(value)
    }
  }

  fn error(&mut self, err: Err) {
    if !self.stopped {
      self.stopped = true;
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.stopped {
      self.stopped = true;
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.stopped || self.observer.is_closed() }
}

type Slot<Item, Err> = Rc<RefCell<Subscriber<Item, Err>>>;

/// How a stream ended.
#[derive(Clone, Debug, PartialEq)]
pub enum Terminal<Err> {
  Errored(Err),
  Completed,
}

pub(crate) enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

/// Registered observers plus the bookkeeping that makes broadcasting safe
/// against re-entrancy.
pub struct Subscribers<Item, Err> {
  slots: DynamicSubscriptions<Slot<Item, Err>>,
  /// Set when a terminal notification is accepted, before it is delivered.
  stopped: bool,
  /// Set once the terminal notification has been delivered.
  terminal: Option<Terminal<Err>>,
  emitting: bool,
  pending: VecDeque<Notification<Item, Err>>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self {
    Self {
      slots: DynamicSubscriptions::default(),
      stopped: false,
      terminal: None,
      emitting: false,
      pending: VecDeque::new(),
    }
  }
}

impl<Item, Err> Subscribers<Item, Err> {
  #[inline]
  pub fn len(&self) -> usize { self.slots.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.slots.is_empty() }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.slots.contains(id) }

  /// Whether a terminal notification was accepted.
  #[inline]
  pub fn is_stopped(&self) -> bool { self.stopped }

  #[inline]
  pub fn terminal(&self) -> Option<&Terminal<Err>> { self.terminal.as_ref() }

  pub fn remove(&mut self, id: usize) -> bool { self.slots.remove(id).is_some() }

  /// Values accepted by a re-entrant `next` that the current broadcast has
  /// not delivered yet. Observers registered now still receive them.
  pub fn queued_values(&self) -> usize {
    self.pending.iter().filter(|n| matches!(n, Notification::Next(_))).count()
  }

  /// True when every registered observer reports itself closed. Observers that
  /// are busy further up the stack count as open.
  pub fn all_closed(&self) -> bool {
    self.slots.iter().all(|(_, slot)| slot.try_borrow().map_or(false, |s| s.is_closed()))
  }
}

impl<Item: Clone, Err: Clone> Subscribers<Item, Err> {
  /// Register `observer`, or deliver the stored terminal notification to it
  /// right away when the registry already finished. Returns the token of the
  /// new registration.
  pub fn subscribe(this: &MutRc<Self>, mut observer: BoxedObserver<Item, Err>) -> Option<usize> {
    let terminal = this.rc_deref().terminal.clone();
    match terminal {
      Some(Terminal::Errored(err)) => {
        observer.error(err);
        None
      }
      Some(Terminal::Completed) => {
        observer.complete();
        None
      }
      None => {
        let slot = Rc::new(RefCell::new(Subscriber::new(observer)));
        Some(this.rc_deref_mut().slots.add(slot))
      }
    }
  }

  pub fn next(this: &MutRc<Self>, value: Item) -> bool {
    Self::dispatch(this, Notification::Next(value))
  }

  /// Returns false when the registry had already stopped.
  pub fn error(this: &MutRc<Self>, err: Err) -> bool {
    Self::dispatch(this, Notification::Error(err))
  }

  /// Returns false when the registry had already stopped.
  pub fn complete(this: &MutRc<Self>) -> bool { Self::dispatch(this, Notification::Complete) }

  fn dispatch(this: &MutRc<Self>, notification: Notification<Item, Err>) -> bool {
    {
      let mut inner = this.rc_deref_mut();
      if inner.stopped {
        return false;
      }
      if !matches!(notification, Notification::Next(_)) {
        inner.stopped = true;
      }
      if inner.emitting {
        // Re-entrant emission: the outer loop delivers it in order.
        inner.pending.push_back(notification);
        return true;
      }
      inner.emitting = true;
    }

    let mut current = Some(notification);
    while let Some(notification) = current {
      Self::deliver(this, notification);
      let mut inner = this.rc_deref_mut();
      current = inner.pending.pop_front();
      if current.is_none() {
        inner.emitting = false;
      }
    }
    true
  }

  fn deliver(this: &MutRc<Self>, notification: Notification<Item, Err>) {
    match notification {
      Notification::Next(value) => {
        let targets = this.rc_deref().slots.snapshot();
        let mut iter = targets.into_iter().peekable();
        while let Some((id, slot)) = iter.next() {
          // Removed by an earlier observer during this broadcast.
          if !this.rc_deref().contains(id) {
            continue;
          }
          if iter.peek().is_some() {
            slot.borrow_mut().next(value.clone());
          } else {
            slot.borrow_mut().next(value);
            break;
          }
        }
      }
      Notification::Error(err) => {
        let targets = {
          let mut inner = this.rc_deref_mut();
          inner.terminal = Some(Terminal::Errored(err.clone()));
          inner.slots.take_all()
        };
        for (_, slot) in targets {
          slot.borrow_mut().error(err.clone());
        }
      }
      Notification::Complete => {
        let targets = {
          let mut inner = this.rc_deref_mut();
          inner.terminal = Some(Terminal::Completed);
          inner.slots.take_all()
        };
        for (_, slot) in targets {
          slot.borrow_mut().complete();
        }
      }
    }
  }
}

/// Removes one registration from a registry. Dropping it does not
/// unsubscribe.
pub struct RegistrySubscription<Item, Err> {
  subscribers: MutRc<Subscribers<Item, Err>>,
  id: Option<usize>,
}

impl<Item, Err> RegistrySubscription<Item, Err> {
  pub fn new(subscribers: MutRc<Subscribers<Item, Err>>, id: usize) -> Self {
    Self { subscribers, id: Some(id) }
  }
}

impl<Item, Err> Subscription for RegistrySubscription<Item, Err> {
  fn unsubscribe(&mut self) {
    if let Some(id) = self.id.take() {
      self.subscribers.rc_deref_mut().remove(id);
    }
  }

  fn is_closed(&self) -> bool {
    self.id.map_or(true, |id| !self.subscribers.rc_deref().contains(id))
  }
}
