//! Disposables: handles that cancel interest in a stream.
//!
//! Every handle in this module is idempotent. Unsubscribing twice, or
//! unsubscribing something that already finished, is a silent no-op.

mod boxed;
mod dynamic;
mod local;

pub use boxed::BoxedSubscription;
pub use dynamic::DynamicSubscriptions;
pub use local::LocalSubscription;

use crate::rc::MutRc;

/// A handle returned by `subscribe` (and by schedulers) that stops delivery.
pub trait Subscription {
  /// Cancel the subscription. Calling it again has no effect.
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

/// The already-closed subscription.
impl Subscription for () {
  #[inline]
  fn unsubscribe(&mut self) {}
  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: Subscription + ?Sized> Subscription for Box<T> {
  #[inline]
  fn unsubscribe(&mut self) { (**self).unsubscribe() }
  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<T: Subscription> Subscription for Option<T> {
  fn unsubscribe(&mut self) {
    if let Some(mut inner) = self.take() {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, |s| s.is_closed()) }
}

impl<T: Subscription> Subscription for MutRc<T> {
  #[inline]
  fn unsubscribe(&mut self) { self.rc_deref_mut().unsubscribe() }
  #[inline]
  fn is_closed(&self) -> bool { self.rc_deref().is_closed() }
}

/// Runs a closure once, on the first `unsubscribe`.
pub struct Teardown(Option<Box<dyn FnOnce()>>);

impl Teardown {
  pub fn new(f: impl FnOnce() + 'static) -> Self { Self(Some(Box::new(f))) }
}

impl Subscription for Teardown {
  fn unsubscribe(&mut self) {
    if let Some(f) = self.0.take() {
      f()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_none() }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
pub struct SubscriptionWrapper<T: Subscription>(pub(crate) T);

impl<T: Subscription> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> { SubscriptionGuard(self.0) }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: Subscription> Subscription for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(&mut self) { self.0.unsubscribe() }
  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// Unsubscribes the wrapped subscription when dropped.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(pub(crate) T);

impl<T: Subscription> SubscriptionGuard<T> {
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  #[rxlite_macro::test]
  fn teardown_runs_once() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let mut t = Teardown::new(move || c.set(c.get() + 1));
    assert!(!t.is_closed());
    t.unsubscribe();
    t.unsubscribe();
    assert!(t.is_closed());
    assert_eq!(calls.get(), 1);
  }

  #[rxlite_macro::test]
  fn guard_unsubscribes_on_drop() {
    let calls = Rc::new(Cell::new(0));
    {
      let c = calls.clone();
      let _guard = SubscriptionWrapper(Teardown::new(move || c.set(c.get() + 1)))
        .unsubscribe_when_dropped();
      assert_eq!(calls.get(), 0);
    }
    assert_eq!(calls.get(), 1);
  }

  #[rxlite_macro::test]
  fn option_subscription_is_taken() {
    let mut sub = Some(Teardown::new(|| {}));
    assert!(!sub.is_closed());
    sub.unsubscribe();
    assert!(sub.is_none());
    assert!(sub.is_closed());
  }
}
