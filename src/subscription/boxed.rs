use super::Subscription;

/// Type-erased subscription.
///
/// Subscriptions are control handles stored and called long after they were
/// created, so they are always `'static`.
pub struct BoxedSubscription(Box<dyn Subscription>);

impl BoxedSubscription {
  pub fn new(subscription: impl Subscription + 'static) -> Self { Self(Box::new(subscription)) }

  /// A handle that is already closed.
  pub fn closed() -> Self { Self::new(()) }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.0.unsubscribe() }
  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl std::fmt::Debug for BoxedSubscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoxedSubscription").field("is_closed", &self.is_closed()).finish()
  }
}
