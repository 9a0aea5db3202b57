use std::{cell::RefCell, rc::Rc};

use smallvec::SmallVec;

use super::{BoxedSubscription, Subscription};

/// A composite subscription that owns child teardowns.
///
/// Cloning yields another handle to the same composite. Children added after
/// the composite closed are unsubscribed on the spot.
#[derive(Clone, Default)]
pub struct LocalSubscription(Rc<RefCell<Inner>>);

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[BoxedSubscription; 1]>,
}

impl LocalSubscription {
  pub fn add(&self, subscription: impl Subscription + 'static) {
    let mut subscription = BoxedSubscription::new(subscription);
    let mut inner = self.0.borrow_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.teardown.retain(|s| !s.is_closed());
      inner.teardown.push(subscription);
    }
  }

  pub fn teardown_size(&self) -> usize { self.0.borrow().teardown.len() }
}

impl Subscription for LocalSubscription {
  fn unsubscribe(&mut self) {
    let teardown = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    // Children may reach back into this composite, so no borrow is held here.
    for mut child in teardown {
      child.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.borrow().closed }
}
