use std::{
  cell::{Ref, RefCell, RefMut},
  rc::Rc,
};

/// Shared, interior-mutable ownership of operator and engine state.
///
/// Every stateful piece of a pipeline (registries, operator buffers, pending
/// connections) lives behind one of these. Borrows are kept short: never hold
/// a `rc_deref_mut` guard while calling into an observer, because that call
/// may come back into the same state.
#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> Ref<'_, T> { self.0.borrow() }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Borrow without panicking when the value is already mutably borrowed
  /// further up the stack.
  #[inline]
  pub fn try_rc_deref(&self) -> Option<Ref<'_, T>> { self.0.try_borrow().ok() }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxlite_macro::test]
  fn clones_share_state() {
    let a = MutRc::own(1);
    let b = a.clone();
    *b.rc_deref_mut() += 1;
    assert_eq!(*a.rc_deref(), 2);
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&MutRc::own(2)));
  }

  #[rxlite_macro::test]
  fn try_deref_reports_busy_state() {
    let a = MutRc::own(0);
    let guard = a.rc_deref_mut();
    assert!(a.try_rc_deref().is_none());
    drop(guard);
    assert!(a.try_rc_deref().is_some());
  }
}
