//! Observer trait and implementations
//!
//! An observer consumes the notification grammar `next* (error | complete)?`.
//! The grammar is enforced by [`Subscriber`](crate::subscriber::Subscriber)
//! at the registry boundary, so plain observers may assume it holds.

use crate::rc::MutRc;

/// The consumer of values, errors and completion notifications.
pub trait Observer<Item, Err> {
  fn next(&mut self, value: Item);

  fn error(&mut self, err: Err);

  fn complete(&mut self);

  /// Whether this observer will ignore any further notification.
  ///
  /// Synchronous producers poll it between values so they can stop early, for
  /// example once a `take` downstream has seen enough.
  fn is_closed(&self) -> bool { false }
}

pub type BoxedObserver<Item, Err> = Box<dyn Observer<Item, Err>>;

impl<Item, Err, O: Observer<Item, Err> + ?Sized> Observer<Item, Err> for Box<O> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }
  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }
  #[inline]
  fn complete(&mut self) { (**self).complete() }
  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// `None` ignores every notification; a terminal notification takes the
/// observer out so it is dropped as soon as the stream ends.
impl<Item, Err, O: Observer<Item, Err>> Observer<Item, Err> for Option<O> {
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(mut inner) = self.take() {
      inner.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut inner) = self.take() {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, |o| o.is_closed()) }
}

impl<Item, Err, O: Observer<Item, Err>> Observer<Item, Err> for MutRc<O> {
  #[inline]
  fn next(&mut self, value: Item) { self.rc_deref_mut().next(value) }
  #[inline]
  fn error(&mut self, err: Err) { self.rc_deref_mut().error(err) }
  #[inline]
  fn complete(&mut self) { self.rc_deref_mut().complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.try_rc_deref().map_or(false, |o| o.is_closed()) }
}

/// Surfaces an error that reached an observer with no error callback.
pub(crate) fn report_unhandled_error<Err>() {
  tracing::error!(error_type = std::any::type_name::<Err>(), "unhandled error in observable");
}

/// Adapts a closure into an observer that only handles values.
///
/// Completion is ignored. Errors are not swallowed silently: they are reported
/// through `tracing` at `error` level.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item, Err> Observer<Item, Err> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(value) }

  fn error(&mut self, _err: Err) { report_unhandled_error::<Err>() }

  #[inline]
  fn complete(&mut self) {}
}

/// What to do with values or completion when no callback was given.
pub enum Callback<F> {
  Ignore,
  Call(F),
}

/// What to do with an error when no callback was given.
pub enum ErrorCallback<F> {
  /// Report through `tracing` and otherwise drop the error.
  Unhandled,
  Call(F),
}

/// An observer assembled from optional callbacks.
///
/// Missing callbacks are explicit variants rather than placeholder closures,
/// so an absent error handler is visible both to readers and at runtime.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use rxlite::prelude::*;
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let s = seen.clone();
/// let observer = CallbackObserver::new()
///   .on_next(move |v: i32| s.borrow_mut().push(v))
///   .on_error(|_: &str| {});
/// Observable::from_array(vec![1, 2]).subscribe_callback(observer);
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub struct CallbackObserver<Item, Err> {
  next: Callback<Box<dyn FnMut(Item)>>,
  error: ErrorCallback<Box<dyn FnMut(Err)>>,
  complete: Callback<Box<dyn FnMut()>>,
}

impl<Item, Err> Default for CallbackObserver<Item, Err> {
  fn default() -> Self {
    Self { next: Callback::Ignore, error: ErrorCallback::Unhandled, complete: Callback::Ignore }
  }
}

impl<Item, Err> CallbackObserver<Item, Err> {
  pub fn new() -> Self { Self::default() }

  pub fn on_next(mut self, f: impl FnMut(Item) + 'static) -> Self {
    self.next = Callback::Call(Box::new(f));
    self
  }

  pub fn on_error(mut self, f: impl FnMut(Err) + 'static) -> Self {
    self.error = ErrorCallback::Call(Box::new(f));
    self
  }

  pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
    self.complete = Callback::Call(Box::new(f));
    self
  }
}

impl<Item, Err> Observer<Item, Err> for CallbackObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if let Callback::Call(f) = &mut self.next {
      f(value)
    }
  }

  fn error(&mut self, err: Err) {
    match &mut self.error {
      ErrorCallback::Call(f) => f(err),
      ErrorCallback::Unhandled => report_unhandled_error::<Err>(),
    }
  }

  fn complete(&mut self) {
    if let Callback::Call(f) = &mut self.complete {
      f()
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use tracing_test::traced_test;

  use super::*;

  #[rxlite_macro::test]
  fn option_observer_drops_inner_on_terminal() {
    let log = Rc::new(RefCell::new(vec![]));
    let l = log.clone();
    let mut observer =
      Some(CallbackObserver::<i32, ()>::new().on_next(move |v| l.borrow_mut().push(v)));
    observer.next(1);
    Observer::<i32, ()>::complete(&mut observer);
    observer.next(2);
    assert!(Observer::<i32, ()>::is_closed(&observer));
    assert_eq!(*log.borrow(), vec![1]);
  }

  #[rxlite_macro::test]
  fn callback_observer_routes_each_kind() {
    let log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let mut observer = CallbackObserver::new()
      .on_next(move |v: i32| l1.borrow_mut().push(format!("next {v}")))
      .on_error(move |e: &str| l2.borrow_mut().push(format!("error {e}")))
      .on_complete(move || l3.borrow_mut().push("complete".to_string()));
    observer.next(1);
    observer.error("boom");
    observer.complete();
    assert_eq!(*log.borrow(), vec!["next 1", "error boom", "complete"]);
  }

  #[test]
  #[traced_test]
  fn missing_error_callback_is_reported() {
    let mut observer = CallbackObserver::<i32, String>::new();
    observer.error("lost".to_string());
    assert!(logs_contain("unhandled error in observable"));
  }

  #[test]
  #[traced_test]
  fn closure_observer_reports_errors() {
    let mut observer = FnMutObserver(|_: i32| {});
    Observer::<i32, &str>::error(&mut observer, "lost");
    assert!(logs_contain("unhandled error in observable"));
  }
}
