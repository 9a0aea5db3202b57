//! The observable handle and its constructors.
//!
//! [`Observable`] is a cheap, clonable handle to a shared instance. Cloning
//! the handle never creates a new instance. What happens when an instance is
//! subscribed twice depends on its kind:
//!
//! * instances built by [`Observable::create`] and by operators run their
//!   production routine once, on the first subscription, and multicast it to
//!   every observer registered since;
//! * [`Observable::defer`], subjects and ref-counted shares hand every
//!   subscription its own route to the producer.

mod connectable;
mod defer;
mod from_iter;
mod lazy;
mod multicast;
mod of;
mod ref_count;
mod trivial;

use std::rc::Rc;

pub use connectable::ConnectableObservable;
pub use lazy::{Emitter, LazyObservable};
pub use multicast::MulticastObservable;
pub use ref_count::RefCountObservable;

use crate::{
  observer::{BoxedObserver, CallbackObserver, FnMutObserver, Observer},
  ops::{Operator, OperatorFactory},
  scheduler::{ImmediateScheduler, SchedulerRef},
  subscription::{BoxedSubscription, SubscriptionWrapper},
};

/// Something observers can be attached to.
///
/// This is the seam every observable kind implements. Implementations receive
/// the scheduler chosen at the subscribe call site and return the handle that
/// detaches `observer` again.
pub trait Subscribable<Item, Err> {
  fn actual_subscribe(
    self: Rc<Self>, observer: BoxedObserver<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription;
}

/// A push-based stream of `Item`s that may end with an `Err` or complete.
pub struct Observable<Item, Err>(Rc<dyn Subscribable<Item, Err>>);

impl<Item, Err> Clone for Observable<Item, Err> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

/// Output item type of the operator built by `F`.
pub type OpItem<F, Item, Err> =
  <<F as OperatorFactory<Item, Err>>::Op as Operator<Item, Err>>::Item;
/// Output error type of the operator built by `F`.
pub type OpErr<F, Item, Err> = <<F as OperatorFactory<Item, Err>>::Op as Operator<Item, Err>>::Err;

impl<Item, Err> Observable<Item, Err> {
  pub fn from_subscribable(source: impl Subscribable<Item, Err> + 'static) -> Self {
    Self(Rc::new(source))
  }

  pub(crate) fn actual_subscribe(
    &self, observer: BoxedObserver<Item, Err>, scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    self.0.clone().actual_subscribe(observer, scheduler)
  }

  /// Whether two handles point to the same instance.
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Subscribe with work scheduled on `scheduler`.
  pub fn subscribe_with_scheduler<O>(
    &self, observer: O, scheduler: &SchedulerRef,
  ) -> SubscriptionWrapper<BoxedSubscription>
  where
    O: Observer<Item, Err> + 'static,
  {
    SubscriptionWrapper(self.actual_subscribe(Box::new(observer), scheduler))
  }

  /// Subscribe on a fresh [`ImmediateScheduler`].
  pub fn subscribe<O>(&self, observer: O) -> SubscriptionWrapper<BoxedSubscription>
  where
    O: Observer<Item, Err> + 'static,
  {
    let scheduler: SchedulerRef = Rc::new(ImmediateScheduler);
    self.subscribe_with_scheduler(observer, &scheduler)
  }

  /// Subscribe with a value callback. Errors are reported as unhandled.
  pub fn subscribe_next(
    &self, next: impl FnMut(Item) + 'static,
  ) -> SubscriptionWrapper<BoxedSubscription> {
    self.subscribe(FnMutObserver(next))
  }

  pub fn subscribe_err(
    &self, next: impl FnMut(Item) + 'static, error: impl FnMut(Err) + 'static,
  ) -> SubscriptionWrapper<BoxedSubscription> {
    self.subscribe(CallbackObserver::new().on_next(next).on_error(error))
  }

  pub fn subscribe_all(
    &self, next: impl FnMut(Item) + 'static, error: impl FnMut(Err) + 'static,
    complete: impl FnMut() + 'static,
  ) -> SubscriptionWrapper<BoxedSubscription> {
    self.subscribe(CallbackObserver::new().on_next(next).on_error(error).on_complete(complete))
  }

  pub fn subscribe_callback(
    &self, observer: CallbackObserver<Item, Err>,
  ) -> SubscriptionWrapper<BoxedSubscription> {
    self.subscribe(observer)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Build a new instance whose production is the operator created by
  /// `factory`, applied to this observable.
  ///
  /// The factory is a blueprint: it is asked for a fresh operator when the new
  /// instance starts, so per-subscription state never leaks between runs.
  pub fn lift<F>(&self, factory: F) -> Observable<OpItem<F, Item, Err>, OpErr<F, Item, Err>>
  where
    F: OperatorFactory<Item, Err> + 'static,
    OpItem<F, Item, Err>: Clone + 'static,
    OpErr<F, Item, Err>: Clone + 'static,
  {
    let source = self.clone();
    Observable::create(move |downstream, scheduler| {
      factory.create().call(&source, downstream, scheduler)
    })
  }
}
