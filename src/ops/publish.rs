//! The sharing surface: multicasting a source through subjects.
//!
//! `multicast` and the `publish*`/`replay` family return a
//! [`ConnectableObservable`] that needs an explicit `connect`. The `share*`
//! family adds reference counting on top, so the source runs while at least
//! one observer is subscribed. The `*_with` forms apply a selector to a
//! per-subscription subject instead.

use crate::{
  observable::{ConnectableObservable, MulticastObservable, Observable},
  subject::{AsyncSubject, BehaviorSubject, ReplayConfig, ReplaySubject, Subject, SubjectLike},
};

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Share one subscription to this observable through `subject`.
  ///
  /// The subject is used for the whole life of the connectable; once it has
  /// terminated, reconnecting only replays its terminal notification.
  pub fn multicast<S>(&self, subject: S) -> ConnectableObservable<Item, Err, S>
  where
    S: SubjectLike<Item, Err>,
  {
    ConnectableObservable::new(self.clone(), subject)
  }

  /// For every subscription, make a subject with `factory`, subscribe to
  /// `selector(subject)` and connect this observable to the subject.
  pub fn multicast_with_selector<S, Out, OutErr>(
    &self, factory: impl Fn() -> S + 'static,
    selector: impl Fn(Observable<Item, Err>) -> Observable<Out, OutErr> + 'static,
  ) -> Observable<Out, OutErr>
  where
    S: SubjectLike<Item, Err>,
    Out: 'static,
    OutErr: 'static,
  {
    Observable::from_subscribable(MulticastObservable::new(self.clone(), factory, selector))
  }

  /// Multicast through a plain [`Subject`].
  pub fn publish(&self) -> ConnectableObservable<Item, Err, Subject<Item, Err>> {
    ConnectableObservable::with_factory(self.clone(), Subject::new)
  }

  /// [`Observable::multicast_with_selector`] over plain subjects.
  pub fn publish_with<Out, OutErr>(
    &self, selector: impl Fn(Observable<Item, Err>) -> Observable<Out, OutErr> + 'static,
  ) -> Observable<Out, OutErr>
  where
    Out: 'static,
    OutErr: 'static,
  {
    self.multicast_with_selector(Subject::<Item, Err>::new, selector)
  }

  /// Multicast only the last value, delivered on completion.
  pub fn publish_last(&self) -> ConnectableObservable<Item, Err, AsyncSubject<Item, Err>> {
    ConnectableObservable::with_factory(self.clone(), AsyncSubject::new)
  }

  /// Multicast starting from `seed`; subscribers first get the latest value.
  pub fn publish_value(
    &self, seed: Item,
  ) -> ConnectableObservable<Item, Err, BehaviorSubject<Item, Err>> {
    ConnectableObservable::with_factory(self.clone(), move || BehaviorSubject::new(seed.clone()))
  }

  /// Multicast and replay buffered values to late subscribers.
  pub fn replay(
    &self, config: ReplayConfig,
  ) -> ConnectableObservable<Item, Err, ReplaySubject<Item, Err>> {
    ConnectableObservable::with_factory(self.clone(), move || ReplaySubject::new(config))
  }

  /// `publish().ref_count()`.
  pub fn share(&self) -> Self { self.publish().ref_count() }

  /// `publish_value(seed).ref_count()`.
  pub fn share_value(&self, seed: Item) -> Self { self.publish_value(seed).ref_count() }

  /// `replay(config).ref_count()`.
  pub fn share_replay(&self, config: ReplayConfig) -> Self { self.replay(config).ref_count() }
}
