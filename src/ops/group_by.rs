//! Split a stream into one sub-stream per key.
//!
//! The first value with a new key emits a [`GroupedObservable`] downstream,
//! then every value with that key is forwarded to it. With
//! `group_by_until`, a group is closed (completed) as soon as its duration
//! observable emits or completes; a later value with the same key opens a
//! fresh group.

use std::{collections::HashMap, hash::Hash, ops::Deref};

use crate::{
  observable::{Emitter, Observable},
  observer::Observer,
  ops::Operator,
  rc::MutRc,
  scheduler::SchedulerRef,
  subject::{Subject, SubjectLike},
  subscription::{BoxedSubscription, DynamicSubscriptions, Subscription},
};

/// The values of one group, tagged with the group's key.
pub struct GroupedObservable<Key, Item, Err> {
  key: Key,
  observable: Observable<Item, Err>,
}

impl<Key: Clone, Item, Err> Clone for GroupedObservable<Key, Item, Err> {
  fn clone(&self) -> Self { Self { key: self.key.clone(), observable: self.observable.clone() } }
}

impl<Key, Item, Err> GroupedObservable<Key, Item, Err> {
  #[inline]
  pub fn key(&self) -> &Key { &self.key }
}

impl<Key, Item, Err> Deref for GroupedObservable<Key, Item, Err> {
  type Target = Observable<Item, Err>;

  fn deref(&self) -> &Observable<Item, Err> { &self.observable }
}

struct Group<Item, Err> {
  id: usize,
  subject: Subject<Item, Err>,
}

struct GroupState<SKey, Item, Err> {
  groups: HashMap<SKey, Group<Item, Err>>,
  /// Duration subscriptions keyed by group id; `None` while the duration is
  /// still being subscribed.
  durations: DynamicSubscriptions<Option<BoxedSubscription>>,
  disposed: bool,
}

type Shared<SKey, Item, Err> = MutRc<GroupState<SKey, Item, Err>>;

fn close_group<SKey, Item, Err>(state: &Shared<SKey, Item, Err>, key: &SKey, id: usize)
where
  SKey: Hash + Eq,
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  let (group, duration) = {
    let mut state = state.rc_deref_mut();
    let open = state.groups.get(key).map_or(false, |g| g.id == id);
    let group = if open { state.groups.remove(key) } else { None };
    (group, state.durations.remove(id))
  };
  if let Some(mut group) = group {
    group.subject.complete();
  }
  if let Some(mut duration) = duration {
    duration.unsubscribe();
  }
}

/// Ends every open group with `end` and drops every duration subscription.
fn end_all<SKey, Item, Err>(
  state: &Shared<SKey, Item, Err>, mut end: impl FnMut(&mut Subject<Item, Err>),
) {
  let (groups, durations) = {
    let mut state = state.rc_deref_mut();
    (std::mem::take(&mut state.groups), state.durations.take_all())
  };
  for (_, mut group) in groups {
    end(&mut group.subject);
  }
  for (_, mut duration) in durations {
    duration.unsubscribe();
  }
}

pub struct GroupByUntilOp<KF, EF, DF, SF> {
  key_selector: KF,
  element_selector: EF,
  duration_selector: DF,
  key_serializer: SF,
}

struct GroupByObserver<Key, Elem, Err, SKey, KF, EF, DF, SF> {
  downstream: Emitter<GroupedObservable<Key, Elem, Err>, Err>,
  state: Shared<SKey, Elem, Err>,
  scheduler: SchedulerRef,
  op: GroupByUntilOp<KF, EF, DF, SF>,
}

impl<Item, Err, Key, Elem, D, SKey, KF, EF, DF, SF> Observer<Item, Err>
  for GroupByObserver<Key, Elem, Err, SKey, KF, EF, DF, SF>
where
  Err: Clone + 'static,
  Key: Clone + 'static,
  Elem: Clone + 'static,
  D: 'static,
  SKey: Hash + Eq + Clone + 'static,
  KF: FnMut(&Item) -> Key,
  EF: FnMut(Item) -> Elem,
  DF: FnMut(&GroupedObservable<Key, Elem, Err>) -> Observable<D, Err>,
  SF: FnMut(&Key) -> SKey,
{
  fn next(&mut self, value: Item) {
    let key = (self.op.key_selector)(&value);
    let serialized = (self.op.key_serializer)(&key);
    let existing = {
      let state = self.state.rc_deref();
      if state.disposed {
        return;
      }
      state.groups.get(&serialized).map(|g| g.subject.clone())
    };
    let mut subject = match existing {
      Some(subject) => subject,
      None => self.open_group::<D>(key, serialized),
    };
    subject.next((self.op.element_selector)(value));
  }

  fn error(&mut self, err: Err) {
    end_all(&self.state, |subject| subject.error(err.clone()));
    self.downstream.error(err)
  }

  fn complete(&mut self) {
    end_all(&self.state, |subject| subject.complete());
    self.downstream.complete()
  }

  fn is_closed(&self) -> bool { self.downstream.is_closed() }
}

impl<Key, Elem, Err, SKey, KF, EF, DF, SF> GroupByObserver<Key, Elem, Err, SKey, KF, EF, DF, SF>
where
  Err: Clone + 'static,
  Key: Clone + 'static,
  Elem: Clone + 'static,
  SKey: Hash + Eq + Clone + 'static,
{
  fn open_group<D: 'static>(&mut self, key: Key, serialized: SKey) -> Subject<Elem, Err>
  where
    DF: FnMut(&GroupedObservable<Key, Elem, Err>) -> Observable<D, Err>,
  {
    let subject = Subject::new();
    let id = {
      let mut state = self.state.rc_deref_mut();
      let id = state.durations.reserve_id();
      state.durations.insert(id, None);
      state.groups.insert(serialized.clone(), Group { id, subject: subject.clone() });
      id
    };
    let grouped = GroupedObservable { key, observable: subject.as_observable() };
    self.downstream.next(grouped.clone());

    let duration = (self.op.duration_selector)(&grouped);
    let observer = DurationObserver {
      state: self.state.clone(),
      downstream: self.downstream.clone(),
      key: serialized,
      id,
    };
    let subscription = duration.actual_subscribe(Box::new(observer), &self.scheduler);
    let closed_early = match self.state.rc_deref_mut().durations.get_mut(id) {
      Some(slot) => {
        *slot = Some(subscription);
        None
      }
      None => Some(subscription),
    };
    if let Some(mut subscription) = closed_early {
      subscription.unsubscribe();
    }
    subject
  }
}

struct DurationObserver<Key, Elem, Err, SKey> {
  state: Shared<SKey, Elem, Err>,
  downstream: Emitter<GroupedObservable<Key, Elem, Err>, Err>,
  key: SKey,
  id: usize,
}

impl<D, Key, Elem, Err, SKey> Observer<D, Err> for DurationObserver<Key, Elem, Err, SKey>
where
  Key: Clone,
  Elem: Clone + 'static,
  Err: Clone + 'static,
  SKey: Hash + Eq,
{
  fn next(&mut self, _: D) { close_group(&self.state, &self.key, self.id) }

  fn error(&mut self, err: Err) {
    end_all(&self.state, |subject| subject.error(err.clone()));
    self.downstream.error(err)
  }

  fn complete(&mut self) { close_group(&self.state, &self.key, self.id) }
}

struct GroupBySubscription<SKey, Elem, Err> {
  source: BoxedSubscription,
  state: Shared<SKey, Elem, Err>,
}

impl<SKey, Elem, Err> Subscription for GroupBySubscription<SKey, Elem, Err> {
  fn unsubscribe(&mut self) {
    self.source.unsubscribe();
    let durations = {
      let mut state = self.state.rc_deref_mut();
      state.disposed = true;
      state.durations.take_all()
    };
    for (_, mut duration) in durations {
      duration.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.state.rc_deref().disposed }
}

impl<Item, Err, Key, Elem, D, SKey, KF, EF, DF, SF> Operator<Item, Err>
  for GroupByUntilOp<KF, EF, DF, SF>
where
  Item: 'static,
  Err: Clone + 'static,
  Key: Clone + 'static,
  Elem: Clone + 'static,
  D: 'static,
  SKey: Hash + Eq + Clone + 'static,
  KF: FnMut(&Item) -> Key + 'static,
  EF: FnMut(Item) -> Elem + 'static,
  DF: FnMut(&GroupedObservable<Key, Elem, Err>) -> Observable<D, Err> + 'static,
  SF: FnMut(&Key) -> SKey + 'static,
{
  type Item = GroupedObservable<Key, Elem, Err>;
  type Err = Err;

  fn call(
    self, source: &Observable<Item, Err>, downstream: Emitter<Self::Item, Err>,
    scheduler: &SchedulerRef,
  ) -> BoxedSubscription {
    let state = MutRc::own(GroupState {
      groups: HashMap::new(),
      durations: DynamicSubscriptions::new(),
      disposed: false,
    });
    let observer =
      GroupByObserver { downstream, state: state.clone(), scheduler: scheduler.clone(), op: self };
    let source = source.actual_subscribe(Box::new(observer), scheduler);
    BoxedSubscription::new(GroupBySubscription { source, state })
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Group values by `key_selector`. Groups stay open until the source
  /// terminates.
  pub fn group_by<Key, KF>(
    &self, key_selector: KF,
  ) -> Observable<GroupedObservable<Key, Item, Err>, Err>
  where
    Key: Hash + Eq + Clone + 'static,
    KF: FnMut(&Item) -> Key + Clone + 'static,
  {
    self.group_by_until(key_selector, |v| v, |_| Observable::<(), Err>::never())
  }

  /// Group values by `key_selector`, transform them with `element_selector`
  /// and close each group when the observable returned by
  /// `duration_selector` for it emits or completes.
  pub fn group_by_until<Key, Elem, D, KF, EF, DF>(
    &self, key_selector: KF, element_selector: EF, duration_selector: DF,
  ) -> Observable<GroupedObservable<Key, Elem, Err>, Err>
  where
    Key: Hash + Eq + Clone + 'static,
    Elem: Clone + 'static,
    D: 'static,
    KF: FnMut(&Item) -> Key + Clone + 'static,
    EF: FnMut(Item) -> Elem + Clone + 'static,
    DF: FnMut(&GroupedObservable<Key, Elem, Err>) -> Observable<D, Err> + Clone + 'static,
  {
    self.group_by_until_serialized(key_selector, element_selector, duration_selector, Key::clone)
  }

  /// Like [`Observable::group_by_until`], but groups are told apart by
  /// `key_serializer(&key)`, for keys that cannot be hashed themselves.
  pub fn group_by_until_serialized<Key, Elem, D, SKey, KF, EF, DF, SF>(
    &self, key_selector: KF, element_selector: EF, duration_selector: DF, key_serializer: SF,
  ) -> Observable<GroupedObservable<Key, Elem, Err>, Err>
  where
    Key: Clone + 'static,
    Elem: Clone + 'static,
    D: 'static,
    SKey: Hash + Eq + Clone + 'static,
    KF: FnMut(&Item) -> Key + Clone + 'static,
    EF: FnMut(Item) -> Elem + Clone + 'static,
    DF: FnMut(&GroupedObservable<Key, Elem, Err>) -> Observable<D, Err> + Clone + 'static,
    SF: FnMut(&Key) -> SKey + Clone + 'static,
  {
    self.lift(move || GroupByUntilOp {
      key_selector: key_selector.clone(),
      element_selector: element_selector.clone(),
      duration_selector: duration_selector.clone(),
      key_serializer: key_serializer.clone(),
    })
  }
}
