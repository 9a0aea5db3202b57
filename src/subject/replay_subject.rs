use std::{collections::VecDeque, rc::Rc};

use super::{Subject, SubjectLike};
use crate::{
  observable::{Observable, Subscribable},
  observer::{BoxedObserver, Observer},
  rc::MutRc,
  scheduler::{Duration, ImmediateScheduler, Instant, SchedulerRef},
  subscription::BoxedSubscription,
};

/// Bounds on what a [`ReplaySubject`] keeps for late subscribers.
///
/// Both bounds are optional; with neither set every value is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayConfig {
  buffer_size: Option<usize>,
  window: Option<Duration>,
}

impl ReplayConfig {
  pub fn new() -> Self { Self::default() }

  /// Keep at most `size` of the most recent values.
  pub fn buffer_size(mut self, size: usize) -> Self {
    self.buffer_size = Some(size);
    self
  }

  /// Drop values older than `window`, measured on the subject's scheduler
  /// clock.
  pub fn window(mut self, window: Duration) -> Self {
    self.window = Some(window);
    self
  }
}

struct ReplayBuffer<Item> {
  config: ReplayConfig,
  values: VecDeque<(Instant, Item)>,
}

impl<Item> ReplayBuffer<Item> {
  fn trim(&mut self, now: Instant) {
    if let Some(size) = self.config.buffer_size {
      while self.values.len() > size {
        self.values.pop_front();
      }
    }
    if let Some(window) = self.config.window {
      while self.values.front().map_or(false, |(at, _)| now.duration_since(*at) > window) {
        self.values.pop_front();
      }
    }
  }
}

/// A subject that replays buffered values to every new subscriber, followed
/// by the terminal notification if the subject already finished.
pub struct ReplaySubject<Item, Err> {
  subject: Subject<Item, Err>,
  buffer: MutRc<ReplayBuffer<Item>>,
  scheduler: SchedulerRef,
}

impl<Item, Err> Clone for ReplaySubject<Item, Err> {
  fn clone(&self) -> Self {
    Self {
      subject: self.subject.clone(),
      buffer: self.buffer.clone(),
      scheduler: self.scheduler.clone(),
    }
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> ReplaySubject<Item, Err> {
  /// A replay subject timed by the wall clock.
  pub fn new(config: ReplayConfig) -> Self {
    Self::with_scheduler(config, Rc::new(ImmediateScheduler))
  }

  /// A replay subject whose time window is measured with `scheduler.now()`.
  pub fn with_scheduler(config: ReplayConfig, scheduler: SchedulerRef) -> Self {
    Self {
      subject: Subject::new(),
      buffer: MutRc::own(ReplayBuffer { config, values: VecDeque::new() }),
      scheduler,
    }
  }

  /// Values a subscriber arriving now would receive.
  pub fn buffered(&self) -> Vec<Item> {
    let mut buffer = self.buffer.rc_deref_mut();
    buffer.trim(self.scheduler.now());
    buffer.values.iter().map(|(_, v)| v.clone()).collect()
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Observer<Item, Err> for ReplaySubject<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.subject.is_stopped() {
      return;
    }
    {
      let mut buffer = self.buffer.rc_deref_mut();
      buffer.values.push_back((self.scheduler.now(), value.clone()));
      buffer.trim(self.scheduler.now());
    }
    self.subject.next(value);
  }

  fn error(&mut self, err: Err) { self.subject.error(err) }

  fn complete(&mut self) { self.subject.complete() }

  fn is_closed(&self) -> bool { self.subject.is_stopped() }
}

impl<Item: Clone + 'static, Err: Clone + 'static> Subscribable<Item, Err>
  for ReplaySubject<Item, Err>
{
  fn actual_subscribe(
    self: Rc<Self>, mut observer: BoxedObserver<Item, Err>, _: &SchedulerRef,
  ) -> BoxedSubscription {
    let mut values = self.buffered();
    values.truncate(values.len().saturating_sub(self.subject.queued_values()));
    for value in values {
      observer.next(value);
    }
    self.subject.register(observer)
  }
}

impl<Item: Clone + 'static, Err: Clone + 'static> SubjectLike<Item, Err>
  for ReplaySubject<Item, Err>
{
  fn as_observable(&self) -> Observable<Item, Err> { Observable::from_subscribable(self.clone()) }

  fn is_stopped(&self) -> bool { self.subject.is_stopped() }

  fn observer_count(&self) -> usize { self.subject.observer_count() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  fn collect(subject: &ReplaySubject<i32, ()>) -> MutRc<Vec<i32>> {
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    subject.as_observable().subscribe_next(move |v| s.rc_deref_mut().push(v));
    seen
  }

  #[rxlite_macro::test]
  fn replays_bounded_buffer() {
    let mut subject = ReplaySubject::<i32, ()>::new(ReplayConfig::new().buffer_size(2));
    for v in 1..=4 {
      subject.next(v);
    }
    let seen = collect(&subject);
    subject.next(5);
    assert_eq!(*seen.rc_deref(), vec![3, 4, 5]);
  }

  #[rxlite_macro::test]
  fn window_uses_scheduler_clock() {
    let scheduler = TestScheduler::new();
    let mut subject = ReplaySubject::<i32, ()>::with_scheduler(
      ReplayConfig::new().window(Duration::from_millis(100)),
      scheduler.scheduler_ref(),
    );
    subject.next(1);
    scheduler.advance_by(Duration::from_millis(60));
    subject.next(2);
    scheduler.advance_by(Duration::from_millis(60));
    assert_eq!(*collect(&subject).rc_deref(), vec![2]);
  }

  #[rxlite_macro::test]
  fn replays_then_completes_after_termination() {
    let mut subject = ReplaySubject::<i32, ()>::new(ReplayConfig::new());
    subject.next(1);
    subject.complete();
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    subject.as_observable().subscribe_all(
      move |v| l1.rc_deref_mut().push(v.to_string()),
      |_| {},
      move || l2.rc_deref_mut().push("complete".to_string()),
    );
    assert_eq!(*log.rc_deref(), vec!["1", "complete"]);
  }

  #[rxlite_macro::test]
  fn observer_joining_mid_broadcast_skips_queued_values() {
    let mut subject = ReplaySubject::<i32, ()>::new(ReplayConfig::new());
    let late = MutRc::own(None);
    let (inner, l) = (subject.clone(), late.clone());
    subject.as_observable().subscribe_next(move |v| {
      if v == 1 {
        inner.clone().next(2);
        *l.rc_deref_mut() = Some(collect(&inner));
      }
    });
    subject.next(1);
    let late = late.rc_deref().clone().unwrap_or_default();
    assert_eq!(*late.rc_deref(), vec![1, 2]);
  }
}
