use super::Observable;
use crate::scheduler::SchedulerExt;

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Completes without emitting a value.
  pub fn empty() -> Self {
    Observable::create(|emitter, scheduler| scheduler.schedule_fn(move || emitter.complete()))
  }

  /// Never emits and never terminates.
  pub fn never() -> Self { Observable::create(|_, _| ()) }

  /// Terminates with `err` without emitting a value.
  #[doc(alias = "error")]
  pub fn throw_err(err: Err) -> Self {
    Observable::create(move |emitter, scheduler| scheduler.schedule_fn(move || emitter.error(err)))
  }
}
