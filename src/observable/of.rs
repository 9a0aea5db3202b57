use super::Observable;
use crate::scheduler::SchedulerExt;

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Emits `value` once, then completes.
  ///
  /// ```
  /// use rxlite::prelude::*;
  ///
  /// let seen = MutRc::own(vec![]);
  /// let s = seen.clone();
  /// Observable::<_, ()>::just(42).subscribe_next(move |v| s.rc_deref_mut().push(v));
  /// assert_eq!(*seen.rc_deref(), vec![42]);
  /// ```
  #[doc(alias = "of")]
  pub fn just(value: Item) -> Self {
    Observable::create(move |emitter, scheduler| {
      scheduler.schedule_fn(move || {
        emitter.next(value);
        emitter.complete();
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn emits_value_then_completes() {
    let log = MutRc::own(vec![]);
    let (l1, l2) = (log.clone(), log.clone());
    Observable::<_, ()>::just("a").subscribe_all(
      move |v| l1.rc_deref_mut().push(v.to_string()),
      |_| {},
      move || l2.rc_deref_mut().push("complete".to_string()),
    );
    assert_eq!(*log.rc_deref(), vec!["a", "complete"]);
  }
}
