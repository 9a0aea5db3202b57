use super::Observable;
use crate::scheduler::SchedulerExt;

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Emits every element of `iter` in order, then completes.
  ///
  /// Each element is one iteration of a recursive scheduled task, so long
  /// sequences do not grow the stack, and production stops as soon as no
  /// observer wants more values.
  pub fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = Item> + 'static,
    I::IntoIter: 'static,
  {
    Observable::create(move |emitter, scheduler| {
      let mut iter = iter.into_iter();
      scheduler.schedule_recursive_fn(move |recurse| {
        if emitter.is_closed() {
          return;
        }
        match iter.next() {
          Some(value) => {
            emitter.next(value);
            recurse.again();
          }
          None => emitter.complete(),
        }
      })
    })
  }

  pub fn from_array(values: Vec<Item>) -> Self { Self::from_iter(values) }
}
