use crate::observable::Observable;

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Map every value to an observable and merge the results.
  #[doc(alias = "merge_map")]
  pub fn flat_map<Out, F>(&self, func: F) -> Observable<Out, Err>
  where
    Out: Clone + 'static,
    F: FnMut(Item) -> Observable<Out, Err> + Clone + 'static,
  {
    self.map(func).merge_all()
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn expands_each_value() {
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    Observable::<_, ()>::from_array(vec![1, 2, 3])
      .flat_map(|v| Observable::from_iter(std::iter::repeat(v).take(v)))
      .subscribe_next(move |v| s.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 2, 3, 3, 3]);
  }

  #[rxlite_macro::test]
  fn inner_values_interleave_as_they_arrive() {
    let mut source = Subject::<i32, ()>::new();
    let mut tick = Subject::<(), ()>::new();
    let ticks = tick.as_observable();
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    source
      .as_observable()
      .flat_map(move |v| ticks.map(move |_| v))
      .subscribe_next(move |v| s.rc_deref_mut().push(v));
    source.next(1);
    tick.next(());
    source.next(2);
    tick.next(());
    assert_eq!(*seen.rc_deref(), vec![1, 1, 2]);
  }
}
