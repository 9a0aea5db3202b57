use super::merge_all::merge_all;
use crate::observable::Observable;

impl<Item: Clone + 'static, Err: Clone + 'static> Observable<Item, Err> {
  /// Interleave the values of this observable and `other`.
  ///
  /// Completes when both have completed; the first error wins.
  pub fn merge(&self, other: &Observable<Item, Err>) -> Self {
    merge_all([self.clone(), other.clone()])
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxlite_macro::test]
  fn odd_even_merge() {
    let mut numbers = Subject::<i32, ()>::new();
    let numbers_obs = numbers.as_observable();
    let odd = numbers_obs.filter(|v| v % 2 != 0);
    let even = numbers_obs.filter(|v| v % 2 == 0);
    let seen = MutRc::own(vec![]);
    let s = seen.clone();
    odd.merge(&even).subscribe_next(move |v| s.rc_deref_mut().push(v));
    (0..6).for_each(|v| numbers.next(v));
    assert_eq!(*seen.rc_deref(), vec![0, 1, 2, 3, 4, 5]);
  }

  #[rxlite_macro::test]
  fn completes_when_both_complete() {
    let mut a = Subject::<i32, ()>::new();
    let mut b = Subject::<i32, ()>::new();
    let completed = MutRc::own(false);
    let c = completed.clone();
    a.as_observable().merge(&b.as_observable()).subscribe_all(|_| {}, |_| {}, move || {
      *c.rc_deref_mut() = true
    });
    a.complete();
    assert!(!*completed.rc_deref());
    b.complete();
    assert!(*completed.rc_deref());
  }

  #[rxlite_macro::test]
  fn first_error_wins() {
    let mut a = Subject::<i32, &str>::new();
    let mut b = Subject::<i32, &str>::new();
    let errors = MutRc::own(vec![]);
    let e = errors.clone();
    a.as_observable()
      .merge(&b.as_observable())
      .subscribe_err(|_| {}, move |x| e.rc_deref_mut().push(x));
    a.error("first");
    b.error("second");
    assert_eq!(*errors.rc_deref(), vec!["first"]);
  }
}
