use smallvec::SmallVec;

use super::Subscription;

/// Token-keyed storage used for observer registries and inner subscriptions.
///
/// Tokens are handed out monotonically and never reused, so removing by token
/// only ever touches the entry it was issued for, even when the same value was
/// inserted twice. A token can be reserved before its value exists, which is
/// how callers break the "observer needs its own id" cycle.
pub struct DynamicSubscriptions<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  pub fn new() -> Self { Self::default() }

  /// Store `item` under a fresh token.
  pub fn add(&mut self, item: U) -> usize {
    let id = self.reserve_id();
    self.items.push((id, item));
    id
  }

  pub fn reserve_id(&mut self) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  /// Store `item` under a token obtained from `reserve_id`.
  pub fn insert(&mut self, id: usize, item: U) { self.items.push((id, item)); }

  pub fn remove(&mut self, id: usize) -> Option<U> {
    let pos = self.items.iter().position(|(i, _)| *i == id)?;
    Some(self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn get_mut(&mut self, id: usize) -> Option<&mut U> {
    self.items.iter_mut().find(|(i, _)| *i == id).map(|(_, item)| item)
  }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Take every entry out, leaving the container empty but keeping the token
  /// counter, so tokens issued later still never collide.
  pub fn take_all(&mut self) -> SmallVec<[(usize, U); 2]> { std::mem::take(&mut self.items) }

  pub fn iter(&self) -> impl Iterator<Item = (usize, &U)> {
    self.items.iter().map(|(i, u)| (*i, u))
  }
}

impl<U: Clone> DynamicSubscriptions<U> {
  /// Copy of the current membership, used to iterate without holding a borrow.
  pub fn snapshot(&self) -> SmallVec<[(usize, U); 4]> { self.items.iter().cloned().collect() }
}

impl<U: Subscription> DynamicSubscriptions<U> {
  pub fn unsubscribe_all(&mut self) {
    for (_, mut item) in self.take_all() {
      item.unsubscribe();
    }
  }
}
