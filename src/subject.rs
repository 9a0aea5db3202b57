//! Subjects: observers that are also observables.
//!
//! Every subject multicasts what it is fed to its current subscribers and
//! remembers how it terminated, so a late subscriber to a finished subject
//! gets the terminal notification straight away. The variants differ in what
//! a new subscriber receives first.

mod async_subject;
mod behavior_subject;
mod publish_subject;
mod replay_subject;

pub use async_subject::AsyncSubject;
pub use behavior_subject::BehaviorSubject;
pub use publish_subject::Subject;
pub use replay_subject::{ReplayConfig, ReplaySubject};

use crate::{observable::Observable, observer::Observer};

/// Shared surface of all subject variants.
///
/// Clones of a subject are handles to the same subject.
pub trait SubjectLike<Item, Err>: Observer<Item, Err> + Clone + 'static {
  /// The subscribe-only side of this subject.
  fn as_observable(&self) -> Observable<Item, Err>;

  /// Whether the subject has received `error` or `complete`.
  fn is_stopped(&self) -> bool;

  fn observer_count(&self) -> usize;
}
