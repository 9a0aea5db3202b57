//! # rxlite: single-threaded reactive streams
//!
//! Observables push values to observers until they end with an error or a
//! completion. Everything here runs on one thread: shared state lives in
//! `Rc` cells, and time is handed in through an explicit [`Scheduler`].
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! let seen = MutRc::own(vec![]);
//! let s = seen.clone();
//! Observable::<_, ()>::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe_next(move |v| s.rc_deref_mut().push(v));
//! assert_eq!(*seen.rc_deref(), vec![0, 4, 8, 12, 16]);
//! ```
//!
//! | Type | Role |
//! |------|------|
//! | [`Observable`] | Clonable handle to a stream and the fluent operator surface |
//! | [`Observer`] | Receives `next`, `error` and `complete` |
//! | [`Subscription`] | Idempotent handle that detaches an observer |
//! | [`Subject`] | Observer and observable at once, for multicasting |
//! | [`Scheduler`] | Decides when queued and recursive work runs |
//!
//! ## Feature flags
//!
//! - **`tokio-scheduler`**: [`TokioLocalScheduler`](scheduler::TokioLocalScheduler),
//!   which runs work as tasks on a tokio `LocalSet`.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;

pub use crate::scheduler::{Duration, Instant};
