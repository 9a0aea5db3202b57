//! Everything needed to build and consume streams, in one import.

pub use crate::{
  observable::{
    ConnectableObservable, Emitter, LazyObservable, MulticastObservable, Observable,
    RefCountObservable, Subscribable,
  },
  observer::{BoxedObserver, CallbackObserver, FnMutObserver, Observer},
  ops::{
    group_by::GroupedObservable,
    merge_all::merge_all,
    retry::{RetryLimit, RetryPolicy},
    Operator, OperatorFactory,
  },
  rc::MutRc,
  scheduler::{
    Duration, ImmediateScheduler, Instant, LocalPoolScheduler, Recurse, Scheduler, SchedulerExt,
    SchedulerRef, TaskHandle, TaskState, TestScheduler, TrampolineScheduler,
  },
  subject::{AsyncSubject, BehaviorSubject, ReplayConfig, ReplaySubject, Subject, SubjectLike},
  subscription::{
    BoxedSubscription, DynamicSubscriptions, LocalSubscription, Subscription, SubscriptionGuard,
    SubscriptionWrapper, Teardown,
  },
};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioLocalScheduler;
