//! Operators.
//!
//! An operator is split into a stateless blueprint and the state of one run.
//! [`OperatorFactory`] is the blueprint: `lift` stores it and asks it for a
//! fresh [`Operator`] each time the lifted instance starts. The operator is
//! consumed by [`Operator::call`], which wires the source to the downstream
//! emitter and returns what must be disposed to stop the run.
//!
//! Any `Fn() -> Op` closure is a factory, so every fluent method below is a
//! thin `lift(move || SomeOp { .. })`.

pub mod as_observable;
pub mod concat;
pub mod distinct_until_changed;
pub mod filter;
pub mod flat_map;
pub mod group_by;
pub mod map;
pub mod merge;
pub mod merge_all;
pub mod publish;
pub mod reduce;
pub mod retry;
pub mod scan;
pub mod skip;
pub mod skip_last;
pub mod skip_until;
pub mod take;
pub mod tap;
pub mod to_array;
pub mod zip;

use crate::{
  observable::{Emitter, Observable},
  scheduler::SchedulerRef,
  subscription::BoxedSubscription,
};

/// One run of an operator.
pub trait Operator<In, InErr> {
  type Item;
  type Err;

  fn call(
    self, source: &Observable<In, InErr>, downstream: Emitter<Self::Item, Self::Err>,
    scheduler: &SchedulerRef,
  ) -> BoxedSubscription;
}

/// Makes a fresh [`Operator`] for every run.
pub trait OperatorFactory<In, InErr> {
  type Op: Operator<In, InErr>;

  fn create(&self) -> Self::Op;
}

impl<F, Op, In, InErr> OperatorFactory<In, InErr> for F
where
  F: Fn() -> Op,
  Op: Operator<In, InErr>,
{
  type Op = Op;

  #[inline]
  fn create(&self) -> Op { self() }
}
