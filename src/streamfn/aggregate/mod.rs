//! Incremental aggregation: the accumulator protocol and its built-in
//! implementations.
//!
//! The protocol itself is the [`AggregateFunction`] trait in
//! [`crate::streamfn::function`]. This module provides the concrete
//! accumulators:
//!
//! - [`basic`] - COUNT, SUM, AVG, MIN, MAX
//! - [`stats`] - Welford-based streaming variance/standard deviation, plus
//!   the buffered median/percentile exception

pub mod basic;
pub mod stats;

pub use basic::{AvgAccumulator, CountAccumulator, MaxAccumulator, MinAccumulator, SumAccumulator};
pub use stats::{PercentileAccumulator, WelfordAccumulator, WelfordState};
