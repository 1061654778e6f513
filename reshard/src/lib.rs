//! Live progress monitoring for shard rebalancing runs.
//!
//! The [`monitor::Monitor`] polls a [`source::MetricsSource`] for per-shard
//! migration counters, folds them into cluster-wide totals through the
//! [`progress::tracker::ProgressTracker`], and keeps a continuously redrawn
//! progress report flowing to a [`sink::RenderSink`] until the migration is
//! observed to finish.

pub mod concurrency;
pub mod error;
pub mod lifecycle;
pub mod monitor;
pub mod progress;
pub mod sink;
pub mod source;
