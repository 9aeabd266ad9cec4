//! # cs-core
//!
//! Core types and traits for ChainSummary.
//!
//! This crate hosts the pieces every other crate depends on:
//! - the error type and `Result` alias
//! - summary data types (`Bound`, `SummaryStatistic`, `MaxPosterior`)
//! - capability traits (`KdeEstimator`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::KdeEstimator;
pub use types::{Bound, MaxPosterior, SummaryStatistic};
