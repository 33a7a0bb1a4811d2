// Copyright (c) 2022. Sebastien Soudan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http:www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resampling-based Hypothesis Testing
//!
//! Check the [`prelude`] module for the public API.
use thiserror::Error;

/// The prelude module re-exports the most commonly used types and traits.
/// This is the public API. Enjoy!
pub mod prelude;

#[cfg(any(feature = "unstable", test))]
/// unstable sample API
pub mod sample;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod sample;

#[cfg(any(feature = "unstable", test))]
/// unstable specification API
pub mod specify;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod specify;

#[cfg(any(feature = "unstable", test))]
/// unstable statistic calculator API
pub mod stat;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod stat;

#[cfg(any(feature = "unstable", test))]
/// unstable null model API
pub mod null_model;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod null_model;

#[cfg(any(feature = "unstable", test))]
/// unstable generator API
pub mod generate;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod generate;

#[cfg(any(feature = "unstable", test))]
/// unstable p-value API
pub mod pvalue;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod pvalue;

#[cfg(any(feature = "unstable", test))]
/// unstable confidence interval API
pub mod ci;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod ci;

#[cfg(any(feature = "unstable", test))]
/// unstable pipeline API
pub mod pipeline;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod pipeline;

#[cfg(any(feature = "unstable", test))]
/// unstable utils API
pub mod utils;

#[cfg(not(any(feature = "unstable", test)))]
pub(crate) mod utils;

use stat::StatKind;

/// The error type for this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The sample violates its schema (ragged columns, duplicate names, missing
    /// values, unknown levels).
    #[error("Invalid sample: {0}")]
    InvalidSample(String),
    /// The requested fields or success level do not fit the sample.
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),
    /// The statistic needs a parameter that was not supplied.
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),
    /// No (or no valid) success level for a categorical response.
    #[error("Invalid success level: {0}")]
    InvalidSuccessLevel(String),
    /// `order` does not name exactly the two levels of the explanatory variable.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    /// The statistic is undefined on this data (empty group, zero variance, ...).
    #[error("Degenerate statistic: {0}")]
    DegenerateStatistic(String),
    /// The statistic cannot be computed on this kind of working dataset.
    #[error("Statistic `{stat}` is incompatible with the data: {reason}")]
    IncompatibleStatistic {
        /// requested statistic
        stat: StatKind,
        /// why it does not apply
        reason: String,
    },
    /// The number of replicates must be positive.
    #[error("Invalid number of replicates: {0}")]
    InvalidReps(usize),
    /// The null model does not apply to the shape of the working dataset.
    #[error("Null model mismatch: {0}")]
    ModelMismatch(String),
    /// A hypothesized value is out of its domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Observed statistic and null distribution are of different kinds.
    #[error("Kind mismatch: null distribution of `{expected}`, observed `{found}`")]
    KindMismatch {
        /// kind of the null distribution
        expected: StatKind,
        /// kind of the observed statistic
        found: StatKind,
    },
    /// A distribution with no values: p-values and intervals are undefined.
    #[error("Empty distribution")]
    EmptyDistribution,
    /// Confidence level must be in (0, 1).
    #[error("Invalid confidence level: {0}")]
    InvalidConfidenceLevel(f64),
    /// Unrecognized statistic name.
    #[error("Unknown statistic: {0}")]
    UnknownStatKind(String),
    /// Unrecognized p-value direction.
    #[error("Unknown direction: {0}")]
    UnknownDirection(String),
}
