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
//! In cases where we have no idea what the distribution of the test statistic is, we
//! still want to be able to perform hypothesis tests, and we are willing to make the
//! hypothesis that the sample we have is representative of the population.
//!
//! The idea is to generate a large number of datasets from the null distribution
//! (the distribution the data would have if H0 were true) and compute the test
//! statistic for each of them. This gives the sampling distribution of the test
//! statistic under H0:
//! - for a point null on a numeric variable (`mu`, `med`), the data is shifted to
//!   the hypothesized value and bootstrapped,
//! - for a point null on a proportion (`p`), outcomes are drawn with the
//!   hypothesized probability,
//! - for an independence null, the explanatory variable is permuted.
//!
//! We can then compute the p-value by counting the number of times the sampled test
//! statistic is more 'extreme' than the test statistic of the observed data.
//!
//! The grammar is `specify -> hypothesize -> generate -> calculate -> get_p_value`.
//! Each verb is a function over immutable values; [`Specified`], [`Hypothesized`]
//! and [`HypothesisTest`] chain them.
//!
//! Random state is explicit: replicate `i` is drawn from a generator derived from the
//! seed and `i`, so the null distribution is reproducible bit for bit even though
//! replicates are drawn in parallel.
//!
//! # References
//! - [Bootstrap Hypothesis Testing][bootstrap-ht]
//!
//! [bootstrap-ht]: https://en.wikipedia.org/wiki/Bootstrapping_(statistics)#Bootstrap_hypothesis_testing
//! - [Permutation test](https://en.wikipedia.org/wiki/Permutation_test)
//! - [P-value](https://en.wikipedia.org/wiki/P-value)
//!
//! # Example
//!
//! Is the average departure delay 10 minutes?
//!
//! ```rust
//! use infer_ht::prelude::*;
//! use rand::prelude::Distribution;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rand_distr::Normal;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let dep_delay = Normal::new(12.0, 5.0)
//!     .unwrap()
//!     .sample_iter(&mut rng)
//!     .take(500)
//!     .collect::<Vec<f64>>();
//! let flights = Sample::builder()
//!     .numeric("dep_delay", dep_delay)
//!     .build()
//!     .unwrap();
//!
//! let data = specify(&flights, "dep_delay", None, None).unwrap();
//! let observed = calculate(&data, StatKind::Mean, &StatParams::new()).unwrap();
//!
//! let null = generate(&data, &NullModel::Point(PointNull::Mu(10.0)), 1_000, 42)
//!     .unwrap()
//!     .calculate(StatKind::Mean, &StatParams::new())
//!     .unwrap();
//!
//! let result = get_p_value(&null, &observed, Direction::TwoSided).unwrap();
//! assert_eq!(result.p_value, 0.0);
//! // p_value is small enough to reject the null hypothesis that the mean is 10
//! ```
//!
//! Are morning flights as frequent in summer as in winter?
//!
//! ```rust
//! use infer_ht::prelude::*;
//!
//! let season = ["summer", "summer", "summer", "summer", "winter", "winter", "winter", "winter"];
//! let day_hour = [
//!     "morning", "morning", "morning", "not morning",
//!     "morning", "not morning", "not morning", "not morning",
//! ];
//! let flights = Sample::builder()
//!     .categorical("season", &season)
//!     .categorical("day_hour", &day_hour)
//!     .build()
//!     .unwrap();
//!
//! let hypothesized = Specified::new(&flights, "day_hour", Some("season"), Some("morning"))
//!     .unwrap()
//!     .hypothesize(NullModel::Independence)
//!     .unwrap();
//!
//! let outcome = HypothesisTest::new(StatKind::DiffInProps)
//!     .with_order("summer", "winter")
//!     .with_config(TestConfig::default().with_direction(Direction::Greater))
//!     .run(&hypothesized)
//!     .unwrap();
//! assert_eq!(outcome.observed.value, 0.5);
//! assert!(outcome.result.p_value > 0.05);
//! // too few flights to reject the null hypothesis of independence
//! ```

pub use crate::ci::{get_confidence_interval, ConfidenceInterval};
pub use crate::generate::{
    bootstrap, bootstrap_distribution, generate, null_distribution, NullDistribution, Replicates,
};
pub use crate::null_model::{NullModel, PointNull};
pub use crate::pipeline::{
    Generated, HypothesisTest, Hypothesized, Specified, TestConfig, TestOutcome,
};
pub use crate::pvalue::{get_p_value, p_value, Direction, TestResult};
pub use crate::sample::{Categorical, Column, FieldType, Sample, SampleBuilder};
pub use crate::specify::{specify, WorkingDataset};
pub use crate::stat::{calculate, StatKind, StatParams, Statistic};
pub use crate::Error;
