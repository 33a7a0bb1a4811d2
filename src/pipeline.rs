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

//! Typed stages of the `specify -> hypothesize -> generate -> calculate` grammar.
//!
//! Each stage is only reachable from a validated previous one: a [`Hypothesized`]
//! always holds a null model that applies to its working dataset, and a
//! [`Generated`] always holds at least one replicate.

use tracing::{debug, instrument};

use crate::generate::{self, NullDistribution, Replicates};
use crate::null_model::{NullModel, PointNull, Simulator};
use crate::pvalue::{get_p_value, Direction, TestResult};
use crate::sample::Sample;
use crate::specify::{specify, WorkingDataset};
use crate::stat::{calculate, StatKind, StatParams, Statistic};
use crate::Error;

/// A validated working dataset.
#[derive(Debug, Clone)]
pub struct Specified {
    data: WorkingDataset,
}

impl Specified {
    /// See [`specify`].
    pub fn new(
        sample: &Sample,
        response: &str,
        explanatory: Option<&str>,
        success: Option<&str>,
    ) -> Result<Self, Error> {
        Ok(Self {
            data: specify(sample, response, explanatory, success)?,
        })
    }

    /// The working dataset.
    pub fn data(&self) -> &WorkingDataset {
        &self.data
    }

    /// Statistic of the observed data.
    pub fn calculate(&self, kind: StatKind, params: &StatParams) -> Result<Statistic, Error> {
        calculate(&self.data, kind, params)
    }

    /// Bootstrap the observed records `reps` times, with no null hypothesis.
    pub fn generate(&self, reps: usize, seed: u64) -> Result<Generated, Error> {
        Ok(Generated {
            replicates: generate::bootstrap(&self.data, reps, seed)?,
        })
    }

    /// Bootstrap distribution of the `kind` statistic over `reps` resamples, e.g. for
    /// [`get_confidence_interval`](crate::ci::get_confidence_interval).
    pub fn bootstrap_distribution(
        &self,
        kind: StatKind,
        params: &StatParams,
        reps: usize,
        seed: u64,
    ) -> Result<NullDistribution, Error> {
        generate::bootstrap_distribution(&self.data, kind, params, reps, seed)
    }

    /// Attach a null hypothesis.
    ///
    /// # Errors
    ///
    /// [`Error::ModelMismatch`] (or the model's parameter errors) when `model` does
    /// not apply to the working dataset.
    pub fn hypothesize(self, model: NullModel) -> Result<Hypothesized, Error> {
        Simulator::new(&self.data, &model)?;
        Ok(Hypothesized {
            data: self.data,
            model,
        })
    }
}

impl From<WorkingDataset> for Specified {
    fn from(data: WorkingDataset) -> Self {
        Self { data }
    }
}

/// `params` completed with what the null model implies: the hypothesized mean of
/// a `mu` point null is the default `mu` of the `t` statistic.
fn implied_params(model: Option<&NullModel>, kind: StatKind, params: &StatParams) -> StatParams {
    let mut params = params.clone();
    if let (StatKind::T, None, Some(NullModel::Point(PointNull::Mu(mu)))) =
        (kind, params.mu, model)
    {
        params.mu = Some(*mu);
    }
    params
}

/// A working dataset with a null hypothesis that applies to it.
#[derive(Debug, Clone)]
pub struct Hypothesized {
    data: WorkingDataset,
    model: NullModel,
}

impl Hypothesized {
    /// The working dataset.
    pub fn data(&self) -> &WorkingDataset {
        &self.data
    }

    /// The null hypothesis.
    pub fn model(&self) -> &NullModel {
        &self.model
    }

    /// Statistic of the observed data, with parameters implied by the null model.
    pub fn calculate(&self, kind: StatKind, params: &StatParams) -> Result<Statistic, Error> {
        calculate(&self.data, kind, &implied_params(Some(&self.model), kind, params))
    }

    /// Draw `reps` replicates under the null hypothesis.
    pub fn generate(&self, reps: usize, seed: u64) -> Result<Generated, Error> {
        Ok(Generated {
            replicates: generate::generate(&self.data, &self.model, reps, seed)?,
        })
    }

    /// Null distribution of the `kind` statistic over `reps` replicates.
    pub fn null_distribution(
        &self,
        kind: StatKind,
        params: &StatParams,
        reps: usize,
        seed: u64,
    ) -> Result<NullDistribution, Error> {
        generate::null_distribution(
            &self.data,
            &self.model,
            kind,
            &implied_params(Some(&self.model), kind, params),
            reps,
            seed,
        )
    }
}

/// Replicates drawn under a null hypothesis, or bootstrap resamples of the
/// observed records.
#[derive(Debug, Clone)]
pub struct Generated {
    replicates: Replicates,
}

impl Generated {
    /// The replicates.
    pub fn replicates(&self) -> &Replicates {
        &self.replicates
    }

    /// Distribution of the `kind` statistic, with parameters implied by the null
    /// model if any.
    pub fn calculate(
        &self,
        kind: StatKind,
        params: &StatParams,
    ) -> Result<NullDistribution, Error> {
        let params = implied_params(self.replicates.model(), kind, params);
        self.replicates.calculate(kind, &params)
    }
}

/// Knobs of a [`HypothesisTest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestConfig {
    /// number of replicates
    pub reps: usize,
    /// base seed of the replicates' random state
    pub seed: u64,
    /// tail(s) of the p-value
    pub direction: Direction,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            reps: 1_000,
            seed: 42,
            direction: Direction::TwoSided,
        }
    }
}

impl TestConfig {
    /// Set the number of replicates.
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Everything a test produces, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    /// statistic of the observed data
    pub observed: Statistic,
    /// statistic over the replicates
    pub null_distribution: NullDistribution,
    /// p-value
    pub result: TestResult,
}

/// A complete test: statistic, its parameters and the resampling configuration.
#[derive(Debug, Clone)]
pub struct HypothesisTest {
    kind: StatKind,
    params: StatParams,
    config: TestConfig,
}

impl HypothesisTest {
    /// Test on the `kind` statistic with the default [`TestConfig`].
    pub fn new(kind: StatKind) -> Self {
        Self {
            kind,
            params: StatParams::default(),
            config: TestConfig::default(),
        }
    }

    /// Set the statistic's parameters.
    pub fn with_params(mut self, params: StatParams) -> Self {
        self.params = params;
        self
    }

    /// Set the order of the explanatory levels.
    pub fn with_order(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.params = self.params.with_order(first, second);
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: TestConfig) -> Self {
        self.config = config;
        self
    }

    /// Compute the observed statistic, its null distribution and the p-value.
    ///
    /// The observed statistic is computed first so that its errors surface before any
    /// replicate is drawn.
    #[instrument(
        skip(self, hypothesized),
        fields(stat = %self.kind, model = %hypothesized.model())
    )]
    pub fn run(&self, hypothesized: &Hypothesized) -> Result<TestOutcome, Error> {
        let observed = hypothesized.calculate(self.kind, &self.params)?;
        let null_distribution = hypothesized.null_distribution(
            self.kind,
            &self.params,
            self.config.reps,
            self.config.seed,
        )?;
        let result = get_p_value(&null_distribution, &observed, self.config.direction)?;
        debug!(
            observed = observed.value,
            p_value = result.p_value,
            direction = %result.direction,
            "test completed"
        );

        Ok(TestOutcome {
            observed,
            null_distribution,
            result,
        })
    }
}
