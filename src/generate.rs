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

//! Replicate generation under a null model, and plain bootstrap resampling.
//!
//! Replicates are drawn in parallel. Replicate `i` uses its own
//! [`ChaCha8Rng`] seeded with the base seed and positioned on stream `i`, so the
//! output only depends on `(data, model, reps, seed)` and not on the scheduling of
//! the worker threads.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::null_model::{NullModel, Simulator};
use crate::specify::WorkingDataset;
use crate::stat::{Calculator, StatKind, StatParams};
use crate::utils;
use crate::Error;

/// The values of a statistic over the replicates, in replicate order.
///
/// Replicates drawn under a null model give a null distribution; plain bootstrap
/// resamples give a bootstrap distribution of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NullDistribution {
    kind: StatKind,
    values: Vec<f64>,
}

impl NullDistribution {
    /// Wrap already computed statistic values.
    pub fn new(kind: StatKind, values: Vec<f64>) -> Self {
        Self { kind, values }
    }

    /// Statistic the values are of.
    pub fn kind(&self) -> StatKind {
        self.kind
    }

    /// One value per replicate.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of replicates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No replicates?
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the values, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        utils::mean(&self.values)
    }
}

/// Replicates of a working dataset, drawn under a null model or bootstrapped as is.
#[derive(Debug, Clone)]
pub struct Replicates {
    model: Option<NullModel>,
    replicates: Vec<WorkingDataset>,
}

impl Replicates {
    /// Null model the replicates were drawn under, `None` for a plain bootstrap.
    pub fn model(&self) -> Option<&NullModel> {
        self.model.as_ref()
    }

    /// Number of replicates.
    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    /// No replicates?
    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    /// Replicate datasets, in replicate order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkingDataset> {
        self.replicates.iter()
    }

    /// Score each replicate with the `kind` statistic.
    ///
    /// # Errors
    ///
    /// The statistic's parameter errors, or the error of the first replicate (in
    /// replicate order) whose statistic cannot be computed.
    pub fn calculate(
        &self,
        kind: StatKind,
        params: &StatParams,
    ) -> Result<NullDistribution, Error> {
        let first = self.replicates.first().ok_or(Error::EmptyDistribution)?;
        let calculator = Calculator::new(first, kind, params)?;

        let values = self
            .replicates
            .par_iter()
            .map(|replicate| calculator.score(replicate))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NullDistribution::new(kind, values))
    }
}

/// Random state of replicate `index`.
fn replicate_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

fn check_reps(reps: usize) -> Result<(), Error> {
    if reps == 0 {
        return Err(Error::InvalidReps(reps));
    }
    Ok(())
}

/// Draw `reps` replicates of `data` under `model`.
///
/// # Errors
///
/// [`Error::InvalidReps`] when `reps == 0`, [`Error::ModelMismatch`] when the model
/// does not apply to `data` (plus the parameter errors of
/// [`NullModel`]), all reported before anything is drawn.
#[instrument(skip(data), fields(n = data.len()))]
pub fn generate(
    data: &WorkingDataset,
    model: &NullModel,
    reps: usize,
    seed: u64,
) -> Result<Replicates, Error> {
    check_reps(reps)?;
    let simulator = Simulator::new(data, model)?;

    let replicates = (0..reps)
        .into_par_iter()
        .map(|i| simulator.replicate(&mut replicate_rng(seed, i), data))
        .collect::<Vec<_>>();
    debug!(reps = replicates.len(), "replicates generated");

    Ok(Replicates {
        model: Some(*model),
        replicates,
    })
}

/// Draw `reps` bootstrap resamples of the records of `data`, with no null
/// hypothesis: the distribution of a statistic over them estimates its sampling
/// distribution around the observed value (see
/// [`get_confidence_interval`](crate::ci::get_confidence_interval)).
///
/// # Errors
///
/// [`Error::InvalidReps`] when `reps == 0`.
#[instrument(skip(data), fields(n = data.len()))]
pub fn bootstrap(data: &WorkingDataset, reps: usize, seed: u64) -> Result<Replicates, Error> {
    check_reps(reps)?;

    let replicates = (0..reps)
        .into_par_iter()
        .map(|i| data.resample(&mut replicate_rng(seed, i)))
        .collect::<Vec<_>>();
    debug!(reps = replicates.len(), "bootstrap resamples drawn");

    Ok(Replicates {
        model: None,
        replicates,
    })
}

/// Bootstrap `data` `reps` times and score each resample with the `kind` statistic,
/// without keeping the resamples.
///
/// Gives the same values as [`bootstrap`] followed by [`Replicates::calculate`].
///
/// # Errors
///
/// [`Error::InvalidReps`] and the statistic's parameter errors before anything is
/// drawn, then the error of the first resample whose statistic cannot be computed.
#[instrument(skip(data, params), fields(n = data.len()))]
pub fn bootstrap_distribution(
    data: &WorkingDataset,
    kind: StatKind,
    params: &StatParams,
    reps: usize,
    seed: u64,
) -> Result<NullDistribution, Error> {
    check_reps(reps)?;
    let calculator = Calculator::new(data, kind, params)?;

    let values = (0..reps)
        .into_par_iter()
        .map(|i| calculator.score(&data.resample(&mut replicate_rng(seed, i))))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    debug!(reps = values.len(), "bootstrap distribution computed");

    Ok(NullDistribution::new(kind, values))
}

/// Draw `reps` replicates of `data` under `model` and score each with the `kind`
/// statistic, without keeping the replicates.
///
/// Gives the same values as [`generate`] followed by [`Replicates::calculate`].
///
/// # Errors
///
/// Parameter errors ([`Error::InvalidReps`], [`Error::ModelMismatch`], the
/// statistic's parameter errors) before anything is drawn, then the error of the
/// first replicate whose statistic cannot be computed.
#[instrument(skip(data, params), fields(n = data.len()))]
pub fn null_distribution(
    data: &WorkingDataset,
    model: &NullModel,
    kind: StatKind,
    params: &StatParams,
    reps: usize,
    seed: u64,
) -> Result<NullDistribution, Error> {
    check_reps(reps)?;
    let simulator = Simulator::new(data, model)?;
    let calculator = Calculator::new(data, kind, params)?;

    let values = (0..reps)
        .into_par_iter()
        .map(|i| calculator.score(&simulator.replicate(&mut replicate_rng(seed, i), data)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    debug!(reps = values.len(), "null distribution computed");

    Ok(NullDistribution::new(kind, values))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::prelude::Distribution;
    use rand::SeedableRng;
    use rand_distr::Normal;

    use super::*;
    use crate::ci::get_confidence_interval;
    use crate::null_model::PointNull;
    use crate::sample::{Column, Sample};
    use crate::specify::specify;

    fn normal_delays(mean: f64, n: usize) -> WorkingDataset {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let values = Normal::new(mean, 5.0)
            .unwrap()
            .sample_iter(&mut rng)
            .take(n)
            .collect::<Vec<f64>>();
        let sample = Sample::builder().numeric("dep_delay", values).build().unwrap();
        specify(&sample, "dep_delay", None, None).unwrap()
    }

    fn seasons() -> WorkingDataset {
        let day_hour = (0..200)
            .map(|i| if i % 3 == 0 { "morning" } else { "not morning" })
            .collect::<Vec<_>>();
        let season = (0..200)
            .map(|i| if i % 2 == 0 { "summer" } else { "winter" })
            .collect::<Vec<_>>();
        let sample = Sample::builder()
            .categorical("day_hour", &day_hour)
            .categorical("season", &season)
            .build()
            .unwrap();
        specify(&sample, "day_hour", Some("season"), Some("morning")).unwrap()
    }

    #[test]
    fn test_mean_converges_to_mu() {
        let w = normal_delays(12.0, 200);
        let null = null_distribution(
            &w,
            &NullModel::Point(PointNull::Mu(10.0)),
            StatKind::Mean,
            &StatParams::new(),
            4_000,
            42,
        )
        .unwrap();
        assert_eq!(null.len(), 4_000);
        assert_abs_diff_eq!(null.mean().unwrap(), 10.0, epsilon = 0.05);
    }

    #[test]
    fn test_prop_converges_to_p() {
        let sample = Sample::builder()
            .categorical("origin", &["JFK", "LGA", "LGA", "EWR", "JFK", "LGA"])
            .build()
            .unwrap();
        let w = specify(&sample, "origin", None, Some("JFK")).unwrap();
        let null = null_distribution(
            &w,
            &NullModel::Point(PointNull::P(0.2)),
            StatKind::Prop,
            &StatParams::new(),
            5_000,
            1,
        )
        .unwrap();
        assert_abs_diff_eq!(null.mean().unwrap(), 0.2, epsilon = 0.01);
    }

    #[test]
    fn test_permutation_centered_on_zero() {
        let w = seasons();
        let null = null_distribution(
            &w,
            &NullModel::Independence,
            StatKind::DiffInProps,
            &StatParams::new().with_order("summer", "winter"),
            2_000,
            3,
        )
        .unwrap();
        assert_abs_diff_eq!(null.mean().unwrap(), 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_determinism() {
        let w = normal_delays(0.0, 50);
        let model = NullModel::Point(PointNull::Med(1.0));
        let run = |seed| {
            null_distribution(&w, &model, StatKind::Median, &StatParams::new(), 500, seed)
                .unwrap()
        };

        let a = run(42);
        let b = run(42);
        assert_eq!(a, b);
        assert!(a
            .values()
            .iter()
            .zip(b.values())
            .all(|(x, y)| x.to_bits() == y.to_bits()));
        assert_ne!(a, run(43));
    }

    #[test]
    fn test_generate_then_calculate_matches_fused() {
        let w = seasons();
        let params = StatParams::new().with_order("winter", "summer");

        let replicates = generate(&w, &NullModel::Independence, 100, 11).unwrap();
        assert_eq!(replicates.len(), 100);
        assert!(replicates.iter().all(|r| r.len() == w.len()));

        let two_step = replicates.calculate(StatKind::DiffInProps, &params).unwrap();
        let fused = null_distribution(
            &w,
            &NullModel::Independence,
            StatKind::DiffInProps,
            &params,
            100,
            11,
        )
        .unwrap();
        assert_eq!(two_step, fused);
    }

    #[test]
    fn test_single_replicate() {
        let w = normal_delays(3.0, 10);
        let null = null_distribution(
            &w,
            &NullModel::Point(PointNull::Mu(0.0)),
            StatKind::T,
            &StatParams::new().with_mu(0.0),
            1,
            42,
        )
        .unwrap();
        assert_eq!(null.len(), 1);
        assert!(null.values()[0].is_finite());
    }

    #[test]
    fn test_parameter_errors_come_first() {
        let w = normal_delays(0.0, 10);
        let model = NullModel::Point(PointNull::Mu(0.0));
        assert_eq!(
            generate(&w, &model, 0, 42).unwrap_err(),
            Error::InvalidReps(0)
        );
        assert!(matches!(
            generate(&w, &NullModel::Independence, 10, 42),
            Err(Error::ModelMismatch(_))
        ));
        assert_eq!(
            null_distribution(&w, &model, StatKind::T, &StatParams::new(), 10, 42)
                .unwrap_err(),
            Error::MissingParameter("mu")
        );
    }

    #[test]
    fn test_degenerate_replicate_aborts() {
        // every bootstrap of a two-record response has a 1/2 chance of zero variance
        let sample = Sample::builder()
            .numeric("dep_delay", vec![1.0, 2.0])
            .build()
            .unwrap();
        let w = specify(&sample, "dep_delay", None, None).unwrap();
        let result = null_distribution(
            &w,
            &NullModel::Point(PointNull::Mu(0.0)),
            StatKind::T,
            &StatParams::new().with_mu(0.0),
            100,
            42,
        );
        assert!(matches!(result, Err(Error::DegenerateStatistic(_))));
    }

    #[test]
    fn test_constant_non_integer_replicate_aborts() {
        // a replicate drawing one value 3 times is constant, its rounded sd need not be 0
        let sample = Sample::builder()
            .numeric("dep_delay", vec![0.1, 0.2, 0.4])
            .build()
            .unwrap();
        let w = specify(&sample, "dep_delay", None, None).unwrap();
        let result = null_distribution(
            &w,
            &NullModel::Point(PointNull::Mu(0.0)),
            StatKind::T,
            &StatParams::new().with_mu(0.0),
            200,
            42,
        );
        assert!(matches!(result, Err(Error::DegenerateStatistic(_))));
    }

    #[test]
    fn test_bootstrap_around_observed_mean() {
        let w = normal_delays(12.0, 200);
        let observed = crate::stat::calculate(&w, StatKind::Mean, &StatParams::new()).unwrap();

        let replicates = bootstrap(&w, 1_000, 42).unwrap();
        assert!(replicates.model().is_none());
        assert_eq!(replicates.len(), 1_000);
        let two_step = replicates.calculate(StatKind::Mean, &StatParams::new()).unwrap();

        let fused =
            bootstrap_distribution(&w, StatKind::Mean, &StatParams::new(), 1_000, 42).unwrap();
        assert_eq!(two_step, fused);
        assert_abs_diff_eq!(fused.mean().unwrap(), observed.value, epsilon = 0.05);

        let ci = get_confidence_interval(&fused, 0.95).unwrap();
        assert!(ci.lower < observed.value && observed.value < ci.upper);
        // standard error 5 / sqrt(200) ~ 0.35
        assert!(ci.upper - ci.lower > 0.8 && ci.upper - ci.lower < 2.0);
    }

    #[test]
    fn test_bootstrap_keeps_records_together() {
        let w = seasons();
        let replicates = bootstrap(&w, 20, 5).unwrap();
        let pairs = w
            .explanatory()
            .unwrap()
            .codes()
            .iter()
            .zip(match w.response() {
                Column::Categorical(c) => c.codes(),
                Column::Numeric(_) => panic!("day_hour is categorical"),
            })
            .map(|(&e, &r)| (e, r))
            .collect::<Vec<_>>();
        for r in replicates.iter() {
            let Column::Categorical(response) = r.response() else {
                panic!("day_hour is categorical");
            };
            assert_eq!(r.len(), w.len());
            for (&e, &c) in r.explanatory().unwrap().codes().iter().zip(response.codes()) {
                assert!(pairs.contains(&(e, c)));
            }
        }
        assert_eq!(bootstrap(&w, 0, 5).unwrap_err(), Error::InvalidReps(0));
    }
}
