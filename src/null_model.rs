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

//! Null hypotheses and how to regenerate data under them.
//!
//! A point null is simulated by moving the data to the hypothesized value and
//! bootstrapping it (numeric responses), or by drawing Bernoulli outcomes with the
//! hypothesized probability (categorical responses). An independence null is
//! simulated by permuting the explanatory variable.

use std::fmt;
use std::sync::Arc;

use rand::distributions::{Bernoulli, Distribution};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::sample::{Categorical, Column};
use crate::specify::WorkingDataset;
use crate::utils::{mean, median};
use crate::Error;

/// A point null hypothesis: the parameter equals the given value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointNull {
    /// population mean
    Mu(f64),
    /// population median
    Med(f64),
    /// population proportion of successes
    P(f64),
}

impl PointNull {
    /// Hypothesized value.
    pub fn value(&self) -> f64 {
        match *self {
            PointNull::Mu(v) | PointNull::Med(v) | PointNull::P(v) => v,
        }
    }

    /// Name of the parameter.
    pub fn parameter_name(&self) -> &'static str {
        match self {
            PointNull::Mu(_) => "mu",
            PointNull::Med(_) => "med",
            PointNull::P(_) => "p",
        }
    }
}

/// The null hypothesis to simulate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NullModel {
    /// a single parameter of a single variable equals a value
    Point(PointNull),
    /// response and explanatory variable are independent
    Independence,
}

impl fmt::Display for NullModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullModel::Point(p) => write!(f, "point({} = {})", p.parameter_name(), p.value()),
            NullModel::Independence => write!(f, "independence"),
        }
    }
}

/// A null model checked against a working dataset, ready to draw replicates of it.
#[derive(Debug, Clone)]
pub(crate) enum Simulator {
    /// bootstrap of values moved to the hypothesized center
    Bootstrap { centered: Vec<f64> },
    /// `n` Bernoulli draws
    Draw {
        n: usize,
        bernoulli: Bernoulli,
        levels: Arc<[String]>,
        success: u32,
        failure: u32,
    },
    /// shuffle of the explanatory codes
    Permute {
        levels: Arc<[String]>,
        codes: Vec<u32>,
    },
}

impl Simulator {
    /// Check `model` against the shape of `data` and precompute what every replicate
    /// shares.
    ///
    /// # Errors
    ///
    /// [`Error::ModelMismatch`] when the model does not apply to `data`,
    /// [`Error::InvalidParameter`] when the hypothesized value is out of its domain,
    /// [`Error::InvalidSuccessLevel`] for a proportion without a success level.
    pub(crate) fn new(data: &WorkingDataset, model: &NullModel) -> Result<Self, Error> {
        let point = match model {
            NullModel::Independence => {
                return match data.explanatory() {
                    Some(explanatory) => Ok(Simulator::Permute {
                        levels: explanatory.shared_levels(),
                        codes: explanatory.codes().to_vec(),
                    }),
                    None => Err(Error::ModelMismatch(
                        "independence needs an explanatory variable".to_string(),
                    )),
                };
            }
            NullModel::Point(point) => point,
        };

        if data.is_two_variable() {
            return Err(Error::ModelMismatch(format!(
                "{model} applies to a single variable, `{}` is explained by `{}`",
                data.response_name(),
                data.explanatory_name().unwrap_or_default()
            )));
        }
        if !point.value().is_finite() {
            return Err(Error::InvalidParameter(format!("{model}")));
        }

        match (point, data.response()) {
            (PointNull::Mu(mu), Column::Numeric(xs)) => {
                let m = mean(xs).ok_or_else(|| empty_response(data))?;
                Ok(Simulator::Bootstrap {
                    centered: xs.iter().map(|x| x - m + mu).collect(),
                })
            }
            (PointNull::Med(med), Column::Numeric(xs)) => {
                let m = median(xs).ok_or_else(|| empty_response(data))?;
                Ok(Simulator::Bootstrap {
                    centered: xs.iter().map(|x| x - m + med).collect(),
                })
            }
            (PointNull::P(p), Column::Categorical(c)) => {
                let success = data.success().ok_or_else(|| {
                    Error::InvalidSuccessLevel(format!(
                        "{model} needs a success level for `{}`",
                        data.response_name()
                    ))
                })?;
                let failure = failure_level(c, success).ok_or_else(|| {
                    Error::ModelMismatch(format!(
                        "`{}` has a single level, no failure outcome to draw",
                        data.response_name()
                    ))
                })?;
                let bernoulli = Bernoulli::new(*p)
                    .map_err(|_| Error::InvalidParameter(format!("{model}: p not in [0, 1]")))?;
                Ok(Simulator::Draw {
                    n: c.len(),
                    bernoulli,
                    levels: c.shared_levels(),
                    success,
                    failure,
                })
            }
            (point, response) => Err(Error::ModelMismatch(format!(
                "`{}` is {}, incompatible with `{}`",
                data.response_name(),
                response.field_type(),
                point.parameter_name()
            ))),
        }
    }

    /// Draw one replicate of `data` under the null.
    pub(crate) fn replicate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        data: &WorkingDataset,
    ) -> WorkingDataset {
        match self {
            Simulator::Bootstrap { centered } => {
                let n = centered.len();
                let resampled = (0..n).map(|_| centered[rng.gen_range(0..n)]).collect();
                data.with_response(Column::Numeric(resampled))
            }
            Simulator::Draw {
                n,
                bernoulli,
                levels,
                success,
                failure,
            } => {
                let codes = (0..*n)
                    .map(|_| {
                        if bernoulli.sample(rng) {
                            *success
                        } else {
                            *failure
                        }
                    })
                    .collect();
                data.with_response(Column::Categorical(Categorical::from_codes(
                    Arc::clone(levels),
                    codes,
                )))
            }
            Simulator::Permute { levels, codes } => {
                let mut codes = codes.clone();
                codes.shuffle(rng);
                data.with_explanatory(Categorical::from_codes(Arc::clone(levels), codes))
            }
        }
    }
}

fn empty_response(data: &WorkingDataset) -> Error {
    Error::DegenerateStatistic(format!(
        "cannot center the empty response `{}`",
        data.response_name()
    ))
}

/// First level that is not `success`.
fn failure_level(c: &Categorical, success: u32) -> Option<u32> {
    (0..c.levels().len() as u32).find(|&code| code != success)
}
