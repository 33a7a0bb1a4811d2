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

use std::fmt;
use std::str::FromStr;

use crate::sample::{Categorical, Column};
use crate::specify::WorkingDataset;
use crate::utils::{mean, median, sample_sd};
use crate::Error;

/// The statistics this crate knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// arithmetic mean of a numeric response
    Mean,
    /// standardized mean: (mean - mu) / (sd / sqrt(n))
    T,
    /// median of a numeric response
    Median,
    /// proportion of successes of a categorical response
    Prop,
    /// difference of the proportions of successes between the two levels of the
    /// explanatory variable
    DiffInProps,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKind::Mean => "mean",
            StatKind::T => "t",
            StatKind::Median => "median",
            StatKind::Prop => "prop",
            StatKind::DiffInProps => "diff in props",
        };
        f.write_str(name)
    }
}

impl FromStr for StatKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(StatKind::Mean),
            "t" => Ok(StatKind::T),
            "median" => Ok(StatKind::Median),
            "prop" => Ok(StatKind::Prop),
            "diff in props" => Ok(StatKind::DiffInProps),
            _ => Err(Error::UnknownStatKind(s.to_string())),
        }
    }
}

/// Extra inputs some statistics need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatParams {
    /// hypothesized mean, required by [`StatKind::T`]
    pub mu: Option<f64>,
    /// levels of the explanatory variable, required by [`StatKind::DiffInProps`]:
    /// the statistic is `prop(order.0) - prop(order.1)`
    pub order: Option<(String, String)>,
}

impl StatParams {
    /// No parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hypothesized mean.
    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = Some(mu);
        self
    }

    /// Set the order of the explanatory levels.
    pub fn with_order(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.order = Some((first.into(), second.into()));
        self
    }
}

/// A computed statistic, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistic {
    /// which statistic
    pub kind: StatKind,
    /// its value
    pub value: f64,
}

/// Compute the `kind` statistic of `data`.
///
/// # Errors
///
/// - [`Error::MissingParameter`] for `t` without `mu`,
/// - [`Error::InvalidSuccessLevel`] for `prop`/`diff in props` without a success
///   level,
/// - [`Error::InvalidOrder`] for `diff in props` without an `order` made of the two
///   levels of the explanatory variable,
/// - [`Error::IncompatibleStatistic`] when the statistic does not apply to the
///   response/explanatory types,
/// - [`Error::DegenerateStatistic`] on empty data, empty groups or zero variance.
pub fn calculate(
    data: &WorkingDataset,
    kind: StatKind,
    params: &StatParams,
) -> Result<Statistic, Error> {
    let calculator = Calculator::new(data, kind, params)?;
    Ok(Statistic {
        kind,
        value: calculator.score(data)?,
    })
}

/// A statistic whose parameters have been checked against the shape of a working
/// dataset, ready to score that dataset and its replicates.
#[derive(Debug, Clone)]
pub(crate) enum Calculator {
    Mean,
    T { mu: f64 },
    Median,
    Prop { success: u32 },
    DiffInProps { success: u32, first: u32, second: u32 },
}

impl Calculator {
    pub(crate) fn new(
        data: &WorkingDataset,
        kind: StatKind,
        params: &StatParams,
    ) -> Result<Self, Error> {
        let incompatible = |reason: &str| Error::IncompatibleStatistic {
            stat: kind,
            reason: reason.to_string(),
        };

        match kind {
            StatKind::Mean | StatKind::T | StatKind::Median => {
                if !matches!(data.response(), Column::Numeric(_)) {
                    return Err(incompatible("the response must be numeric"));
                }
                if data.is_two_variable() {
                    return Err(incompatible("expects a single variable"));
                }
                match kind {
                    StatKind::Mean => Ok(Calculator::Mean),
                    StatKind::Median => Ok(Calculator::Median),
                    _ => {
                        let mu = params.mu.ok_or(Error::MissingParameter("mu"))?;
                        if !mu.is_finite() {
                            return Err(Error::InvalidParameter(format!("mu = {mu}")));
                        }
                        Ok(Calculator::T { mu })
                    }
                }
            }
            StatKind::Prop => {
                if !matches!(data.response(), Column::Categorical(_)) {
                    return Err(incompatible("the response must be categorical"));
                }
                if data.is_two_variable() {
                    return Err(incompatible("expects a single variable"));
                }
                Ok(Calculator::Prop {
                    success: success_of(data)?,
                })
            }
            StatKind::DiffInProps => {
                if !matches!(data.response(), Column::Categorical(_)) {
                    return Err(incompatible("the response must be categorical"));
                }
                let explanatory = data
                    .explanatory()
                    .ok_or_else(|| incompatible("expects an explanatory variable"))?;
                let success = success_of(data)?;
                let (first, second) = resolve_order(explanatory, params.order.as_ref())?;
                Ok(Calculator::DiffInProps {
                    success,
                    first,
                    second,
                })
            }
        }
    }

    /// Score `data`, which must have the shape this calculator was built for.
    pub(crate) fn score(&self, data: &WorkingDataset) -> Result<f64, Error> {
        let degenerate = |what: &str| Error::DegenerateStatistic(what.to_string());

        let value = match (self, data.response()) {
            (Calculator::Mean, Column::Numeric(xs)) => {
                mean(xs).ok_or_else(|| degenerate("mean of an empty response"))?
            }
            (Calculator::Median, Column::Numeric(xs)) => {
                median(xs).ok_or_else(|| degenerate("median of an empty response"))?
            }
            (Calculator::T { mu }, Column::Numeric(xs)) => {
                let sd = sample_sd(xs)
                    .ok_or_else(|| degenerate("t needs at least 2 records"))?;
                // rounding leaves a tiny non-zero sd on constant data
                if sd == 0. || xs.iter().all(|&x| x == xs[0]) {
                    return Err(degenerate("t of a response with zero variance"));
                }
                let m = mean(xs).ok_or_else(|| degenerate("mean of an empty response"))?;
                (m - mu) / (sd / (xs.len() as f64).sqrt())
            }
            (Calculator::Prop { success }, Column::Categorical(c)) => {
                if c.is_empty() {
                    return Err(degenerate("proportion of an empty response"));
                }
                let hits = c.codes().iter().filter(|&&code| code == *success).count();
                hits as f64 / c.len() as f64
            }
            (
                Calculator::DiffInProps {
                    success,
                    first,
                    second,
                },
                Column::Categorical(c),
            ) => {
                let explanatory = data
                    .explanatory()
                    .ok_or_else(|| degenerate("missing explanatory variable"))?;
                // (records, successes) per level of the explanatory variable
                let mut first_counts = (0usize, 0usize);
                let mut second_counts = (0usize, 0usize);
                for (&group, &response) in explanatory.codes().iter().zip(c.codes()) {
                    let counts = if group == *first {
                        &mut first_counts
                    } else if group == *second {
                        &mut second_counts
                    } else {
                        continue;
                    };
                    counts.0 += 1;
                    if response == *success {
                        counts.1 += 1;
                    }
                }
                if first_counts.0 == 0 || second_counts.0 == 0 {
                    return Err(degenerate("empty group in diff in props"));
                }
                first_counts.1 as f64 / first_counts.0 as f64
                    - second_counts.1 as f64 / second_counts.0 as f64
            }
            _ => return Err(degenerate("response type changed under the calculator")),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(degenerate("non-finite statistic"))
        }
    }
}

fn success_of(data: &WorkingDataset) -> Result<u32, Error> {
    data.success().ok_or_else(|| {
        Error::InvalidSuccessLevel(format!(
            "no success level specified for categorical response `{}`",
            data.response_name()
        ))
    })
}

fn resolve_order(
    explanatory: &Categorical,
    order: Option<&(String, String)>,
) -> Result<(u32, u32), Error> {
    let levels = explanatory.levels();
    let (first, second) = order.ok_or_else(|| {
        Error::InvalidOrder(format!("no order given for the levels {levels:?}"))
    })?;
    if levels.len() != 2 {
        return Err(Error::InvalidOrder(format!(
            "the explanatory variable must have exactly 2 levels, found {levels:?}"
        )));
    }
    match (explanatory.code_of(first), explanatory.code_of(second)) {
        (Some(a), Some(b)) if a != b => Ok((a, b)),
        _ => Err(Error::InvalidOrder(format!(
            "[{first:?}, {second:?}] is not a permutation of {levels:?}"
        ))),
    }
}
