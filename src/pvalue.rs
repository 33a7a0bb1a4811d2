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

use num_traits::Float;
use tracing::warn;

use crate::generate::NullDistribution;
use crate::stat::Statistic;
use crate::Error;

/// Part of the statistic distribution to use for the p-value
/// https://en.wikipedia.org/wiki/P-value#Probability_of_obtaining_a_real-valued_test_statistic_at_least_as_extreme_as_the_one_actually_obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One-sided test (left tail)
    /// Pr(T <= t | H0)
    Less,
    /// One-sided test (right tail)
    /// Pr(T >= t | H0)
    Greater,
    /// Two-sided test
    /// min(1, 2 * min(Pr(T >= t | H0), Pr(T <= t | H0)))
    TwoSided,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Less => "less",
            Direction::Greater => "greater",
            Direction::TwoSided => "two_sided",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "less" | "left" => Ok(Direction::Less),
            "greater" | "right" => Ok(Direction::Greater),
            "two_sided" | "two-sided" | "two sided" | "both" => Ok(Direction::TwoSided),
            _ => Err(Error::UnknownDirection(s.to_string())),
        }
    }
}

/// Outcome of comparing an observed statistic to its null distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    /// in [0, 1]
    pub p_value: f64,
    /// tail(s) the p-value was computed on
    pub direction: Direction,
    /// number of null values at least as extreme as the observed statistic (on the
    /// smaller tail for a two-sided test)
    pub count: usize,
    /// size of the null distribution
    pub reps: usize,
}

/// Count the values on each side of `observed`: `(#{x <= observed}, #{x >= observed})`.
fn tail_counts<F: Float>(values: &[F], observed: F) -> (usize, usize) {
    values.iter().fold((0, 0), |(le, ge), &x| {
        (le + usize::from(x <= observed), ge + usize::from(x >= observed))
    })
}

/// p-value of `observed` against the sampled `values` of the statistic under H0,
/// along with the count it is made of. `None` when `values` is empty.
pub fn p_value<F: Float>(
    values: &[F],
    observed: F,
    direction: Direction,
) -> Option<(F, usize)> {
    if values.is_empty() {
        return None;
    }
    let rep = F::from(values.len())?;
    let (left, right) = tail_counts(values, observed);

    let (p, count) = match direction {
        Direction::Less => (F::from(left)? / rep, left),
        Direction::Greater => (F::from(right)? / rep, right),
        Direction::TwoSided => {
            let min = left.min(right);
            let p = F::from(2.)? * F::from(min)? / rep;
            (p.min(F::one()), min)
        }
    };
    Some((p, count))
}

/// Compare `observed` to `null`.
///
/// # Errors
///
/// [`Error::KindMismatch`] when `observed` is not the statistic `null` is made of,
/// [`Error::EmptyDistribution`] on an empty null distribution.
pub fn get_p_value(
    null: &NullDistribution,
    observed: &Statistic,
    direction: Direction,
) -> Result<TestResult, Error> {
    if null.kind() != observed.kind {
        return Err(Error::KindMismatch {
            expected: null.kind(),
            found: observed.kind,
        });
    }

    let (p_value, count) =
        p_value(null.values(), observed.value, direction).ok_or(Error::EmptyDistribution)?;
    if p_value == 0. {
        warn!(
            reps = null.len(),
            "p-value of 0: the true p-value is smaller than 1/{}, \
             use more replicates for a closer estimate",
            null.len()
        );
    }

    Ok(TestResult {
        p_value,
        direction,
        count,
        reps: null.len(),
    })
}
