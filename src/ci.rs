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

use crate::generate::NullDistribution;
use crate::utils::quantile_sorted;
use crate::Error;

/// Percentile interval of a distribution of statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    /// lower bound
    pub lower: f64,
    /// upper bound
    pub upper: f64,
    /// confidence level, in (0, 1)
    pub level: f64,
}

/// Central `level` percentile interval of `distribution`: the `(1 - level) / 2` and
/// `(1 + level) / 2` quantiles.
///
/// # Errors
///
/// [`Error::InvalidConfidenceLevel`] unless `0 < level < 1`, [`Error::EmptyDistribution`]
/// on an empty distribution.
pub fn get_confidence_interval(
    distribution: &NullDistribution,
    level: f64,
) -> Result<ConfidenceInterval, Error> {
    if !(level > 0. && level < 1.) {
        return Err(Error::InvalidConfidenceLevel(level));
    }

    let mut sorted = distribution.values().to_vec();
    sorted.sort_by(f64::total_cmp);

    let alpha = (1. - level) / 2.;
    let lower = quantile_sorted(&sorted, alpha).ok_or(Error::EmptyDistribution)?;
    let upper = quantile_sorted(&sorted, 1. - alpha).ok_or(Error::EmptyDistribution)?;

    Ok(ConfidenceInterval {
        lower,
        upper,
        level,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::stat::StatKind;

    #[test]
    fn test_percentile_interval() {
        let values = (0..=100).rev().map(f64::from).collect();
        let d = NullDistribution::new(StatKind::Mean, values);
        let ci = get_confidence_interval(&d, 0.9).unwrap();
        assert_relative_eq!(ci.lower, 5.0, epsilon = 1e-9);
        assert_relative_eq!(ci.upper, 95.0, epsilon = 1e-9);
        assert_eq!(ci.level, 0.9);
    }

    #[test]
    fn test_invalid() {
        let d = NullDistribution::new(StatKind::Mean, vec![1.0]);
        for level in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                get_confidence_interval(&d, level),
                Err(Error::InvalidConfidenceLevel(_))
            ));
        }
        assert_eq!(
            get_confidence_interval(&NullDistribution::new(StatKind::Mean, vec![]), 0.95),
            Err(Error::EmptyDistribution)
        );
    }
}
