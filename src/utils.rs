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

//! Small numeric helpers shared by the calculator, the generator and the reducers.

use num_traits::Float;

/// Arithmetic mean, `None` on an empty slice.
pub fn mean<F: Float + std::iter::Sum>(xs: &[F]) -> Option<F> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().copied().sum::<F>() / F::from(xs.len())?)
}

/// Sample standard deviation (n - 1 denominator), `None` when `xs.len() < 2`.
pub fn sample_sd<F: Float + std::iter::Sum>(xs: &[F]) -> Option<F> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let ss = xs.iter().map(|&x| (x - m) * (x - m)).sum::<F>();
    Some((ss / F::from(xs.len() - 1)?).sqrt())
}

/// Median: middle value, or the average of the two middle values for even
/// lengths. `None` on an empty slice.
pub fn median<F: Float>(xs: &[F]) -> Option<F> {
    if xs.is_empty() {
        return None;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / F::from(2.)?)
    }
}

/// Quantile with linear interpolation between order statistics of `sorted`
/// (R's type 7). `sorted` must be non-empty and ascending; `q` in [0, 1].
pub fn quantile_sorted<F: Float>(sorted: &[F], q: F) -> Option<F> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = F::from(n - 1)? * q;
    let lo = h.floor();
    let lo_idx = lo.to_usize()?.min(n - 1);
    let hi_idx = (lo_idx + 1).min(n - 1);
    Some(sorted[lo_idx] + (h - lo) * (sorted[hi_idx] - sorted[lo_idx]))
}
