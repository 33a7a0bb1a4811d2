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

//! Null distribution benchmark
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use infer_ht::prelude::*;
use rand::prelude::Distribution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

const REPETITIONS: usize = 10_000;

fn point_null_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_null_mean");
    for size in [10, 100, 200, 500, 1000] {
        let mut rng = ChaCha8Rng::seed_from_u64(123);

        // dep_delay: `size` values with mean 12 and standard deviation 5
        let normal = Normal::new(12.0, 5.0).unwrap();
        let dep_delay = normal
            .sample_iter(&mut rng)
            .take(size)
            .collect::<Vec<f64>>();
        let sample = Sample::builder()
            .numeric("dep_delay", dep_delay)
            .build()
            .unwrap();
        let data = specify(&sample, "dep_delay", None, None).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            let model = NullModel::Point(PointNull::Mu(10.0));
            b.iter(|| {
                null_distribution(
                    data,
                    &model,
                    StatKind::Mean,
                    &StatParams::new(),
                    REPETITIONS,
                    42,
                )
            })
        });
    }
    group.finish();
}

fn independence_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("independence_diff_in_props");
    for size in [10, 100, 200, 500, 1000] {
        let season = (0..size)
            .map(|i| if i % 2 == 0 { "summer" } else { "winter" })
            .collect::<Vec<_>>();
        let day_hour = (0..size)
            .map(|i| if i % 3 == 0 { "morning" } else { "not morning" })
            .collect::<Vec<_>>();
        let sample = Sample::builder()
            .categorical("season", &season)
            .categorical("day_hour", &day_hour)
            .build()
            .unwrap();
        let data = specify(&sample, "day_hour", Some("season"), Some("morning")).unwrap();
        let params = StatParams::new().with_order("summer", "winter");

        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                null_distribution(
                    data,
                    &NullModel::Independence,
                    StatKind::DiffInProps,
                    &params,
                    REPETITIONS,
                    42,
                )
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(20));
    targets = point_null_benchmark, independence_benchmark
}
criterion_main!(benches);
