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

//! Immutable tabular samples with typed columns.
//!
//! A [`Sample`] is built once through a [`SampleBuilder`], which enforces the schema
//! invariants (unique field names, equal row counts, no missing numeric values,
//! categorical values drawn from their levels), and is read-only afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::Error;

/// Type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// real-valued
    Numeric,
    /// one of a fixed, finite set of levels
    Categorical,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Numeric => write!(f, "numeric"),
            FieldType::Categorical => write!(f, "categorical"),
        }
    }
}

/// A categorical column: the levels and, per record, the index of its level.
///
/// Levels are shared between clones so replicates of a working dataset do not copy
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    levels: Arc<[String]>,
    codes: Vec<u32>,
}

impl Categorical {
    /// Build a column whose levels are the sorted distinct `values`.
    pub fn new<S: AsRef<str>>(values: &[S]) -> Self {
        let levels = values
            .iter()
            .map(|v| v.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let codes = values
            .iter()
            .map(|v| {
                levels
                    .binary_search_by(|l| l.as_str().cmp(v.as_ref()))
                    .unwrap_or_default() as u32
            })
            .collect();
        Self {
            levels: levels.into(),
            codes,
        }
    }

    /// Build a column with explicit `levels`; every value must be one of them.
    pub fn with_levels<L: AsRef<str>, S: AsRef<str>>(
        levels: &[L],
        values: &[S],
    ) -> Result<Self, Error> {
        let levels = levels
            .iter()
            .map(|l| l.as_ref().to_string())
            .collect::<Vec<_>>();
        if levels.iter().collect::<BTreeSet<_>>().len() != levels.len() {
            return Err(Error::InvalidSample(format!(
                "duplicate levels in {levels:?}"
            )));
        }

        let codes = values
            .iter()
            .map(|v| {
                levels
                    .iter()
                    .position(|l| l == v.as_ref())
                    .map(|i| i as u32)
                    .ok_or_else(|| {
                        Error::InvalidSample(format!(
                            "value `{}` is not one of the levels {levels:?}",
                            v.as_ref()
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            levels: levels.into(),
            codes,
        })
    }

    pub(crate) fn from_codes(levels: Arc<[String]>, codes: Vec<u32>) -> Self {
        Self { levels, codes }
    }

    /// Levels of this column, in code order.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub(crate) fn shared_levels(&self) -> Arc<[String]> {
        Arc::clone(&self.levels)
    }

    /// Level index of each record.
    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    /// Index of `level`, if it is one of the levels.
    pub fn code_of(&self, level: &str) -> Option<u32> {
        self.levels.iter().position(|l| l == level).map(|i| i as u32)
    }

    /// Level of record `i`.
    pub fn value(&self, i: usize) -> Option<&str> {
        self.codes
            .get(i)
            .and_then(|&c| self.levels.get(c as usize))
            .map(String::as_str)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// No records?
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// A typed column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// real values
    Numeric(Vec<f64>),
    /// levels and codes
    Categorical(Categorical),
}

impl Column {
    /// Type of the column.
    pub fn field_type(&self) -> FieldType {
        match self {
            Column::Numeric(_) => FieldType::Numeric,
            Column::Categorical(_) => FieldType::Categorical,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(c) => c.len(),
        }
    }

    /// No records?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An immutable dataset: named, typed columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Sample {
    /// Start building a sample.
    pub fn builder() -> SampleBuilder {
        SampleBuilder::default()
    }

    /// Number of records.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Field names, in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Field names and their types.
    pub fn schema(&self) -> Vec<(&str, FieldType)> {
        self.names
            .iter()
            .zip(&self.columns)
            .map(|(n, c)| (n.as_str(), c.field_type()))
            .collect()
    }

    /// Column named `name`.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }
}

/// Builder for [`Sample`]. Errors are reported by [`SampleBuilder::build`].
#[derive(Debug, Default)]
pub struct SampleBuilder {
    fields: Vec<(String, Result<Column, Error>)>,
}

impl SampleBuilder {
    /// Add a numeric field.
    pub fn numeric(mut self, name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        self.fields
            .push((name.into(), Ok(Column::Numeric(values.into()))));
        self
    }

    /// Add a categorical field whose levels are its sorted distinct values.
    pub fn categorical<S: AsRef<str>>(mut self, name: impl Into<String>, values: &[S]) -> Self {
        self.fields.push((
            name.into(),
            Ok(Column::Categorical(Categorical::new(values))),
        ));
        self
    }

    /// Add a categorical field with explicit levels.
    pub fn categorical_with_levels<L: AsRef<str>, S: AsRef<str>>(
        mut self,
        name: impl Into<String>,
        levels: &[L],
        values: &[S],
    ) -> Self {
        let column = Categorical::with_levels(levels, values).map(Column::Categorical);
        self.fields.push((name.into(), column));
        self
    }

    /// Validate the schema and freeze the sample.
    pub fn build(self) -> Result<Sample, Error> {
        if self.fields.is_empty() {
            return Err(Error::InvalidSample("no fields".to_string()));
        }

        let mut names = Vec::with_capacity(self.fields.len());
        let mut columns = Vec::with_capacity(self.fields.len());
        for (name, column) in self.fields {
            if names.contains(&name) {
                return Err(Error::InvalidSample(format!("duplicate field `{name}`")));
            }
            let column = column?;
            if let Column::Numeric(values) = &column {
                if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                    return Err(Error::InvalidSample(format!(
                        "field `{name}` has a missing or non-finite value at record {i}"
                    )));
                }
            }
            names.push(name);
            columns.push(column);
        }

        let n_rows = columns[0].len();
        if let Some((name, column)) = names
            .iter()
            .zip(&columns)
            .find(|(_, c)| c.len() != n_rows)
        {
            return Err(Error::InvalidSample(format!(
                "field `{name}` has {} records, expected {n_rows}",
                column.len()
            )));
        }

        Ok(Sample {
            names,
            columns,
            n_rows,
        })
    }
}
