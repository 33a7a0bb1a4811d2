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

use rand::Rng;

use crate::sample::{Categorical, Column, FieldType, Sample};
use crate::Error;

/// The projection of a [`Sample`] onto the response field and, optionally, a
/// categorical explanatory field.
///
/// Record order and count are those of the sample. Replicates produced by the
/// generator have the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingDataset {
    response_name: String,
    response: Column,
    explanatory: Option<(String, Categorical)>,
    success: Option<u32>,
}

impl WorkingDataset {
    /// Name of the response field.
    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    /// Response column.
    pub fn response(&self) -> &Column {
        &self.response
    }

    /// Name of the explanatory field, if any.
    pub fn explanatory_name(&self) -> Option<&str> {
        self.explanatory.as_ref().map(|(n, _)| n.as_str())
    }

    /// Explanatory column, if any.
    pub fn explanatory(&self) -> Option<&Categorical> {
        self.explanatory.as_ref().map(|(_, c)| c)
    }

    /// Level index of the success level of a categorical response.
    pub fn success(&self) -> Option<u32> {
        self.success
    }

    /// Success level of a categorical response.
    pub fn success_level(&self) -> Option<&str> {
        match (&self.response, self.success) {
            (Column::Categorical(c), Some(s)) => {
                c.levels().get(s as usize).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.response.len()
    }

    /// No records?
    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }

    /// Response and explanatory?
    pub fn is_two_variable(&self) -> bool {
        self.explanatory.is_some()
    }

    /// Resample the records with replacement, keeping each record's response and
    /// explanatory values together.
    pub(crate) fn resample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let n = self.len();
        if n == 0 {
            return self.clone();
        }
        let rows = (0..n).map(|_| rng.gen_range(0..n)).collect::<Vec<_>>();

        let response = match &self.response {
            Column::Numeric(xs) => Column::Numeric(rows.iter().map(|&i| xs[i]).collect()),
            Column::Categorical(c) => Column::Categorical(pick(c, &rows)),
        };
        Self {
            response_name: self.response_name.clone(),
            response,
            explanatory: self
                .explanatory
                .as_ref()
                .map(|(name, c)| (name.clone(), pick(c, &rows))),
            success: self.success,
        }
    }

    /// Same dataset with another response column of the same length.
    pub(crate) fn with_response(&self, response: Column) -> Self {
        debug_assert_eq!(response.len(), self.len());
        Self {
            response_name: self.response_name.clone(),
            response,
            explanatory: self.explanatory.clone(),
            success: self.success,
        }
    }

    /// Same dataset with another explanatory column of the same length.
    pub(crate) fn with_explanatory(&self, explanatory: Categorical) -> Self {
        debug_assert_eq!(explanatory.len(), self.len());
        Self {
            response_name: self.response_name.clone(),
            response: self.response.clone(),
            explanatory: self
                .explanatory
                .as_ref()
                .map(|(name, _)| (name.clone(), explanatory)),
            success: self.success,
        }
    }
}

fn pick(c: &Categorical, rows: &[usize]) -> Categorical {
    let codes = c.codes();
    Categorical::from_codes(c.shared_levels(), rows.iter().map(|&i| codes[i]).collect())
}

/// Select the `response` field (and optionally a categorical `explanatory` field and
/// the `success` level of a categorical response) from `sample`.
///
/// # Errors
///
/// [`Error::InvalidSpecification`] when a field is absent, when `explanatory` is not
/// categorical, or when `success` is not a level of a categorical response.
pub fn specify(
    sample: &Sample,
    response: &str,
    explanatory: Option<&str>,
    success: Option<&str>,
) -> Result<WorkingDataset, Error> {
    let response_column = sample.column(response).ok_or_else(|| {
        Error::InvalidSpecification(format!("response field `{response}` not in the sample"))
    })?;

    let explanatory = explanatory
        .map(|name| match sample.column(name) {
            Some(Column::Categorical(c)) => Ok((name.to_string(), c.clone())),
            Some(other) => Err(Error::InvalidSpecification(format!(
                "explanatory field `{name}` must be categorical, found {}",
                other.field_type()
            ))),
            None => Err(Error::InvalidSpecification(format!(
                "explanatory field `{name}` not in the sample"
            ))),
        })
        .transpose()?;

    let success = success
        .map(|level| match response_column {
            Column::Categorical(c) => c.code_of(level).ok_or_else(|| {
                Error::InvalidSpecification(format!(
                    "success `{level}` is not a level of `{response}` {:?}",
                    c.levels()
                ))
            }),
            Column::Numeric(_) => Err(Error::InvalidSpecification(format!(
                "success `{level}` given for {} response `{response}`",
                FieldType::Numeric
            ))),
        })
        .transpose()?;

    Ok(WorkingDataset {
        response_name: response.to_string(),
        response: response_column.clone(),
        explanatory,
        success,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flights() -> Sample {
        Sample::builder()
            .numeric("dep_delay", vec![-2.0, 10.0, 35.0, 0.0])
            .categorical("season", &["winter", "summer", "summer", "winter"])
            .categorical("day_hour", &["morning", "not morning", "morning", "morning"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_specify_one_variable() {
        let w = specify(&flights(), "dep_delay", None, None).unwrap();
        assert_eq!(w.response_name(), "dep_delay");
        assert_eq!(w.response(), &Column::Numeric(vec![-2.0, 10.0, 35.0, 0.0]));
        assert_eq!(w.len(), 4);
        assert!(!w.is_two_variable());
    }

    #[test]
    fn test_specify_two_variables() {
        let w = specify(&flights(), "day_hour", Some("season"), Some("morning")).unwrap();
        assert!(w.is_two_variable());
        assert_eq!(w.explanatory_name(), Some("season"));
        assert_eq!(w.success_level(), Some("morning"));
        assert_eq!(w.explanatory().unwrap().levels(), ["summer", "winter"]);
    }

    #[test]
    fn test_specify_errors() {
        let sample = flights();
        for (response, explanatory, success) in [
            ("arr_delay", None, None),
            ("day_hour", Some("dep_delay"), Some("morning")),
            ("day_hour", Some("origin"), Some("morning")),
            ("day_hour", None, Some("evening")),
            ("dep_delay", None, Some("morning")),
        ] {
            assert!(
                matches!(
                    specify(&sample, response, explanatory, success),
                    Err(Error::InvalidSpecification(_))
                ),
                "{response} {explanatory:?} {success:?}"
            );
        }
    }
}
