//! Addable, scalable analysis values.
//!
//! Results files map dataset names to observables. An observable is a plain
//! number, a flat vector of bin contents, a histogram with explicit bin
//! edges, or a nested map of further observables. Two observables add when
//! they have the same kind and shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::datatools::errors::DataToolsError;

/// Observable name to value, for one dataset.
pub type DatasetResults = IndexMap<String, Accumulator>;

/// Dataset name to its results, in file order.
pub type ResultSet = IndexMap<String, DatasetResults>;

/// One analysis value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawAccumulator")]
pub enum Accumulator {
    Scalar(f64),
    Bins(Vec<f64>),
    Histogram(Histogram),
    Nested(IndexMap<String, Accumulator>),
}

/// Binned counts with their edges.
///
/// Always has one more edge than counts, and as many variances as counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<f64>,

    /// Sum of squared weights per bin, if tracked
    #[serde(skip_serializing_if = "Option::is_none")]
    variances: Option<Vec<f64>>,
}

impl Histogram {
    pub fn new(
        edges: Vec<f64>,
        counts: Vec<f64>,
        variances: Option<Vec<f64>>,
    ) -> Result<Self, DataToolsError> {
        if edges.len() != counts.len() + 1 {
            return Err(DataToolsError::MalformedHistogram {
                reason: format!("{} edges for {} bins", edges.len(), counts.len()),
            });
        }
        if let Some(ref v) = variances {
            if v.len() != counts.len() {
                return Err(DataToolsError::MalformedHistogram {
                    reason: format!("{} variances for {} bins", v.len(), counts.len()),
                });
            }
        }
        Ok(Histogram {
            edges,
            counts,
            variances,
        })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn variances(&self) -> Option<&[f64]> {
        self.variances.as_deref()
    }
}

/// Wire form, validated into [`Accumulator`].
///
/// Histograms are checked after the variant is chosen so a malformed one is
/// an error rather than a nested map of bins.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAccumulator {
    Scalar(f64),
    Bins(Vec<f64>),
    Histogram(RawHistogram),
    Nested(IndexMap<String, Accumulator>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHistogram {
    edges: Vec<f64>,
    counts: Vec<f64>,
    #[serde(default)]
    variances: Option<Vec<f64>>,
}

impl TryFrom<RawAccumulator> for Accumulator {
    type Error = DataToolsError;

    fn try_from(raw: RawAccumulator) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawAccumulator::Scalar(value) => Accumulator::Scalar(value),
            RawAccumulator::Bins(bins) => Accumulator::Bins(bins),
            RawAccumulator::Histogram(h) => {
                Accumulator::Histogram(Histogram::new(h.edges, h.counts, h.variances)?)
            }
            RawAccumulator::Nested(map) => Accumulator::Nested(map),
        })
    }
}

impl Accumulator {
    /// The value as a number, if it is one.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Accumulator::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Accumulator::Scalar(_) => "a scalar".to_string(),
            Accumulator::Bins(bins) => format!("{} bins", bins.len()),
            Accumulator::Histogram(h) => format!("a histogram with {} bins", h.counts.len()),
            Accumulator::Nested(map) => format!("a map of {} observables", map.len()),
        }
    }

    fn mismatch(&self, other: &Accumulator) -> DataToolsError {
        DataToolsError::ShapeMismatch {
            left: other.describe(),
            right: self.describe(),
        }
    }

    /// Add `other` into `self`.
    ///
    /// On error `self` may be partially updated when it is a nested map.
    pub fn add_assign(&mut self, other: &Accumulator) -> Result<(), DataToolsError> {
        match (self, other) {
            (Accumulator::Scalar(a), Accumulator::Scalar(b)) => {
                *a += b;
                Ok(())
            }
            (Accumulator::Bins(a), Accumulator::Bins(b)) if a.len() == b.len() => {
                add_slices(a, b);
                Ok(())
            }
            (Accumulator::Histogram(a), Accumulator::Histogram(b))
                if a.edges == b.edges && a.counts.len() == b.counts.len() =>
            {
                add_slices(&mut a.counts, &b.counts);
                a.variances = match (a.variances.take(), &b.variances) {
                    (Some(mut va), Some(vb)) if va.len() == vb.len() => {
                        add_slices(&mut va, vb);
                        Some(va)
                    }
                    // Variances are only meaningful if both sides track them
                    _ => None,
                };
                Ok(())
            }
            (Accumulator::Nested(a), Accumulator::Nested(b)) => {
                for (key, value) in b {
                    match a.get_mut(key) {
                        Some(existing) => existing.add_assign(value)?,
                        None => {
                            a.insert(key.clone(), value.clone());
                        }
                    }
                }
                Ok(())
            }
            (left, right) => Err(left.mismatch(right)),
        }
    }

    /// A copy with every entry multiplied by `factor`.
    ///
    /// Variances scale with the square of the factor.
    pub fn scaled(&self, factor: f64) -> Accumulator {
        match self {
            Accumulator::Scalar(value) => Accumulator::Scalar(value * factor),
            Accumulator::Bins(bins) => Accumulator::Bins(bins.iter().map(|b| b * factor).collect()),
            Accumulator::Histogram(h) => Accumulator::Histogram(Histogram {
                edges: h.edges.clone(),
                counts: h.counts.iter().map(|c| c * factor).collect(),
                variances: h
                    .variances
                    .as_ref()
                    .map(|v| v.iter().map(|x| x * factor * factor).collect()),
            }),
            Accumulator::Nested(map) => Accumulator::Nested(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.scaled(factor)))
                    .collect(),
            ),
        }
    }
}

fn add_slices(a: &mut [f64], b: &[f64]) {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
}
