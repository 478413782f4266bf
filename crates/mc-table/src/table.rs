//! Time-series table type.

use std::collections::{BTreeMap, HashSet};

use mc_core::Real;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::{TableError, TableResult};

/// Metadata key marking angular columns as degrees.
pub const IN_DEGREES_KEY: &str = "inDegrees";

/// Labelled columns sampled at strictly increasing times.
///
/// `data` has one row per time and one column per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRecord", into = "TableRecord")]
pub struct TimeSeriesTable {
    times: Vec<Real>,
    labels: Vec<String>,
    data: DMatrix<Real>,
    metadata: BTreeMap<String, String>,
}

impl TimeSeriesTable {
    pub fn new(times: Vec<Real>, labels: Vec<String>, data: DMatrix<Real>) -> TableResult<Self> {
        if data.nrows() != times.len() {
            return Err(TableError::Shape {
                what: format!("{} rows of data for {} times", data.nrows(), times.len()),
            });
        }
        if data.ncols() != labels.len() {
            return Err(TableError::Shape {
                what: format!("{} columns of data for {} labels", data.ncols(), labels.len()),
            });
        }
        for (row, pair) in times.windows(2).enumerate() {
            if !(pair[1] > pair[0]) {
                return Err(TableError::NonMonotonicTime { row: row + 1 });
            }
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(TableError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }
        Ok(Self {
            times,
            labels,
            data,
            metadata: BTreeMap::new(),
        })
    }

    /// Build from row-major values.
    pub fn from_rows(times: Vec<Real>, labels: Vec<String>, rows: &[Vec<Real>]) -> TableResult<Self> {
        let ncols = labels.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(TableError::Shape {
                    what: format!("row {i} has {} values for {ncols} labels", row.len()),
                });
            }
        }
        let data = DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r][c]);
        Self::new(times, labels, data)
    }

    pub fn num_rows(&self) -> usize {
        self.times.len()
    }

    pub fn num_columns(&self) -> usize {
        self.labels.len()
    }

    pub fn times(&self) -> &[Real] {
        &self.times
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn data(&self) -> &DMatrix<Real> {
        &self.data
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn column(&self, label: &str) -> TableResult<DVector<Real>> {
        let idx = self
            .column_index(label)
            .ok_or_else(|| TableError::ColumnNotFound {
                label: label.to_string(),
            })?;
        Ok(self.data.column(idx).into_owned())
    }

    pub fn row(&self, i: usize) -> Option<Vec<Real>> {
        (i < self.num_rows()).then(|| self.data.row(i).iter().copied().collect())
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn metadata_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn in_degrees(&self) -> bool {
        self.metadata(IN_DEGREES_KEY) == Some("yes")
    }

    /// Linearly interpolated value of column `col` at `time`.
    ///
    /// Outside the sampled range the nearest endpoint value is held.
    pub fn sample(&self, col: usize, time: Real) -> Real {
        let n = self.times.len();
        if n == 0 {
            return Real::NAN;
        }
        if time <= self.times[0] {
            return self.data[(0, col)];
        }
        if time >= self.times[n - 1] {
            return self.data[(n - 1, col)];
        }
        // First sample strictly after `time`; guaranteed in 1..n here
        let hi = self.times.partition_point(|t| *t <= time);
        let lo = hi - 1;
        let (t0, t1) = (self.times[lo], self.times[hi]);
        let w = (time - t0) / (t1 - t0);
        (1.0 - w) * self.data[(lo, col)] + w * self.data[(hi, col)]
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, labels: &[&str]) -> TableResult<Self> {
        let mut indices = Vec::with_capacity(labels.len());
        for label in labels {
            indices.push(self.column_index(label).ok_or_else(|| {
                TableError::ColumnNotFound {
                    label: (*label).to_string(),
                }
            })?);
        }
        let data = DMatrix::from_fn(self.num_rows(), indices.len(), |r, c| {
            self.data[(r, indices[c])]
        });
        let mut table = Self::new(
            self.times.clone(),
            labels.iter().map(|l| (*l).to_string()).collect(),
            data,
        )?;
        table.metadata = self.metadata.clone();
        Ok(table)
    }

    pub(crate) fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Serialized form: row-major values beside the time column.
#[derive(Serialize, Deserialize)]
struct TableRecord {
    labels: Vec<String>,
    times: Vec<Real>,
    rows: Vec<Vec<Real>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl TryFrom<TableRecord> for TimeSeriesTable {
    type Error = TableError;

    fn try_from(record: TableRecord) -> Result<Self, Self::Error> {
        Ok(TimeSeriesTable::from_rows(record.times, record.labels, &record.rows)?
            .with_metadata(record.metadata))
    }
}

impl From<TimeSeriesTable> for TableRecord {
    fn from(table: TimeSeriesTable) -> Self {
        let rows = (0..table.num_rows())
            .map(|r| table.data.row(r).iter().copied().collect())
            .collect();
        TableRecord {
            labels: table.labels,
            times: table.times,
            rows,
            metadata: table.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> TimeSeriesTable {
        TimeSeriesTable::from_rows(
            vec![0.0, 1.0, 2.0],
            vec!["a".into(), "b".into()],
            &[vec![0.0, 10.0], vec![1.0, 20.0], vec![2.0, 40.0]],
        )
        .unwrap()
    }

    #[test]
    fn sample_interpolates_and_holds_ends() {
        let t = ramp();
        assert_eq!(t.sample(0, 0.5), 0.5);
        assert_eq!(t.sample(1, 1.5), 30.0);
        assert_eq!(t.sample(1, 1.0), 20.0);
        assert_eq!(t.sample(1, -1.0), 10.0);
        assert_eq!(t.sample(1, 5.0), 40.0);
    }

    #[test]
    fn rejects_repeated_times() {
        let err = TimeSeriesTable::from_rows(vec![0.0, 0.0], vec!["a".into()], &[vec![1.0], vec![2.0]])
            .unwrap_err();
        assert!(matches!(err, TableError::NonMonotonicTime { row: 1 }));
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err = TimeSeriesTable::from_rows(vec![0.0], vec!["a".into(), "a".into()], &[vec![1.0, 2.0]])
            .unwrap_err();
        assert!(matches!(err, TableError::DuplicateLabel { .. }));
    }

    #[test]
    fn select_reorders() {
        let t = ramp().select(&["b", "a"]).unwrap();
        assert_eq!(t.labels(), &["b".to_string(), "a".to_string()]);
        assert_eq!(t.row(2).unwrap(), vec![40.0, 2.0]);
        assert!(ramp().select(&["zzz"]).is_err());
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(ramp()).unwrap();
        assert_eq!(json["rows"][1][1], 20.0);
        let back: TimeSeriesTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, ramp());
    }
}
