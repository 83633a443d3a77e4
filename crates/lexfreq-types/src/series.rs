use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Inclusive year bounds for a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct YearRange {
    start: i32,
    end: i32,
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("year range start {start} is after end {end}")]
pub struct YearRangeError {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, YearRangeError> {
        if start > end {
            return Err(YearRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(self) -> i32 {
        self.start
    }

    pub fn end(self) -> i32 {
        self.end
    }

    pub fn contains(self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

/// Year-indexed frequency values.
///
/// Years are kept in a sorted map so series with different spans can be
/// summed by aligning on the union of their years.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    points: BTreeMap<i32, f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from consecutive values starting at `first_year`.
    /// Values that would land past `i32::MAX` are dropped.
    pub fn from_values(first_year: i32, values: impl IntoIterator<Item = f64>) -> Self {
        let points = (first_year..=i32::MAX).zip(values).collect();
        Self { points }
    }

    pub fn from_points(points: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.points.get(&year).copied()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.values().copied()
    }

    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points.iter().map(|(y, v)| (*y, *v))
    }

    /// Sum over every year in the series.
    pub fn total(&self) -> f64 {
        self.points.values().sum()
    }

    /// Drop years outside `range`.
    pub fn restrict(mut self, range: YearRange) -> Self {
        self.points.retain(|year, _| range.contains(*year));
        self
    }

    /// Add `other` into `self`, year by year.
    ///
    /// A year present on only one side counts as zero on the other, since
    /// both series did contribute.
    pub fn accumulate(&mut self, other: &Series) {
        for (year, value) in &other.points {
            *self.points.entry(*year).or_insert(0.0) += value;
        }
    }

    /// Element-wise sum of every series yielded. `None` if nothing was yielded.
    pub fn sum<'a>(series: impl IntoIterator<Item = &'a Series>) -> Option<Series> {
        let mut iter = series.into_iter();
        let mut acc = iter.next()?.clone();
        for s in iter {
            acc.accumulate(s);
        }
        Some(acc)
    }
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let years: Vec<i32> = self.years().collect();
        let values: Vec<f64> = self.values().collect();
        let mut state = serializer.serialize_struct("Series", 2)?;
        state.serialize_field("years", &years)?;
        state.serialize_field("values", &values)?;
        state.end()
    }
}
