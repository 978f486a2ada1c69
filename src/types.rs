use crate::error::{Error, Malformed, Result};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A parsed historian response: named columns and rows of string cells.
///
/// Every row has exactly one cell per column and column names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table, rejecting duplicate column names and ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::malformed(Malformed::DuplicateColumn(name.clone())));
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(Error::malformed(Malformed::RaggedRow {
                row: idx + 1,
                expected: columns.len(),
                found: row.len(),
            }));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Cell at `row` in column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Rows paired with their column names, in column order.
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &str)>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }
}

/// Ordered query parameters for one request.
///
/// Setting a name that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Unit of the sampling interval of a trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntervalUnit {
    #[default]
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl IntervalUnit {
    /// Name the historian expects on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Days => "dagen",
            IntervalUnit::Hours => "uren",
            IntervalUnit::Minutes => "minuten",
            IntervalUnit::Seconds => "seconden",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "days" | "day" | "dagen" => Ok(IntervalUnit::Days),
            "hours" | "hour" | "uren" => Ok(IntervalUnit::Hours),
            "minutes" | "minute" | "minuten" => Ok(IntervalUnit::Minutes),
            "seconds" | "second" | "seconden" => Ok(IntervalUnit::Seconds),
            _ => Err(format!("Unknown interval unit: {}", s)),
        }
    }
}

/// Aggregation the historian applies per interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Calculation {
    #[default]
    Actual,
    Average,
    Min,
    Max,
    LinearInterpolation,
    StepInterpolation,
}

impl Calculation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Calculation::Actual => "actual",
            Calculation::Average => "avg",
            Calculation::Min => "min",
            Calculation::Max => "max",
            Calculation::LinearInterpolation => "int_lin",
            Calculation::StepInterpolation => "int_step",
        }
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Calculation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "actual" => Ok(Calculation::Actual),
            "average" | "avg" | "mean" => Ok(Calculation::Average),
            "min" => Ok(Calculation::Min),
            "max" => Ok(Calculation::Max),
            "linear-interpolation" | "linear" | "int_lin" => Ok(Calculation::LinearInterpolation),
            "step-interpolation" | "step" | "int_step" => Ok(Calculation::StepInterpolation),
            _ => Err(format!("Unknown calculation: {}", s)),
        }
    }
}

/// Sampling options shared by the trend queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendOptions {
    pub interval: u32,
    pub unit: IntervalUnit,
    pub calculation: Calculation,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            interval: 1,
            unit: IntervalUnit::Days,
            calculation: Calculation::Actual,
        }
    }
}
