use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::estimator::CostCoefficients;

/// One fitted function, pre-scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub function: String,
    pub a: f64,
    pub b: f64,
    /// Empty for functions that were not regressed against size.
    pub r2: Option<f64>,
}

impl CostRow {
    pub fn coefficients(&self) -> CostCoefficients {
        CostCoefficients { a: self.a, b: self.b }
    }
}

/// For each function, its fitted coefficients in nanoseconds.
///
/// This is the hand-off between the estimation and the generation stage.
/// Rows keep insertion order, which is also the order formulas are emitted in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoefficientTable {
    rows: Vec<CostRow>,
    index: BTreeMap<String, usize>,
}

impl CoefficientTable {
    /// Adds a row. Returns `false`, leaving the table unchanged, if the
    /// function is already present.
    pub fn add(&mut self, function: &str, coefficients: CostCoefficients, r2: Option<f64>) -> bool {
        if self.index.contains_key(function) {
            return false;
        }
        self.index.insert(function.to_string(), self.rows.len());
        self.rows.push(CostRow { function: function.to_string(), a: coefficients.a, b: coefficients.b, r2 });
        true
    }

    pub fn get(&self, function: &str) -> Option<CostCoefficients> {
        self.index.get(function).map(|&i| self.rows[i].coefficients())
    }

    /// Overwrites the coefficients of a present function, keeping its R².
    pub(crate) fn set(&mut self, function: &str, coefficients: CostCoefficients) -> bool {
        match self.index.get(function) {
            Some(&i) => {
                self.rows[i].a = coefficients.a;
                self.rows[i].b = coefficients.b;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CostRow> + '_ {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open constants table {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to read constants table {}", path.display()))
    }

    /// Reads a `function,a,b,r2` table. Repeated functions keep the first row.
    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut table = CoefficientTable::default();
        for row in reader.deserialize() {
            let row: CostRow = row?;
            if !table.add(&row.function, row.coefficients(), row.r2) {
                tracing::warn!(target: "calibrator", function = %row.function, "duplicate constants row ignored");
            }
        }
        Ok(table)
    }

    pub fn write_path(&self, path: &Path) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create constants table {}", path.display()))?;
        self.write_to(file).with_context(|| format!("failed to write constants table {}", path.display()))
    }

    pub fn write_to(&self, writer: impl Write) -> anyhow::Result<()> {
        let mut writer = csv::WriterBuilder::new().from_writer(writer);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<CostRow> for CoefficientTable {
    fn from_iter<T: IntoIterator<Item = CostRow>>(iter: T) -> Self {
        let mut table = CoefficientTable::default();
        for row in iter {
            table.add(&row.function, row.coefficients(), row.r2);
        }
        table
    }
}
