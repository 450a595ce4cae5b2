use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::formula::{closed_form, FunctionDefinition, PREAMBLE};
use crate::scaling::ScaledCoefficients;

/// Constants shown for the previous formula of a function nobody recorded.
pub const PLACEHOLDER_PRIOR: ScaledCoefficients = ScaledCoefficients { a: 1000, b: 1000 };

#[derive(Deserialize)]
struct PriorRow {
    function: String,
    a: u64,
    b: u64,
}

/// Scaled constants of the formulas currently in use.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriorCosts {
    map: BTreeMap<String, ScaledCoefficients>,
}

impl PriorCosts {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open prior constants {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to read prior constants {}", path.display()))
    }

    /// Reads a `function,a,b` table.
    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut map = BTreeMap::new();
        for row in reader.deserialize() {
            let PriorRow { function, a, b } = row?;
            map.entry(function).or_insert(ScaledCoefficients { a, b });
        }
        Ok(Self { map })
    }

    /// Previous constants of `function`, or [`PLACEHOLDER_PRIOR`].
    pub fn get(&self, function: &str) -> ScaledCoefficients {
        self.map.get(function).copied().unwrap_or(PLACEHOLDER_PRIOR)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

impl FromIterator<(String, ScaledCoefficients)> for PriorCosts {
    fn from_iter<T: IntoIterator<Item = (String, ScaledCoefficients)>>(iter: T) -> Self {
        Self { map: iter.into_iter().collect() }
    }
}

/// The formula document: the preamble, then every definition in the given
/// order, separated by blank lines.
pub fn render_formulas(definitions: &[FunctionDefinition]) -> String {
    let mut out = String::from(PREAMBLE);
    for definition in definitions {
        // Writing into a String cannot fail.
        let _ = write!(out, "\n{definition}\n");
    }
    out
}

/// Markdown table of the new runtime formula of every definition next to the
/// one it replaces.
pub fn render_comparison(definitions: &[FunctionDefinition], prior: &PriorCosts) -> String {
    let mut out = String::from("| function | new formula | old formula |\n|---|---|---|\n");
    for definition in definitions {
        let new = definition.formula.closed_form();
        let old = closed_form(definition.formula.growth_kind(), prior.get(&definition.name));
        let _ = writeln!(out, "| {} | {} | {} |", definition.name, new, old);
    }
    out
}

/// Output locations of a generation run.
#[derive(Clone, Debug)]
pub struct ArtifactPaths<'a> {
    pub formulas: &'a Path,
    pub comparison: &'a Path,
}

/// Overwrites both documents.
pub fn write_artifacts(
    definitions: &[FunctionDefinition],
    prior: &PriorCosts,
    paths: &ArtifactPaths<'_>,
) -> anyhow::Result<()> {
    std::fs::write(paths.formulas, render_formulas(definitions))
        .with_context(|| format!("failed to write formulas to {}", paths.formulas.display()))?;
    std::fs::write(paths.comparison, render_comparison(definitions, prior))
        .with_context(|| format!("failed to write comparison table to {}", paths.comparison.display()))?;
    tracing::info!(
        target: "calibrator",
        formulas = %paths.formulas.display(),
        comparison = %paths.comparison.display(),
        definitions = definitions.len(),
        "artifacts written"
    );
    Ok(())
}
