use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Declared growth kind per function name, as read from
/// `function_name_to_type.csv`.
///
/// Kinds are kept verbatim and only parsed when a function is dispatched, so
/// that a typo in one row fails that function instead of the whole registry.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    kinds: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RegistryRow {
    function_name: String,
    type_name: String,
}

impl FunctionRegistry {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open registry {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to parse registry {}", path.display()))
    }

    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut registry = FunctionRegistry::default();
        for row in csv.deserialize() {
            let row: RegistryRow = row?;
            if let Some(prev) = registry.kinds.insert(row.function_name.clone(), row.type_name) {
                tracing::warn!(
                    target: "calibrator",
                    function = %row.function_name,
                    previous = %prev,
                    "function declared twice in registry, keeping the last declaration"
                );
            }
        }
        Ok(registry)
    }

    /// Raw declared kind, `None` when the function is not registered.
    pub fn declared_kind(&self, function: &str) -> Option<&str> {
        self.kinds.get(function).map(String::as_str)
    }

    /// Registered function names in sorted order.
    pub fn functions(&self) -> impl Iterator<Item = &str> + '_ {
        self.kinds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl<N: Into<String>, K: Into<String>> FromIterator<(N, K)> for FunctionRegistry {
    fn from_iter<T: IntoIterator<Item = (N, K)>>(iter: T) -> Self {
        let kinds = iter.into_iter().map(|(name, kind)| (name.into(), kind.into())).collect();
        Self { kinds }
    }
}

#[cfg(test)]
mod tests {
    use super::FunctionRegistry;

    #[test]
    fn parses_csv_and_trims_values() {
        let csv = "function_name,type_name\ncost_add, linear\ncost_sqrti,constant \ncost_map,quadratic\n";
        let registry = FunctionRegistry::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.declared_kind("cost_add"), Some("linear"));
        assert_eq!(registry.declared_kind("cost_sqrti"), Some("constant"));
        // Unknown kinds are kept as declared; dispatch rejects them.
        assert_eq!(registry.declared_kind("cost_map"), Some("quadratic"));
        assert_eq!(registry.declared_kind("cost_ft_mint"), None);
        assert_eq!(registry.functions().collect::<Vec<_>>(), ["cost_add", "cost_map", "cost_sqrti"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "function_name\ncost_add\n";
        assert!(FunctionRegistry::from_reader(csv.as_bytes()).is_err());
    }
}
