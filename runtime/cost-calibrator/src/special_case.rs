//! Fixed-shape cost descriptors for functions whose charged cost spans more
//! than runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::growth_kind::GrowthKind;

/// Shape of the runtime dimension of a template.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeShape {
    /// One placeholder: the scaled intercept.
    Constant,
    /// Two placeholders: the scaled slope and intercept.
    Linear,
}

/// An auxiliary (storage) dimension of a template.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Constant(u64),
    /// Linear in size, charged with the same coefficients as the runtime.
    Linear,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCaseTemplate {
    pub runtime: RuntimeShape,
    pub write_length: Dimension,
    pub write_count: Dimension,
    pub read_count: Dimension,
    pub read_length: Dimension,
}

impl SpecialCaseTemplate {
    /// Growth kind used to fit and clamp the runtime dimension.
    pub fn growth_kind(&self) -> GrowthKind {
        match self.runtime {
            RuntimeShape::Constant => GrowthKind::Constant,
            RuntimeShape::Linear => GrowthKind::Linear,
        }
    }

    /// Auxiliary dimensions in output order.
    pub fn dimensions(&self) -> [(&'static str, Dimension); 4] {
        [
            ("write_length", self.write_length),
            ("write_count", self.write_count),
            ("read_count", self.read_count),
            ("read_length", self.read_length),
        ]
    }

    pub(crate) fn validate(&self, function: &str) -> Result<(), ConfigError> {
        if self.runtime == RuntimeShape::Constant {
            if let Some((dimension, _)) =
                self.dimensions().into_iter().find(|(_, dim)| *dim == Dimension::Linear)
            {
                return Err(ConfigError::LinearDimensionOnConstantTemplate {
                    function: function.to_string(),
                    dimension,
                });
            }
        }
        Ok(())
    }
}

/// Runtime is a constant, all storage dimensions are declared constants.
const fn one_constant(
    write_length: u64,
    write_count: u64,
    read_count: u64,
    read_length: u64,
) -> SpecialCaseTemplate {
    SpecialCaseTemplate {
        runtime: RuntimeShape::Constant,
        write_length: Dimension::Constant(write_length),
        write_count: Dimension::Constant(write_count),
        read_count: Dimension::Constant(read_count),
        read_length: Dimension::Constant(read_length),
    }
}

const fn two_constant(
    write_length: Dimension,
    write_count: Dimension,
    read_count: Dimension,
    read_length: Dimension,
) -> SpecialCaseTemplate {
    SpecialCaseTemplate { runtime: RuntimeShape::Linear, write_length, write_count, read_count, read_length }
}

/// Templates of the storage-touching operations.
pub fn default_templates() -> BTreeMap<String, SpecialCaseTemplate> {
    use Dimension::{Constant as C, Linear as L};

    let templates = [
        ("cost_at_block", one_constant(0, 0, 1, 1)),
        ("cost_create_ft", one_constant(1, 2, 0, 0)),
        ("cost_block_info", one_constant(0, 0, 1, 1)),
        ("cost_stx_balance", one_constant(0, 0, 1, 1)),
        ("cost_stx_transfer", one_constant(1, 1, 1, 1)),
        ("cost_ft_mint", one_constant(1, 2, 2, 1)),
        ("cost_ft_transfer", one_constant(1, 2, 2, 1)),
        ("cost_ft_balance", one_constant(0, 0, 1, 1)),
        ("cost_ft_get_supply", one_constant(0, 0, 1, 1)),
        ("cost_ft_burn", one_constant(1, 2, 2, 1)),
        ("poison_microblock", one_constant(1, 1, 1, 1)),
        ("cost_analysis_storage", two_constant(L, C(1), C(1), C(1))),
        ("cost_analysis_use_trait_entry", two_constant(L, C(0), C(1), L)),
        ("cost_analysis_get_function_entry", two_constant(C(0), C(0), C(1), L)),
        // Three reads because of the associated metadata loads.
        ("cost_load_contract", two_constant(C(0), C(0), C(3), L)),
        ("cost_create_map", two_constant(L, C(1), C(0), C(0))),
        ("cost_create_var", two_constant(L, C(2), C(0), C(0))),
        ("cost_create_nft", two_constant(L, C(1), C(0), C(0))),
        ("cost_fetch_entry", two_constant(C(0), C(0), C(1), L)),
        ("cost_set_entry", two_constant(L, C(1), C(1), C(0))),
        ("cost_fetch_var", two_constant(C(0), C(0), C(1), L)),
        ("cost_set_var", two_constant(L, C(1), C(1), C(0))),
        ("cost_contract_storage", two_constant(L, C(1), C(0), C(0))),
        ("cost_nft_mint", two_constant(C(1), C(1), C(1), C(1))),
        ("cost_nft_transfer", two_constant(C(1), C(1), C(1), C(1))),
        ("cost_nft_owner", two_constant(C(0), C(0), C(1), C(1))),
        ("cost_nft_burn", two_constant(C(1), C(1), C(1), C(1))),
    ];
    templates.into_iter().map(|(name, template)| (name.to_string(), template)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_templates_are_valid() {
        for (name, template) in default_templates() {
            template.validate(&name).unwrap();
        }
    }

    #[test]
    fn constant_runtime_rejects_linear_dimensions() {
        let mut template = one_constant(0, 0, 1, 1);
        template.read_length = Dimension::Linear;
        assert_eq!(
            template.validate("cost_x"),
            Err(ConfigError::LinearDimensionOnConstantTemplate {
                function: "cost_x".into(),
                dimension: "read_length"
            })
        );
    }

    #[test]
    fn json_shape() {
        let template = two_constant(Dimension::Linear, Dimension::Constant(1), Dimension::Constant(0), Dimension::Constant(0));
        let json = serde_json::to_value(template).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "runtime": "linear",
                "write_length": "linear",
                "write_count": { "constant": 1 },
                "read_count": { "constant": 0 },
                "read_length": { "constant": 0 },
            })
        );
        let back: SpecialCaseTemplate = serde_json::from_value(json).unwrap();
        assert_eq!(back, template);
    }
}
