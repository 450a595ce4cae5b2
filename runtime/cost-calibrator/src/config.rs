use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matched_group::MatchedGroup;
use crate::scaling::ScalingPolicy;
use crate::special_case::{default_templates, SpecialCaseTemplate};

/// Runtime budget of a block, in nanoseconds.
const DEFAULT_SCALE_NUMERATOR: u64 = 5_000_000_000;
/// Block limit runtime units (3e10) times the number of blocks (100) the
/// budget is spread over.
const DEFAULT_SCALE_DENOMINATOR: u64 = 3_000_000_000_000;

/// Functions never priced from their runtime fit.
const DEFAULT_SKIP: &[&str] = &[
    // Measured together with storage operations, but the runtime dimension
    // must not pay for storage performance.
    "cost_at_block",
    "cost_create_ft",
    "cost_block_info",
    "cost_stx_balance",
    "cost_stx_transfer",
    "cost_ft_mint",
    "cost_ft_transfer",
    "cost_ft_balance",
    "cost_ft_get_supply",
    "cost_ft_burn",
    "poison_microblock",
    "cost_analysis_storage",
    "cost_analysis_use_trait_entry",
    "cost_analysis_get_function_entry",
    "cost_load_contract",
    "cost_create_map",
    "cost_create_var",
    "cost_create_nft",
    "cost_fetch_entry",
    "cost_set_entry",
    "cost_fetch_var",
    "cost_set_var",
    "cost_contract_storage",
    "cost_nft_mint",
    "cost_nft_transfer",
    "cost_nft_owner",
    "cost_nft_burn",
    // Linear in size, but the benchmarks only measured a constant.
    "cost_list_cons",
    "cost_index_of",
    "cost_hash160",
    "cost_sha256",
    "cost_sha512",
    "cost_sha512t256",
    "cost_keccak256",
    "cost_print",
    // Need further analysis.
    "cost_analysis_iterable_func",
    "cost_analysis_type_check",
];

/// Operations an adversary can freely substitute for one another.
const DEFAULT_MATCHED_GROUPS: &[&[&str]] = &[
    &["cost_le", "cost_ge"],
    &["cost_leq", "cost_geq"],
    &["cost_and", "cost_or"],
    &["cost_is_some", "cost_is_none"],
    &["cost_is_okay", "cost_is_err"],
    &["cost_ft_mint", "cost_ft_burn"],
    &["cost_nft_mint", "cost_nft_burn"],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub numerator: u64,
    pub denominator: u64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self { numerator: DEFAULT_SCALE_NUMERATOR, denominator: DEFAULT_SCALE_DENOMINATOR }
    }
}

/// Everything a calibration run depends on besides its input files.
///
/// Fields missing from a JSON config take their built-in default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub scale: ScaleConfig,
    pub skip: BTreeSet<String>,
    pub matched_groups: Vec<MatchedGroup>,
    pub special_cases: BTreeMap<String, SpecialCaseTemplate>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            scale: ScaleConfig::default(),
            skip: DEFAULT_SKIP.iter().map(|name| name.to_string()).collect(),
            matched_groups: DEFAULT_MATCHED_GROUPS
                .iter()
                .map(|members| MatchedGroup::new(members.iter().copied()))
                .collect(),
            special_cases: default_templates(),
        }
    }
}

impl CalibrationConfig {
    /// Reads and validates a JSON config.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: CalibrationConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate().with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scaling_policy()?;

        let mut seen = BTreeSet::new();
        for (index, group) in self.matched_groups.iter().enumerate() {
            if group.len() < 2 {
                return Err(ConfigError::TrivialGroup { index });
            }
            for member in group.members() {
                if !seen.insert(member) {
                    return Err(ConfigError::OverlappingGroups { function: member.to_string() });
                }
            }
        }

        for (function, template) in &self.special_cases {
            template.validate(function)?;
        }
        Ok(())
    }

    pub fn scaling_policy(&self) -> Result<ScalingPolicy, ConfigError> {
        ScalingPolicy::new(self.scale.numerator, self.scale.denominator)
    }

    pub fn is_skipped(&self, function: &str) -> bool {
        self.skip.contains(function)
    }

    pub fn special_case(&self, function: &str) -> Option<&SpecialCaseTemplate> {
        self.special_cases.get(function)
    }
}
