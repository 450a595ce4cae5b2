/// Assumed asymptotic shape of a function's cost as its input size grows.
///
/// The kind is declared externally per function (see
/// [`crate::registry::FunctionRegistry`]) and is never inferred from data.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GrowthKind {
    /// Size is ignored, the cost is a pure intercept.
    Constant,
    Linear,
    #[strum(serialize = "logn")]
    #[serde(rename = "logn")]
    LogN,
    #[strum(serialize = "nlogn")]
    #[serde(rename = "nlogn")]
    NLogN,
}

impl GrowthKind {
    /// Maps an input size onto the explanatory variable of the regression.
    pub fn transform(self, size: u64) -> f64 {
        let n = size as f64;
        match self {
            GrowthKind::Constant => 0.0,
            GrowthKind::Linear => n,
            GrowthKind::LogN => n.log2(),
            GrowthKind::NLogN => n * n.log2(),
        }
    }

    pub fn is_constant(self) -> bool {
        self == GrowthKind::Constant
    }
}

#[cfg(test)]
mod tests {
    use super::GrowthKind;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parse_and_display_round_trip() {
        for kind in GrowthKind::iter() {
            assert_eq!(GrowthKind::from_str(&kind.to_string()), Ok(kind));
        }
        assert_eq!("logn".parse::<GrowthKind>(), Ok(GrowthKind::LogN));
        assert_eq!("nlogn".parse::<GrowthKind>(), Ok(GrowthKind::NLogN));
        assert!("quadratic".parse::<GrowthKind>().is_err());
        assert!("Linear ".parse::<GrowthKind>().is_err());
    }

    #[test]
    fn transforms() {
        assert_eq!(GrowthKind::Constant.transform(1024), 0.0);
        assert_eq!(GrowthKind::Linear.transform(1024), 1024.0);
        assert_eq!(GrowthKind::LogN.transform(1024), 10.0);
        assert_eq!(GrowthKind::NLogN.transform(1024), 10240.0);
        assert_eq!(GrowthKind::LogN.transform(1), 0.0);
        assert_eq!(GrowthKind::NLogN.transform(1), 0.0);
    }
}
