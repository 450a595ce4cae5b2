use serde::{Deserialize, Serialize};

use crate::cost_table::CoefficientTable;
use crate::estimator::CostCoefficients;

/// Functions that must share one conservative cost, because a caller can
/// always pick the cheaper one to do equivalent work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchedGroup {
    members: Vec<String>,
}

impl MatchedGroup {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { members: members.into_iter().map(Into::into).collect() }
    }

    pub fn members(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Elementwise maximum over the members present in `table`, or `None` if
    /// no member is present.
    pub fn envelope(&self, table: &CoefficientTable) -> Option<CostCoefficients> {
        self.members().filter_map(|member| table.get(member)).reduce(CostCoefficients::max)
    }
}

/// Replaces the coefficients of every group member present in `table` with
/// the group's envelope. Must run on fitted, pre-scaling values.
pub fn reconcile(table: &mut CoefficientTable, groups: &[MatchedGroup]) {
    for group in groups {
        let Some(envelope) = group.envelope(table) else {
            tracing::debug!(target: "calibrator", group = ?group.members, "no member of matched group was fitted");
            continue;
        };
        for member in group.members() {
            if !table.set(member, envelope) {
                tracing::warn!(target: "calibrator", function = member, "matched group member missing from the constants table");
            }
        }
        tracing::debug!(target: "calibrator", group = ?group.members, a = envelope.a, b = envelope.b, "reconciled");
    }
}
