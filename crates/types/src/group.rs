use crate::ids::{CohortId, SectionId};
use serde::{Deserialize, Serialize};

/// A scheduling-unit: either a CORE section or an elective cohort (§9).
/// Both act as a "group id" in the exclusion constraints, but arise from different
/// relations (`TAKES` vs `ELECTS`) with different membership semantics.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Group {
    Section(SectionId),
    Cohort(CohortId),
}

impl Group {
    /// String key used to index per-group occupancy maps in the constraint builder.
    pub fn key(&self) -> String {
        match self {
            Group::Section(id) => format!("section:{}", id.0),
            Group::Cohort(id) => format!("cohort:{}", id.0),
        }
    }
}
