use crate::enums::{CourseKind, DayOfWeek, Equip, FacilityToken, RoomType};
use crate::ids::{CohortId, CourseId, DeptId, FacultyId, PolicyId, ProgramId, RoomId, SectionId, TimeslotId, YearTermId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Department {
    pub id: DeptId,
    pub name: String,
    #[serde(default)]
    pub buildings: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub duration_terms: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct YearTerm {
    pub id: YearTermId,
    pub program_id: ProgramId,
    pub term_no: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Section {
    pub id: SectionId,
    pub year_id: YearTermId,
    pub capacity: u32,
    #[serde(default)]
    pub tags: HashSet<String>,
    #[serde(default)]
    pub preferred_windows: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub kind: CourseKind,
    pub credits: u32,
    pub hours_theory: u32,
    pub hours_lab: u32,
    pub duration_min: u32,
    pub owner_dept: DeptId,
    #[serde(default)]
    pub facility_needs: HashMap<FacilityToken, bool>,
}

impl Course {
    pub fn weekly_sessions(&self) -> u32 {
        self.hours_theory + self.hours_lab
    }

    pub fn requires(&self, need: FacilityToken) -> bool {
        self.facility_needs.get(&need).copied().unwrap_or(false)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FacultyPrefs {
    #[serde(default)]
    pub preferred_days: Vec<DayOfWeek>,
    #[serde(default)]
    pub avoid_slots: HashSet<TimeslotId>,
    #[serde(default)]
    pub morning: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Faculty {
    pub id: FacultyId,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub max_per_day: u32,
    pub max_per_week: u32,
    #[serde(default)]
    pub availability: HashSet<TimeslotId>,
    #[serde(default)]
    pub prefs: FacultyPrefs,
    #[serde(default)]
    pub historical_load: u32,
}

impl Faculty {
    /// Empty availability means "no declared restriction" (matches the reference's toy data),
    /// distinct from an explicitly emptied set after a What-If leave mutation.
    pub fn is_available(&self, slot: &TimeslotId, unrestricted_if_empty: bool) -> bool {
        if self.availability.is_empty() {
            return unrestricted_if_empty;
        }
        self.availability.contains(slot)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub building: String,
    pub room_type: RoomType,
    pub capacity: u32,
    #[serde(default)]
    pub equipment: Vec<Equip>,
    #[serde(default)]
    pub availability: HashSet<TimeslotId>,
    #[serde(default = "default_true")]
    pub accessible: bool,
}

fn default_true() -> bool {
    true
}

impl Room {
    pub fn is_available(&self, slot: &TimeslotId, unrestricted_if_empty: bool) -> bool {
        if self.availability.is_empty() {
            return unrestricted_if_empty;
        }
        self.availability.contains(slot)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Cohort {
    pub id: CohortId,
    #[serde(default)]
    pub constituent_sections: Vec<SectionId>,
    #[serde(default)]
    pub bundled_courses: Vec<CourseId>,
    pub size: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SoftWeights {
    #[serde(default)]
    pub unpreferred_time: i32,
    #[serde(default)]
    pub windows: i32,
    #[serde(default)]
    pub compact_bonus: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Policy {
    pub id: PolicyId,
    pub scope: String,
    pub rule_type: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub soft_weights: SoftWeights,
    /// Grid indices considered "midday" for the compact-window objective term.
    #[serde(default = "default_compact_window")]
    pub compact_window: Vec<u32>,
}

fn default_compact_window() -> Vec<u32> {
    vec![2, 3, 4]
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            id: PolicyId("default".into()),
            scope: "univ".into(),
            rule_type: "default".into(),
            params: serde_json::Value::Null,
            priority: 0,
            soft_weights: SoftWeights::default(),
            compact_window: default_compact_window(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Timeslot {
    pub slot_id: TimeslotId,
    pub day: DayOfWeek,
    pub index: u32,
    pub start_min: u32,
    pub end_min: u32,
}
