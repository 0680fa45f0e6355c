use crate::enums::DayOfWeek;
use crate::ids::{CourseId, FacultyId, RoomId, SessionKey, TimeslotId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SolveParams {
    pub time_limit_s: u64,
    pub workers: u32,
    pub seed: u64,
    #[serde(default)]
    pub repair_local_search: bool,
    #[serde(default)]
    pub repair_steps: Option<u32>,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            time_limit_s: 10,
            workers: 8,
            seed: 0,
            repair_local_search: false,
            repair_steps: None,
        }
    }
}

/// A concrete placement: every assigned session refers to exactly one (room, slot, teacher).
/// Unlike the reference, the teacher is always explicit (§9 — `z[s, f]`), never implicit.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
pub struct Assignment {
    pub session_key: SessionKey,
    pub course_id: CourseId,
    pub timeslot: TimeslotId,
    pub room_id: RoomId,
    pub teacher_id: FacultyId,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    pub fn is_usable(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub objective: f64,
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub stats: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimetableVersion {
    pub tt_id: String,
    pub assignments: HashMap<SessionKey, Assignment>,
    pub pins: std::collections::HashSet<SessionKey>,
    #[serde(default)]
    pub score_breakdown: serde_json::Value,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl TimetableVersion {
    pub fn from_result(tt_id: impl Into<String>, result: &SolveResult) -> Self {
        let assignments = result
            .assignments
            .iter()
            .map(|a| (a.session_key.clone(), a.clone()))
            .collect();
        Self {
            tt_id: tt_id.into(),
            assignments,
            pins: std::collections::HashSet::new(),
            score_breakdown: serde_json::json!({ "objective": result.objective }),
            meta: serde_json::Value::Null,
        }
    }
}

/// How strongly a prior assignment is carried into the next build (§4.F's "chosen subset").
#[derive(Clone, Copy, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum LockMode {
    /// Room, timeslot, and teacher are all fixed.
    Full,
    /// Only the timeslot is fixed; the solver may re-pick the room and teacher.
    TimeslotOnly,
    /// Only the room is fixed; the solver may re-pick the timeslot and teacher.
    RoomOnly,
    /// Timeslot and room are fixed; the teacher may still change.
    TimeAndRoom,
}

/// A query over a prior `TimetableVersion`'s assignments selecting which ones become pins
/// (and at what strength) before the next build.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockMask {
    #[serde(default)]
    pub courses: Vec<CourseId>,
    #[serde(default)]
    pub teachers: Vec<FacultyId>,
    #[serde(default)]
    pub rooms: Vec<RoomId>,
    #[serde(default)]
    pub days: Vec<DayOfWeek>,
    #[serde(default)]
    pub times: Vec<TimeslotId>,
    pub lock: LockMode,
    /// Invert the match: assignments matching this mask are *excluded* from pinning
    /// instead of included.
    #[serde(default)]
    pub negate: bool,
}

/// A partial pin resolved from a `LockMask` or supplied directly by the caller: a session
/// whose timeslot and/or room (and, under `LockMode::Full`, teacher) is fixed, but not
/// necessarily all three.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PartialPin {
    pub session_key: SessionKey,
    #[serde(default)]
    pub timeslot: Option<TimeslotId>,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub teacher_id: Option<FacultyId>,
}
