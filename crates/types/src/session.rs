use crate::group::Group;
use crate::ids::{CourseId, FacultyId, RoomId, SessionKey};
use serde::{Deserialize, Serialize};

/// Derived, internal: one weekly teaching instance of a course for a specific group (§4.C).
/// Sessions are interchangeable within a (course, group) family and live only for the
/// duration of a solve.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Session {
    pub session_key: SessionKey,
    pub course_id: CourseId,
    pub group: Group,
    pub size: u32,
    pub candidate_faculty: Vec<FacultyId>,
    pub feasible_rooms: Vec<RoomId>,
    pub duration_blocks: u32,
}
