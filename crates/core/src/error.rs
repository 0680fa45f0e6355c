use thiserror::Error;
use types::{CourseId, SessionKey};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("instance failed validation:\n- {}", .0.join("\n- "))]
    Failed(Vec<String>),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Ingest(#[from] store::IngestError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("course {0} has no feasible room or no candidate faculty")]
    Unschedulable(CourseId),
    #[error(transparent)]
    Pin(#[from] PinInfeasible),
}

/// Why a pin carried from a prior `TimetableVersion` can no longer be honored (§4.F, §7).
/// Fatal: unlike a dropped `UnschedulableWarning`, the build aborts rather than silently
/// dropping the pin — the caller decides whether to drop it and retry (§7).
#[derive(Debug, Error)]
pub enum PinInfeasible {
    #[error("pinned session {0} no longer exists in the expanded model")]
    SessionGone(SessionKey),
    #[error("pin for {session} names room {room} which is not in that session's feasible set")]
    RoomNotFeasible { session: SessionKey, room: String },
    #[error("pin for {session} names room {room} unavailable at slot {slot}")]
    RoomUnavailable {
        session: SessionKey,
        room: String,
        slot: String,
    },
    #[error("pin for {session} names timeslot {slot} outside the solve grid")]
    TimeslotUnknown { session: SessionKey, slot: String },
    #[error("pin for {session} names teacher {teacher} who is not a candidate for this session")]
    TeacherNotCandidate { session: SessionKey, teacher: String },
    #[error("pin for {session} names teacher {teacher} unavailable at slot {slot}")]
    TeacherUnavailable {
        session: SessionKey,
        teacher: String,
        slot: String,
    },
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("solver cancelled before search began")]
    Cancelled,
    #[error("solver backend error: {0}")]
    Backend(String),
}
