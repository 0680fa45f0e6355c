//! Pin carry-over between solves (§4.F): turns a prior `TimetableVersion` plus a
//! `LockMask` into the set of `PartialPin`s the next solve must respect, validating each
//! against the freshly expanded session set — and against current room/faculty
//! availability — before handing it to the solver.

use types::{
    Assignment, Faculty, LockMask, LockMode, PartialPin, Room, Session, SessionKey, Timeslot,
    TimetableVersion,
};

use crate::error::PinInfeasible;

/// Does `mask` select this assignment for carry-over? Each filter field is OR'd internally
/// (empty = "don't filter on this"), then the whole mask can be negated (§4.F: "exclude
/// everyone in dept X" is `negate: true` with `courses` naming that dept's courses).
fn mask_selects(mask: &LockMask, a: &Assignment) -> bool {
    let course_ok = mask.courses.is_empty() || mask.courses.contains(&a.course_id);
    let teacher_ok = mask.teachers.is_empty() || mask.teachers.contains(&a.teacher_id);
    let room_ok = mask.rooms.is_empty() || mask.rooms.contains(&a.room_id);
    let day_ok = mask.days.is_empty()
        || a.timeslot
            .day()
            .map(|d| mask.days.contains(&d))
            .unwrap_or(false);
    let time_ok = mask.times.is_empty() || mask.times.contains(&a.timeslot);

    let selected = course_ok && teacher_ok && room_ok && day_ok && time_ok;
    if mask.negate {
        !selected
    } else {
        selected
    }
}

/// Builds the carry-over pin set from a prior version: every assignment selected by an
/// active `lock` mask becomes a `PartialPin`, shaped by that mask's `LockMode`.
pub fn pins_from_masks(prior: &TimetableVersion, masks: &[LockMask]) -> Vec<PartialPin> {
    let mut out = Vec::new();
    for mask in masks {
        for a in prior.assignments.values() {
            if mask_selects(mask, a) {
                out.push(match mask.lock {
                    LockMode::Full => PartialPin {
                        session_key: a.session_key.clone(),
                        timeslot: Some(a.timeslot.clone()),
                        room_id: Some(a.room_id.clone()),
                        teacher_id: Some(a.teacher_id.clone()),
                    },
                    LockMode::TimeslotOnly => PartialPin {
                        session_key: a.session_key.clone(),
                        timeslot: Some(a.timeslot.clone()),
                        room_id: None,
                        teacher_id: None,
                    },
                    LockMode::RoomOnly => PartialPin {
                        session_key: a.session_key.clone(),
                        timeslot: None,
                        room_id: Some(a.room_id.clone()),
                        teacher_id: None,
                    },
                    LockMode::TimeAndRoom => PartialPin {
                        session_key: a.session_key.clone(),
                        timeslot: Some(a.timeslot.clone()),
                        room_id: Some(a.room_id.clone()),
                        teacher_id: None,
                    },
                });
            }
        }
    }
    out
}

/// Validates each pin against the session it names still existing, with its room and/or
/// teacher still inside that session's feasible/candidate sets, still available at the
/// pinned timeslot, and the timeslot itself known to the grid. A pin that fails any of
/// these is fatal (`PinInfeasible`) — §4.F/§7 require the build to abort rather than
/// silently drop or reinterpret a pin the caller asked to hold.
pub fn validate_pins(
    pins: &[PartialPin],
    sessions: &[Session],
    rooms: &[Room],
    faculty: &[Faculty],
    timeslots: &[Timeslot],
) -> Result<(), PinInfeasible> {
    let session_by_key: std::collections::HashMap<&SessionKey, &Session> =
        sessions.iter().map(|s| (&s.session_key, s)).collect();
    let room_by_id: std::collections::HashMap<_, _> = rooms.iter().map(|r| (&r.id, r)).collect();
    let faculty_by_id: std::collections::HashMap<_, _> = faculty.iter().map(|f| (&f.id, f)).collect();
    let known_slots: std::collections::HashSet<_> = timeslots.iter().map(|t| &t.slot_id).collect();

    for pin in pins {
        let session = session_by_key
            .get(&pin.session_key)
            .ok_or_else(|| PinInfeasible::SessionGone(pin.session_key.clone()))?;

        if let Some(slot) = &pin.timeslot {
            if !known_slots.contains(slot) {
                return Err(PinInfeasible::TimeslotUnknown {
                    session: pin.session_key.clone(),
                    slot: slot.0.clone(),
                });
            }
        }

        if let Some(room_id) = &pin.room_id {
            if !session.feasible_rooms.contains(room_id) {
                return Err(PinInfeasible::RoomNotFeasible {
                    session: pin.session_key.clone(),
                    room: room_id.0.clone(),
                });
            }
            if let Some(slot) = &pin.timeslot {
                let room = room_by_id.get(room_id);
                let available = room.map_or(true, |r| r.is_available(slot, true));
                if !available {
                    return Err(PinInfeasible::RoomUnavailable {
                        session: pin.session_key.clone(),
                        room: room_id.0.clone(),
                        slot: slot.0.clone(),
                    });
                }
            }
        }

        if let Some(teacher_id) = &pin.teacher_id {
            if !session.candidate_faculty.contains(teacher_id) {
                return Err(PinInfeasible::TeacherNotCandidate {
                    session: pin.session_key.clone(),
                    teacher: teacher_id.0.clone(),
                });
            }
            if let Some(slot) = &pin.timeslot {
                let teacher = faculty_by_id.get(teacher_id);
                let available = teacher.map_or(true, |f| f.is_available(slot, true));
                if !available {
                    return Err(PinInfeasible::TeacherUnavailable {
                        session: pin.session_key.clone(),
                        teacher: teacher_id.0.clone(),
                        slot: slot.0.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{
        CohortId, CourseId, DayOfWeek, FacultyId, FacultyPrefs, Group, RoomId, RoomType, TimeslotId,
    };

    fn session(room: &str, faculty: &str) -> Session {
        Session {
            session_key: SessionKey("S_C_cohort:X_0".into()),
            course_id: CourseId("C".into()),
            group: Group::Cohort(CohortId("X".into())),
            size: 10,
            candidate_faculty: vec![FacultyId(faculty.into())],
            feasible_rooms: vec![RoomId(room.into())],
            duration_blocks: 1,
        }
    }

    fn room(id: &str, available: Vec<TimeslotId>) -> Room {
        Room {
            id: RoomId(id.into()),
            building: "A".into(),
            room_type: RoomType::Seminar,
            capacity: 60,
            equipment: vec![],
            availability: available.into_iter().collect(),
            accessible: true,
        }
    }

    fn faculty(id: &str, available: Vec<TimeslotId>) -> Faculty {
        Faculty {
            id: FacultyId(id.into()),
            expertise: vec![],
            max_per_day: 3,
            max_per_week: 12,
            availability: available.into_iter().collect(),
            prefs: FacultyPrefs::default(),
            historical_load: 0,
        }
    }

    #[test]
    fn pin_on_vanished_session_is_fatal() {
        let sessions = vec![];
        let pins = vec![PartialPin {
            session_key: SessionKey("S_C_cohort:X_0".into()),
            timeslot: None,
            room_id: None,
            teacher_id: None,
        }];
        let err = validate_pins(&pins, &sessions, &[], &[], &[]).unwrap_err();
        assert!(matches!(err, PinInfeasible::SessionGone(_)));
    }

    #[test]
    fn pin_on_room_now_unavailable_at_slot_is_fatal() {
        let sessions = vec![session("R204", "F1")];
        let mon2 = TimeslotId::new(DayOfWeek::Mon, 2);
        let grid = types::GridConfig::default();
        let timeslots = grid.timeslots();
        // R204 declares availability everywhere except MON_2 (an outage was applied).
        let available: Vec<TimeslotId> = timeslots
            .iter()
            .map(|t| t.slot_id.clone())
            .filter(|s| s != &mon2)
            .collect();
        let rooms = vec![room("R204", available)];
        let pins = vec![PartialPin {
            session_key: SessionKey("S_C_cohort:X_0".into()),
            timeslot: Some(mon2),
            room_id: Some(RoomId("R204".into())),
            teacher_id: None,
        }];
        let err = validate_pins(&pins, &sessions, &rooms, &[], &timeslots).unwrap_err();
        assert!(matches!(err, PinInfeasible::RoomUnavailable { .. }));
    }

    #[test]
    fn pin_with_room_still_available_validates() {
        let sessions = vec![session("R204", "F1")];
        let grid = types::GridConfig::default();
        let timeslots = grid.timeslots();
        let mon2 = TimeslotId::new(DayOfWeek::Mon, 2);
        let rooms = vec![room("R204", vec![])]; // empty == unrestricted
        let faculty = vec![faculty("F1", vec![])];
        let pins = vec![PartialPin {
            session_key: SessionKey("S_C_cohort:X_0".into()),
            timeslot: Some(mon2),
            room_id: Some(RoomId("R204".into())),
            teacher_id: Some(FacultyId("F1".into())),
        }];
        assert!(validate_pins(&pins, &sessions, &rooms, &faculty, &timeslots).is_ok());
    }

    #[test]
    fn pin_naming_non_candidate_teacher_is_fatal() {
        let sessions = vec![session("R204", "F1")];
        let pins = vec![PartialPin {
            session_key: SessionKey("S_C_cohort:X_0".into()),
            timeslot: None,
            room_id: None,
            teacher_id: Some(FacultyId("F2".into())),
        }];
        let err = validate_pins(&pins, &sessions, &[], &[faculty("F1", vec![])], &[]).unwrap_err();
        assert!(matches!(err, PinInfeasible::TeacherNotCandidate { .. }));
    }

    #[test]
    fn full_lock_mode_pins_room_timeslot_and_teacher() {
        let mut version = TimetableVersion {
            tt_id: "t1".into(),
            assignments: Default::default(),
            pins: Default::default(),
            score_breakdown: Default::default(),
            meta: Default::default(),
        };
        let a = Assignment {
            session_key: SessionKey("S_C_cohort:X_0".into()),
            course_id: CourseId("C".into()),
            timeslot: TimeslotId::new(DayOfWeek::Mon, 2),
            room_id: RoomId("R204".into()),
            teacher_id: FacultyId("F1".into()),
        };
        version.assignments.insert(a.session_key.clone(), a.clone());
        let masks = vec![LockMask {
            courses: vec![],
            teachers: vec![],
            rooms: vec![],
            days: vec![],
            times: vec![],
            lock: LockMode::Full,
            negate: false,
        }];
        let pins = pins_from_masks(&version, &masks);
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].teacher_id, Some(FacultyId("F1".into())));
        assert_eq!(pins[0].room_id, Some(RoomId("R204".into())));
    }
}
