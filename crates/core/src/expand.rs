//! Session expansion (§4.C): turns each course into one `Session` per
//! `(group, weekly occurrence)` pair, each carrying its own candidate rooms/faculty so the
//! model builder never has to re-walk the graph.
//!
//! A `(course, group)` pair with no feasible room or no candidate faculty is dropped here
//! rather than expanded — an empty-candidate session would force an unsatisfiable coverage
//! constraint downstream, so the course is left out and the rest of the timetable still
//! solves (§4.B, §7, §8).

use store::{NodeKey, Store};
use types::{GridConfig, Session, SessionKey};

use crate::oracle::{self, UnschedulableWarning};

/// Expands every course in the store into its constituent weekly sessions, in stable
/// `(course insertion order, group insertion order, occurrence index)` order. Returns the
/// sessions alongside a warning for every group dropped for lack of a feasible room or
/// candidate faculty.
pub fn expand_sessions(store: &Store, grid: &GridConfig) -> (Vec<Session>, Vec<UnschedulableWarning>) {
    let mut sessions = Vec::new();
    let mut warnings = Vec::new();
    for course in store.courses() {
        let course_key = store
            .course_node_key(&course.id)
            .unwrap_or_else(|| panic!("course {} vanished during expansion", course.id.0));
        let weekly = course.weekly_sessions();
        if weekly == 0 {
            continue;
        }
        let groups = oracle::groups_for(store, course_key);
        let faculty = oracle::faculty_for(store, course_key);
        let duration_blocks = grid.duration_blocks(course.duration_min);

        if faculty.is_empty() {
            warnings.push(UnschedulableWarning {
                course_id: course.id.clone(),
                reason: "no faculty can teach this course".into(),
            });
            continue;
        }

        for (group, size) in &groups {
            let rooms = oracle::rooms_for(store, course, *size);
            if rooms.is_empty() {
                warnings.push(UnschedulableWarning {
                    course_id: course.id.clone(),
                    reason: format!("no room fits group {} (size {size})", group.key()),
                });
                continue;
            }
            for k in 0..weekly {
                let session_key = SessionKey::new(&course.id, &group.key(), k);
                sessions.push(Session {
                    session_key,
                    course_id: course.id.clone(),
                    group: group.clone(),
                    size: *size,
                    candidate_faculty: faculty.clone(),
                    feasible_rooms: rooms.clone(),
                    duration_blocks,
                });
            }
        }
    }
    (sessions, warnings)
}
