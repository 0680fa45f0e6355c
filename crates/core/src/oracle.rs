//! The feasibility oracle (§4.B): answers "which rooms/faculty/groups could possibly serve
//! this course" by walking the entity graph, before the expander turns that into sessions
//! and the model builder turns sessions into decision variables.

use store::{Direction, NodeKey, Store};
use types::{Course, CourseId, FacultyId, Group, RoomId};

#[derive(Clone, Debug)]
pub struct UnschedulableWarning {
    pub course_id: CourseId,
    pub reason: String,
}

/// Rooms whose type and capacity can seat the course's largest enrolled group, and whose
/// facility needs (`lab`, `smart_class`) the room type satisfies.
pub fn rooms_for(store: &Store, course: &Course, min_capacity: u32) -> Vec<RoomId> {
    store
        .rooms()
        .iter()
        .filter(|r| r.accessible)
        .filter(|r| r.capacity >= min_capacity)
        .filter(|r| {
            course
                .facility_needs
                .iter()
                .filter(|(_, &needed)| needed)
                .all(|(token, _)| r.room_type.satisfies(*token))
        })
        .map(|r| r.id.clone())
        .collect()
}

/// Faculty linked to the course by `CAN_TEACH`, in edge-insertion order (stable for
/// reproducible solver runs).
pub fn faculty_for(store: &Store, course_key: NodeKey) -> Vec<FacultyId> {
    store
        .neighbors(course_key, Some(types::RelationKind::CanTeach), Direction::In)
        .filter_map(|k| match k {
            NodeKey::Faculty(idx) => store.faculty_all().get(idx).map(|f| f.id.clone()),
            _ => None,
        })
        .collect()
}

/// Every section/cohort that `TAKES`/`ELECTS` the course, each carrying its own enrollment
/// size (§9: sections and cohorts both act as "groups" but via different relations).
pub fn groups_for(store: &Store, course_key: NodeKey) -> Vec<(Group, u32)> {
    let mut out = Vec::new();
    for k in store.neighbors(course_key, Some(types::RelationKind::Takes), Direction::In) {
        if let NodeKey::Section(idx) = k {
            if let Some(s) = store.sections().get(idx) {
                out.push((Group::Section(s.id.clone()), s.capacity));
            }
        }
    }
    for k in store.neighbors(course_key, Some(types::RelationKind::Elects), Direction::In) {
        if let NodeKey::Cohort(idx) = k {
            if let Some(c) = store.cohorts().get(idx) {
                out.push((Group::Cohort(c.id.clone()), c.size));
            }
        }
    }
    out
}

/// Checks a course has at least one section or cohort taking it — the one drop condition
/// the expander can't detect by itself, since it simply has no group to iterate over.
/// Non-fatal (§4.B, §7). The per-group room/faculty checks live in [`crate::expand`], which
/// drops and warns on exactly the groups it can't emit sessions for.
pub fn check_course_feasibility(store: &Store, course_key: NodeKey, course: &Course) -> Vec<UnschedulableWarning> {
    if groups_for(store, course_key).is_empty() {
        vec![UnschedulableWarning {
            course_id: course.id.clone(),
            reason: "no section or cohort takes this course".into(),
        }]
    } else {
        vec![]
    }
}
