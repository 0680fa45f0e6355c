//! The entity store: typed arenas for every label in the graph plus an adjacency index
//! keyed by relation tag (§4.A, §9). Replaces the reference's `networkx.MultiDiGraph` with
//! `(arena_idx, relation, arena_idx)` edges — no generic graph crate, per the redesign flag
//! that calls the reference's implicit dict-of-dicts coupling out directly.

mod edge;
mod error;
mod node;
mod store;

pub use edge::{Edge, EdgeAttrs};
pub use error::IngestError;
pub use node::{Direction, NodeKey};
pub use store::{Store, NO_AVAILABILITY_SENTINEL};

#[cfg(test)]
mod tests {
    use super::*;
    use types::*;

    fn sample_store() -> Store {
        let mut s = Store::new(GridConfig::default());
        s.add_department(Department {
            id: DeptId("CSE".into()),
            name: "Computer Science".into(),
            buildings: vec!["A-Block".into()],
        })
        .unwrap();
        s.add_course(Course {
            id: CourseId("CORE-CS-101".into()),
            title: "Intro to Programming".into(),
            kind: CourseKind::Core,
            credits: 4,
            hours_theory: 2,
            hours_lab: 1,
            duration_min: 55,
            owner_dept: DeptId("CSE".into()),
            facility_needs: Default::default(),
        })
        .unwrap();
        s.add_faculty(Faculty {
            id: FacultyId("F1".into()),
            expertise: vec![],
            max_per_day: 3,
            max_per_week: 12,
            availability: Default::default(),
            prefs: Default::default(),
            historical_load: 0,
        })
        .unwrap();
        s.add_room(Room {
            id: RoomId("R1".into()),
            building: "A-Block".into(),
            room_type: RoomType::Seminar,
            capacity: 60,
            equipment: vec![],
            availability: Default::default(),
            accessible: true,
        })
        .unwrap();
        s
    }

    #[test]
    fn ingest_is_idempotent_order_and_rejects_duplicates() {
        let mut s = sample_store();
        let err = s
            .add_department(Department {
                id: DeptId("CSE".into()),
                name: "dup".into(),
                buildings: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, IngestError::Duplicate { .. }));
    }

    #[test]
    fn link_rejects_unknown_endpoints() {
        let mut s = sample_store();
        let err = s
            .dept_offers_course(&DeptId("NOPE".into()), &CourseId("CORE-CS-101".into()))
            .unwrap_err();
        assert!(matches!(err, IngestError::UnknownNode { .. }));
    }

    #[test]
    fn neighbors_round_trip_both_directions() {
        let mut s = sample_store();
        s.dept_offers_course(&DeptId("CSE".into()), &CourseId("CORE-CS-101".into()))
            .unwrap();
        s.faculty_can_teach(&FacultyId("F1".into()), &CourseId("CORE-CS-101".into()), None, None)
            .unwrap();

        let dept_key = NodeKey::Department(0);
        let out: Vec<_> = s
            .neighbors(dept_key, Some(RelationKind::Offers), Direction::Out)
            .collect();
        assert_eq!(out.len(), 1);

        let course_key = NodeKey::Course(0);
        let teachers: Vec<_> = s
            .neighbors(course_key, Some(RelationKind::CanTeach), Direction::In)
            .collect();
        assert_eq!(teachers.len(), 1);
    }

    #[test]
    fn stable_iteration_order_matches_insertion() {
        let mut s = Store::new(GridConfig::default());
        for i in 0..5 {
            s.add_course(Course {
                id: CourseId(format!("C{i}")),
                title: format!("course {i}"),
                kind: CourseKind::Core,
                credits: 1,
                hours_theory: 1,
                hours_lab: 0,
                duration_min: 55,
                owner_dept: DeptId("CSE".into()),
                facility_needs: Default::default(),
            })
            .unwrap();
        }
        let ids: Vec<_> = s.courses().iter().map(|c| c.id.0.clone()).collect();
        assert_eq!(ids, vec!["C0", "C1", "C2", "C3", "C4"]);
    }

    #[test]
    fn faculty_leave_clears_then_restricts_availability() {
        let mut s = sample_store();
        let leave_slot = TimeslotId::new(DayOfWeek::Mon, 0);
        s.apply_faculty_leave(&FacultyId("F1".into()), &[leave_slot.clone()])
            .unwrap();
        let f = s.faculty(&FacultyId("F1".into())).unwrap();
        assert!(!f.availability.contains(&leave_slot));
        assert!(f.availability.contains(&TimeslotId::new(DayOfWeek::Tue, 0)));
    }

    #[test]
    fn room_outage_restricts_availability() {
        let mut s = sample_store();
        let out_slot = TimeslotId::new(DayOfWeek::Wed, 2);
        s.apply_room_outage(&RoomId("R1".into()), &[out_slot.clone()])
            .unwrap();
        let r = s.room(&RoomId("R1".into())).unwrap();
        assert!(!r.availability.contains(&out_slot));
    }

    #[test]
    fn remove_course_tombstones_without_shifting_indices() {
        let mut s = sample_store();
        let before = s.courses().len();
        s.remove_course(&CourseId("CORE-CS-101".into())).unwrap();
        assert_eq!(s.courses().len(), before - 1);
        assert!(s.course(&CourseId("CORE-CS-101".into())).is_none());
    }

    #[test]
    fn enrollment_add_remove_round_trips() {
        let mut s = sample_store();
        let section = SectionId("FYUP_Y1_A".into());
        s.add_year(YearTerm {
            id: YearTermId("Y1".into()),
            program_id: ProgramId("FYUP".into()),
            term_no: 1,
        })
        .unwrap();
        s.add_section(Section {
            id: section.clone(),
            year_id: YearTermId("Y1".into()),
            capacity: 60,
            tags: Default::default(),
            preferred_windows: vec![],
        })
        .unwrap();
        let group = Group::Section(section);
        s.add_enrollment(&group, &CourseId("CORE-CS-101".into())).unwrap();
        let course_key = NodeKey::Course(0);
        assert_eq!(
            s.neighbors(course_key, Some(RelationKind::Takes), Direction::In)
                .count(),
            1
        );
        s.remove_enrollment(&group, &CourseId("CORE-CS-101".into())).unwrap();
        assert_eq!(
            s.neighbors(course_key, Some(RelationKind::Takes), Direction::In)
                .count(),
            0
        );
    }
}
