//! Shared domain vocabulary for the timetabling core: ids, entities, relation tags,
//! the derived `Session`/`Assignment` types, and grid/objective configuration.
//!
//! This crate has no behavior beyond small, local invariants (e.g.
//! `TimeslotId::is_valid_format`) — everything that traverses the entity graph or builds a
//! decision model lives in `store` and `solver-milp` respectively.

mod entities;
mod enums;
mod grid;
mod group;
mod ids;
mod session;
mod solve;

pub use entities::{
    Cohort, Course, Department, Faculty, FacultyPrefs, Policy, Program, Room, Section,
    SoftWeights, Timeslot, YearTerm,
};
pub use enums::{CourseKind, DayOfWeek, Equip, FacilityToken, RoomType};
pub use grid::GridConfig;
pub use group::Group;
pub use ids::{
    CohortId, CourseId, DeptId, FacultyId, PolicyId, ProgramId, RoomId, SectionId, SessionKey,
    TimeslotId, YearTermId,
};
pub use session::Session;
pub use solve::{
    Assignment, LockMask, LockMode, PartialPin, SolveParams, SolveResult, SolveStatus,
    TimetableVersion,
};

/// Relation tags used by the entity graph's edges (§3, §4.A).
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize, schemars::JsonSchema,
)]
pub enum RelationKind {
    /// DEPT `OFFERS` COURSE
    Offers,
    /// FACULTY `CAN_TEACH` COURSE (carries proficiency, last_taught)
    CanTeach,
    /// SECTION `TAKES` COURSE
    Takes,
    /// COHORT `ELECTS` COURSE
    Elects,
    /// COURSE `REQUIRES` COURSE
    Requires,
    /// ROOM `IS_TYPE` FACILITY_TYPE
    IsType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeslot_id_format() {
        let t = TimeslotId::new(DayOfWeek::Wed, 3);
        assert_eq!(t.0, "wed.3");
        assert!(t.is_valid_format());
        assert_eq!(t.day(), Some(DayOfWeek::Wed));
        assert_eq!(t.index(), Some(3));

        assert!(!TimeslotId("nope".into()).is_valid_format());
        assert!(!TimeslotId("wed.x".into()).is_valid_format());
        assert!(!TimeslotId("xyz.3".into()).is_valid_format());
    }

    #[test]
    fn session_key_is_deterministic() {
        let c = CourseId("CORE-MATH-101".into());
        let k1 = SessionKey::new(&c, "section:FYUP_Y1_A", 0);
        let k2 = SessionKey::new(&c, "section:FYUP_Y1_A", 0);
        assert_eq!(k1, k2);
        assert_eq!(k1.0, "S_CORE-MATH-101_section:FYUP_Y1_A_0");
    }

    #[test]
    fn group_key_distinguishes_section_from_cohort() {
        let s = Group::Section(SectionId("A".into()));
        let c = Group::Cohort(CohortId("A".into()));
        assert_ne!(s.key(), c.key());
    }

    #[test]
    fn grid_config_default_matches_reference_shape() {
        let grid = GridConfig::default();
        let slots = grid.timeslots();
        assert_eq!(slots.len(), 5 * 6);
        assert_eq!(slots[0].slot_id.0, "mon.0");
        assert_eq!(slots[0].start_min, 9 * 60);
        assert_eq!(grid.duration_blocks(55), 1);
        assert_eq!(grid.duration_blocks(110), 2);
    }

    #[test]
    fn room_type_capability_matching() {
        assert!(RoomType::Lab.satisfies(FacilityToken::Lab));
        assert!(RoomType::Lab.satisfies(FacilityToken::SmartClass));
        assert!(RoomType::Smart.satisfies(FacilityToken::SmartClass));
        assert!(!RoomType::Smart.satisfies(FacilityToken::Lab));
        assert!(!RoomType::Seminar.satisfies(FacilityToken::SmartClass));
    }
}
