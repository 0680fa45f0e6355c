//! End-to-end scenarios exercising the whole pipeline (store → build_plan → MilpSolver)
//! against the toy setup carried through the whole spec: two sections taking a core math
//! course, cohorts electing it, a faculty leave, and a pin that a subsequent room outage
//! invalidates.

use sched_core::{build_plan, BuildError, PinInfeasible, Solver};
use solver_milp::MilpSolver;
use std::collections::HashSet;
use store::Store;
use types::*;

fn base_store() -> Store {
    let mut s = Store::new(GridConfig::default());
    s.add_department(Department {
        id: DeptId("CSE".into()),
        name: "Computer Science".into(),
        buildings: vec!["A-Block".into()],
    })
    .unwrap();
    s.add_program(Program {
        id: ProgramId("FYUP".into()),
        name: "FYUP".into(),
        duration_terms: 8,
    })
    .unwrap();
    s.add_year(YearTerm {
        id: YearTermId("Y1".into()),
        program_id: ProgramId("FYUP".into()),
        term_no: 1,
    })
    .unwrap();

    for letter in ["A", "B"] {
        s.add_section(Section {
            id: SectionId(format!("FYUP_Y1_{letter}")),
            year_id: YearTermId("Y1".into()),
            capacity: 60,
            tags: Default::default(),
            preferred_windows: vec![],
        })
        .unwrap();
    }

    let mut smart_needs = std::collections::HashMap::new();
    smart_needs.insert(FacilityToken::SmartClass, true);
    s.add_course(Course {
        id: CourseId("CORE-MATH-101".into()),
        title: "Calculus".into(),
        kind: CourseKind::Core,
        credits: 4,
        hours_theory: 4,
        hours_lab: 0,
        duration_min: 55,
        owner_dept: DeptId("CSE".into()),
        facility_needs: smart_needs,
    })
    .unwrap();
    s.dept_offers_course(&DeptId("CSE".into()), &CourseId("CORE-MATH-101".into()))
        .unwrap();
    for letter in ["A", "B"] {
        s.section_takes_course(
            &SectionId(format!("FYUP_Y1_{letter}")),
            &CourseId("CORE-MATH-101".into()),
        )
        .unwrap();
    }

    s.add_faculty(Faculty {
        id: FacultyId("F-CS-1".into()),
        expertise: vec!["math".into()],
        max_per_day: 4,
        max_per_week: 16,
        availability: Default::default(),
        prefs: Default::default(),
        historical_load: 0,
    })
    .unwrap();
    s.add_faculty(Faculty {
        id: FacultyId("F-CS-2".into()),
        expertise: vec!["math".into()],
        max_per_day: 4,
        max_per_week: 16,
        availability: Default::default(),
        prefs: Default::default(),
        historical_load: 0,
    })
    .unwrap();
    s.faculty_can_teach(&FacultyId("F-CS-1".into()), &CourseId("CORE-MATH-101".into()), None, None)
        .unwrap();
    s.faculty_can_teach(&FacultyId("F-CS-2".into()), &CourseId("CORE-MATH-101".into()), None, None)
        .unwrap();

    s.add_room(Room {
        id: RoomId("R101".into()),
        building: "A-Block".into(),
        room_type: RoomType::Smart,
        capacity: 80,
        equipment: vec![],
        availability: Default::default(),
        accessible: true,
    })
    .unwrap();
    s.add_room(Room {
        id: RoomId("R204".into()),
        building: "A-Block".into(),
        room_type: RoomType::Smart,
        capacity: 120,
        equipment: vec![],
        availability: Default::default(),
        accessible: true,
    })
    .unwrap();
    s.add_room(Room {
        id: RoomId("LAB1".into()),
        building: "A-Block".into(),
        room_type: RoomType::Lab,
        capacity: 40,
        equipment: vec![],
        availability: Default::default(),
        accessible: true,
    })
    .unwrap();

    s
}

/// Scenario 1 (§8): 2 sections x 4h/wk CORE-MATH-101 across 3 rooms, 2 faculty.
#[test]
fn scenario_1_core_math_schedules_with_no_clashes_and_never_uses_the_undersized_lab() {
    let s = base_store();
    let plan = build_plan(&s, vec![]).unwrap();
    assert_eq!(plan.sessions.len(), 8);

    let solver = MilpSolver::new();
    let result = solver.solve(&plan, &SolveParams::default()).unwrap();
    assert!(result.status.is_usable(), "expected OPTIMAL/FEASIBLE, got {:?}", result.status);
    assert_eq!(result.assignments.len(), 8);

    let mut room_slot = HashSet::new();
    let mut faculty_slot = HashSet::new();
    for a in &result.assignments {
        assert_ne!(a.room_id.0, "LAB1", "LAB1 (cap 40) cannot seat a 60-strong section");
        assert!(room_slot.insert((a.room_id.clone(), a.timeslot.clone())), "room/slot clash");
        assert!(faculty_slot.insert((a.teacher_id.clone(), a.timeslot.clone())), "faculty/slot clash");
    }
}

/// Scenario 2 (§8): add a VAC cohort electing a smart_class course; it lands in R101/R204 only.
#[test]
fn scenario_2_vac_cohort_lands_only_in_smart_capable_rooms() {
    let mut s = base_store();
    let mut smart_needs = std::collections::HashMap::new();
    smart_needs.insert(FacilityToken::SmartClass, true);
    s.add_course(Course {
        id: CourseId("VAC-DS-201".into()),
        title: "Data Science Essentials".into(),
        kind: CourseKind::Vac,
        credits: 2,
        hours_theory: 2,
        hours_lab: 0,
        duration_min: 55,
        owner_dept: DeptId("CSE".into()),
        facility_needs: smart_needs,
    })
    .unwrap();
    s.dept_offers_course(&DeptId("CSE".into()), &CourseId("VAC-DS-201".into())).unwrap();
    s.add_cohort(Cohort {
        id: CohortId("VAC-DS".into()),
        constituent_sections: vec![SectionId("FYUP_Y1_A".into()), SectionId("FYUP_Y1_B".into())],
        bundled_courses: vec![CourseId("VAC-DS-201".into())],
        size: 70,
    })
    .unwrap();
    s.cohort_elects_course(&CohortId("VAC-DS".into()), &CourseId("VAC-DS-201".into())).unwrap();
    s.faculty_can_teach(&FacultyId("F-CS-1".into()), &CourseId("VAC-DS-201".into()), None, None)
        .unwrap();

    let plan = build_plan(&s, vec![]).unwrap();
    assert_eq!(plan.sessions.len(), 10);

    let solver = MilpSolver::new();
    let result = solver.solve(&plan, &SolveParams::default()).unwrap();
    assert!(result.status.is_usable());
    for a in result.assignments.iter().filter(|a| a.course_id.0 == "VAC-DS-201") {
        assert!(matches!(a.room_id.0.as_str(), "R101" | "R204"));
    }
}

/// Scenario 3 (§8): add an AEC cohort electing a second course; total scheduled sessions
/// across both courses reaches 12 and still clash-free.
#[test]
fn scenario_3_aec_cohort_brings_total_to_twelve_sessions() {
    let mut s = base_store();
    let mut smart_needs = std::collections::HashMap::new();
    smart_needs.insert(FacilityToken::SmartClass, true);
    s.add_course(Course {
        id: CourseId("VAC-DS-201".into()),
        title: "Data Science Essentials".into(),
        kind: CourseKind::Vac,
        credits: 2,
        hours_theory: 2,
        hours_lab: 0,
        duration_min: 55,
        owner_dept: DeptId("CSE".into()),
        facility_needs: smart_needs,
    })
    .unwrap();
    s.dept_offers_course(&DeptId("CSE".into()), &CourseId("VAC-DS-201".into())).unwrap();
    s.add_cohort(Cohort {
        id: CohortId("VAC-DS".into()),
        constituent_sections: vec![SectionId("FYUP_Y1_A".into()), SectionId("FYUP_Y1_B".into())],
        bundled_courses: vec![CourseId("VAC-DS-201".into())],
        size: 70,
    })
    .unwrap();
    s.cohort_elects_course(&CohortId("VAC-DS".into()), &CourseId("VAC-DS-201".into())).unwrap();
    s.faculty_can_teach(&FacultyId("F-CS-1".into()), &CourseId("VAC-DS-201".into()), None, None)
        .unwrap();

    s.add_course(Course {
        id: CourseId("AEC-ENG-101".into()),
        title: "Technical English".into(),
        kind: CourseKind::Aec,
        credits: 2,
        hours_theory: 2,
        hours_lab: 0,
        duration_min: 55,
        owner_dept: DeptId("CSE".into()),
        facility_needs: Default::default(),
    })
    .unwrap();
    s.dept_offers_course(&DeptId("CSE".into()), &CourseId("AEC-ENG-101".into())).unwrap();
    s.add_cohort(Cohort {
        id: CohortId("AEC-ENG".into()),
        constituent_sections: vec![SectionId("FYUP_Y1_A".into()), SectionId("FYUP_Y1_B".into())],
        bundled_courses: vec![CourseId("AEC-ENG-101".into())],
        size: 50,
    })
    .unwrap();
    s.cohort_elects_course(&CohortId("AEC-ENG".into()), &CourseId("AEC-ENG-101".into())).unwrap();
    s.faculty_can_teach(&FacultyId("F-CS-2".into()), &CourseId("AEC-ENG-101".into()), None, None)
        .unwrap();

    let plan = build_plan(&s, vec![]).unwrap();
    assert_eq!(plan.sessions.len(), 12);

    let solver = MilpSolver::new();
    let result = solver.solve(&plan, &SolveParams::default()).unwrap();
    assert!(result.status.is_usable());
    assert_eq!(result.assignments.len(), 12);

    let mut room_slot = HashSet::new();
    let mut faculty_slot = HashSet::new();
    for a in &result.assignments {
        assert!(room_slot.insert((a.room_id.clone(), a.timeslot.clone())), "room/slot clash");
        assert!(faculty_slot.insert((a.teacher_id.clone(), a.timeslot.clone())), "faculty/slot clash");
    }
}

/// Scenario 4 (§8): a faculty leave removes WED indices 2..4; the re-solve stays feasible and
/// avoids those cells for every session that faculty could have taught.
#[test]
fn scenario_4_faculty_leave_avoids_the_leave_window_on_resolve() {
    let mut s = base_store();
    let leave_slots = vec![TimeslotId::new(DayOfWeek::Wed, 2), TimeslotId::new(DayOfWeek::Wed, 3)];
    s.apply_faculty_leave(&FacultyId("F-CS-1".into()), &leave_slots).unwrap();

    let plan = build_plan(&s, vec![]).unwrap();
    let solver = MilpSolver::new();
    let result = solver.solve(&plan, &SolveParams::default()).unwrap();
    assert!(result.status.is_usable());
    for a in &result.assignments {
        if a.teacher_id.0 == "F-CS-1" {
            assert!(!leave_slots.contains(&a.timeslot));
        }
    }
}

/// Scenario 5 (§8): emptying a faculty's *entire* remaining availability, when that faculty
/// uniquely covers a course's candidate set, makes the build INFEASIBLE.
#[test]
fn scenario_5_total_faculty_unavailability_is_infeasible() {
    let mut s = Store::new(GridConfig::default());
    s.add_department(Department { id: DeptId("CSE".into()), name: "CS".into(), buildings: vec![] })
        .unwrap();
    s.add_program(Program { id: ProgramId("FYUP".into()), name: "FYUP".into(), duration_terms: 8 })
        .unwrap();
    s.add_year(YearTerm { id: YearTermId("Y1".into()), program_id: ProgramId("FYUP".into()), term_no: 1 })
        .unwrap();
    s.add_section(Section {
        id: SectionId("FYUP_Y1_A".into()),
        year_id: YearTermId("Y1".into()),
        capacity: 60,
        tags: Default::default(),
        preferred_windows: vec![],
    })
    .unwrap();
    s.add_course(Course {
        id: CourseId("CORE-MATH-101".into()),
        title: "Calculus".into(),
        kind: CourseKind::Core,
        credits: 4,
        hours_theory: 4,
        hours_lab: 0,
        duration_min: 55,
        owner_dept: DeptId("CSE".into()),
        facility_needs: Default::default(),
    })
    .unwrap();
    s.dept_offers_course(&DeptId("CSE".into()), &CourseId("CORE-MATH-101".into())).unwrap();
    s.section_takes_course(&SectionId("FYUP_Y1_A".into()), &CourseId("CORE-MATH-101".into())).unwrap();
    s.add_faculty(Faculty {
        id: FacultyId("F-CS-1".into()),
        expertise: vec![],
        max_per_day: 4,
        max_per_week: 16,
        availability: Default::default(),
        prefs: Default::default(),
        historical_load: 0,
    })
    .unwrap();
    s.faculty_can_teach(&FacultyId("F-CS-1".into()), &CourseId("CORE-MATH-101".into()), None, None)
        .unwrap();
    s.add_room(Room {
        id: RoomId("R1".into()),
        building: "A".into(),
        room_type: RoomType::Seminar,
        capacity: 60,
        equipment: vec![],
        availability: Default::default(),
        accessible: true,
    })
    .unwrap();

    let all_slots: Vec<TimeslotId> = s.timeslots().iter().map(|t| t.slot_id.clone()).collect();
    s.apply_faculty_leave(&FacultyId("F-CS-1".into()), &all_slots).unwrap();

    let plan = build_plan(&s, vec![]).unwrap();
    let solver = MilpSolver::new();
    let result = solver.solve(&plan, &SolveParams::default()).unwrap();
    assert_eq!(result.status, SolveStatus::Infeasible);
}

/// Scenario 6 (§8): pin a session to a room, then take that room out at the pinned slot —
/// the next build must fail fast with `BuildError::Pin`, never silently drop the pin.
#[test]
fn scenario_6_pin_then_room_outage_is_pin_infeasible() {
    let mut s = base_store();
    let mon2 = TimeslotId::new(DayOfWeek::Mon, 2);

    let plan = build_plan(&s, vec![]).unwrap();
    let pinned_session = plan
        .sessions
        .iter()
        .find(|sess| sess.course_id.0 == "CORE-MATH-101" && sess.group.key() == "section:FYUP_Y1_A")
        .expect("at least one CORE-MATH-101 session for section A")
        .session_key
        .clone();

    s.apply_room_outage(&RoomId("R204".into()), &[mon2.clone()]).unwrap();

    let pin = PartialPin {
        session_key: pinned_session,
        timeslot: Some(mon2),
        room_id: Some(RoomId("R204".into())),
        teacher_id: None,
    };
    let err = build_plan(&s, vec![pin]).unwrap_err();
    assert!(matches!(err, BuildError::Pin(PinInfeasible::RoomUnavailable { .. })));
}
