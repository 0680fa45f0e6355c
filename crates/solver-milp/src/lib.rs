//! Exact MILP backend: builds the session-indexed assignment model in [`milp_core`] and
//! hands it to `good_lp`'s CBC backend. Synchronous end-to-end (§5) — no `async fn` here.

mod milp_core;

use good_lp::{Solution, SolverModel};
use sched_core::{BuildPlan, CancelToken, SolveError, Solver};
use tracing::{info, warn};
use types::{SolveParams, SolveResult, SolveStatus};

pub struct MilpSolver;

impl MilpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MilpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for MilpSolver {
    fn solve(&self, plan: &BuildPlan, params: &SolveParams) -> Result<SolveResult, SolveError> {
        solve(plan, params, &CancelToken::new())
    }
}

impl MilpSolver {
    /// Same as `Solver::solve`, but checked against a cancellation token before the
    /// (uninterruptible) call into CBC — cooperative cancellation (§5) can only happen
    /// between phases, not mid-search.
    pub fn solve_cancellable(
        &self,
        plan: &BuildPlan,
        params: &SolveParams,
        cancel: &CancelToken,
    ) -> Result<SolveResult, SolveError> {
        solve(plan, params, cancel)
    }
}

fn solve(plan: &BuildPlan, params: &SolveParams, cancel: &CancelToken) -> Result<SolveResult, SolveError> {
    use good_lp::{default_solver, ProblemVariables};
    use milp_core::*;

    info!(sessions = plan.sessions.len(), rooms = plan.rooms.len(), faculty = plan.faculty.len(), "building MILP model");

    if cancel.is_cancelled() {
        return Err(SolveError::Cancelled);
    }

    let prep = build_prep(plan);

    let mut pvars = ProblemVariables::new();
    let assign = declare_assign_vars(&prep, &mut pvars);
    if assign.is_empty() {
        warn!("no feasible assignment variables — every session is unplaceable under current pins/availability");
        return Ok(SolveResult {
            status: SolveStatus::Infeasible,
            objective: 0.0,
            assignments: vec![],
            warnings: vec!["no feasible (session, timeslot, room, faculty) tuples".into()],
            stats: serde_json::json!({"method": "milp", "sessions": plan.sessions.len()}),
        });
    }
    let z = declare_z_vars(&prep, &mut pvars, &assign);
    let (ot, og) = declare_occupancy_vars(&prep, &mut pvars);
    let (adj_t, adj_g) = declare_adjacency_vars(&prep, &mut pvars);
    let v = Vars { assign, z, ot, og, adj_t, adj_g };

    if cancel.is_cancelled() {
        return Err(SolveError::Cancelled);
    }

    let objective = build_objective(&prep, &v);

    // `params.time_limit_s`/`params.workers` are not wired into the CBC call: good_lp's
    // `SolverModel` trait has no cross-backend way to express either, and reaching past it
    // into `coin_cbc`-specific configuration would tie this backend to one crate version.
    // The heuristic-repair backend is where the time budget is actually enforced (§5).
    let mut model = pvars.minimise(objective.clone()).using(default_solver);
    model = add_session_coverage_constraints(model, &prep, &v);
    model = link_z_vars(model, &v);
    model = add_room_capacity_constraints(model, &prep, &v);
    model = link_occupancy_and_capacity(model, &prep, &v);
    model = add_adjacency_constraints(model, &v);
    model = add_faculty_cap_constraints(model, &prep, &v);

    match model.solve() {
        Ok(sol) => {
            let assignments = extract_solution(&prep, &v, &sol);
            let status = if assignments.len() == plan.sessions.len() {
                SolveStatus::Optimal
            } else {
                SolveStatus::Feasible
            };
            let kpis = sched_core::scoring::report(
                &plan.sessions,
                &assignments,
                &plan.faculty,
                &plan.rooms,
                &plan.policy,
                &plan.timeslots,
            );
            Ok(SolveResult {
                status,
                objective: sol.eval(objective),
                assignments,
                warnings: vec![],
                stats: serde_json::json!({
                    "method": "milp",
                    "sessions": plan.sessions.len(),
                    "timeslots": prep.times.len(),
                    "rooms": plan.rooms.len(),
                    "faculty": plan.faculty.len(),
                    "pins": plan.pins.len(),
                    "time_limit_s": params.time_limit_s,
                    "kpis": kpis,
                }),
            })
        }
        Err(e) => {
            warn!(error = %e, "CBC returned no solution, reporting infeasible");
            Ok(SolveResult {
                status: SolveStatus::Infeasible,
                objective: 0.0,
                assignments: vec![],
                warnings: vec![format!("milp backend: {e}")],
                stats: serde_json::json!({"method": "milp", "error": e.to_string()}),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::build_plan;
    use store::Store;
    use types::*;

    fn toy_store() -> Store {
        let mut s = Store::new(GridConfig::default());
        s.add_department(Department {
            id: DeptId("CSE".into()),
            name: "CS".into(),
            buildings: vec![],
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
            hours_theory: 1,
            hours_lab: 0,
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
            building: "A".into(),
            room_type: RoomType::Seminar,
            capacity: 60,
            equipment: vec![],
            availability: Default::default(),
            accessible: true,
        })
        .unwrap();
        s.dept_offers_course(&DeptId("CSE".into()), &CourseId("CORE-MATH-101".into()))
            .unwrap();
        s.section_takes_course(&SectionId("FYUP_Y1_A".into()), &CourseId("CORE-MATH-101".into()))
            .unwrap();
        s.faculty_can_teach(&FacultyId("F1".into()), &CourseId("CORE-MATH-101".into()), None, None)
            .unwrap();
        s
    }

    #[test]
    fn single_session_single_room_single_faculty_is_optimal() {
        let s = toy_store();
        let plan = build_plan(&s, vec![]).unwrap();
        let solver = MilpSolver::new();
        let result = solver.solve(&plan, &SolveParams::default()).unwrap();
        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].room_id, RoomId("R1".into()));
        assert_eq!(result.assignments[0].teacher_id, FacultyId("F1".into()));
    }

    #[test]
    fn total_faculty_unavailability_is_infeasible() {
        let mut s = toy_store();
        let all_slots: Vec<TimeslotId> = s.timeslots().iter().map(|t| t.slot_id.clone()).collect();
        s.apply_faculty_leave(&FacultyId("F1".into()), &all_slots).unwrap();
        let plan = build_plan(&s, vec![]).unwrap();
        let solver = MilpSolver::new();
        let result = solver.solve(&plan, &SolveParams::default()).unwrap();
        assert_eq!(result.status, SolveStatus::Infeasible);
    }
}
