//! Everything between the entity store and a solver backend: the feasibility oracle, the
//! session expander, the soft-score/KPI reporting, pin carry-over for What-If re-solves,
//! and the `Solver` trait backends implement.
//!
//! Deliberately synchronous end-to-end — no asynchronous I/O belongs in the core.

pub mod error;
pub mod expand;
pub mod oracle;
pub mod scoring;
pub mod validate;
pub mod whatif;

pub use error::{BuildError, PinInfeasible, SolveError, ValidationError};
pub use oracle::UnschedulableWarning;

use types::{Faculty, GridConfig, PartialPin, Policy, Room, SolveParams, SolveResult, Timeslot};

/// A built model ready to hand to a solver backend: the expanded sessions, the resource
/// data a model builder needs to declare occupancy/capacity constraints without re-walking
/// the graph, and whatever pins survived validation.
#[derive(Clone, Debug)]
pub struct BuildPlan {
    pub sessions: Vec<types::Session>,
    pub pins: Vec<PartialPin>,
    pub warnings: Vec<String>,
    pub faculty: Vec<Faculty>,
    pub rooms: Vec<Room>,
    pub timeslots: Vec<Timeslot>,
    pub grid: GridConfig,
    pub policy: Policy,
}

/// Expands sessions from the store, validates any carried-over pins against them, and
/// returns a `BuildPlan` a solver backend can consume directly. A pin that no longer holds
/// (vanished session, unavailable room/teacher at the pinned slot, …) aborts the build with
/// `BuildError::Pin` (§4.F, §7) — it is never silently dropped.
pub fn build_plan(store: &store::Store, pins: Vec<PartialPin>) -> Result<BuildPlan, BuildError> {
    validate::validate_store(store)?;

    let (sessions, expand_warnings) = expand::expand_sessions(store, store.grid());

    let mut warnings: Vec<String> =
        expand_warnings.iter().map(|w| format!("{}: {}", w.course_id.0, w.reason)).collect();
    for course in store.courses() {
        let Some(course_key) = store.course_node_key(&course.id) else {
            continue;
        };
        for w in oracle::check_course_feasibility(store, course_key, course) {
            warnings.push(format!("{}: {}", w.course_id.0, w.reason));
        }
    }

    whatif::validate_pins(&pins, &sessions, store.rooms(), store.faculty_all(), store.timeslots())?;

    let policy = store.policies().first().cloned().unwrap_or_default();

    Ok(BuildPlan {
        sessions,
        pins,
        warnings,
        faculty: store.faculty_all().to_vec(),
        rooms: store.rooms().to_vec(),
        timeslots: store.timeslots().to_vec(),
        grid: store.grid().clone(),
        policy,
    })
}

/// Implemented by every solving backend (MILP-exact, heuristic-repair, or a composite of
/// both). Synchronous by design (§5) — backends that need a worker pool spawn their own
/// threads internally rather than exposing `async fn`.
pub trait Solver: Send + Sync {
    fn solve(&self, plan: &BuildPlan, params: &SolveParams) -> Result<SolveResult, SolveError>;
}

/// Cooperative cancellation token: backends check this between solve phases (and before
/// calling into the underlying search) rather than interrupting mid-search, which neither
/// the MILP backend nor the heuristic repair loop can do safely.
#[derive(Clone, Default)]
pub struct CancelToken(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}
