//! Heuristic repair backend: a steady-state genetic algorithm over session-indexed
//! placements. Reworked from a course-indexed construct-then-mutate loop into one that
//! honors per-session `duration_blocks` (a session can span more than one timeslot without
//! crossing a day boundary), a session's full `feasible_rooms`/`candidate_faculty` sets, and
//! `PartialPin`s with an explicit teacher (§9). Synchronous end-to-end (§5).

use rand::{seq::SliceRandom, Rng};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{BuildPlan, CancelToken, SolveError, Solver};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use types::{
    Assignment, DayOfWeek, Faculty, FacultyId, PartialPin, RoomId, SessionKey, SolveParams,
    SolveResult, SolveStatus, Timeslot, TimeslotId,
};

pub struct HeurSolver;

impl HeurSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeurSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for HeurSolver {
    fn solve(&self, plan: &BuildPlan, params: &SolveParams) -> Result<SolveResult, SolveError> {
        solve(plan, params, &CancelToken::new())
    }
}

impl HeurSolver {
    /// Same as `Solver::solve`, checked against `cancel` between GA generations — the only
    /// point cooperative cancellation (§5) can safely interrupt this backend.
    pub fn solve_cancellable(
        &self,
        plan: &BuildPlan,
        params: &SolveParams,
        cancel: &CancelToken,
    ) -> Result<SolveResult, SolveError> {
        solve(plan, params, cancel)
    }

    /// Local-search repair from an existing placement (§4.F's re-solve path): seeds the
    /// population with `base` wherever a session's old placement is still feasible, falls
    /// back to a fresh random build for the rest, then runs `steps` mutation rounds keeping
    /// only improving children. Returns whatever `base` it received, unmodified and with an
    /// infinite objective, if even a fresh build can't cover every session.
    pub fn improve_from(
        &self,
        plan: &BuildPlan,
        base: &[Assignment],
        seed: u64,
        steps: u32,
    ) -> (Vec<Assignment>, f64) {
        let prep = build_prep(plan);
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);

        let Some(mut parent) = construct_from_base(&prep, base, &mut rng)
            .or_else(|| randomized_construct(&prep, &mut rng))
        else {
            return (base.to_vec(), f64::INFINITY);
        };
        parent.evaluate(&prep);

        for _ in 0..steps {
            let mut child = mutate(&prep, parent.clone(), &mut rng);
            child.evaluate(&prep);
            if child.objective < parent.objective {
                parent = child;
            }
        }
        (parent.to_assignments(&prep), parent.objective)
    }
}

fn solve(plan: &BuildPlan, params: &SolveParams, cancel: &CancelToken) -> Result<SolveResult, SolveError> {
    if cancel.is_cancelled() {
        return Err(SolveError::Cancelled);
    }

    let prep = build_prep(plan);
    info!(sessions = plan.sessions.len(), rooms = plan.rooms.len(), faculty = plan.faculty.len(), "built GA candidate sets");

    if let Some(si) = prep.feas.iter().position(|opts| opts.is_empty()) {
        let key = &plan.sessions[si].session_key;
        warn!(session = %key.0, "no feasible tuple for session");
        return Ok(SolveResult {
            status: SolveStatus::Infeasible,
            objective: 0.0,
            assignments: vec![],
            warnings: vec![format!(
                "session {} has no feasible (timeslot, room, faculty) tuple",
                key.0
            )],
            stats: serde_json::json!({"method": "heuristic-repair", "sessions": plan.sessions.len()}),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let pop_size = 40usize.min(10 + plan.sessions.len() * 2).max(1);
    let iters = params.repair_steps.unwrap_or(300) as usize;

    let mut population: Vec<Candidate> = Vec::new();
    while population.len() < pop_size {
        if cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }
        match randomized_construct(&prep, &mut rng) {
            Some(c) => population.push(c),
            None => break,
        }
    }

    if population.is_empty() {
        warn!("GA construction never produced a complete placement");
        return Ok(SolveResult {
            status: SolveStatus::Infeasible,
            objective: 0.0,
            assignments: vec![],
            warnings: vec!["heuristic construction could not place every session".into()],
            stats: serde_json::json!({"method": "heuristic-repair"}),
        });
    }
    population.sort_by(|a, b| a.objective.total_cmp(&b.objective));

    for _ in 0..iters {
        if cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }
        let parent = tournament(&population, 3, &mut rng).clone();
        let mut child = mutate(&prep, parent, &mut rng);
        child.evaluate(&prep);
        if let Some(worst) = population.last() {
            if child.objective < worst.objective {
                population.pop();
                insert_sorted(&mut population, child);
            }
        }
    }

    let best = &population[0];
    info!(objective = best.objective, population = population.len(), "GA converged");
    let assignments = best.to_assignments(&prep);
    let kpis = sched_core::scoring::report(
        &plan.sessions,
        &assignments,
        &plan.faculty,
        &plan.rooms,
        &plan.policy,
        &plan.timeslots,
    );
    Ok(SolveResult {
        status: SolveStatus::Feasible,
        objective: best.objective,
        assignments,
        warnings: vec![],
        stats: serde_json::json!({
            "method": "heuristic-repair",
            "population": population.len(),
            "iterations": iters,
            "kpis": kpis,
        }),
    })
}

/// Per-session candidate placements and the lookups needed to evaluate/mutate them, built
/// once per solve from a `BuildPlan`.
struct Prep<'a> {
    plan: &'a BuildPlan,
    times: &'a [Timeslot],
    day_of: Vec<DayOfWeek>,
    faculty_by_id: HashMap<String, Faculty>,
    all_slots_by_day: HashMap<DayOfWeek, Vec<TimeslotId>>,
    /// `feas[si]` is every `(timeslot_idx, room_idx, faculty_idx)` a session can legally
    /// occupy, already pruned by any carried-over `PartialPin`.
    feas: Vec<Vec<(usize, usize, usize)>>,
}

/// Consecutive timeslot indices `start..start+blocks`, or `None` if they'd spill past a day
/// boundary — a multi-block session never straddles two days.
fn block_indices(day_of: &[DayOfWeek], start: usize, blocks: u32) -> Option<Vec<usize>> {
    let blocks = blocks as usize;
    if start + blocks > day_of.len() {
        return None;
    }
    let day = day_of[start];
    let idxs: Vec<usize> = (start..start + blocks).collect();
    idxs.iter().all(|&i| day_of[i] == day).then_some(idxs)
}

fn room_available_for_blocks(plan: &BuildPlan, times: &[Timeslot], ri: usize, blocks: &[usize]) -> bool {
    let room = &plan.rooms[ri];
    blocks.iter().all(|&k| room.is_available(&times[k].slot_id, true))
}

fn faculty_available_for_blocks(plan: &BuildPlan, times: &[Timeslot], fi: usize, blocks: &[usize]) -> bool {
    let faculty = &plan.faculty[fi];
    blocks.iter().all(|&k| faculty.is_available(&times[k].slot_id, true))
}

fn build_prep(plan: &BuildPlan) -> Prep<'_> {
    let times = plan.timeslots.as_slice();
    let day_of: Vec<DayOfWeek> = times.iter().map(|t| t.day).collect();

    let idx_ts: HashMap<&TimeslotId, usize> = times.iter().enumerate().map(|(i, t)| (&t.slot_id, i)).collect();
    let idx_room: HashMap<&RoomId, usize> = plan.rooms.iter().enumerate().map(|(i, r)| (&r.id, i)).collect();
    let idx_faculty: HashMap<&FacultyId, usize> = plan.faculty.iter().enumerate().map(|(i, f)| (&f.id, i)).collect();

    let faculty_by_id: HashMap<String, Faculty> = plan.faculty.iter().map(|f| (f.id.0.clone(), f.clone())).collect();

    let mut all_slots_by_day: HashMap<DayOfWeek, Vec<TimeslotId>> = HashMap::new();
    for t in times {
        all_slots_by_day.entry(t.day).or_default().push(t.slot_id.clone());
    }
    for slots in all_slots_by_day.values_mut() {
        slots.sort_by_key(|s| idx_ts.get(s).map(|&i| times[i].index).unwrap_or(0));
    }

    let pins_by_session: HashMap<&SessionKey, &PartialPin> =
        plan.pins.iter().map(|p| (&p.session_key, p)).collect();

    let mut feas: Vec<Vec<(usize, usize, usize)>> = Vec::with_capacity(plan.sessions.len());
    for session in &plan.sessions {
        let pin = pins_by_session.get(&session.session_key).copied();
        let pin_t = pin.and_then(|p| p.timeslot.as_ref()).and_then(|ts| idx_ts.get(ts).copied());
        let pin_r = pin.and_then(|p| p.room_id.as_ref()).and_then(|rid| idx_room.get(rid).copied());
        let pin_f = pin.and_then(|p| p.teacher_id.as_ref());

        let candidate_times: Vec<usize> = match pin_t {
            Some(t) => vec![t],
            None => (0..times.len()).collect(),
        };
        let candidate_rooms: Vec<usize> = match pin_r {
            Some(r) => vec![r],
            None => session
                .feasible_rooms
                .iter()
                .filter_map(|rid| idx_room.get(rid).copied())
                .collect(),
        };

        let mut options = Vec::new();
        for &t in &candidate_times {
            let Some(blocks) = block_indices(&day_of, t, session.duration_blocks) else {
                continue;
            };
            for &r in &candidate_rooms {
                if !room_available_for_blocks(plan, times, r, &blocks) {
                    continue;
                }
                for f_id in &session.candidate_faculty {
                    if let Some(pinned) = pin_f {
                        if pinned != f_id {
                            continue;
                        }
                    }
                    let Some(&f) = idx_faculty.get(f_id) else { continue };
                    if !faculty_available_for_blocks(plan, times, f, &blocks) {
                        continue;
                    }
                    options.push((t, r, f));
                }
            }
        }
        feas.push(options);
    }

    Prep {
        plan,
        times,
        day_of,
        faculty_by_id,
        all_slots_by_day,
        feas,
    }
}

#[derive(Default, Clone)]
struct Occupancy {
    room: HashSet<(usize, usize)>,
    faculty: HashSet<(usize, usize)>,
    group: HashSet<(String, usize)>,
    /// Sessions placed per `(faculty_idx, day)`, checked against `max_per_day`.
    faculty_day: HashMap<(usize, DayOfWeek), u32>,
    /// Sessions placed per `faculty_idx` across the whole week, checked against
    /// `max_per_week`.
    faculty_week: HashMap<usize, u32>,
}

/// Tries to occupy `(t, r, f)` for session `si`: if every block it would occupy is free and
/// `f`'s day/week load caps (§4.D constraint #9) aren't exceeded, commits the occupancy and
/// returns those blocks; otherwise leaves `occ` untouched.
fn place_ok(prep: &Prep, si: usize, t: usize, r: usize, f: usize, occ: &mut Occupancy) -> Option<Vec<usize>> {
    let session = &prep.plan.sessions[si];
    let blocks = block_indices(&prep.day_of, t, session.duration_blocks)?;
    let gkey = session.group.key();
    if blocks
        .iter()
        .any(|&k| occ.room.contains(&(r, k)) || occ.faculty.contains(&(f, k)) || occ.group.contains(&(gkey.clone(), k)))
    {
        return None;
    }

    let faculty = &prep.plan.faculty[f];
    let day = prep.day_of[t];
    let day_count = *occ.faculty_day.get(&(f, day)).unwrap_or(&0);
    if day_count >= faculty.max_per_day {
        return None;
    }
    let week_count = *occ.faculty_week.get(&f).unwrap_or(&0);
    if week_count >= faculty.max_per_week {
        return None;
    }

    for &k in &blocks {
        occ.room.insert((r, k));
        occ.faculty.insert((f, k));
        occ.group.insert((gkey.clone(), k));
    }
    *occ.faculty_day.entry((f, day)).or_insert(0) += 1;
    *occ.faculty_week.entry(f).or_insert(0) += 1;
    Some(blocks)
}

fn unplace(prep: &Prep, si: usize, t: usize, r: usize, f: usize, occ: &mut Occupancy) {
    let session = &prep.plan.sessions[si];
    if let Some(blocks) = block_indices(&prep.day_of, t, session.duration_blocks) {
        let gkey = session.group.key();
        for k in blocks {
            occ.room.remove(&(r, k));
            occ.faculty.remove(&(f, k));
            occ.group.remove(&(gkey.clone(), k));
        }
        let day = prep.day_of[t];
        if let Some(c) = occ.faculty_day.get_mut(&(f, day)) {
            *c = c.saturating_sub(1);
        }
        if let Some(c) = occ.faculty_week.get_mut(&f) {
            *c = c.saturating_sub(1);
        }
    }
}

#[derive(Clone)]
struct Candidate {
    /// `placements[si]` is the `(timeslot_idx, room_idx, faculty_idx)` chosen for session
    /// `si`, aligned with `Prep::plan.sessions` by position.
    placements: Vec<(usize, usize, usize)>,
    objective: f64,
}

impl Candidate {
    fn to_assignments(&self, prep: &Prep) -> Vec<Assignment> {
        prep.plan
            .sessions
            .iter()
            .zip(&self.placements)
            .map(|(session, &(t, r, f))| Assignment {
                session_key: session.session_key.clone(),
                course_id: session.course_id.clone(),
                timeslot: prep.times[t].slot_id.clone(),
                room_id: prep.plan.rooms[r].id.clone(),
                teacher_id: prep.plan.faculty[f].id.clone(),
            })
            .collect()
    }

    fn evaluate(&mut self, prep: &Prep) {
        let assignments = self.to_assignments(prep);
        let scores = sched_core::scoring::compute_soft_scores(
            &prep.plan.sessions,
            &assignments,
            &prep.faculty_by_id,
            &prep.plan.policy,
            &prep.all_slots_by_day,
        );
        self.objective = scores.objective;
    }
}

fn insert_sorted(pop: &mut Vec<Candidate>, c: Candidate) {
    let pos = pop.partition_point(|x| x.objective <= c.objective);
    pop.insert(pos, c);
}

fn tournament<'a>(pop: &'a [Candidate], k: usize, rng: &mut ChaCha8Rng) -> &'a Candidate {
    let mut best: Option<&Candidate> = None;
    for _ in 0..k {
        let i = rng.gen_range(0..pop.len());
        let c = &pop[i];
        if best.map_or(true, |b| c.objective < b.objective) {
            best = Some(c);
        }
    }
    best.expect("k > 0 and pop non-empty")
}

/// Builds one full placement from scratch: sessions with the fewest candidate options go
/// first (most-constrained-first), each trying shuffled candidates until one doesn't clash.
fn randomized_construct(prep: &Prep, rng: &mut ChaCha8Rng) -> Option<Candidate> {
    let n = prep.plan.sessions.len();
    let mut placements: Vec<Option<(usize, usize, usize)>> = vec![None; n];
    let mut occ = Occupancy::default();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&si| prep.feas[si].len());

    for si in order {
        let mut options = prep.feas[si].clone();
        options.shuffle(rng);
        let mut placed = false;
        for (t, r, f) in options {
            if place_ok(prep, si, t, r, f, &mut occ).is_some() {
                placements[si] = Some((t, r, f));
                placed = true;
                break;
            }
        }
        if !placed {
            return None;
        }
    }

    let placements = placements.into_iter().collect::<Option<Vec<_>>>()?;
    let mut cand = Candidate { placements, objective: 0.0 };
    cand.evaluate(prep);
    Some(cand)
}

/// Same as [`randomized_construct`], but seeds each session from `base`'s prior placement
/// first — whatever is no longer feasible (room outage, a changed pin, …) falls through to
/// the usual shuffled fill.
fn construct_from_base(prep: &Prep, base: &[Assignment], rng: &mut ChaCha8Rng) -> Option<Candidate> {
    let n = prep.plan.sessions.len();
    let mut placements: Vec<Option<(usize, usize, usize)>> = vec![None; n];
    let mut occ = Occupancy::default();

    let session_index: HashMap<&SessionKey, usize> =
        prep.plan.sessions.iter().enumerate().map(|(i, s)| (&s.session_key, i)).collect();
    let idx_ts: HashMap<&TimeslotId, usize> = prep.times.iter().enumerate().map(|(i, t)| (&t.slot_id, i)).collect();
    let idx_room: HashMap<&RoomId, usize> = prep.plan.rooms.iter().enumerate().map(|(i, r)| (&r.id, i)).collect();
    let idx_faculty: HashMap<&FacultyId, usize> =
        prep.plan.faculty.iter().enumerate().map(|(i, f)| (&f.id, i)).collect();

    for a in base {
        let Some(&si) = session_index.get(&a.session_key) else { continue };
        let (Some(&t), Some(&r), Some(&f)) =
            (idx_ts.get(&a.timeslot), idx_room.get(&a.room_id), idx_faculty.get(&a.teacher_id))
        else {
            continue;
        };
        if !prep.feas[si].contains(&(t, r, f)) {
            continue;
        }
        if place_ok(prep, si, t, r, f, &mut occ).is_some() {
            placements[si] = Some((t, r, f));
        }
    }

    let mut order: Vec<usize> = (0..n).filter(|&si| placements[si].is_none()).collect();
    order.sort_by_key(|&si| prep.feas[si].len());

    for si in order {
        let mut options = prep.feas[si].clone();
        options.shuffle(rng);
        let mut placed = false;
        for (t, r, f) in options {
            if place_ok(prep, si, t, r, f, &mut occ).is_some() {
                placements[si] = Some((t, r, f));
                placed = true;
                break;
            }
        }
        if !placed {
            return None;
        }
    }

    let placements = placements.into_iter().collect::<Option<Vec<_>>>()?;
    let mut cand = Candidate { placements, objective: 0.0 };
    cand.evaluate(prep);
    Some(cand)
}

/// Rebuilds `parent`'s occupancy, then re-rolls a handful of movable sessions (those with
/// more than one feasible option — a fully pinned session can't move) to new, non-clashing
/// placements.
fn mutate(prep: &Prep, mut parent: Candidate, rng: &mut ChaCha8Rng) -> Candidate {
    let n = parent.placements.len();
    if n == 0 {
        return parent;
    }

    let mut occ = Occupancy::default();
    for (si, &(t, r, f)) in parent.placements.iter().enumerate() {
        place_ok(prep, si, t, r, f, &mut occ);
    }

    let movable: Vec<usize> = (0..n).filter(|&si| prep.feas[si].len() > 1).collect();
    if movable.is_empty() {
        return parent;
    }

    let mutations = 1 + (n / 10).min(3);
    for _ in 0..mutations {
        let si = movable[rng.gen_range(0..movable.len())];
        let (t0, r0, f0) = parent.placements[si];
        unplace(prep, si, t0, r0, f0, &mut occ);

        let mut options = prep.feas[si].clone();
        options.shuffle(rng);

        let mut placed = false;
        for (t, r, f) in options {
            if place_ok(prep, si, t, r, f, &mut occ).is_some() {
                parent.placements[si] = (t, r, f);
                placed = true;
                break;
            }
        }
        if !placed {
            place_ok(prep, si, t0, r0, f0, &mut occ);
        }
    }

    parent
}
