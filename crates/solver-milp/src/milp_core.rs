#![allow(clippy::needless_lifetimes)]

use std::collections::HashMap;

use good_lp::{Expression, ProblemVariables, Solution, SolverModel, Variable};
use sched_core::BuildPlan;
use types::{Assignment, DayOfWeek, FacultyId, PartialPin, RoomId, Session, SessionKey, Timeslot, TimeslotId};

/// One candidate placement of a session: a fixed (timeslot, room, faculty) triple with its
/// own binary decision variable. The explicit faculty dimension is the redesign point
/// (§9): the reference bakes a single fixed teacher into every course, this model treats
/// teacher choice as a first-class decision alongside time and room.
#[derive(Clone)]
pub(crate) struct AssignVar {
    pub s: usize,
    pub t: usize,
    pub r: usize,
    pub f: usize,
    pub var: Variable,
}

pub(crate) struct Prep<'a> {
    pub plan: &'a BuildPlan,
    pub times: &'a [Timeslot],
    pub day_of: Vec<DayOfWeek>,
    pub day_groups: HashMap<DayOfWeek, Vec<usize>>,
    pub idx_ts: HashMap<&'a TimeslotId, usize>,
    pub idx_room: HashMap<&'a RoomId, usize>,
    pub idx_faculty: HashMap<&'a FacultyId, usize>,
    pub pins_by_session: HashMap<&'a SessionKey, &'a PartialPin>,
    pub group_ids: Vec<String>,
}

/// The explicit teacher-selection variable `z[s, f]` (§9's `z[s,f]` redesign point),
/// defined by `z[s,f] == sum over (t, r) of assign[s,t,r,f]`.
pub(crate) struct Vars {
    pub assign: Vec<AssignVar>,
    pub z: HashMap<(usize, usize), Variable>,
    pub ot: HashMap<(usize, usize), Variable>,
    pub og: HashMap<(String, usize), Variable>,
    pub adj_t: Vec<(Variable, usize, usize, usize)>,
    pub adj_g: Vec<(Variable, String, usize, usize)>,
}

/// Consecutive timeslot indices `start..start+blocks` if (and only if) they all fall on
/// the same day — a multi-block session is never allowed to spill past a day boundary.
/// Fixes a latent bug in the reference-derived `dur2` handling, which only checked
/// `t + 1 < times.len()` globally.
pub(crate) fn block_indices(day_of: &[DayOfWeek], start: usize, blocks: u32) -> Option<Vec<usize>> {
    let blocks = blocks as usize;
    if start + blocks > day_of.len() {
        return None;
    }
    let day = day_of[start];
    let idxs: Vec<usize> = (start..start + blocks).collect();
    if idxs.iter().all(|&i| day_of[i] == day) {
        Some(idxs)
    } else {
        None
    }
}

pub(crate) fn build_prep<'a>(plan: &'a BuildPlan) -> Prep<'a> {
    let times = plan.timeslots.as_slice();
    let day_of: Vec<DayOfWeek> = times.iter().map(|t| t.day).collect();
    let mut day_groups: HashMap<DayOfWeek, Vec<usize>> = HashMap::new();
    for (i, t) in times.iter().enumerate() {
        day_groups.entry(t.day).or_default().push(i);
    }
    for v in day_groups.values_mut() {
        v.sort_by_key(|&i| times[i].index);
    }

    let idx_ts = times.iter().enumerate().map(|(i, t)| (&t.slot_id, i)).collect();
    let idx_room = plan.rooms.iter().enumerate().map(|(i, r)| (&r.id, i)).collect();
    let idx_faculty = plan.faculty.iter().enumerate().map(|(i, f)| (&f.id, i)).collect();

    let pins_by_session = plan.pins.iter().map(|p| (&p.session_key, p)).collect();

    let mut group_ids: Vec<String> = plan.sessions.iter().map(|s| s.group.key()).collect();
    group_ids.sort();
    group_ids.dedup();

    Prep {
        plan,
        times,
        day_of,
        day_groups,
        idx_ts,
        idx_room,
        idx_faculty,
        pins_by_session,
        group_ids,
    }
}

fn room_available_for_blocks(prep: &Prep, ri: usize, blocks: &[usize]) -> bool {
    let room = &prep.plan.rooms[ri];
    blocks
        .iter()
        .all(|&k| room.is_available(&prep.times[k].slot_id, true))
}

fn faculty_available_for_blocks(prep: &Prep, fi: usize, blocks: &[usize]) -> bool {
    let faculty = &prep.plan.faculty[fi];
    blocks
        .iter()
        .all(|&k| faculty.is_available(&prep.times[k].slot_id, true))
}

/// Declares one binary variable per feasible `(session, timeslot, room, faculty)` tuple,
/// pruned by pin restrictions (timeslot/room/teacher fixed by a carried-over `PartialPin`),
/// day-boundary-respecting block occupancy, and declared availability.
pub(crate) fn declare_assign_vars(prep: &Prep, vars: &mut ProblemVariables) -> Vec<AssignVar> {
    let mut out = Vec::new();
    for (si, session) in prep.plan.sessions.iter().enumerate() {
        let pin = prep.pins_by_session.get(&session.session_key).copied();
        let pin_t = pin.and_then(|p| p.timeslot.as_ref()).and_then(|ts| prep.idx_ts.get(ts).copied());
        let pin_r = pin.and_then(|p| p.room_id.as_ref()).and_then(|rid| prep.idx_room.get(rid).copied());
        let pin_f = pin.and_then(|p| p.teacher_id.as_ref());

        let candidate_times: Vec<usize> = match pin_t {
            Some(t) => vec![t],
            None => (0..prep.times.len()).collect(),
        };
        let candidate_rooms: Vec<usize> = match pin_r {
            Some(r) => vec![r],
            None => session
                .feasible_rooms
                .iter()
                .filter_map(|rid| prep.idx_room.get(rid).copied())
                .collect(),
        };

        for &t in &candidate_times {
            let Some(blocks) = block_indices(&prep.day_of, t, session.duration_blocks) else {
                continue;
            };
            for &r in &candidate_rooms {
                if !room_available_for_blocks(prep, r, &blocks) {
                    continue;
                }
                for f_id in &session.candidate_faculty {
                    if let Some(pinned) = pin_f {
                        if pinned != f_id {
                            continue;
                        }
                    }
                    let Some(&f) = prep.idx_faculty.get(f_id) else { continue };
                    if !faculty_available_for_blocks(prep, f, &blocks) {
                        continue;
                    }
                    let var = vars.add(good_lp::variable().binary());
                    out.push(AssignVar { s: si, t, r, f, var });
                }
            }
        }
    }
    out
}

pub(crate) fn occupied_blocks<'a>(prep: &'a Prep, a: &AssignVar) -> Vec<usize> {
    block_indices(&prep.day_of, a.t, prep.plan.sessions[a.s].duration_blocks).unwrap_or_default()
}

pub(crate) fn declare_z_vars(prep: &Prep, vars: &mut ProblemVariables, assign: &[AssignVar]) -> HashMap<(usize, usize), Variable> {
    let mut pairs: Vec<(usize, usize)> = assign.iter().map(|a| (a.s, a.f)).collect();
    pairs.sort_unstable();
    pairs.dedup();
    pairs
        .into_iter()
        .map(|(s, f)| ((s, f), vars.add(good_lp::variable().binary())))
        .collect()
}

pub(crate) fn declare_occupancy_vars(
    prep: &Prep,
    vars: &mut ProblemVariables,
) -> (HashMap<(usize, usize), Variable>, HashMap<(String, usize), Variable>) {
    let mut ot = HashMap::new();
    for fi in 0..prep.plan.faculty.len() {
        for k in 0..prep.times.len() {
            ot.insert((fi, k), vars.add(good_lp::variable().binary()));
        }
    }
    let mut og = HashMap::new();
    for gid in &prep.group_ids {
        for k in 0..prep.times.len() {
            og.insert((gid.clone(), k), vars.add(good_lp::variable().binary()));
        }
    }
    (ot, og)
}

pub(crate) fn declare_adjacency_vars(
    prep: &Prep,
    vars: &mut ProblemVariables,
) -> (Vec<(Variable, usize, usize, usize)>, Vec<(Variable, String, usize, usize)>) {
    let mut adj_t = Vec::new();
    for fi in 0..prep.plan.faculty.len() {
        for slots in prep.day_groups.values() {
            for w in slots.windows(2) {
                let a = vars.add(good_lp::variable().binary());
                adj_t.push((a, fi, w[0], w[1]));
            }
        }
    }
    let mut adj_g = Vec::new();
    for gid in &prep.group_ids {
        for slots in prep.day_groups.values() {
            for w in slots.windows(2) {
                let a = vars.add(good_lp::variable().binary());
                adj_g.push((a, gid.clone(), w[0], w[1]));
            }
        }
    }
    (adj_t, adj_g)
}

fn is_compact_slot(compact_window: &[u32], slot: &Timeslot) -> bool {
    compact_window.contains(&slot.index)
}

pub(crate) fn build_objective(prep: &Prep, v: &Vars) -> Expression {
    let mut objective = Expression::from(0.0);
    let w_unpref = prep.plan.policy.soft_weights.unpreferred_time as f64;
    let w_windows = prep.plan.policy.soft_weights.windows as f64;
    let w_compact = prep.plan.policy.soft_weights.compact_bonus as f64;
    let compact_window = &prep.plan.policy.compact_window;

    if w_unpref > 0.0 {
        for a in &v.assign {
            let faculty = &prep.plan.faculty[a.f];
            let blocks = occupied_blocks(prep, a);
            let penalize = blocks.iter().any(|&k| faculty.prefs.avoid_slots.contains(&prep.times[k].slot_id));
            if penalize {
                objective = objective + w_unpref * a.var;
            }
        }
    }

    if w_windows > 0.0 {
        for fi in 0..prep.plan.faculty.len() {
            for slots in prep.day_groups.values() {
                if slots.len() < 2 {
                    continue;
                }
                for &k in slots {
                    objective = objective + w_windows * v.ot[&(fi, k)];
                }
            }
        }
        for &(a, _fi, _k, _k1) in &v.adj_t {
            objective = objective - w_windows * a;
        }
        for gid in &prep.group_ids {
            for slots in prep.day_groups.values() {
                if slots.len() < 2 {
                    continue;
                }
                for &k in slots {
                    objective = objective + w_windows * v.og[&(gid.clone(), k)];
                }
            }
        }
        for (a, _gid, _k, _k1) in &v.adj_g {
            objective = objective - w_windows * *a;
        }
    }

    if w_compact > 0.0 {
        for a in &v.assign {
            let blocks = occupied_blocks(prep, a);
            let count = blocks.iter().filter(|&&k| is_compact_slot(compact_window, &prep.times[k])).count();
            if count > 0 {
                objective = objective - w_compact * (count as f64) * a.var;
            }
        }
    }

    objective
}

/// Every session must be placed exactly once (§4.D constraint #1).
pub(crate) fn add_session_coverage_constraints<M: SolverModel>(mut model: M, prep: &Prep, v: &Vars) -> M {
    for si in 0..prep.plan.sessions.len() {
        let mut sum = Expression::from(0.0);
        for a in v.assign.iter().filter(|a| a.s == si) {
            sum = sum + a.var;
        }
        model = model.with(sum.eq(1.0));
    }
    model
}

/// `z[s,f] == sum_{t,r} assign[s,t,r,f]` — the explicit teacher-selection linkage (§9).
pub(crate) fn link_z_vars<M: SolverModel>(mut model: M, v: &Vars) -> M {
    for (&(s, f), &z) in &v.z {
        let mut sum = Expression::from(0.0);
        for a in v.assign.iter().filter(|a| a.s == s && a.f == f) {
            sum = sum + a.var;
        }
        model = model.with(sum.eq(z));
    }
    model
}

/// A room may host at most one session per occupied block (§4.D constraint #2).
pub(crate) fn add_room_capacity_constraints<M: SolverModel>(mut model: M, prep: &Prep, v: &Vars) -> M {
    for ri in 0..prep.plan.rooms.len() {
        for k in 0..prep.times.len() {
            let mut sum = Expression::from(0.0);
            for a in v.assign.iter().filter(|a| a.r == ri) {
                if occupied_blocks(prep, a).contains(&k) {
                    sum = sum + a.var;
                }
            }
            model = model.with(sum.leq(1.0));
        }
    }
    model
}

/// Links `ot[f,k]`/`og[g,k]` occupancy indicators to the underlying assign vars, and
/// constrains faculty/group occupancy to at most one session per block (§4.D constraints
/// #3, #4).
pub(crate) fn link_occupancy_and_capacity<M: SolverModel>(mut model: M, prep: &Prep, v: &Vars) -> M {
    for fi in 0..prep.plan.faculty.len() {
        for k in 0..prep.times.len() {
            let mut sum = Expression::from(0.0);
            for a in v.assign.iter().filter(|a| a.f == fi) {
                if occupied_blocks(prep, a).contains(&k) {
                    sum = sum + a.var;
                }
            }
            let ot = v.ot[&(fi, k)];
            model = model.with(sum.clone().eq(ot));
            model = model.with(sum.leq(1.0));
        }
    }
    for gid in &prep.group_ids {
        for k in 0..prep.times.len() {
            let mut sum = Expression::from(0.0);
            for a in v.assign.iter() {
                if prep.plan.sessions[a.s].group.key() == *gid && occupied_blocks(prep, a).contains(&k) {
                    sum = sum + a.var;
                }
            }
            let og = v.og[&(gid.clone(), k)];
            model = model.with(sum.clone().eq(og));
            model = model.with(sum.leq(1.0));
        }
    }
    model
}

pub(crate) fn add_adjacency_constraints<M: SolverModel>(mut model: M, v: &Vars) -> M {
    for &(a, fi, k, k1) in &v.adj_t {
        let ot_k = v.ot[&(fi, k)];
        let ot_k1 = v.ot[&(fi, k1)];
        model = model.with((a - ot_k).leq(0.0));
        model = model.with((a - ot_k1).leq(0.0));
        model = model.with((a - ot_k - ot_k1).geq(-1.0));
    }
    for (a, gid, k, k1) in &v.adj_g {
        let og_k = v.og[&(gid.clone(), *k)];
        let og_k1 = v.og[&(gid.clone(), *k1)];
        model = model.with((*a - og_k).leq(0.0));
        model = model.with((*a - og_k1).leq(0.0));
        model = model.with((*a - og_k - og_k1).geq(-1.0));
    }
    model
}

/// Hard faculty load caps (§8 invariant, resolving Open Question c): a faculty's occupied
/// blocks must not exceed `max_per_day` on any single day, and its `z[s,f]` sum (total
/// sessions taught) must not exceed `max_per_week` overall.
pub(crate) fn add_faculty_cap_constraints<M: SolverModel>(mut model: M, prep: &Prep, v: &Vars) -> M {
    for (fi, faculty) in prep.plan.faculty.iter().enumerate() {
        for slots in prep.day_groups.values() {
            let mut day_sum = Expression::from(0.0);
            for &k in slots {
                if let Some(&ot) = v.ot.get(&(fi, k)) {
                    day_sum = day_sum + ot;
                }
            }
            model = model.with(day_sum.leq(faculty.max_per_day as f64));
        }

        let mut week_sum = Expression::from(0.0);
        for si in 0..prep.plan.sessions.len() {
            if let Some(&z) = v.z.get(&(si, fi)) {
                week_sum = week_sum + z;
            }
        }
        model = model.with(week_sum.leq(faculty.max_per_week as f64));
    }
    model
}

pub(crate) fn extract_solution(prep: &Prep, v: &Vars, sol: &impl Solution) -> Vec<Assignment> {
    let mut out = Vec::new();
    for a in &v.assign {
        if sol.value(a.var) > 0.5 {
            let session = &prep.plan.sessions[a.s];
            out.push(Assignment {
                session_key: session.session_key.clone(),
                course_id: session.course_id.clone(),
                timeslot: prep.times[a.t].slot_id.clone(),
                room_id: prep.plan.rooms[a.r].id.clone(),
                teacher_id: prep.plan.faculty[a.f].id.clone(),
            });
        }
    }
    out
}
