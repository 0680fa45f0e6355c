//! Soft-score breakdown and KPI reporting (§4.G), generalized from per-course occupancy to
//! per-`Session`/`Group` occupancy so it keeps working once sections and cohorts share a
//! course.

use std::collections::{HashMap, HashSet};

use types::{Assignment, Faculty, Policy, Room, Session, Timeslot, TimeslotId};

#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Scores {
    pub unpreferred_meetings: i64,
    pub windows_teachers: HashMap<String, i64>,
    pub windows_groups: HashMap<String, i64>,
    pub windows_total: i64,
    pub compact_bonus: i64,
    pub objective: f64,
}

/// KPIs surfaced alongside a solve result (§4.G).
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Kpis {
    /// Assignment cardinality — how many sessions actually landed a placement.
    pub assigned_sessions: usize,
    /// Number of `(room, timeslot)` pairs occupied by more than one assignment. Must be 0
    /// for any result a solver backend hands back as feasible/optimal.
    pub room_slot_clashes: usize,
    /// `occupied / (|rooms| * |timeslots|)`, the fraction of the room/slot grid in use.
    pub utilization_ratio: f64,
    pub faculty_load: HashMap<String, u32>,
    /// Standard deviation of per-faculty session counts, `None` with fewer than two
    /// faculty (the statistic isn't meaningful).
    pub load_fairness_stddev: Option<f64>,
    pub scores: Scores,
}

pub fn compute_soft_scores(
    sessions: &[Session],
    assignments: &[Assignment],
    faculty_by_id: &HashMap<String, Faculty>,
    policy: &Policy,
    all_slots_ordered_by_day: &HashMap<types::DayOfWeek, Vec<TimeslotId>>,
) -> Scores {
    let session_by_key: HashMap<_, _> = sessions.iter().map(|s| (&s.session_key, s)).collect();

    let mut occ_teacher: HashMap<(String, TimeslotId), bool> = HashMap::new();
    let mut occ_group: HashMap<(String, TimeslotId), bool> = HashMap::new();
    let mut unpref = 0i64;

    for a in assignments {
        let session = match session_by_key.get(&a.session_key) {
            Some(s) => *s,
            None => continue,
        };
        let gkey = session.group.key();

        if let Some(f) = faculty_by_id.get(&a.teacher_id.0) {
            if f.prefs.avoid_slots.contains(&a.timeslot) {
                unpref += 1;
            }
        }
        occ_teacher.insert((a.teacher_id.0.clone(), a.timeslot.clone()), true);
        occ_group.insert((gkey, a.timeslot.clone()), true);
    }

    let mut windows_teachers: HashMap<String, i64> = HashMap::new();
    let mut windows_groups: HashMap<String, i64> = HashMap::new();
    let mut compact_bonus = 0i64;

    let mut teacher_ids: Vec<&String> = faculty_by_id.keys().collect();
    teacher_ids.sort();
    let mut group_ids: HashSet<String> = HashSet::new();
    for s in sessions {
        group_ids.insert(s.group.key());
    }
    let mut group_ids: Vec<String> = group_ids.into_iter().collect();
    group_ids.sort();

    let compact_set: HashSet<u32> = policy.compact_window.iter().copied().collect();

    let agent_windows = |is_teacher: bool, id: &str| -> (i64, i64) {
        let mut total = 0i64;
        let mut compact = 0i64;
        for slots in all_slots_ordered_by_day.values() {
            let occ_at = |slot: &TimeslotId| -> bool {
                if is_teacher {
                    *occ_teacher.get(&(id.to_string(), slot.clone())).unwrap_or(&false)
                } else {
                    *occ_group.get(&(id.to_string(), slot.clone())).unwrap_or(&false)
                }
            };
            let mut sum_o = 0i64;
            for slot in slots {
                if occ_at(slot) {
                    sum_o += 1;
                    if let Some(idx) = slot.index() {
                        if compact_set.contains(&idx) {
                            compact += 1;
                        }
                    }
                }
            }
            let mut sum_adj = 0i64;
            for w in slots.windows(2) {
                if occ_at(&w[0]) && occ_at(&w[1]) {
                    sum_adj += 1;
                }
            }
            total += sum_o - sum_adj;
        }
        (total, compact)
    };

    for tid in &teacher_ids {
        let (val, compact) = agent_windows(true, tid);
        if val != 0 {
            windows_teachers.insert((*tid).clone(), val);
        }
        compact_bonus += compact;
    }
    for gid in &group_ids {
        let (val, _compact) = agent_windows(false, gid);
        if val != 0 {
            windows_groups.insert(gid.clone(), val);
        }
    }

    let windows_total: i64 =
        windows_teachers.values().sum::<i64>() + windows_groups.values().sum::<i64>();

    let w_unpref = policy.soft_weights.unpreferred_time as f64;
    let w_windows = policy.soft_weights.windows as f64;
    let w_compact = policy.soft_weights.compact_bonus as f64;
    let objective = w_unpref * (unpref as f64) + w_windows * (windows_total as f64)
        - w_compact * (compact_bonus as f64);

    Scores {
        unpreferred_meetings: unpref,
        windows_teachers,
        windows_groups,
        windows_total,
        compact_bonus,
        objective,
    }
}

pub fn compute_kpis(
    sessions: &[Session],
    assignments: &[Assignment],
    faculty_by_id: &HashMap<String, Faculty>,
    policy: &Policy,
    room_count: usize,
    slot_count: usize,
    all_slots_ordered_by_day: &HashMap<types::DayOfWeek, Vec<TimeslotId>>,
) -> Kpis {
    let mut room_slot_counts: HashMap<(String, TimeslotId), usize> = HashMap::new();
    let mut faculty_load: HashMap<String, u32> = HashMap::new();
    for a in assignments {
        *room_slot_counts.entry((a.room_id.0.clone(), a.timeslot.clone())).or_insert(0) += 1;
        *faculty_load.entry(a.teacher_id.0.clone()).or_insert(0) += 1;
    }

    let room_slot_clashes = room_slot_counts.values().filter(|&&n| n > 1).count();
    let occupied = room_slot_counts.len();
    let capacity = (room_count * slot_count).max(1);
    let utilization_ratio = occupied as f64 / capacity as f64;

    let load_fairness_stddev = if faculty_load.len() > 1 {
        let loads: Vec<f64> = faculty_load.values().map(|&n| n as f64).collect();
        let mean = loads.iter().sum::<f64>() / loads.len() as f64;
        let variance = loads.iter().map(|n| (n - mean).powi(2)).sum::<f64>() / loads.len() as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    Kpis {
        assigned_sessions: assignments.len(),
        room_slot_clashes,
        utilization_ratio,
        faculty_load,
        load_fairness_stddev,
        scores: compute_soft_scores(sessions, assignments, faculty_by_id, policy, all_slots_ordered_by_day),
    }
}

/// Builds the lookups [`compute_kpis`] needs straight from a solved plan's resource lists,
/// so the solver backends don't each have to re-derive `faculty_by_id`/`all_slots_by_day`
/// just to call it — the one wiring point a solve path needs (§4.G).
pub fn report(
    sessions: &[Session],
    assignments: &[Assignment],
    faculty: &[Faculty],
    rooms: &[Room],
    policy: &Policy,
    timeslots: &[Timeslot],
) -> Kpis {
    let faculty_by_id: HashMap<String, Faculty> = faculty.iter().map(|f| (f.id.0.clone(), f.clone())).collect();

    let mut ordered: HashMap<types::DayOfWeek, Vec<(u32, TimeslotId)>> = HashMap::new();
    for t in timeslots {
        ordered.entry(t.day).or_default().push((t.index, t.slot_id.clone()));
    }
    let all_slots_ordered_by_day: HashMap<types::DayOfWeek, Vec<TimeslotId>> = ordered
        .into_iter()
        .map(|(day, mut pairs)| {
            pairs.sort_by_key(|(idx, _)| *idx);
            (day, pairs.into_iter().map(|(_, id)| id).collect())
        })
        .collect();

    compute_kpis(
        sessions,
        assignments,
        &faculty_by_id,
        policy,
        rooms.len(),
        timeslots.len(),
        &all_slots_ordered_by_day,
    )
}
