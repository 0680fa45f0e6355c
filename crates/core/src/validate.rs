//! Pre-solve validation (§4, §7): every check here is a hard structural failure, distinct
//! from the oracle's `UnschedulableWarning`s which are soft ("this one course looks
//! unsolvable, proceed anyway and let the solver report INFEASIBLE if so").

use std::collections::HashSet;

use store::{Store, NO_AVAILABILITY_SENTINEL};

use crate::error::ValidationError;

pub fn validate_store(store: &Store) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    if store.timeslots().is_empty() {
        errors.push("grid has no timeslots".to_string());
    }
    for t in store.timeslots() {
        if !t.slot_id.is_valid_format() {
            errors.push(format!("timeslot has invalid id: {}", t.slot_id));
        }
    }

    let mut seen = HashSet::new();
    for c in store.courses() {
        if !seen.insert(c.id.0.clone()) {
            errors.push(format!("duplicate course id: {}", c.id.0));
        }
        if c.duration_min == 0 {
            errors.push(format!("course {} has duration_min=0", c.id.0));
        }
        if c.weekly_sessions() == 0 {
            errors.push(format!(
                "course {} has zero weekly sessions (hours_theory + hours_lab == 0)",
                c.id.0
            ));
        }
        if store.department(&c.owner_dept).is_none() {
            errors.push(format!(
                "course {} references missing department {}",
                c.id.0, c.owner_dept.0
            ));
        }
    }

    for f in store.faculty_all() {
        if f.max_per_day == 0 {
            errors.push(format!("faculty {} has max_per_day=0", f.id.0));
        }
        if f.max_per_week < f.max_per_day {
            errors.push(format!(
                "faculty {} has max_per_week ({}) below max_per_day ({})",
                f.id.0, f.max_per_week, f.max_per_day
            ));
        }
        for slot in &f.availability {
            if slot.0 == NO_AVAILABILITY_SENTINEL {
                continue;
            }
            if store.timeslot(slot).is_none() {
                errors.push(format!(
                    "faculty {} declares availability for unknown slot {}",
                    f.id.0, slot.0
                ));
            }
        }
    }

    for r in store.rooms() {
        for slot in &r.availability {
            if slot.0 == NO_AVAILABILITY_SENTINEL {
                continue;
            }
            if store.timeslot(slot).is_none() {
                errors.push(format!(
                    "room {} declares availability for unknown slot {}",
                    r.id.0, slot.0
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Failed(errors))
    }
}
