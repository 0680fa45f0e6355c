use crate::enums::DayOfWeek;
use crate::entities::Timeslot;
use crate::ids::TimeslotId;
use serde::{Deserialize, Serialize};

/// The timetable grid configuration the reference hardcodes (`DAYS`, `SLOTS_PER_DAY`,
/// `START_MIN`): which days are teachable, how many slots per day, and the start time of
/// each slot index. Carried as data rather than constants so a deployment can run a
/// different bell schedule without touching the solver.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GridConfig {
    pub days: Vec<DayOfWeek>,
    pub slots_per_day: u32,
    /// start_min[i] is the start time (minutes from midnight) of slot index i.
    pub start_min: Vec<u32>,
    pub slot_len_min: u32,
    /// Minutes per grid step, used to compute `duration_blocks` for multi-block sessions.
    pub grid_step_min: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        let start_min = vec![9 * 60, 10 * 60, 11 * 60, 12 * 60 + 30, 14 * 60, 15 * 60];
        Self {
            days: vec![
                DayOfWeek::Mon,
                DayOfWeek::Tue,
                DayOfWeek::Wed,
                DayOfWeek::Thu,
                DayOfWeek::Fri,
            ],
            slots_per_day: start_min.len() as u32,
            start_min,
            slot_len_min: 55,
            grid_step_min: 60,
        }
    }
}

impl GridConfig {
    /// Materializes the full week grid as `Timeslot` entities, in stable
    /// day-then-index order, matching the order the reference's `build_toy_twin` uses.
    pub fn timeslots(&self) -> Vec<Timeslot> {
        let mut out = Vec::with_capacity(self.days.len() * self.slots_per_day as usize);
        for day in &self.days {
            for idx in 0..self.slots_per_day {
                let start = self
                    .start_min
                    .get(idx as usize)
                    .copied()
                    .unwrap_or(self.start_min.last().copied().unwrap_or(0));
                out.push(Timeslot {
                    slot_id: TimeslotId::new(*day, idx),
                    day: *day,
                    index: idx,
                    start_min: start,
                    end_min: start + self.slot_len_min,
                });
            }
        }
        out
    }

    pub fn duration_blocks(&self, duration_min: u32) -> u32 {
        ((duration_min + self.grid_step_min - 1) / self.grid_step_min).max(1)
    }
}
