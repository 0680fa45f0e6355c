use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_newtype!(DeptId);
id_newtype!(ProgramId);
id_newtype!(YearTermId);
id_newtype!(SectionId);
id_newtype!(CourseId);
id_newtype!(FacultyId);
id_newtype!(RoomId);
id_newtype!(CohortId);
id_newtype!(PolicyId);

/// Stable external identifier for a grid cell, e.g. `"mon.2"`.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
#[serde(transparent)]
pub struct TimeslotId(pub String);

impl fmt::Display for TimeslotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TimeslotId {
    pub fn new(day: crate::DayOfWeek, index: u32) -> Self {
        Self(format!("{}.{}", day.as_str(), index))
    }

    pub fn is_valid_format(&self) -> bool {
        let parts: Vec<_> = self.0.split('.').collect();
        if parts.len() != 2 {
            return false;
        }
        let idx_ok = parts[1].parse::<u32>().is_ok();
        crate::DayOfWeek::parse(parts[0]).is_some() && idx_ok
    }

    pub fn day(&self) -> Option<crate::DayOfWeek> {
        self.0.split('.').next().and_then(crate::DayOfWeek::parse)
    }

    pub fn index(&self) -> Option<u32> {
        self.0.split('.').nth(1).and_then(|s| s.parse().ok())
    }
}

/// Deterministic key for a derived session: `S_{course}_{group}_{k}`.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(transparent)]
pub struct SessionKey(pub String);

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl SessionKey {
    pub fn new(course: &CourseId, group: &str, k: u32) -> Self {
        Self(format!("S_{}_{}_{}", course.0, group, k))
    }
}
