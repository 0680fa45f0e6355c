use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
            DayOfWeek::Sun => "sun",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "mon" => DayOfWeek::Mon,
            "tue" => DayOfWeek::Tue,
            "wed" => DayOfWeek::Wed,
            "thu" => DayOfWeek::Thu,
            "fri" => DayOfWeek::Fri,
            "sat" => DayOfWeek::Sat,
            "sun" => DayOfWeek::Sun,
            _ => return None,
        })
    }
}

/// Generic equipment tags, distinct from the room-type/facility-need matching rule.
#[derive(Clone, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equip {
    Projector,
    Whiteboard,
    ComputerLab,
    Online,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Lab,
    Smart,
    Studio,
    Seminar,
}

impl RoomType {
    /// Room-capability matching rule (§4.B): a course requiring `lab` matches only `Lab`;
    /// a course requiring `smart_class` matches `Smart` or `Lab`.
    pub fn satisfies(&self, need: FacilityToken) -> bool {
        match need {
            FacilityToken::Lab => matches!(self, RoomType::Lab),
            FacilityToken::SmartClass => matches!(self, RoomType::Smart | RoomType::Lab),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, schemars::JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FacilityToken {
    Lab,
    SmartClass,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, schemars::JsonSchema, Default, Eq, PartialEq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CourseKind {
    #[default]
    Core,
    Aec,
    Vac,
    Sec,
    Lab,
    Project,
}
