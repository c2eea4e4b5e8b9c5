//! Traffic-light status shared by KPIs and OKRs

use serde::{Deserialize, Serialize};
use std::fmt;

/// How close a value is to its goal
///
/// New KPIs and objectives start out `Red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusLevel {
    Green,
    Yellow,
    #[default]
    Red,
}

impl StatusLevel {
    pub const ALL: [StatusLevel; 3] = [Self::Green, Self::Yellow, Self::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }

    pub fn is_at_risk(&self) -> bool {
        matches!(self, Self::Red)
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
