//! Identifier types for dataset entities.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric code of a stop, unique across the network.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::StopCode;
///
/// let code: StopCode = "2193".parse().unwrap();
/// assert_eq!(code, StopCode(2193));
/// assert_eq!(code.to_string(), "2193");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopCode(pub u32);

/// Numeric code of a direction (one ordered traversal of a line).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectionCode(pub u32);

/// Index of a line in the routes table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteIndex(pub u32);

macro_rules! numeric_id {
    ($name:ident) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }
    };
}

numeric_id!(StopCode);
numeric_id!(DirectionCode);
numeric_id!(RouteIndex);
