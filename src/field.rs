// Field layout helpers: platform orientation codes and small statistics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;
use crate::model::AllianceColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// The three randomized structures, nearest the blue wall first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldStructure {
    NearSwitch,
    Scale,
    FarSwitch,
}

impl FieldStructure {
    fn index(self) -> usize {
        match self {
            FieldStructure::NearSwitch => 0,
            FieldStructure::Scale => 1,
            FieldStructure::FarSwitch => 2,
        }
    }
}

/// A 3-character `L`/`R` platform-orientation code, seen from the blue alliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformCode([Side; 3]);

impl PlatformCode {
    pub fn side(&self, structure: FieldStructure) -> Side {
        self.0[structure.index()]
    }

    /// Which alliance owns the given plate of a structure.
    pub fn color(&self, structure: FieldStructure, plate: Side) -> AllianceColor {
        if self.side(structure) == plate {
            AllianceColor::Blue
        } else {
            AllianceColor::Red
        }
    }
}

impl FromStr for PlatformCode {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sides: Vec<Side> = s
            .chars()
            .map(|c| match c {
                'L' => Ok(Side::Left),
                'R' => Ok(Side::Right),
                _ => Err(ScoutError::InvalidPlatformCode(s.to_string())),
            })
            .collect::<Result<_, _>>()?;
        let sides: [Side; 3] = sides
            .try_into()
            .map_err(|_| ScoutError::InvalidPlatformCode(s.to_string()))?;
        Ok(PlatformCode(sides))
    }
}

impl fmt::Display for PlatformCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in self.0 {
            f.write_str(match side {
                Side::Left => "L",
                Side::Right => "R",
            })?;
        }
        Ok(())
    }
}

impl Serialize for PlatformCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Median of a sample, averaging the middle pair for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
