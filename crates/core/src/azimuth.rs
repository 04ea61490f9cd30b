//! Azimuth assignment for multi-image world prompts.
//!
//! Every image in a multi-image prompt is placed at a horizontal angle
//! (degrees, `0..=359`) around the capture point. Callers either name a
//! compass [`Direction`] per image or leave the angle unset, in which
//! case the images are spread evenly around the full circle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of degrees in a full turn.
pub const FULL_TURN_DEGREES: u16 = 360;

/// Largest valid azimuth value.
pub const MAX_AZIMUTH: u16 = FULL_TURN_DEGREES - 1;

// ---------------------------------------------------------------------------
// Compass directions
// ---------------------------------------------------------------------------

/// Named compass direction relative to the property entrance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Front,
    Right,
    Back,
    Left,
}

impl Direction {
    /// Fixed azimuth for this direction.
    pub fn degrees(self) -> u16 {
        match self {
            Direction::Front => 0,
            Direction::Right => 90,
            Direction::Back => 180,
            Direction::Left => 270,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Front => "front",
            Direction::Right => "right",
            Direction::Back => "back",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(Direction::Front),
            "right" => Ok(Direction::Right),
            "back" => Ok(Direction::Back),
            "left" => Ok(Direction::Left),
            other => Err(CoreError::Validation(format!(
                "Unknown direction '{other}'. Must be one of: front, right, back, left"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Spread `count` images evenly around the circle.
///
/// `azimuth[i] = round(i * 360 / count)`, wrapped into `0..360`.
pub fn even_azimuths(count: usize) -> Vec<u16> {
    if count == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|i| {
            let raw = (i as f64 * f64::from(FULL_TURN_DEGREES) / count as f64).round() as u16;
            raw % FULL_TURN_DEGREES
        })
        .collect()
}

/// Resolve the final azimuth for each image.
///
/// When at least one image carries an explicit angle, explicit values
/// win and every unassigned image falls back to `0`. Otherwise the
/// images are spaced evenly by position.
pub fn resolve_azimuths(explicit: &[Option<u16>]) -> Vec<u16> {
    if explicit.iter().any(Option::is_some) {
        explicit.iter().map(|a| a.unwrap_or(0)).collect()
    } else {
        even_azimuths(explicit.len())
    }
}

/// Reject explicit angles outside `0..=359`.
pub fn validate_azimuth(degrees: u16) -> Result<(), CoreError> {
    if degrees <= MAX_AZIMUTH {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Azimuth {degrees} is out of range. Must be between 0 and {MAX_AZIMUTH}"
        )))
    }
}

/// Parse a comma-separated direction list such as `"front,,back"`.
///
/// Empty entries leave the corresponding image unassigned.
pub fn parse_direction_list(input: &str) -> Result<Vec<Option<Direction>>, CoreError> {
    input
        .split(',')
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                Ok(None)
            } else {
                entry.parse().map(Some)
            }
        })
        .collect()
}
