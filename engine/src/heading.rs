use serde::{Deserialize, Serialize};

use crate::geometry::{delta_angle, normalize_angle};

/// Remaining error at which the heading snaps onto its target.
pub const HEADING_SNAP_DEGREES: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
  Left,
  Right,
}

impl TurnDirection {
  pub fn sign(self) -> f64 {
    match self {
      Self::Left => -1.0,
      Self::Right => 1.0,
    }
  }
}

/// Turns from `current` toward `target` by at most `turn_rate * dt` degrees.
///
/// Without a forced direction the shorter way is taken. A forced direction
/// keeps the turn going that way even when it is the long way around.
pub fn turn_toward(
  current: f64,
  target: f64,
  turn_rate: f64,
  dt: f64,
  forced: Option<TurnDirection>,
) -> f64 {
  let shortest = delta_angle(current, target);
  if shortest.abs() <= HEADING_SNAP_DEGREES {
    return normalize_angle(target);
  }

  let diff = match forced {
    Some(TurnDirection::Right) if shortest < 0.0 => shortest + 360.0,
    Some(TurnDirection::Left) if shortest > 0.0 => shortest - 360.0,
    _ => shortest,
  };

  let max_turn = turn_rate * dt;
  if diff.abs() <= max_turn {
    return normalize_angle(target);
  }

  let heading = normalize_angle(current + max_turn.copysign(diff));
  if delta_angle(heading, target).abs() <= HEADING_SNAP_DEGREES {
    normalize_angle(target)
  } else {
    heading
  }
}
