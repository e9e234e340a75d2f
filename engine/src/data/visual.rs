use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::fixes::{Runway, from_arp, runway};

/// Radius of the aerodrome traffic zone around the ARP.
pub const ATZ_RADIUS_NM: f64 = 4.32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualPattern {
  #[serde(rename = "30R_RIGHT")]
  Rwy30RRight,
  #[serde(rename = "12L_LEFT")]
  Rwy12LLeft,
  #[serde(rename = "30L_LEFT")]
  Rwy30LLeft,
  #[serde(rename = "12R_RIGHT")]
  Rwy12RRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisualEntry {
  Downwind,
  Base,
  Final,
}

impl VisualEntry {
  pub fn from_name(name: &str) -> Option<Self> {
    match name.trim().to_uppercase().as_str() {
      "DOWNWIND" => Some(Self::Downwind),
      "BASE" => Some(Self::Base),
      "FINAL" => Some(Self::Final),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternSpeeds {
  pub atz_entry: f64,
  pub downwind: f64,
  pub base: f64,
  pub final_leg: f64,
  pub final_approach: f64,
  pub touchdown: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternAltitudes {
  pub atz_entry: f64,
  pub base: f64,
  pub final_leg: f64,
}

pub const PATTERN_SPEEDS: PatternSpeeds = PatternSpeeds {
  atz_entry: 150.0,
  downwind: 150.0,
  base: 120.0,
  final_leg: 100.0,
  final_approach: 80.0,
  touchdown: 50.0,
};

pub const PATTERN_ALTITUDES: PatternAltitudes = PatternAltitudes {
  atz_entry: 800.0,
  base: 600.0,
  final_leg: 400.0,
};

/// kt/s, applied on top of the performance model inside the pattern.
pub const PATTERN_DECELERATION: f64 = 4.0;
/// kt/s once on the ground.
pub const GROUND_DECELERATION: f64 = 30.0;
/// ft/NM
pub const PATTERN_DESCENT_RATE: f64 = 300.0;
pub const PATTERN_LANDING_ALTITUDE: f64 = 200.0;

impl VisualPattern {
  pub const ALL: [Self; 4] = [
    Self::Rwy30RRight,
    Self::Rwy12LLeft,
    Self::Rwy30LLeft,
    Self::Rwy12RRight,
  ];

  pub fn code(self) -> &'static str {
    match self {
      Self::Rwy30RRight => "30R_RIGHT",
      Self::Rwy12LLeft => "12L_LEFT",
      Self::Rwy30LLeft => "30L_LEFT",
      Self::Rwy12RRight => "12R_RIGHT",
    }
  }

  pub fn from_code(code: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|pattern| pattern.code().eq_ignore_ascii_case(code.trim()))
  }

  pub fn runway_id(self) -> &'static str {
    match self {
      Self::Rwy30RRight => "30R",
      Self::Rwy12LLeft => "12L",
      Self::Rwy30LLeft => "30L",
      Self::Rwy12RRight => "12R",
    }
  }

  pub fn runway(self) -> Option<&'static Runway> {
    runway(self.runway_id())
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Rwy30RRight => "Runway 30R (Right Pattern)",
      Self::Rwy12LLeft => "Runway 12L (Left Pattern)",
      Self::Rwy30LLeft => "Runway 30L (Left Pattern)",
      Self::Rwy12RRight => "Runway 12R (Right Pattern)",
    }
  }

  /// Downwind, base and final points as radial/distance from the ARP.
  fn legs(self) -> [(f64, f64); 3] {
    match self {
      Self::Rwy30RRight => [(349.0, 2.6), (83.0, 3.8), (106.0, 3.3)],
      Self::Rwy12LLeft => [(95.0, 2.6), (354.0, 2.8), (320.0, 1.2)],
      Self::Rwy30LLeft => [(262.0, 3.3), (176.0, 2.0), (135.0, 0.7)],
      Self::Rwy12RRight => [(179.0, 2.0), (285.0, 3.8), (300.0, 2.5)],
    }
  }

  pub fn waypoint(self, entry: VisualEntry) -> DVec2 {
    let [downwind, base, final_leg] = self.legs();
    let (radial, distance) = match entry {
      VisualEntry::Downwind => downwind,
      VisualEntry::Base => base,
      VisualEntry::Final => final_leg,
    };

    from_arp(radial, distance)
  }
}
