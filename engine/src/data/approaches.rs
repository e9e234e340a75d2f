//! Geometry and profiles of the instrument approaches.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{
  geometry::{dms, latlon},
  performance::AircraftKind,
};

use super::fixes::{WAYPOINTS, Waypoint, ZAR};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApproachSpeeds {
  /// Arrival segment, before the approach proper.
  pub initial: f64,
  /// Arc and intermediate segment.
  pub approach: f64,
  pub final_approach: f64,
}

/// Speed profile shared by the ILS and both VOR procedures.
pub fn approach_speeds(kind: AircraftKind) -> ApproachSpeeds {
  match kind {
    AircraftKind::Vfr => ApproachSpeeds {
      initial: 120.0,
      approach: 100.0,
      final_approach: 80.0,
    },
    AircraftKind::Ifr => ApproachSpeeds {
      initial: 250.0,
      approach: 180.0,
      final_approach: 140.0,
    },
    AircraftKind::Military => ApproachSpeeds {
      initial: 350.0,
      approach: 200.0,
      final_approach: 160.0,
    },
  }
}

/// Where an aircraft joins the ILS 30R.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IlsEntry {
  Yarzu,
  Kekag,
  Godpi,
  IfIls,
}

impl IlsEntry {
  pub const ALL: [Self; 4] =
    [Self::Yarzu, Self::Kekag, Self::Godpi, Self::IfIls];

  /// Looks an entry up by its fix name, ignoring case.
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|entry| entry.fix_name().eq_ignore_ascii_case(name.trim()))
  }

  pub fn fix_name(self) -> &'static str {
    match self {
      Self::Yarzu => "YARZU",
      Self::Kekag => "KEKAG",
      Self::Godpi => "GODPI",
      Self::IfIls => "IF_ILS",
    }
  }

  pub fn fix(self) -> Option<&'static Waypoint> {
    WAYPOINTS.get(self.fix_name())
  }

  /// Arc entries fly to the entry fix and around the 17 DME arc.
  pub fn is_arc(self) -> bool {
    matches!(self, Self::Yarzu | Self::Godpi)
  }

  /// Altitude assigned when the approach is cleared.
  pub fn initial_altitude(self, assigned: f64) -> f64 {
    match self {
      Self::Yarzu => assigned.min(7000.0),
      _ => 5000.0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IlsProcedure {
  pub runway: &'static str,
  pub final_track: f64,
  /// ft/NM
  pub descent_rate: f64,
  pub arc_radius: f64,
  /// Radial from the ARP where the arc hands over to the IF.
  pub arc_radial: f64,
  pub intermediate_altitude: f64,
  pub landing_altitude: f64,
  pub touchdown_speed: f64,
}

pub const ILS_30R: IlsProcedure = IlsProcedure {
  runway: "30R",
  final_track: 300.0,
  descent_rate: 318.0,
  arc_radius: 17.0,
  arc_radial: 118.0,
  intermediate_altitude: 5000.0,
  landing_altitude: 500.0,
  touchdown_speed: 50.0,
};

/// Full procedure via the VOR or straight-in to the IF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcedureEntry {
  #[serde(alias = "VOR")]
  Full,
  #[serde(alias = "IF_VOR")]
  StraightIn,
}

impl ProcedureEntry {
  pub fn from_name(name: &str) -> Option<Self> {
    match name.trim().to_uppercase().as_str() {
      "FULL" | "VOR" | "TACAN" | "AMBEL" => Some(Self::Full),
      "STRAIGHT_IN" | "IF" | "IF_VOR" | "IF_VOR30R" => Some(Self::StraightIn),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stepdown {
  pub dme: f64,
  pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vor12RProcedure {
  pub runway: &'static str,
  pub vor: DVec2,
  pub outbound_radial: f64,
  pub if_distance: f64,
  pub if_position: DVec2,
  pub faf_distance: f64,
  pub faf_altitude: f64,
  pub stepdowns: &'static [Stepdown],
  /// Below this DME the profile blends into the threshold glideslope.
  pub mapt_distance: f64,
  pub initial_altitude: f64,
  pub descent_rate: f64,
  pub landing_altitude: f64,
  pub touchdown_speed: f64,
}

pub const VOR_12R: Vor12RProcedure = Vor12RProcedure {
  runway: "12R",
  vor: latlon(dms(41.0, 39.0, 28.0), -dms(1.0, 1.0, 51.0)),
  outbound_radial: 319.0,
  if_distance: 18.0,
  if_position: latlon(dms(41.0, 48.0, 27.0), -dms(1.0, 22.0, 41.0)),
  faf_distance: 8.9,
  faf_altitude: 2900.0,
  stepdowns: &[
    Stepdown {
      dme: 8.9,
      altitude: 2900.0,
    },
    Stepdown {
      dme: 7.0,
      altitude: 2610.0,
    },
    Stepdown {
      dme: 5.0,
      altitude: 2290.0,
    },
    Stepdown {
      dme: 3.7,
      altitude: 2070.0,
    },
  ],
  mapt_distance: 3.7,
  initial_altitude: 5000.0,
  descent_rate: 340.0,
  landing_altitude: 500.0,
  touchdown_speed: 50.0,
};

impl Vor12RProcedure {
  /// Lowest stepdown altitude whose DME has been passed.
  pub fn stepdown_altitude(&self, dme: f64) -> f64 {
    self
      .stepdowns
      .iter()
      .rev()
      .find(|s| dme <= s.dme)
      .map_or(self.faf_altitude, |s| s.altitude)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vor30RProcedure {
  pub runway: &'static str,
  pub vor: DVec2,
  pub radial: f64,
  pub final_track: f64,
  pub if_distance: f64,
  pub if_position: DVec2,
  pub faf_position: DVec2,
  pub mapt_position: DVec2,
  /// DME at which the aircraft is established on final.
  pub final_distance: f64,
  pub intercept_tolerance: f64,
  pub intercept_lead: f64,
  /// DME to altitude, ordered by decreasing DME.
  pub altitude_table: &'static [Stepdown],
  pub initial_altitude: f64,
  pub descent_rate: f64,
  pub landing_altitude: f64,
  pub touchdown_speed: f64,
}

pub const VOR_30R: Vor30RProcedure = Vor30RProcedure {
  runway: "30R",
  vor: ZAR,
  radial: 108.0,
  final_track: 288.0,
  if_distance: 16.0,
  if_position: latlon(dms(41.0, 34.0, 29.7), -dms(0.0, 41.0, 34.2)),
  faf_position: latlon(dms(41.0, 37.0, 36.8), -dms(0.0, 54.0, 14.2)),
  mapt_position: latlon(dms(41.0, 38.0, 51.2), -dms(0.0, 59.0, 18.5)),
  final_distance: 5.5,
  intercept_tolerance: 0.5,
  intercept_lead: 5.0,
  altitude_table: &[
    Stepdown {
      dme: 16.0,
      altitude: 5000.0,
    },
    Stepdown {
      dme: 6.0,
      altitude: 2400.0,
    },
    Stepdown {
      dme: 5.0,
      altitude: 2140.0,
    },
    Stepdown {
      dme: 4.0,
      altitude: 1830.0,
    },
    Stepdown {
      dme: 3.0,
      altitude: 1520.0,
    },
    Stepdown {
      dme: 2.0,
      altitude: 1330.0,
    },
    Stepdown {
      dme: 0.0,
      altitude: 834.0,
    },
  ],
  initial_altitude: 5000.0,
  descent_rate: 318.0,
  landing_altitude: 1000.0,
  touchdown_speed: 50.0,
};

impl Vor30RProcedure {
  /// Linear interpolation through the DME altitude table, clamped at both
  /// ends.
  pub fn altitude_at(&self, dme: f64) -> f64 {
    let table = self.altitude_table;
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
      return self.initial_altitude;
    };

    if dme >= first.dme {
      return first.altitude;
    }
    if dme <= last.dme {
      return last.altitude;
    }

    table
      .windows(2)
      .find(|pair| dme <= pair[0].dme && dme >= pair[1].dme)
      .map_or(last.altitude, |pair| {
        let (upper, lower) = (pair[0], pair[1]);
        let t = (dme - lower.dme) / (upper.dme - lower.dme);
        lower.altitude + t * (upper.altitude - lower.altitude)
      })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitacSpeeds {
  pub initial: f64,
  pub intermediate: f64,
  pub final_approach: f64,
}

/// Military high TACAN approach to runway 12R.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitacProcedure {
  pub runway: &'static str,
  pub tacan: DVec2,
  pub iaf: DVec2,
  pub iaf_altitude: f64,
  pub radial: f64,
  pub inbound_heading: f64,
  pub turn_distance: f64,
  pub intercept_tolerance: f64,
  pub intercept_lead: f64,
  pub if_position: DVec2,
  pub if_altitude: f64,
  pub faf_position: DVec2,
  pub faf_altitude: f64,
  pub speeds: HitacSpeeds,
  pub descent_rate: f64,
  pub landing_altitude: f64,
  pub touchdown_speed: f64,
}

pub const HITAC_12R: HitacProcedure = HitacProcedure {
  runway: "12R",
  tacan: ZAR,
  iaf: latlon(41.788285, -1.709244),
  iaf_altitude: 20000.0,
  radial: 295.0,
  inbound_heading: 115.0,
  turn_distance: 20.0,
  intercept_tolerance: 0.5,
  intercept_lead: 5.0,
  if_position: latlon(41.770057, -1.354690),
  if_altitude: 6000.0,
  faf_position: latlon(41.721916, -1.179665),
  faf_altitude: 2800.0,
  speeds: HitacSpeeds {
    initial: 350.0,
    intermediate: 250.0,
    final_approach: 180.0,
  },
  descent_rate: 300.0,
  landing_altitude: 300.0,
  touchdown_speed: 140.0,
};

impl HitacProcedure {
  pub fn initial_altitude(&self, entry: ProcedureEntry) -> f64 {
    match entry {
      ProcedureEntry::Full => self.iaf_altitude,
      ProcedureEntry::StraightIn => self.if_altitude,
    }
  }
}
