pub mod actions;
pub mod effects;
pub mod events;
pub mod procedures;

use glam::DVec2;
use internment::Intern;
use serde::{Deserialize, Serialize};

use crate::{
  data::Waypoint,
  engine::Bundle,
  heading::TurnDirection,
  performance::{AircraftKind, Performance},
};

pub use actions::{Action, ActionKind};
use actions::{AircraftActionHandler, AircraftAllActionHandler};
use effects::{
  AircraftEffect, AircraftFormationEffect, AircraftKinematicsEffect,
  AircraftLifecycleEffect, AircraftNavigationEffect, AircraftSpeedEffect,
};
use procedures::{
  hitac::HitacApproach, holding::HoldingPattern, ils::IlsApproach,
  route::RouteNav, visual::VisualApproach, vor::Vor12RApproach,
  vor30r::Vor30RApproach,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightState {
  #[default]
  Parked,
  TakeoffRoll,
  Climbing,
  Cruise,
  Descending,
  Approach,
  Landing,
}

impl FlightState {
  pub fn is_airborne(self) -> bool {
    !matches!(self, Self::Parked | Self::TakeoffRoll)
  }

  /// States derived from the altitude error rather than owned by a
  /// procedure.
  pub fn is_enroute(self) -> bool {
    matches!(self, Self::Climbing | Self::Cruise | Self::Descending)
  }
}

/// The active navigation mode. Only the active mode carries a payload, so
/// switching modes drops whatever the previous procedure was doing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum Navigation {
  #[default]
  #[serde(rename = "SID_NAV")]
  Sid,
  #[serde(rename = "HEADING_MODE")]
  Heading,
  #[serde(rename = "ROUTE_NAV")]
  Route(RouteNav),
  #[serde(rename = "ILS_APPROACH")]
  Ils(IlsApproach),
  #[serde(rename = "VOR_APPROACH")]
  Vor12R(Vor12RApproach),
  #[serde(rename = "VOR_30R_APPROACH")]
  Vor30R(Vor30RApproach),
  #[serde(rename = "HITAC_APPROACH")]
  Hitac(HitacApproach),
  #[serde(rename = "VISUAL_APPROACH")]
  Visual(VisualApproach),
  #[serde(rename = "HOLDING")]
  Holding(HoldingPattern),
  #[serde(rename = "ORBIT")]
  Orbit { direction: TurnDirection },
  #[serde(rename = "RANDOM_VFR")]
  RandomVfr { waypoint: Option<Waypoint> },
}

impl Navigation {
  pub fn is_approach(&self) -> bool {
    matches!(
      self,
      Self::Ils(..)
        | Self::Vor12R(..)
        | Self::Vor30R(..)
        | Self::Hitac(..)
        | Self::Visual(..)
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidClearance {
  pub designator: Intern<String>,
  /// Index of the next fix to fly to.
  pub index: usize,
  pub complete: bool,
  pub altitude_cap: Option<f64>,
}

impl SidClearance {
  pub fn new(designator: Intern<String>, altitude_cap: Option<f64>) -> Self {
    Self {
      designator,
      index: 0,
      complete: false,
      altitude_cap,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Formation {
  /// Slot in the trail, 0 is the leader.
  pub position: usize,
  pub leader: bool,
  pub leader_id: u32,
  /// Split members fly on their own for good.
  pub split: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
  pub id: u32,
  pub callsign: Intern<String>,
  #[serde(rename = "type")]
  pub kind: AircraftKind,

  pub pos: DVec2,
  pub altitude: f64,
  pub heading: f64,
  pub speed: f64,

  pub assigned_altitude: f64,
  pub assigned_speed: Option<f64>,
  pub assigned_heading: Option<f64>,

  pub state: FlightState,
  pub navigation: Navigation,
  pub sid: Option<SidClearance>,
  pub formation: Option<Formation>,

  pub landed: bool,
  pub should_delete: bool,
  /// Seconds of sim time left before a deleted aircraft is removed.
  pub pending_delete: Option<f64>,
}

impl Aircraft {
  pub fn new(id: u32, callsign: Intern<String>, kind: AircraftKind) -> Self {
    Self {
      id,
      callsign,
      kind,

      pos: DVec2::ZERO,
      altitude: 0.0,
      heading: 0.0,
      speed: 0.0,

      assigned_altitude: 0.0,
      assigned_speed: None,
      assigned_heading: None,

      state: FlightState::default(),
      navigation: Navigation::default(),
      sid: None,
      formation: None,

      landed: false,
      should_delete: false,
      pending_delete: None,
    }
  }

  pub fn performance(&self) -> &'static Performance {
    self.kind.performance()
  }

  pub fn is_follower(&self) -> bool {
    self.formation.is_some_and(|f| !f.leader)
  }

  pub fn is_removable(&self) -> bool {
    self.landed
      || self.should_delete
      || self.pending_delete.is_some_and(|t| t <= 0.0)
  }
}

// Update pipeline
impl Aircraft {
  pub fn apply(&mut self, actions: impl IntoIterator<Item = Action>) {
    let id = self.id;
    for action in actions.into_iter().filter(|a| a.id == id) {
      AircraftAllActionHandler::run(self, &action);
    }
  }

  fn run_effect<E: AircraftEffect>(&mut self, bundle: &mut Bundle) {
    E::run(self, bundle);
    let actions = core::mem::take(&mut bundle.actions);
    self.apply(actions);
  }

  /// Advances the aircraft by `bundle.dt`. Each stage sees the result of the
  /// previous one.
  pub fn update(&mut self, bundle: &mut Bundle) {
    if let Some(countdown) = self.pending_delete {
      self.pending_delete = Some(countdown - bundle.dt);
    }

    if AircraftFormationEffect::leader(self, bundle).is_some() {
      self.run_effect::<AircraftFormationEffect>(bundle);
      return;
    }

    self.run_effect::<AircraftNavigationEffect>(bundle);
    self.run_effect::<AircraftLifecycleEffect>(bundle);
    self.run_effect::<AircraftSpeedEffect>(bundle);
    self.run_effect::<AircraftKinematicsEffect>(bundle);
  }
}
