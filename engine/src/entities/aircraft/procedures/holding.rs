use glam::DVec2;
use internment::Intern;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, Navigation},
  geometry::{bearing, delta_angle, distance_nm, inverse_degrees},
  heading::{TurnDirection, turn_toward},
};

/// Holds are flown at standard rate whatever the aircraft.
pub const HOLDING_TURN_RATE: f64 = 3.0;
const FIX_CAPTURE_NM: f64 = 0.5;
const FIX_CROSSING_NM: f64 = 0.3;
const TURN_COMPLETE_DEGREES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldingPhase {
  ToFix,
  Inbound,
  TurnInbound,
  Outbound,
  TurnOutbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldingPattern {
  /// `None` when holding over present position.
  pub fix_name: Option<Intern<String>>,
  pub fix: DVec2,
  pub inbound: f64,
  pub direction: TurnDirection,
  pub leg_minutes: f64,
  pub phase: HoldingPhase,
  /// Seconds flown on the current leg.
  pub elapsed: f64,
}

impl HoldingPattern {
  pub fn outbound(&self) -> f64 {
    inverse_degrees(self.inbound)
  }

  pub fn fix_label(&self) -> &str {
    self.fix_name.as_ref().map_or("present position", |n| n.as_str())
  }
}

fn fly(
  aircraft: &Aircraft,
  target: f64,
  forced: Option<TurnDirection>,
  bundle: &mut Bundle,
) -> f64 {
  let heading =
    turn_toward(aircraft.heading, target, HOLDING_TURN_RATE, bundle.dt, forced);

  if heading != aircraft.heading {
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Heading(heading)));
  }
  if aircraft.assigned_heading != Some(target) {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::AssignedHeading(Some(target)),
    ));
  }

  heading
}

pub fn update(
  aircraft: &Aircraft,
  holding: &HoldingPattern,
  bundle: &mut Bundle,
) {
  let mut next = *holding;
  let to_fix = distance_nm(aircraft.pos, holding.fix);

  match holding.phase {
    HoldingPhase::ToFix => {
      fly(aircraft, bearing(aircraft.pos, holding.fix), None, bundle);

      if to_fix < FIX_CAPTURE_NM {
        info!("{} at the holding fix, inbound", aircraft.callsign);
        next.phase = HoldingPhase::Inbound;
        next.elapsed = 0.0;
      }
    }
    HoldingPhase::Inbound => {
      fly(aircraft, bearing(aircraft.pos, holding.fix), None, bundle);

      if to_fix < FIX_CROSSING_NM {
        info!(
          "{} crossing {}, turning outbound",
          aircraft.callsign,
          holding.fix_label()
        );
        next.phase = HoldingPhase::TurnInbound;
      }
    }
    HoldingPhase::TurnInbound => {
      let outbound = holding.outbound();
      let heading =
        fly(aircraft, outbound, Some(holding.direction), bundle);

      if delta_angle(heading, outbound).abs() < TURN_COMPLETE_DEGREES {
        info!("{} outbound", aircraft.callsign);
        next.phase = HoldingPhase::Outbound;
        next.elapsed = 0.0;
      }
    }
    HoldingPhase::Outbound => {
      fly(aircraft, holding.outbound(), None, bundle);
      next.elapsed += bundle.dt;

      if next.elapsed >= holding.leg_minutes * 60.0 {
        info!(
          "{} outbound leg complete ({:.1}s), turning inbound",
          aircraft.callsign, next.elapsed
        );
        next.phase = HoldingPhase::TurnOutbound;
      }
    }
    HoldingPhase::TurnOutbound => {
      let heading =
        fly(aircraft, holding.inbound, Some(holding.direction), bundle);

      if delta_angle(heading, holding.inbound).abs() < TURN_COMPLETE_DEGREES {
        info!("{} inbound to {}", aircraft.callsign, holding.fix_label());
        next.phase = HoldingPhase::Inbound;
        next.elapsed = 0.0;
      }
    }
  }

  if next != *holding {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::Navigation(Navigation::Holding(next)),
    ));
  }
}

pub fn enter(
  aircraft: &Aircraft,
  fix_name: Option<Intern<String>>,
  fix: DVec2,
  inbound: f64,
  direction: TurnDirection,
  leg_minutes: f64,
  bundle: &mut Bundle,
) {
  let phase = if distance_nm(aircraft.pos, fix) < FIX_CAPTURE_NM {
    HoldingPhase::Inbound
  } else {
    HoldingPhase::ToFix
  };

  let holding = HoldingPattern {
    fix_name,
    fix,
    inbound,
    direction,
    leg_minutes,
    phase,
    elapsed: 0.0,
  };
  info!(
    "{}: holding at {}, inbound {:03.0}, {:?} turns, {} min legs",
    aircraft.callsign,
    holding.fix_label(),
    inbound,
    direction,
    leg_minutes
  );

  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Navigation(Navigation::Holding(holding)),
  ));
}
