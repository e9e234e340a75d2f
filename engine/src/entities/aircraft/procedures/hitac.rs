use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  data::{
    approaches::{HITAC_12R, ProcedureEntry},
    runway,
  },
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, FlightState, Navigation},
  geometry::{bearing, distance_nm},
};

use super::{
  assign_altitude, assign_speed, glideslope, roll_out, set_state, steer,
  track_radial,
};

const IAF_CAPTURE_NM: f64 = 1.0;
const FIX_CAPTURE_NM: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HitacPhase {
  ToAmbel,
  /// Tracks R-295 inbound to the TACAN. Keeps the published phase label.
  #[serde(rename = "OUTBOUND_R281")]
  OutboundR281,
  TurnToIf,
  IfToFaf,
  FinalApproach,
  Landing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitacApproach {
  pub entry: ProcedureEntry,
  pub phase: HitacPhase,
  pub passed_ambel: bool,
  pub rollout: f64,
}

impl HitacApproach {
  pub fn new(entry: ProcedureEntry) -> Self {
    Self {
      entry,
      phase: match entry {
        ProcedureEntry::Full => HitacPhase::ToAmbel,
        ProcedureEntry::StraightIn => HitacPhase::TurnToIf,
      },
      passed_ambel: false,
      rollout: 0.0,
    }
  }
}

/// Spreads the descent to `target` over the remaining `distance`, so the
/// aircraft arrives at the fix level instead of diving straight to it.
pub fn planned_descent(
  altitude: f64,
  target: f64,
  distance: f64,
  speed: f64,
  dt: f64,
) -> f64 {
  if altitude > target && distance > 0.1 {
    let feet_per_nm = (altitude - target) / distance;
    let descent = feet_per_nm * (speed / 3600.0) * dt;
    // The x60 scaling shapes the published HITAC profile
    target.max(altitude - descent * 60.0)
  } else {
    target
  }
}

pub fn update(
  aircraft: &Aircraft,
  approach: &HitacApproach,
  bundle: &mut Bundle,
) {
  let Some(runway) = runway(HITAC_12R.runway) else {
    warn!("{}: runway {} not found", aircraft.callsign, HITAC_12R.runway);
    return;
  };

  let mut next = *approach;
  let dt = bundle.dt;
  let descend_to = |target: f64, distance: f64| {
    planned_descent(aircraft.altitude, target, distance, aircraft.speed, dt)
  };

  match approach.phase {
    HitacPhase::ToAmbel => {
      let to_iaf = distance_nm(aircraft.pos, HITAC_12R.iaf);
      steer(aircraft, bearing(aircraft.pos, HITAC_12R.iaf), bundle);
      assign_altitude(aircraft, HITAC_12R.iaf_altitude, bundle);
      assign_speed(aircraft, HITAC_12R.speeds.initial, bundle);

      if to_iaf < IAF_CAPTURE_NM {
        info!(
          "{} passed AMBEL ({:.1} NM), intercepting R-295",
          aircraft.callsign, to_iaf
        );
        next.phase = HitacPhase::OutboundR281;
        next.passed_ambel = true;
      }
    }
    HitacPhase::OutboundR281 => {
      let dme = distance_nm(aircraft.pos, HITAC_12R.tacan);
      let heading = track_radial(
        aircraft.pos,
        HITAC_12R.tacan,
        HITAC_12R.radial,
        HITAC_12R.inbound_heading,
        HITAC_12R.intercept_tolerance,
        (dme - HITAC_12R.intercept_lead).max(HITAC_12R.turn_distance),
      );
      steer(aircraft, heading, bundle);

      let to_if = distance_nm(aircraft.pos, HITAC_12R.if_position);
      let altitude = descend_to(HITAC_12R.if_altitude, to_if);
      assign_altitude(aircraft, altitude, bundle);
      assign_speed(aircraft, HITAC_12R.speeds.initial, bundle);

      if dme <= HITAC_12R.turn_distance {
        info!("{} at {:.1} DME, turning to IF", aircraft.callsign, dme);
        next.phase = HitacPhase::TurnToIf;
      }
    }
    HitacPhase::TurnToIf => {
      let to_if = distance_nm(aircraft.pos, HITAC_12R.if_position);
      steer(aircraft, bearing(aircraft.pos, HITAC_12R.if_position), bundle);
      let altitude = descend_to(HITAC_12R.if_altitude, to_if);
      assign_altitude(aircraft, altitude, bundle);
      assign_speed(aircraft, HITAC_12R.speeds.intermediate, bundle);

      if to_if < FIX_CAPTURE_NM {
        info!(
          "{} at IF, {:.0} ft, turning to FAF",
          aircraft.callsign, aircraft.altitude
        );
        next.phase = HitacPhase::IfToFaf;
      }
    }
    HitacPhase::IfToFaf => {
      let to_faf = distance_nm(aircraft.pos, HITAC_12R.faf_position);
      steer(aircraft, bearing(aircraft.pos, HITAC_12R.faf_position), bundle);
      let altitude = descend_to(HITAC_12R.faf_altitude, to_faf);
      assign_altitude(aircraft, altitude, bundle);
      assign_speed(aircraft, HITAC_12R.speeds.intermediate, bundle);

      if to_faf < FIX_CAPTURE_NM {
        info!(
          "{} passed FAF at {:.0} ft, final approach",
          aircraft.callsign, aircraft.altitude
        );
        set_state(aircraft, FlightState::Approach, bundle);
        next.phase = HitacPhase::FinalApproach;
      }
    }
    HitacPhase::FinalApproach => {
      let to_threshold = distance_nm(aircraft.pos, runway.threshold);
      steer(aircraft, bearing(aircraft.pos, runway.threshold), bundle);
      let altitude = glideslope(to_threshold, HITAC_12R.descent_rate);
      assign_altitude(aircraft, altitude, bundle);
      assign_speed(aircraft, HITAC_12R.speeds.final_approach, bundle);

      if aircraft.altitude < HITAC_12R.landing_altitude {
        info!("{} landing runway {}", aircraft.callsign, runway.id);
        set_state(aircraft, FlightState::Landing, bundle);
        next.phase = HitacPhase::Landing;
        next.rollout = 0.0;
      } else {
        set_state(aircraft, FlightState::Approach, bundle);
      }
    }
    HitacPhase::Landing => {
      next.rollout = roll_out(
        aircraft,
        runway.heading,
        HITAC_12R.touchdown_speed,
        approach.rollout,
        bundle,
      );
    }
  }

  if next != *approach {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::Navigation(Navigation::Hitac(next)),
    ));
  }
}

pub fn clear(aircraft: &Aircraft, entry: ProcedureEntry, bundle: &mut Bundle) {
  let altitude = HITAC_12R.initial_altitude(entry);
  info!(
    "{}: HI-TAC {} cleared, {:?}, {} ft",
    aircraft.callsign, HITAC_12R.runway, entry, altitude
  );

  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Navigation(Navigation::Hitac(HitacApproach::new(entry))),
  ));
  assign_altitude(aircraft, altitude, bundle);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entities::aircraft::procedures::testing::{airborne, fly_until},
    geometry::project,
    performance::AircraftKind,
  };

  #[test]
  fn test_planned_descent() {
    // Level or below the target holds the target
    assert_eq!(planned_descent(5000.0, 6000.0, 10.0, 300.0, 1.0), 6000.0);
    assert_eq!(planned_descent(9000.0, 6000.0, 0.05, 300.0, 1.0), 6000.0);

    // 3000 ft over 10 NM at 360 kt: 300 ft/NM, 0.1 NM per second
    let altitude = planned_descent(9000.0, 6000.0, 10.0, 360.0, 1.0);
    assert!((altitude - (9000.0 - 1800.0)).abs() < 1e-9);

    // Never below the target
    assert_eq!(planned_descent(6500.0, 6000.0, 1.0, 360.0, 1.0), 6000.0);
  }

  #[test]
  fn test_full_procedure_lands() {
    let start = project(HITAC_12R.iaf, 270.0, 10.0);
    let mut aircraft =
      airborne(AircraftKind::Military, start, 90.0, HITAC_12R.iaf_altitude);
    aircraft.navigation =
      Navigation::Hitac(HitacApproach::new(ProcedureEntry::Full));

    let mut seen = Vec::new();
    let landed = fly_until(&mut aircraft, 1.0, 3600, |a| {
      if let Navigation::Hitac(approach) = a.navigation {
        if seen.last() != Some(&approach.phase) {
          seen.push(approach.phase);
        }
      }
      a.landed
    });

    assert!(landed.is_some(), "stuck in {:?}", seen.last());
    assert_eq!(
      seen,
      vec![
        HitacPhase::ToAmbel,
        HitacPhase::OutboundR281,
        HitacPhase::TurnToIf,
        HitacPhase::IfToFaf,
        HitacPhase::FinalApproach,
        HitacPhase::Landing,
      ]
    );
    assert_eq!(aircraft.altitude, 0.0);
  }

  #[test]
  fn test_straight_in_starts_at_the_if() {
    let approach = HitacApproach::new(ProcedureEntry::StraightIn);
    assert_eq!(approach.phase, HitacPhase::TurnToIf);
    assert!(!approach.passed_ambel);
    assert_eq!(HITAC_12R.initial_altitude(ProcedureEntry::StraightIn), 6000.0);
  }
}
