use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  data::{
    approaches::{ProcedureEntry, VOR_12R, approach_speeds},
    runway,
  },
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, FlightState, Navigation},
  geometry::{bearing, distance_nm},
};

use super::{
  assign_altitude, assign_speed, glideslope, roll_out, set_state, steer,
};

const FIX_CAPTURE_NM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vor12RPhase {
  ToVor,
  Outbound,
  ToIf,
  FafInbound,
  FinalApproach,
  Landing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vor12RApproach {
  pub entry: ProcedureEntry,
  pub phase: Vor12RPhase,
  pub rollout: f64,
}

impl Vor12RApproach {
  pub fn new(entry: ProcedureEntry) -> Self {
    Self {
      entry,
      phase: match entry {
        ProcedureEntry::Full => Vor12RPhase::ToVor,
        ProcedureEntry::StraightIn => Vor12RPhase::ToIf,
      },
      rollout: 0.0,
    }
  }
}

pub fn update(
  aircraft: &Aircraft,
  approach: &Vor12RApproach,
  bundle: &mut Bundle,
) {
  let Some(runway) = runway(VOR_12R.runway) else {
    warn!("{}: runway {} not found", aircraft.callsign, VOR_12R.runway);
    return;
  };

  let mut next = *approach;
  let dme = distance_nm(aircraft.pos, VOR_12R.vor);

  match approach.phase {
    Vor12RPhase::ToVor => {
      steer(aircraft, bearing(aircraft.pos, VOR_12R.vor), bundle);
      assign_altitude(aircraft, VOR_12R.initial_altitude, bundle);

      if dme < FIX_CAPTURE_NM {
        info!("{} over the VOR, outbound", aircraft.callsign);
        next.phase = Vor12RPhase::Outbound;
      }
    }
    Vor12RPhase::Outbound => {
      steer(aircraft, VOR_12R.outbound_radial, bundle);
      assign_altitude(aircraft, VOR_12R.initial_altitude, bundle);

      if dme >= VOR_12R.if_distance {
        info!("{} at IF, {:.1} DME, turning inbound", aircraft.callsign, dme);
        next.phase = Vor12RPhase::FafInbound;
      }
    }
    Vor12RPhase::ToIf => {
      let to_if = distance_nm(aircraft.pos, VOR_12R.if_position);
      steer(aircraft, bearing(aircraft.pos, VOR_12R.if_position), bundle);
      assign_altitude(aircraft, VOR_12R.initial_altitude, bundle);

      if to_if < FIX_CAPTURE_NM {
        info!("{} at IF, proceeding to FAF", aircraft.callsign);
        next.phase = Vor12RPhase::FafInbound;
      }
    }
    Vor12RPhase::FafInbound => {
      steer(aircraft, bearing(aircraft.pos, runway.threshold), bundle);
      assign_altitude(aircraft, VOR_12R.initial_altitude, bundle);

      if dme <= VOR_12R.faf_distance {
        info!("{} at FAF, {:.1} DME, final descent", aircraft.callsign, dme);
        set_state(aircraft, FlightState::Approach, bundle);
        let speed = approach_speeds(aircraft.kind).final_approach;
        assign_speed(aircraft, speed, bundle);
        next.phase = Vor12RPhase::FinalApproach;
      }
    }
    Vor12RPhase::FinalApproach => {
      let to_threshold = distance_nm(aircraft.pos, runway.threshold);
      steer(aircraft, bearing(aircraft.pos, runway.threshold), bundle);

      let mut altitude = VOR_12R.stepdown_altitude(dme);
      if dme < VOR_12R.mapt_distance {
        altitude =
          altitude.min(glideslope(to_threshold, VOR_12R.descent_rate));
      }
      assign_altitude(aircraft, altitude, bundle);
      let speed = approach_speeds(aircraft.kind).final_approach;
      assign_speed(aircraft, speed, bundle);

      if aircraft.altitude < VOR_12R.landing_altitude {
        info!("{} landing runway {}", aircraft.callsign, runway.id);
        set_state(aircraft, FlightState::Landing, bundle);
        next.phase = Vor12RPhase::Landing;
        next.rollout = 0.0;
      } else {
        set_state(aircraft, FlightState::Approach, bundle);
      }
    }
    Vor12RPhase::Landing => {
      next.rollout = roll_out(
        aircraft,
        runway.heading,
        VOR_12R.touchdown_speed,
        approach.rollout,
        bundle,
      );
    }
  }

  if next != *approach {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::Navigation(Navigation::Vor12R(next)),
    ));
  }
}

pub fn clear(aircraft: &Aircraft, entry: ProcedureEntry, bundle: &mut Bundle) {
  info!(
    "{}: VOR {} cleared, {:?}",
    aircraft.callsign, VOR_12R.runway, entry
  );

  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Navigation(Navigation::Vor12R(Vor12RApproach::new(entry))),
  ));
  assign_altitude(aircraft, VOR_12R.initial_altitude, bundle);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    ARP,
    entities::aircraft::procedures::testing::{airborne, fly_until},
    geometry::project,
    performance::AircraftKind,
  };

  fn phases(mut aircraft: Aircraft, max_ticks: usize) -> Vec<Vor12RPhase> {
    let mut seen = Vec::new();
    let landed = fly_until(&mut aircraft, 1.0, max_ticks, |a| {
      if let Navigation::Vor12R(approach) = a.navigation {
        if seen.last() != Some(&approach.phase) {
          seen.push(approach.phase);
        }
      }
      a.landed
    });
    assert!(landed.is_some(), "stuck in {:?}", seen.last());
    seen
  }

  #[test]
  fn test_full_procedure_goes_outbound_first() {
    let start = project(ARP, 120.0, 15.0);
    let mut aircraft = airborne(AircraftKind::Ifr, start, 300.0, 6000.0);
    aircraft.navigation =
      Navigation::Vor12R(Vor12RApproach::new(ProcedureEntry::Full));
    aircraft.assigned_altitude = VOR_12R.initial_altitude;

    assert_eq!(
      phases(aircraft, 3600),
      vec![
        Vor12RPhase::ToVor,
        Vor12RPhase::Outbound,
        Vor12RPhase::FafInbound,
        Vor12RPhase::FinalApproach,
        Vor12RPhase::Landing,
      ]
    );
  }

  #[test]
  fn test_straight_in_skips_the_vor() {
    let start = project(VOR_12R.if_position, 319.0, 8.0);
    let mut aircraft = airborne(AircraftKind::Vfr, start, 139.0, 5000.0);
    aircraft.navigation =
      Navigation::Vor12R(Vor12RApproach::new(ProcedureEntry::StraightIn));

    assert_eq!(
      phases(aircraft, 3600),
      vec![
        Vor12RPhase::ToIf,
        Vor12RPhase::FafInbound,
        Vor12RPhase::FinalApproach,
        Vor12RPhase::Landing,
      ]
    );
  }

  #[test]
  fn test_stepdowns_blend_into_glideslope() {
    assert_eq!(VOR_12R.stepdown_altitude(8.0), 2900.0);
    assert_eq!(VOR_12R.stepdown_altitude(4.0), 2290.0);
    assert_eq!(VOR_12R.stepdown_altitude(2.0), 2070.0);
    assert!(glideslope(2.0, VOR_12R.descent_rate) < 2070.0);
  }
}
