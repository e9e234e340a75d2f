use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  data::{
    approaches::{ProcedureEntry, VOR_30R, approach_speeds},
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

const VOR_CAPTURE_NM: f64 = 0.5;
const IF_CAPTURE_NM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vor30RPhase {
  ToZar,
  Outbound,
  ToIf,
  IfToFaf,
  FinalApproach,
  Landing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vor30RApproach {
  pub entry: ProcedureEntry,
  pub phase: Vor30RPhase,
  pub rollout: f64,
}

impl Vor30RApproach {
  pub fn new(entry: ProcedureEntry) -> Self {
    Self {
      entry,
      phase: match entry {
        ProcedureEntry::Full => Vor30RPhase::ToZar,
        ProcedureEntry::StraightIn => Vor30RPhase::ToIf,
      },
      rollout: 0.0,
    }
  }
}

pub fn update(
  aircraft: &Aircraft,
  approach: &Vor30RApproach,
  bundle: &mut Bundle,
) {
  let Some(runway) = runway(VOR_30R.runway) else {
    warn!("{}: runway {} not found", aircraft.callsign, VOR_30R.runway);
    return;
  };

  let mut next = *approach;
  let dme = distance_nm(aircraft.pos, VOR_30R.vor);
  let speeds = approach_speeds(aircraft.kind);

  match approach.phase {
    Vor30RPhase::ToZar => {
      steer(aircraft, bearing(aircraft.pos, VOR_30R.vor), bundle);
      assign_altitude(aircraft, VOR_30R.initial_altitude, bundle);

      if dme < VOR_CAPTURE_NM {
        info!("{} over ZAR, outbound R-108", aircraft.callsign);
        next.phase = Vor30RPhase::Outbound;
      }
    }
    Vor30RPhase::Outbound => {
      let heading = track_radial(
        aircraft.pos,
        VOR_30R.vor,
        VOR_30R.radial,
        VOR_30R.radial,
        VOR_30R.intercept_tolerance,
        dme + VOR_30R.intercept_lead,
      );
      steer(aircraft, heading, bundle);
      assign_altitude(aircraft, VOR_30R.initial_altitude, bundle);

      if dme >= VOR_30R.if_distance {
        info!("{} at IF, {:.1} DME, turning inbound", aircraft.callsign, dme);
        next.phase = Vor30RPhase::IfToFaf;
      }
    }
    Vor30RPhase::ToIf => {
      let to_if = distance_nm(aircraft.pos, VOR_30R.if_position);
      steer(aircraft, bearing(aircraft.pos, VOR_30R.if_position), bundle);
      assign_altitude(aircraft, VOR_30R.initial_altitude, bundle);

      if to_if < IF_CAPTURE_NM {
        info!("{} at IF, proceeding to FAF", aircraft.callsign);
        next.phase = Vor30RPhase::IfToFaf;
      }
    }
    Vor30RPhase::IfToFaf => {
      // Fly the final track once the FAF is close
      let to_faf = distance_nm(aircraft.pos, VOR_30R.faf_position);
      let target = if to_faf < IF_CAPTURE_NM {
        runway.threshold
      } else {
        VOR_30R.faf_position
      };
      steer(aircraft, bearing(aircraft.pos, target), bundle);
      assign_altitude(aircraft, VOR_30R.altitude_at(dme), bundle);

      if dme <= VOR_30R.final_distance {
        info!("{} at FAF, {:.1} DME, final descent", aircraft.callsign, dme);
        set_state(aircraft, FlightState::Approach, bundle);
        assign_speed(aircraft, speeds.final_approach, bundle);
        next.phase = Vor30RPhase::FinalApproach;
      } else {
        assign_speed(aircraft, speeds.approach, bundle);
      }
    }
    Vor30RPhase::FinalApproach => {
      let to_threshold = distance_nm(aircraft.pos, runway.threshold);
      steer(aircraft, bearing(aircraft.pos, runway.threshold), bundle);

      let altitude = VOR_30R
        .altitude_at(dme)
        .min(glideslope(to_threshold, VOR_30R.descent_rate));
      assign_altitude(aircraft, altitude, bundle);
      assign_speed(aircraft, speeds.final_approach, bundle);

      if aircraft.altitude < VOR_30R.landing_altitude {
        info!("{} landing runway {}", aircraft.callsign, runway.id);
        set_state(aircraft, FlightState::Landing, bundle);
        next.phase = Vor30RPhase::Landing;
        next.rollout = 0.0;
      } else {
        set_state(aircraft, FlightState::Approach, bundle);
      }
    }
    Vor30RPhase::Landing => {
      next.rollout = roll_out(
        aircraft,
        runway.heading,
        VOR_30R.touchdown_speed,
        approach.rollout,
        bundle,
      );
    }
  }

  if next != *approach {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::Navigation(Navigation::Vor30R(next)),
    ));
  }
}

pub fn clear(aircraft: &Aircraft, entry: ProcedureEntry, bundle: &mut Bundle) {
  info!(
    "{}: VOR {} cleared, {:?}",
    aircraft.callsign, VOR_30R.runway, entry
  );

  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Navigation(Navigation::Vor30R(Vor30RApproach::new(entry))),
  ));
  assign_altitude(aircraft, VOR_30R.initial_altitude, bundle);
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use turborand::{SeededCore, rng::Rng};

  use super::*;
  use crate::{
    entities::{
      aircraft::procedures::{
        cross_track,
        testing::{airborne, fly_until},
      },
      airspace::Airspace,
    },
    geometry::project,
    performance::AircraftKind,
  };

  #[test]
  fn test_outbound_stays_near_the_radial() {
    // Cross ZAR heading north, well off the 108 outbound track
    let start = project(VOR_30R.vor, 180.0, 3.0);
    let mut aircraft = airborne(AircraftKind::Ifr, start, 0.0, 5000.0);
    aircraft.navigation =
      Navigation::Vor30R(Vor30RApproach::new(ProcedureEntry::Full));

    let mut worst_late_xtk: f64 = 0.0;
    let turned_inbound = fly_until(&mut aircraft, 1.0, 1800, |a| {
      let Navigation::Vor30R(approach) = a.navigation else {
        return true;
      };
      let dme = distance_nm(a.pos, VOR_30R.vor);
      if approach.phase == Vor30RPhase::Outbound && dme > 12.0 {
        let xtk = cross_track(a.pos, VOR_30R.vor, VOR_30R.radial);
        worst_late_xtk = worst_late_xtk.max(xtk.abs());
      }
      approach.phase == Vor30RPhase::IfToFaf
    });

    assert!(turned_inbound.is_some());
    assert!(worst_late_xtk < 1.5, "{worst_late_xtk}");
  }

  #[test]
  fn test_faf_crossing_assigns_final_speed_once() {
    let start = project(VOR_30R.vor, VOR_30R.radial, 5.0);
    let mut aircraft = airborne(AircraftKind::Ifr, start, 288.0, 2500.0);
    let mut approach = Vor30RApproach::new(ProcedureEntry::StraightIn);
    approach.phase = Vor30RPhase::IfToFaf;
    aircraft.navigation = Navigation::Vor30R(approach);

    let snapshot = BTreeMap::new();
    let airspace = Airspace::default();
    let mut rng = Rng::with_seed(42);
    let mut bundle = Bundle::new(1.0, &snapshot, &airspace, &mut rng);
    update(&aircraft, &approach, &mut bundle);

    let speeds: Vec<_> = bundle
      .actions
      .iter()
      .filter_map(|action| match action.kind {
        ActionKind::AssignedSpeed(speed) => Some(speed),
        _ => None,
      })
      .collect();
    assert_eq!(
      speeds,
      vec![Some(approach_speeds(AircraftKind::Ifr).final_approach)]
    );
  }

  #[test]
  fn test_straight_in_lands() {
    let start = project(VOR_30R.if_position, 108.0, 6.0);
    let mut aircraft = airborne(AircraftKind::Ifr, start, 288.0, 5000.0);
    aircraft.navigation =
      Navigation::Vor30R(Vor30RApproach::new(ProcedureEntry::StraightIn));

    let mut seen = Vec::new();
    let landed = fly_until(&mut aircraft, 1.0, 3600, |a| {
      if let Navigation::Vor30R(approach) = a.navigation {
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
        Vor30RPhase::ToIf,
        Vor30RPhase::IfToFaf,
        Vor30RPhase::FinalApproach,
        Vor30RPhase::Landing,
      ]
    );
  }
}
