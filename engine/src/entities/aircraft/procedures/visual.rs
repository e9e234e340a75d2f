use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  ARP, ROLLOUT_SECONDS, TOUCHDOWN_ALTITUDE_FT,
  data::visual::{
    ATZ_RADIUS_NM, GROUND_DECELERATION, PATTERN_ALTITUDES,
    PATTERN_DECELERATION, PATTERN_DESCENT_RATE, PATTERN_LANDING_ALTITUDE,
    PATTERN_SPEEDS, VisualEntry, VisualPattern,
  },
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, FlightState, Navigation},
  geometry::{bearing, distance_nm, point_in_circle},
};

use super::{assign_altitude, assign_speed, glideslope, set_state, steer};

const LEG_CAPTURE_NM: f64 = 0.4;
const FINAL_CAPTURE_NM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisualPhase {
  ToDownwind,
  ToBase,
  ToFinal,
  FinalApproach,
  Landing,
}

impl From<VisualEntry> for VisualPhase {
  fn from(entry: VisualEntry) -> Self {
    match entry {
      VisualEntry::Downwind => Self::ToDownwind,
      VisualEntry::Base => Self::ToBase,
      VisualEntry::Final => Self::ToFinal,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualApproach {
  pub pattern: VisualPattern,
  pub entry: VisualEntry,
  pub phase: VisualPhase,
  pub entered_atz: bool,
  /// Seconds on the ground.
  pub rollout: f64,
  /// Seconds stopped on the runway.
  pub stopped: f64,
}

impl VisualApproach {
  pub fn new(pattern: VisualPattern, entry: VisualEntry) -> Self {
    Self {
      pattern,
      entry,
      phase: entry.into(),
      entered_atz: false,
      rollout: 0.0,
      stopped: 0.0,
    }
  }
}

pub fn in_atz(pos: DVec2) -> bool {
  point_in_circle(pos, ARP, ATZ_RADIUS_NM)
}

/// Slows down at the pattern rate on top of the normal deceleration.
fn pattern_decelerate(aircraft: &Aircraft, target: f64, bundle: &mut Bundle) {
  if aircraft.speed > target {
    let speed =
      target.max(aircraft.speed - PATTERN_DECELERATION * bundle.dt);
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Speed(speed)));
  }
}

fn fly_leg(
  aircraft: &Aircraft,
  point: DVec2,
  speed: f64,
  altitude: f64,
  bundle: &mut Bundle,
) -> f64 {
  steer(aircraft, bearing(aircraft.pos, point), bundle);
  assign_speed(aircraft, speed, bundle);
  assign_altitude(aircraft, altitude, bundle);
  pattern_decelerate(aircraft, speed, bundle);

  distance_nm(aircraft.pos, point)
}

pub fn update(
  aircraft: &Aircraft,
  approach: &VisualApproach,
  bundle: &mut Bundle,
) {
  let pattern = approach.pattern;
  let Some(runway) = pattern.runway() else {
    warn!(
      "{}: runway {} not found",
      aircraft.callsign,
      pattern.runway_id()
    );
    return;
  };

  let mut next = *approach;

  match approach.phase {
    VisualPhase::ToDownwind => {
      let point = pattern.waypoint(VisualEntry::Downwind);
      steer(aircraft, bearing(aircraft.pos, point), bundle);

      let inside = in_atz(aircraft.pos);
      if inside && !approach.entered_atz {
        info!(
          "{} entering ATZ, {} kt and {} ft",
          aircraft.callsign,
          PATTERN_SPEEDS.atz_entry,
          PATTERN_ALTITUDES.atz_entry
        );
        next.entered_atz = true;
      }
      if inside || approach.entered_atz {
        if aircraft.speed > PATTERN_SPEEDS.atz_entry {
          assign_speed(aircraft, PATTERN_SPEEDS.atz_entry, bundle);
        }
        assign_altitude(aircraft, PATTERN_ALTITUDES.atz_entry, bundle);
        pattern_decelerate(aircraft, PATTERN_SPEEDS.downwind, bundle);
      }

      if distance_nm(aircraft.pos, point) < LEG_CAPTURE_NM {
        info!("{} downwind, proceeding to base", aircraft.callsign);
        next.phase = VisualPhase::ToBase;
      }
    }
    VisualPhase::ToBase => {
      let distance = fly_leg(
        aircraft,
        pattern.waypoint(VisualEntry::Base),
        PATTERN_SPEEDS.base,
        PATTERN_ALTITUDES.base,
        bundle,
      );

      if distance < LEG_CAPTURE_NM {
        info!("{} base, proceeding to final", aircraft.callsign);
        next.phase = VisualPhase::ToFinal;
      }
    }
    VisualPhase::ToFinal => {
      let distance = fly_leg(
        aircraft,
        pattern.waypoint(VisualEntry::Final),
        PATTERN_SPEEDS.final_leg,
        PATTERN_ALTITUDES.final_leg,
        bundle,
      );

      if distance < FINAL_CAPTURE_NM {
        info!("{} established on final {}", aircraft.callsign, runway.id);
        next.phase = VisualPhase::FinalApproach;
      }
    }
    VisualPhase::FinalApproach => {
      let to_threshold = distance_nm(aircraft.pos, runway.threshold);
      fly_leg(
        aircraft,
        runway.threshold,
        PATTERN_SPEEDS.final_approach,
        glideslope(to_threshold, PATTERN_DESCENT_RATE),
        bundle,
      );

      if aircraft.altitude < PATTERN_LANDING_ALTITUDE {
        info!(
          "{} landing runway {} at {:.0} ft",
          aircraft.callsign, runway.id, aircraft.altitude
        );
        set_state(aircraft, FlightState::Landing, bundle);
        next.phase = VisualPhase::Landing;
        next.rollout = 0.0;
        next.stopped = 0.0;
      } else {
        set_state(aircraft, FlightState::Approach, bundle);
      }
    }
    VisualPhase::Landing => {
      if aircraft.heading != runway.heading {
        bundle
          .actions
          .push(Action::new(aircraft.id, ActionKind::Heading(runway.heading)));
      }
      if aircraft.assigned_heading != Some(runway.heading) {
        bundle.actions.push(Action::new(
          aircraft.id,
          ActionKind::AssignedHeading(Some(runway.heading)),
        ));
      }
      assign_altitude(aircraft, 0.0, bundle);

      if aircraft.altitude > TOUCHDOWN_ALTITUDE_FT {
        assign_speed(aircraft, PATTERN_SPEEDS.touchdown, bundle);
      } else {
        if aircraft.altitude != 0.0 {
          bundle
            .actions
            .push(Action::new(aircraft.id, ActionKind::Altitude(0.0)));
        }
        next.rollout += bundle.dt;

        let speed =
          (aircraft.speed - GROUND_DECELERATION * bundle.dt).max(0.0);
        if speed != aircraft.speed {
          bundle
            .actions
            .push(Action::new(aircraft.id, ActionKind::Speed(speed)));
        }
        assign_speed(aircraft, 0.0, bundle);

        if speed == 0.0 {
          if approach.stopped == 0.0 {
            info!("{} landed runway {}", aircraft.callsign, runway.id);
          }
          set_state(aircraft, FlightState::Parked, bundle);
          next.stopped += bundle.dt;

          if next.stopped >= ROLLOUT_SECONDS {
            info!("{} vacated runway {}", aircraft.callsign, runway.id);
            bundle
              .actions
              .push(Action::new(aircraft.id, ActionKind::ShouldDelete));
          }
        }
      }
    }
  }

  if next != *approach {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::Navigation(Navigation::Visual(next)),
    ));
  }
}

pub fn clear(
  aircraft: &Aircraft,
  pattern: VisualPattern,
  entry: VisualEntry,
  bundle: &mut Bundle,
) {
  info!(
    "{}: visual {} cleared via {:?}",
    aircraft.callsign,
    pattern.name(),
    entry
  );

  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Navigation(Navigation::Visual(VisualApproach::new(
      pattern, entry,
    ))),
  ));
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
  fn test_entry_picks_first_phase() {
    let pattern = VisualPattern::Rwy12LLeft;
    assert_eq!(
      VisualApproach::new(pattern, VisualEntry::Base).phase,
      VisualPhase::ToBase
    );
    assert_eq!(
      VisualApproach::new(pattern, VisualEntry::Final).phase,
      VisualPhase::ToFinal
    );
  }

  #[test]
  fn test_atz_boundary() {
    assert!(in_atz(ARP));
    assert!(in_atz(project(ARP, 45.0, 4.2)));
    assert!(!in_atz(project(ARP, 45.0, 4.5)));
  }

  #[test]
  fn test_downwind_entry_lands_and_vacates() {
    let pattern = VisualPattern::Rwy30RRight;
    let start = project(ARP, 340.0, 8.0);
    let mut aircraft = airborne(AircraftKind::Vfr, start, 160.0, 1500.0);
    aircraft.navigation =
      Navigation::Visual(VisualApproach::new(pattern, VisualEntry::Downwind));

    let mut seen = Vec::new();
    let mut entered_atz = false;
    let done = fly_until(&mut aircraft, 1.0, 3600, |a| {
      if let Navigation::Visual(approach) = a.navigation {
        entered_atz |= approach.entered_atz;
        if seen.last() != Some(&approach.phase) {
          seen.push(approach.phase);
        }
      }
      a.should_delete
    });

    assert!(done.is_some(), "stuck in {:?}", seen.last());
    assert!(entered_atz);
    assert_eq!(
      seen,
      vec![
        VisualPhase::ToDownwind,
        VisualPhase::ToBase,
        VisualPhase::ToFinal,
        VisualPhase::FinalApproach,
        VisualPhase::Landing,
      ]
    );
    assert_eq!(aircraft.state, FlightState::Parked);
    assert_eq!(aircraft.speed, 0.0);
    assert_eq!(aircraft.altitude, 0.0);
  }
}
