//! Per-mode navigation engines. Each engine reads the aircraft and pushes
//! the actions for one tick: heading, targets and its own phase changes.

pub mod formation;
pub mod hitac;
pub mod holding;
pub mod ils;
pub mod orbit;
pub mod random;
pub mod route;
pub mod sid;
pub mod visual;
pub mod vor;
pub mod vor30r;

use tracing::info;

use glam::DVec2;

use crate::{
  ROLLOUT_SECONDS, TOUCHDOWN_ALTITUDE_FT,
  engine::Bundle,
  geometry::{bearing, delta_angle, distance_nm, normalize_angle, radial_point},
  heading::turn_toward,
};

use super::{Action, ActionKind, Aircraft, FlightState};

/// Turns toward `target` at the aircraft's own turn rate.
pub fn turn_to(aircraft: &Aircraft, target: f64, bundle: &mut Bundle) {
  let heading = turn_toward(
    aircraft.heading,
    target,
    aircraft.performance().turn_rate,
    bundle.dt,
    None,
  );

  if heading != aircraft.heading {
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Heading(heading)));
  }
}

/// Turns toward `target` and publishes it as the assigned heading.
pub fn steer(aircraft: &Aircraft, target: f64, bundle: &mut Bundle) {
  turn_to(aircraft, target, bundle);

  let target = normalize_angle(target);
  if aircraft.assigned_heading != Some(target) {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::AssignedHeading(Some(target)),
    ));
  }
}

pub fn assign_altitude(
  aircraft: &Aircraft,
  altitude: f64,
  bundle: &mut Bundle,
) {
  if aircraft.assigned_altitude != altitude {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::AssignedAltitude(altitude),
    ));
  }
}

pub fn assign_speed(aircraft: &Aircraft, speed: f64, bundle: &mut Bundle) {
  if aircraft.assigned_speed != Some(speed) {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::AssignedSpeed(Some(speed)),
    ));
  }
}

pub fn set_state(
  aircraft: &Aircraft,
  state: FlightState,
  bundle: &mut Bundle,
) {
  if aircraft.state != state {
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::State(state)));
  }
}

/// Signed distance of `pos` from `radial` of `navaid`, positive clockwise.
pub fn cross_track(pos: DVec2, navaid: DVec2, radial: f64) -> f64 {
  let off = delta_angle(radial, bearing(navaid, pos));
  distance_nm(navaid, pos) * off.to_radians().sin()
}

/// Heading that keeps an aircraft on `radial`. Once it is `tolerance` NM or
/// more off the radial it aims at the point `aim_dme` out on the radial,
/// otherwise it flies `track`.
pub fn track_radial(
  pos: DVec2,
  navaid: DVec2,
  radial: f64,
  track: f64,
  tolerance: f64,
  aim_dme: f64,
) -> f64 {
  if cross_track(pos, navaid, radial).abs() >= tolerance {
    bearing(pos, radial_point(navaid, radial, aim_dme))
  } else {
    track
  }
}

/// Altitude of a straight glideslope `distance` NM from the threshold.
pub fn glideslope(distance: f64, feet_per_nm: f64) -> f64 {
  (distance * feet_per_nm).max(0.0)
}

/// Keeps a landing aircraft on the runway heading until it has spent
/// [`ROLLOUT_SECONDS`] at or below touchdown height. Returns the updated
/// rollout time.
pub fn roll_out(
  aircraft: &Aircraft,
  runway_heading: f64,
  touchdown_speed: f64,
  rollout: f64,
  bundle: &mut Bundle,
) -> f64 {
  if aircraft.heading != runway_heading {
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Heading(runway_heading)));
  }
  if aircraft.assigned_heading != Some(runway_heading) {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::AssignedHeading(Some(runway_heading)),
    ));
  }
  assign_altitude(aircraft, 0.0, bundle);

  if aircraft.altitude > TOUCHDOWN_ALTITUDE_FT {
    assign_speed(aircraft, touchdown_speed, bundle);
    return rollout;
  }

  assign_speed(aircraft, 0.0, bundle);
  if aircraft.altitude != 0.0 {
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Altitude(0.0)));
  }

  let rollout = rollout + bundle.dt;
  if rollout >= ROLLOUT_SECONDS {
    info!("{} landed", aircraft.callsign);
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Landed));
  }

  rollout
}

#[cfg(test)]
pub(crate) mod testing {
  use std::collections::BTreeMap;

  use glam::DVec2;
  use internment::Intern;
  use turborand::{SeededCore, rng::Rng};

  use crate::{
    engine::Bundle,
    entities::{
      aircraft::{Aircraft, FlightState, Navigation},
      airspace::Airspace,
    },
    performance::AircraftKind,
  };

  pub fn airborne(
    kind: AircraftKind,
    pos: DVec2,
    heading: f64,
    altitude: f64,
  ) -> Aircraft {
    Aircraft {
      pos,
      heading,
      altitude,
      assigned_altitude: altitude,
      speed: kind.performance().cruise_speed,
      assigned_speed: Some(kind.performance().cruise_speed),
      assigned_heading: Some(heading),
      state: FlightState::Cruise,
      navigation: Navigation::Heading,
      ..Aircraft::new(1, Intern::from_ref("TEST1"), kind)
    }
  }

  /// Ticks a lone aircraft until `done` holds, returning the tick count.
  pub fn fly_until(
    aircraft: &mut Aircraft,
    dt: f64,
    max_ticks: usize,
    mut done: impl FnMut(&Aircraft) -> bool,
  ) -> Option<usize> {
    let snapshot = BTreeMap::new();
    let airspace = Airspace::default();
    let mut rng = Rng::with_seed(42);

    for tick in 1..=max_ticks {
      let mut bundle = Bundle::new(dt, &snapshot, &airspace, &mut rng);
      aircraft.update(&mut bundle);
      if done(aircraft) {
        return Some(tick);
      }
    }

    None
  }
}
