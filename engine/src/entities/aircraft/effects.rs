use tracing::info;

use crate::{
  LEVEL_OFF_BAND_FT, abbreviate_altitude,
  engine::Bundle,
  geometry::project,
};

use super::{
  Action, ActionKind, Aircraft, FlightState, Navigation,
  procedures::{
    formation, hitac, holding, ils, orbit, random, route, sid, turn_to,
    visual, vor, vor30r,
  },
};

pub trait AircraftEffect {
  fn run(aircraft: &Aircraft, bundle: &mut Bundle);
}

/// Runs the engine of the active navigation mode. On the ground only an
/// approach still in its rollout gets to run.
pub struct AircraftNavigationEffect;
impl AircraftEffect for AircraftNavigationEffect {
  fn run(aircraft: &Aircraft, bundle: &mut Bundle) {
    if !aircraft.state.is_airborne() && !aircraft.navigation.is_approach() {
      return;
    }

    match &aircraft.navigation {
      Navigation::Ils(approach) => ils::update(aircraft, approach, bundle),
      Navigation::Vor12R(approach) => vor::update(aircraft, approach, bundle),
      Navigation::Vor30R(approach) => {
        vor30r::update(aircraft, approach, bundle)
      }
      Navigation::Hitac(approach) => hitac::update(aircraft, approach, bundle),
      Navigation::Visual(approach) => {
        visual::update(aircraft, approach, bundle)
      }
      Navigation::Holding(holding) => {
        holding::update(aircraft, holding, bundle)
      }
      Navigation::Orbit { direction } => {
        orbit::update(aircraft, *direction, bundle)
      }
      Navigation::Heading => {
        if let Some(heading) = aircraft.assigned_heading {
          turn_to(aircraft, heading, bundle);
        }
      }
      Navigation::Route(route) => route::update(aircraft, route, bundle),
      Navigation::RandomVfr { waypoint } => {
        random::update(aircraft, waypoint.as_ref(), bundle)
      }
      Navigation::Sid => match &aircraft.sid {
        Some(clearance) => sid::update(aircraft, clearance, bundle),
        None => {
          if let Some(heading) = aircraft.assigned_heading {
            turn_to(aircraft, heading, bundle);
          }
        }
      },
    }
  }
}

/// Re-derives the enroute state from the altitude error. Procedure owned
/// states are left alone.
pub struct AircraftLifecycleEffect;
impl AircraftEffect for AircraftLifecycleEffect {
  fn run(aircraft: &Aircraft, bundle: &mut Bundle) {
    if !aircraft.state.is_enroute() {
      return;
    }

    let error = aircraft.assigned_altitude - aircraft.altitude;
    let state = if error <= -LEVEL_OFF_BAND_FT {
      FlightState::Descending
    } else if error >= LEVEL_OFF_BAND_FT {
      FlightState::Climbing
    } else {
      FlightState::Cruise
    };

    if state == aircraft.state {
      return;
    }

    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::State(state)));

    // Inside the band counts as level
    if state == FlightState::Cruise {
      bundle.actions.push(Action::new(
        aircraft.id,
        ActionKind::Altitude(aircraft.assigned_altitude),
      ));
      if aircraft.state == FlightState::Climbing {
        bundle.actions.push(Action::new(
          aircraft.id,
          ActionKind::Speed(aircraft.performance().cruise_speed),
        ));
      }
    }
  }
}

/// Converges speed on the assigned speed while airborne.
pub struct AircraftSpeedEffect;
impl AircraftEffect for AircraftSpeedEffect {
  fn run(aircraft: &Aircraft, bundle: &mut Bundle) {
    let Some(target) = aircraft.assigned_speed else {
      return;
    };
    if !aircraft.state.is_airborne() || aircraft.speed == target {
      return;
    }

    let performance = aircraft.performance();
    let speed = if (aircraft.speed - target).abs() <= 1.0 {
      target
    } else if aircraft.speed < target {
      target.min(aircraft.speed + performance.acceleration * bundle.dt)
    } else {
      target.max(aircraft.speed - performance.deceleration * bundle.dt)
    };

    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Speed(speed)));
  }
}

/// Moves altitude and position according to the flight state.
pub struct AircraftKinematicsEffect;
impl AircraftKinematicsEffect {
  fn takeoff_roll(aircraft: &Aircraft, bundle: &mut Bundle) -> f64 {
    let performance = aircraft.performance();
    let speed = performance
      .takeoff_speed
      .min(aircraft.speed + performance.acceleration * bundle.dt);

    if speed >= performance.takeoff_speed {
      info!("{} airborne", aircraft.callsign);
      bundle.actions.extend([
        Action::new(aircraft.id, ActionKind::State(FlightState::Climbing)),
        Action::new(aircraft.id, ActionKind::Speed(performance.climb_speed)),
      ]);
    } else {
      bundle
        .actions
        .push(Action::new(aircraft.id, ActionKind::Speed(speed)));
    }

    speed
  }

  fn climb(aircraft: &Aircraft, bundle: &mut Bundle) {
    let performance = aircraft.performance();
    let target = aircraft.assigned_altitude;
    if aircraft.altitude >= target {
      return;
    }

    let altitude =
      target.min(aircraft.altitude + performance.climb_rate * bundle.dt / 60.0);
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Altitude(altitude)));

    if altitude >= target {
      info!(
        "{} level at {}",
        aircraft.callsign,
        abbreviate_altitude(aircraft.assigned_altitude)
      );
      bundle.actions.extend([
        Action::new(aircraft.id, ActionKind::State(FlightState::Cruise)),
        Action::new(aircraft.id, ActionKind::Speed(performance.cruise_speed)),
      ]);
    }
  }

  /// Descends toward `target` and returns true once there.
  fn descend(aircraft: &Aircraft, target: f64, bundle: &mut Bundle) -> bool {
    if aircraft.altitude <= target {
      return true;
    }

    let rate = aircraft.performance().descent_rate;
    let altitude = target.max(aircraft.altitude - rate * bundle.dt / 60.0);
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Altitude(altitude)));

    altitude <= target
  }
}

impl AircraftEffect for AircraftKinematicsEffect {
  fn run(aircraft: &Aircraft, bundle: &mut Bundle) {
    let mut speed = aircraft.speed;

    match aircraft.state {
      FlightState::Parked => return,
      FlightState::TakeoffRoll => {
        speed = Self::takeoff_roll(aircraft, bundle);
      }
      FlightState::Climbing => Self::climb(aircraft, bundle),
      FlightState::Cruise => {}
      FlightState::Descending => {
        let level =
          Self::descend(aircraft, aircraft.assigned_altitude, bundle);
        if level && !matches!(aircraft.navigation, Navigation::Ils(..)) {
          bundle.actions.push(Action::new(
            aircraft.id,
            ActionKind::State(FlightState::Cruise),
          ));
        }
      }
      FlightState::Approach => {
        Self::descend(aircraft, aircraft.assigned_altitude, bundle);
      }
      FlightState::Landing => {
        Self::descend(aircraft, 0.0, bundle);
      }
    }

    let distance = speed * bundle.dt / 3600.0;
    let pos = project(aircraft.pos, aircraft.heading, distance);
    if pos != aircraft.pos {
      bundle
        .actions
        .push(Action::new(aircraft.id, ActionKind::Pos(pos)));
    }
  }
}

/// Keeps a follower glued to its leader.
pub struct AircraftFormationEffect;
impl AircraftFormationEffect {
  pub fn leader<'a>(
    aircraft: &Aircraft,
    bundle: &Bundle<'a>,
  ) -> Option<&'a Aircraft> {
    formation::leader(aircraft, bundle.snapshot)
  }
}

impl AircraftEffect for AircraftFormationEffect {
  fn run(aircraft: &Aircraft, bundle: &mut Bundle) {
    let Some(leader) = Self::leader(aircraft, bundle) else {
      return;
    };
    if let Some(position) = aircraft.formation {
      formation::update(aircraft, &position, leader, bundle);
    }
  }
}
