use glam::DVec2;
use internment::Intern;
use itertools::Itertools;
use tracing::{debug, info};

use crate::{
  DEFAULT_DEPARTURE_ALTITUDE_FT, DELETE_DELAY_SECONDS, abbreviate_altitude,
  data::{
    approaches::{IlsEntry, ProcedureEntry},
    visual::{VisualEntry, VisualPattern},
  },
  engine::Bundle,
  heading::TurnDirection,
};

use super::{
  Action, ActionKind, Aircraft, FlightState, Navigation, SidClearance,
  procedures::{
    formation, hitac, holding, ils, orbit, random, route::RouteNav, sid,
    visual, vor, vor30r,
  },
};

/// ATC instructions as seen by a single aircraft. Arguments are already
/// validated by the command layer.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
  Takeoff,
  Heading(f64),
  Altitude(f64),
  Speed(f64),
  Sid {
    designator: Intern<String>,
    altitude_cap: Option<f64>,
  },
  Route(RouteNav),

  // Approaches
  Ils(IlsEntry),
  Vor12R(ProcedureEntry),
  Vor30R(ProcedureEntry),
  Hitac(ProcedureEntry),
  Visual {
    pattern: VisualPattern,
    entry: VisualEntry,
  },

  Holding {
    fix_name: Option<Intern<String>>,
    fix: DVec2,
    inbound: f64,
    direction: TurnDirection,
    leg_minutes: f64,
  },
  Orbit(TurnDirection),

  Split,
  RandomAutopilot,
  Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
  pub id: u32,
  pub kind: EventKind,
}

impl Event {
  pub fn new(id: u32, kind: EventKind) -> Self {
    Self { id, kind }
  }
}

pub trait AircraftEventHandler {
  fn run(aircraft: &Aircraft, event: &EventKind, bundle: &mut Bundle);
}

pub struct HandleAircraftEvent;
impl AircraftEventHandler for HandleAircraftEvent {
  fn run(aircraft: &Aircraft, event: &EventKind, bundle: &mut Bundle) {
    debug!("{}: {:?}", aircraft.callsign, event);

    match event {
      EventKind::Takeoff => handle_takeoff_event(aircraft, bundle),
      EventKind::Heading(heading) => {
        bundle.actions.extend([
          Action::new(aircraft.id, ActionKind::AssignedHeading(Some(*heading))),
          Action::new(aircraft.id, ActionKind::Navigation(Navigation::Heading)),
        ]);
      }
      EventKind::Altitude(altitude) => {
        handle_altitude_event(aircraft, *altitude, bundle)
      }
      EventKind::Speed(speed) => {
        bundle.actions.push(Action::new(
          aircraft.id,
          ActionKind::AssignedSpeed(Some(*speed)),
        ));
      }
      EventKind::Sid {
        designator,
        altitude_cap,
      } => {
        info!("{}: cleared {}", aircraft.callsign, designator);
        let clearance = SidClearance::new(*designator, *altitude_cap);
        bundle.actions.extend([
          Action::new(aircraft.id, ActionKind::Sid(Some(clearance))),
          Action::new(aircraft.id, ActionKind::Navigation(Navigation::Sid)),
        ]);
      }
      EventKind::Route(route) => {
        info!(
          "{}: route {}",
          aircraft.callsign,
          route.names.iter().join(" ")
        );
        bundle.actions.push(Action::new(
          aircraft.id,
          ActionKind::Navigation(Navigation::Route(route.clone())),
        ));
      }

      // Approaches
      EventKind::Ils(entry) => ils::clear(aircraft, *entry, bundle),
      EventKind::Vor12R(entry) => vor::clear(aircraft, *entry, bundle),
      EventKind::Vor30R(entry) => vor30r::clear(aircraft, *entry, bundle),
      EventKind::Hitac(entry) => hitac::clear(aircraft, *entry, bundle),
      EventKind::Visual { pattern, entry } => {
        visual::clear(aircraft, *pattern, *entry, bundle)
      }

      EventKind::Holding {
        fix_name,
        fix,
        inbound,
        direction,
        leg_minutes,
      } => holding::enter(
        aircraft,
        *fix_name,
        *fix,
        *inbound,
        *direction,
        *leg_minutes,
        bundle,
      ),
      EventKind::Orbit(direction) => orbit::enter(aircraft, *direction, bundle),

      EventKind::Split => {
        formation::split(aircraft, bundle);
      }
      EventKind::RandomAutopilot => {
        random::enable(aircraft, bundle);
      }
      EventKind::Delete => {
        info!("{} deleted", aircraft.callsign);
        bundle.actions.push(Action::new(
          aircraft.id,
          ActionKind::PendingDelete(DELETE_DELAY_SECONDS),
        ));
      }
    }
  }
}

fn handle_takeoff_event(aircraft: &Aircraft, bundle: &mut Bundle) {
  if aircraft.state != FlightState::Parked {
    return;
  }

  let altitude = aircraft
    .sid
    .as_ref()
    .map_or(DEFAULT_DEPARTURE_ALTITUDE_FT, sid::initial_climb);
  info!(
    "{} cleared for takeoff, climbing to {}",
    aircraft.callsign,
    abbreviate_altitude(altitude)
  );

  bundle.actions.extend([
    Action::new(aircraft.id, ActionKind::State(FlightState::TakeoffRoll)),
    Action::new(aircraft.id, ActionKind::AssignedAltitude(altitude)),
  ]);
}

/// Assigning a level flips an enroute aircraft into the climb or descent
/// straight away.
fn handle_altitude_event(
  aircraft: &Aircraft,
  altitude: f64,
  bundle: &mut Bundle,
) {
  bundle
    .actions
    .push(Action::new(aircraft.id, ActionKind::AssignedAltitude(altitude)));

  if !aircraft.state.is_enroute() || altitude == aircraft.altitude {
    return;
  }

  let state = if altitude > aircraft.altitude {
    FlightState::Climbing
  } else {
    FlightState::Descending
  };
  if state != aircraft.state {
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::State(state)));
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use turborand::{SeededCore, rng::Rng};

  use super::*;
  use crate::{
    ARP,
    entities::{
      aircraft::procedures::testing::airborne, airspace::Airspace,
    },
    performance::AircraftKind,
  };

  fn handle(aircraft: &mut Aircraft, event: EventKind) {
    let snapshot = BTreeMap::new();
    let airspace = Airspace::default();
    let mut rng = Rng::with_seed(1);
    let mut bundle = Bundle::new(1.0, &snapshot, &airspace, &mut rng);

    HandleAircraftEvent::run(aircraft, &event, &mut bundle);
    aircraft.apply(bundle.actions);
  }

  #[test]
  fn test_takeoff_only_from_parked() {
    let mut aircraft = airborne(AircraftKind::Ifr, ARP, 120.0, 0.0);
    aircraft.state = FlightState::Parked;
    aircraft.assigned_altitude = 0.0;
    handle(&mut aircraft, EventKind::Takeoff);
    assert_eq!(aircraft.state, FlightState::TakeoffRoll);
    assert_eq!(aircraft.assigned_altitude, 5000.0);

    let mut cruising = airborne(AircraftKind::Ifr, ARP, 120.0, 8000.0);
    handle(&mut cruising, EventKind::Takeoff);
    assert_eq!(cruising.state, FlightState::Cruise);
  }

  #[test]
  fn test_takeoff_with_sid_uses_cap() {
    let mut aircraft = airborne(AircraftKind::Ifr, ARP, 120.0, 0.0);
    aircraft.state = FlightState::Parked;
    handle(&mut aircraft, EventKind::Sid {
      designator: Intern::from_ref("CMA3D"),
      altitude_cap: None,
    });
    handle(&mut aircraft, EventKind::Takeoff);
    assert_eq!(aircraft.assigned_altitude, 24000.0);

    let mut capped = airborne(AircraftKind::Ifr, ARP, 120.0, 0.0);
    capped.state = FlightState::Parked;
    handle(&mut capped, EventKind::Sid {
      designator: Intern::from_ref("CMA3D"),
      altitude_cap: Some(11000.0),
    });
    handle(&mut capped, EventKind::Takeoff);
    assert_eq!(capped.assigned_altitude, 11000.0);
  }

  #[test]
  fn test_altitude_flips_state_immediately() {
    let mut aircraft = airborne(AircraftKind::Ifr, ARP, 0.0, 8000.0);
    handle(&mut aircraft, EventKind::Altitude(12000.0));
    assert_eq!(aircraft.state, FlightState::Climbing);

    handle(&mut aircraft, EventKind::Altitude(4000.0));
    assert_eq!(aircraft.state, FlightState::Descending);

    handle(&mut aircraft, EventKind::Altitude(8000.0));
    assert_eq!(aircraft.state, FlightState::Descending);
    assert_eq!(aircraft.assigned_altitude, 8000.0);
  }

  #[test]
  fn test_heading_switches_mode() {
    let mut aircraft = airborne(AircraftKind::Ifr, ARP, 0.0, 8000.0);
    aircraft.navigation = Navigation::Orbit {
      direction: TurnDirection::Left,
    };
    handle(&mut aircraft, EventKind::Heading(270.0));
    assert_eq!(aircraft.navigation, Navigation::Heading);
    assert_eq!(aircraft.assigned_heading, Some(270.0));
  }

  #[test]
  fn test_delete_starts_countdown() {
    let mut aircraft = airborne(AircraftKind::Vfr, ARP, 0.0, 3000.0);
    handle(&mut aircraft, EventKind::Delete);
    assert_eq!(aircraft.pending_delete, Some(DELETE_DELAY_SECONDS));
    assert!(!aircraft.is_removable());
  }
}
