use glam::DVec2;
use tracing::{debug, info, warn};
use turborand::{TurboRand, rng::Rng};

use crate::{
  ARP, FIX_CROSSING_NM,
  data::{Waypoint, WaypointKind},
  engine::Bundle,
  entities::{
    aircraft::{Action, ActionKind, Aircraft, Navigation},
    airspace::Airspace,
  },
  geometry::{bearing, distance_nm, project},
  performance::AircraftKind,
};

use super::turn_to;

const MAX_ATTEMPTS: usize = 20;
const MIN_LEG_NM: f64 = 3.0;
const MAX_LEG_NM: f64 = 10.0;
/// Random waypoints never stray further than this from the field.
pub const MAX_RANGE_NM: f64 = 60.0;

/// Picks a waypoint a few miles away that is inside the sim area and clear
/// of restricted airspace. Gives up after a handful of attempts.
pub fn generate_waypoint(
  from: DVec2,
  airspace: &Airspace,
  rng: &mut Rng,
) -> Option<Waypoint> {
  for _ in 0..MAX_ATTEMPTS {
    let distance = MIN_LEG_NM + rng.f64() * (MAX_LEG_NM - MIN_LEG_NM);
    let pos = project(from, rng.f64() * 360.0, distance);

    if distance_nm(pos, ARP) > MAX_RANGE_NM || airspace.is_restricted(pos) {
      debug!("rejected random waypoint at {pos}");
      continue;
    }

    let name = format!("RND{}", rng.u32(0..1000));
    return Some(Waypoint::new(name, WaypointKind::Random, pos));
  }

  None
}

fn next_waypoint(aircraft: &Aircraft, bundle: &mut Bundle) {
  let waypoint =
    generate_waypoint(aircraft.pos, bundle.airspace, bundle.rng);
  match &waypoint {
    Some(waypoint) => {
      info!("{} proceeding to {}", aircraft.callsign, waypoint.name);
    }
    None => {
      warn!(
        "{}: no legal random waypoint, holding heading",
        aircraft.callsign
      );
    }
  }

  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Navigation(Navigation::RandomVfr { waypoint }),
  ));
}

pub fn update(
  aircraft: &Aircraft,
  waypoint: Option<&Waypoint>,
  bundle: &mut Bundle,
) {
  let Some(waypoint) = waypoint else {
    next_waypoint(aircraft, bundle);
    return;
  };

  turn_to(aircraft, bearing(aircraft.pos, waypoint.pos), bundle);

  if distance_nm(aircraft.pos, waypoint.pos) <= FIX_CROSSING_NM {
    debug!("{} reached {}", aircraft.callsign, waypoint.name);
    next_waypoint(aircraft, bundle);
  }
}

/// Hands a VFR aircraft over to the random autopilot. Returns false for
/// other kinds, which are left untouched.
pub fn enable(aircraft: &Aircraft, bundle: &mut Bundle) -> bool {
  if aircraft.kind != AircraftKind::Vfr {
    return false;
  }

  info!("{}: random VFR autopilot on", aircraft.callsign);
  bundle.actions.extend([
    Action::new(aircraft.id, ActionKind::Sid(None)),
    Action::new(aircraft.id, ActionKind::AssignedHeading(None)),
  ]);
  next_waypoint(aircraft, bundle);

  true
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use internment::Intern;

  use super::*;
  use turborand::SeededCore;
  use crate::entities::aircraft::procedures::testing::{airborne, fly_until};

  #[test]
  fn test_generated_waypoints_are_legal() {
    let airspace = Airspace::default();
    let mut rng = Rng::with_seed(7);

    for from in [ARP, project(ARP, 200.0, 55.0), project(ARP, 20.0, 30.0)] {
      for _ in 0..200 {
        let Some(waypoint) = generate_waypoint(from, &airspace, &mut rng)
        else {
          continue;
        };

        let leg = distance_nm(from, waypoint.pos);
        assert!((MIN_LEG_NM - 0.01..=MAX_LEG_NM + 0.01).contains(&leg));
        assert!(distance_nm(waypoint.pos, ARP) <= MAX_RANGE_NM);
        assert!(!airspace.is_restricted(waypoint.pos));
        assert_eq!(waypoint.kind, WaypointKind::Random);
        assert!(waypoint.name.starts_with("RND"));
      }
    }
  }

  #[test]
  fn test_enable_is_vfr_only() {
    let snapshot = BTreeMap::new();
    let airspace = Airspace::default();
    let mut rng = Rng::with_seed(1);

    let ifr = airborne(AircraftKind::Ifr, ARP, 0.0, 8000.0);
    let mut bundle = Bundle::new(1.0, &snapshot, &airspace, &mut rng);
    assert!(!enable(&ifr, &mut bundle));
    assert!(bundle.actions.is_empty());

    let vfr = Aircraft {
      callsign: Intern::from_ref("VFR1"),
      ..airborne(AircraftKind::Vfr, project(ARP, 270.0, 20.0), 0.0, 3000.0)
    };
    let mut bundle = Bundle::new(1.0, &snapshot, &airspace, &mut rng);
    assert!(enable(&vfr, &mut bundle));
    assert!(bundle.actions.iter().any(|a| matches!(
      a.kind,
      ActionKind::Navigation(Navigation::RandomVfr { .. })
    )));
  }

  #[test]
  fn test_keeps_picking_new_waypoints() {
    let start = project(ARP, 270.0, 20.0);
    let mut aircraft = airborne(AircraftKind::Vfr, start, 0.0, 3000.0);
    aircraft.navigation = Navigation::RandomVfr { waypoint: None };

    let mut seen = Vec::new();
    fly_until(&mut aircraft, 1.0, 3600, |a| {
      if let Navigation::RandomVfr {
        waypoint: Some(waypoint),
      } = &a.navigation
      {
        if seen.last() != Some(&waypoint.pos) {
          seen.push(waypoint.pos);
        }
      }
      seen.len() >= 3
    });

    assert!(seen.len() >= 3);
    assert!(distance_nm(aircraft.pos, ARP) <= MAX_RANGE_NM + MAX_LEG_NM);
  }
}
