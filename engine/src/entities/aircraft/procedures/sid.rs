use tracing::{info, warn};

use crate::{
  DEFAULT_SID_CEILING_FT, FIX_CROSSING_NM, abbreviate_altitude,
  data::{Sid, sid},
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, SidClearance},
  geometry::{bearing, distance_nm},
};

use super::{assign_altitude, turn_to};

/// Altitude an aircraft climbs to on takeoff with a SID. A cap from the
/// clearance replaces the default ceiling.
pub fn initial_climb(clearance: &SidClearance) -> f64 {
  clearance.altitude_cap.unwrap_or(DEFAULT_SID_CEILING_FT)
}

/// Level to settle at once the last fix is behind, never above the cap.
pub fn final_altitude(sid: &Sid, clearance: &SidClearance) -> f64 {
  clearance
    .altitude_cap
    .map_or(sid.final_altitude, |cap| cap.min(sid.final_altitude))
}

pub fn update(
  aircraft: &Aircraft,
  clearance: &SidClearance,
  bundle: &mut Bundle,
) {
  if clearance.complete {
    return;
  }

  let Some(sid) = sid(&clearance.designator) else {
    warn!("{}: SID {} not found", aircraft.callsign, clearance.designator);
    return;
  };

  let Some(fix) = sid.fixes.get(clearance.index) else {
    complete(aircraft, sid, clearance, bundle);
    return;
  };

  turn_to(aircraft, bearing(aircraft.pos, fix.pos), bundle);

  if distance_nm(aircraft.pos, fix.pos) <= FIX_CROSSING_NM {
    info!(
      "{} crossed {} at {:.0} ft",
      aircraft.callsign, fix.name, aircraft.altitude
    );

    let next = SidClearance {
      index: clearance.index + 1,
      ..clearance.clone()
    };
    match sid.fixes.get(next.index) {
      Some(fix) => {
        info!("{} proceeding to {}", aircraft.callsign, fix.name);
        bundle
          .actions
          .push(Action::new(aircraft.id, ActionKind::Sid(Some(next))));
      }
      None => complete(aircraft, sid, &next, bundle),
    }
  }
}

fn complete(
  aircraft: &Aircraft,
  sid: &Sid,
  clearance: &SidClearance,
  bundle: &mut Bundle,
) {
  let altitude = final_altitude(sid, clearance);
  info!(
    "{}: SID {} complete, final altitude {}",
    aircraft.callsign,
    sid.designator,
    abbreviate_altitude(altitude)
  );

  assign_altitude(aircraft, altitude, bundle);
  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Sid(Some(SidClearance {
      complete: true,
      ..clearance.clone()
    })),
  ));
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use internment::Intern;
  use turborand::{SeededCore, rng::Rng};

  use super::*;
  use crate::{
    entities::{
      aircraft::{
        Navigation,
        procedures::testing::{airborne, fly_until},
      },
      airspace::Airspace,
    },
    performance::AircraftKind,
  };

  fn cleared(cap: Option<f64>) -> SidClearance {
    SidClearance::new(Intern::from_ref("CMA3D"), cap)
  }

  #[test]
  fn test_altitudes() {
    let sid = sid("CMA3D").unwrap();
    assert_eq!(initial_climb(&cleared(None)), 24000.0);
    assert_eq!(initial_climb(&cleared(Some(9000.0))), 9000.0);
    assert_eq!(final_altitude(sid, &cleared(None)), 23000.0);
    assert_eq!(final_altitude(sid, &cleared(Some(9000.0))), 9000.0);
    assert_eq!(final_altitude(sid, &cleared(Some(30000.0))), 23000.0);
  }

  #[test]
  fn test_walks_fixes_and_completes() {
    let sid = sid("CMA3D").unwrap();
    let start = crate::geometry::project(sid.fixes[0].pos, 300.0, 3.0);
    let mut aircraft = airborne(AircraftKind::Ifr, start, 120.0, 24000.0);
    aircraft.navigation = Navigation::Sid;
    aircraft.sid = Some(cleared(None));

    let done = fly_until(&mut aircraft, 1.0, 7200, |a| {
      a.sid.as_ref().is_some_and(|s| s.complete)
    });

    assert!(done.is_some());
    let clearance = aircraft.sid.clone().unwrap();
    assert_eq!(clearance.index, sid.fixes.len());
    assert_eq!(aircraft.assigned_altitude, 23000.0);
  }

  #[test]
  fn test_completion_is_idempotent() {
    let snapshot = BTreeMap::new();
    let airspace = Airspace::default();
    let mut rng = Rng::with_seed(3);

    let mut aircraft = airborne(AircraftKind::Ifr, crate::ARP, 0.0, 23000.0);
    aircraft.sid = Some(SidClearance {
      index: 3,
      complete: true,
      ..cleared(None)
    });

    for _ in 0..50 {
      let mut bundle = Bundle::new(1.0, &snapshot, &airspace, &mut rng);
      update(&aircraft, aircraft.sid.as_ref().unwrap(), &mut bundle);
      assert!(bundle.actions.is_empty());
    }
  }
}
