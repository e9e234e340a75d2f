use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  ARP,
  data::{
    WAYPOINTS,
    approaches::{ILS_30R, IlsEntry, approach_speeds},
    runway,
  },
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, FlightState, Navigation},
  geometry::{bearing, delta_angle, distance_nm, normalize_angle, radial_point},
};

use super::{
  assign_altitude, assign_speed, glideslope, roll_out, set_state, steer,
};

/// Entry fix capture distance.
const ENTRY_CAPTURE_NM: f64 = 2.0;
/// Above this DME the aircraft flies to a point on the arc instead of
/// following it.
const ARC_INTERCEPT_DME: f64 = 19.0;
const ARC_JOIN_DME: f64 = 15.0;
/// How far ahead on the arc the intercept point is, in degrees of radial.
const ARC_LEAD_DEGREES: f64 = 25.0;
const ARC_EXIT_DEGREES: f64 = 50.0;
const ARC_EXIT_IF_NM: f64 = 9.0;
const IF_CAPTURE_NM: f64 = 1.0;
const LOCALIZER_CAPTURE_NM: f64 = 15.0;
const LOCALIZER_HEADING_TOLERANCE: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IlsPhase {
  ToEntry,
  ToArc,
  Arc,
  ToIf,
  IfToFap,
  FinalApproach,
  Landing,
}

/// Which way an aircraft flies around the DME arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArcDirection {
  #[serde(rename = "CW")]
  Clockwise,
  #[serde(rename = "CCW")]
  Counterclockwise,
}

impl ArcDirection {
  /// Flies the short way around from `radial` to `target`.
  pub fn toward(radial: f64, target: f64) -> Self {
    if delta_angle(radial, target) >= 0.0 {
      Self::Clockwise
    } else {
      Self::Counterclockwise
    }
  }

  pub fn sign(self) -> f64 {
    match self {
      Self::Clockwise => 1.0,
      Self::Counterclockwise => -1.0,
    }
  }

  /// Heading tangent to an arc at `radial`, turned by `correction` degrees
  /// toward the arc's center.
  pub fn tangent(self, radial: f64, correction: f64) -> f64 {
    normalize_angle(radial + self.sign() * (90.0 + correction))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IlsApproach {
  pub entry: IlsEntry,
  pub phase: IlsPhase,
  /// Decided once, when the aircraft first heads for the arc.
  pub arc_direction: Option<ArcDirection>,
  pub rollout: f64,
}

impl IlsApproach {
  pub fn new(entry: IlsEntry) -> Self {
    Self {
      entry,
      phase: if entry.is_arc() {
        IlsPhase::ToEntry
      } else {
        IlsPhase::IfToFap
      },
      arc_direction: None,
      rollout: 0.0,
    }
  }
}

pub fn update(
  aircraft: &Aircraft,
  approach: &IlsApproach,
  bundle: &mut Bundle,
) {
  let mut next = *approach;

  match approach.phase {
    IlsPhase::ToEntry => to_entry(aircraft, &mut next, bundle),
    IlsPhase::ToArc => to_arc(aircraft, &mut next, bundle),
    IlsPhase::Arc => arc(aircraft, &mut next, bundle),
    IlsPhase::ToIf => to_if(aircraft, &mut next, bundle),
    IlsPhase::IfToFap => if_to_fap(aircraft, &mut next, bundle),
    IlsPhase::FinalApproach => final_approach(aircraft, &mut next, bundle),
    IlsPhase::Landing => {
      next.rollout = roll_out(
        aircraft,
        ILS_30R.final_track,
        ILS_30R.touchdown_speed,
        approach.rollout,
        bundle,
      );
    }
  }

  if next != *approach {
    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::Navigation(Navigation::Ils(next)),
    ));
  }
}

fn to_entry(
  aircraft: &Aircraft,
  approach: &mut IlsApproach,
  bundle: &mut Bundle,
) {
  let Some(fix) = approach.entry.fix() else {
    warn!(
      "{}: ILS entry {} not found",
      aircraft.callsign,
      approach.entry.fix_name()
    );
    return;
  };

  let distance = distance_nm(aircraft.pos, fix.pos);
  steer(aircraft, bearing(aircraft.pos, fix.pos), bundle);

  // YARZU holds 7000 until the fix, GODPI descends straight away
  let altitude = match approach.entry {
    IlsEntry::Yarzu if distance > ENTRY_CAPTURE_NM => 7000.0,
    _ => ILS_30R.intermediate_altitude,
  };
  assign_altitude(aircraft, altitude, bundle);

  let speeds = approach_speeds(aircraft.kind);
  if distance <= 5.0 || (distance <= 10.0 && aircraft.speed > speeds.approach)
  {
    assign_speed(aircraft, speeds.approach, bundle);
  }

  if distance < ENTRY_CAPTURE_NM {
    info!("{} passing {}, joining the arc", aircraft.callsign, fix.name);
    approach.phase = IlsPhase::ToArc;
  }
}

fn to_arc(
  aircraft: &Aircraft,
  approach: &mut IlsApproach,
  bundle: &mut Bundle,
) {
  let radial = bearing(ARP, aircraft.pos);
  let dme = distance_nm(ARP, aircraft.pos);
  let direction = *approach
    .arc_direction
    .get_or_insert_with(|| ArcDirection::toward(radial, ILS_30R.arc_radial));

  let heading = if dme > ARC_INTERCEPT_DME {
    let intercept = radial_point(
      ARP,
      radial + direction.sign() * ARC_LEAD_DEGREES,
      ILS_30R.arc_radius,
    );
    bearing(aircraft.pos, intercept)
  } else {
    let error = dme - ILS_30R.arc_radius;
    let correction = if error.abs() > 1.0 {
      10.0_f64.copysign(error)
    } else {
      0.0
    };
    direction.tangent(radial, correction)
  };

  steer(aircraft, heading, bundle);
  assign_altitude(aircraft, ILS_30R.intermediate_altitude, bundle);
  assign_speed(aircraft, approach_speeds(aircraft.kind).approach, bundle);

  if (ARC_JOIN_DME..=ARC_INTERCEPT_DME).contains(&dme) {
    info!(
      "{} established on the arc, radial {:.0} at {:.1} DME",
      aircraft.callsign, radial, dme
    );
    approach.phase = IlsPhase::Arc;
  }
}

fn arc(aircraft: &Aircraft, approach: &mut IlsApproach, bundle: &mut Bundle) {
  let radial = bearing(ARP, aircraft.pos);
  let dme = distance_nm(ARP, aircraft.pos);
  let direction = *approach
    .arc_direction
    .get_or_insert_with(|| ArcDirection::toward(radial, ILS_30R.arc_radial));

  let error = dme - ILS_30R.arc_radius;
  let correction = if error.abs() > 0.5 {
    (error.abs() * 5.0).min(15.0).copysign(error)
  } else {
    0.0
  };

  steer(aircraft, direction.tangent(radial, correction), bundle);
  assign_altitude(aircraft, ILS_30R.intermediate_altitude, bundle);
  assign_speed(aircraft, approach_speeds(aircraft.kind).approach, bundle);

  let to_if = IlsEntry::IfIls
    .fix()
    .map_or(f64::INFINITY, |fix| distance_nm(aircraft.pos, fix.pos));
  if delta_angle(radial, ILS_30R.arc_radial).abs() < ARC_EXIT_DEGREES
    || to_if < ARC_EXIT_IF_NM
  {
    info!(
      "{} leaving the arc at radial {:.0}, {:.1} NM to IF",
      aircraft.callsign, radial, to_if
    );
    approach.phase = IlsPhase::ToIf;
  }
}

fn to_if(
  aircraft: &Aircraft,
  approach: &mut IlsApproach,
  bundle: &mut Bundle,
) {
  let Some(fix) = IlsEntry::IfIls.fix() else {
    warn!("{}: IF_ILS not found", aircraft.callsign);
    return;
  };

  let distance = distance_nm(aircraft.pos, fix.pos);
  steer(aircraft, bearing(aircraft.pos, fix.pos), bundle);
  assign_altitude(aircraft, ILS_30R.intermediate_altitude, bundle);
  assign_speed(aircraft, approach_speeds(aircraft.kind).approach, bundle);

  if distance < IF_CAPTURE_NM {
    info!("{} at IF_ILS, intercepting the localizer", aircraft.callsign);
    approach.phase = IlsPhase::IfToFap;
  }
}

fn if_to_fap(
  aircraft: &Aircraft,
  approach: &mut IlsApproach,
  bundle: &mut Bundle,
) {
  let Some(threshold) = runway(ILS_30R.runway).map(|r| r.threshold) else {
    warn!("{}: runway {} not found", aircraft.callsign, ILS_30R.runway);
    return;
  };

  let to_threshold = distance_nm(aircraft.pos, threshold);
  steer(aircraft, bearing(aircraft.pos, threshold), bundle);
  assign_altitude(aircraft, ILS_30R.intermediate_altitude, bundle);

  let to_entry = approach
    .entry
    .fix()
    .map_or(f64::INFINITY, |fix| distance_nm(aircraft.pos, fix.pos));
  let passed_entry = match approach.entry {
    IlsEntry::Kekag => to_entry < ENTRY_CAPTURE_NM || to_threshold < 18.0,
    IlsEntry::IfIls => to_entry < ENTRY_CAPTURE_NM || to_threshold < 12.0,
    IlsEntry::Yarzu | IlsEntry::Godpi => true,
  };

  let speeds = approach_speeds(aircraft.kind);
  if passed_entry {
    assign_speed(aircraft, speeds.final_approach, bundle);
  } else if to_entry <= 5.0 {
    assign_speed(aircraft, speeds.approach, bundle);
  }

  let established = delta_angle(aircraft.heading, ILS_30R.final_track).abs()
    < LOCALIZER_HEADING_TOLERANCE
    || to_threshold < 8.0;

  if passed_entry && established && to_threshold < LOCALIZER_CAPTURE_NM {
    info!(
      "{} established on the localizer, {:.1} NM from the threshold",
      aircraft.callsign, to_threshold
    );
    set_state(aircraft, FlightState::Approach, bundle);
    approach.phase = IlsPhase::FinalApproach;
  }
}

fn final_approach(
  aircraft: &Aircraft,
  approach: &mut IlsApproach,
  bundle: &mut Bundle,
) {
  let Some(threshold) = runway(ILS_30R.runway).map(|r| r.threshold) else {
    warn!("{}: runway {} not found", aircraft.callsign, ILS_30R.runway);
    return;
  };

  let to_threshold = distance_nm(aircraft.pos, threshold);
  steer(aircraft, bearing(aircraft.pos, threshold), bundle);
  assign_altitude(
    aircraft,
    glideslope(to_threshold, ILS_30R.descent_rate),
    bundle,
  );
  assign_speed(aircraft, approach_speeds(aircraft.kind).final_approach, bundle);

  if aircraft.altitude < ILS_30R.landing_altitude {
    info!("{} landing runway {}", aircraft.callsign, ILS_30R.runway);
    set_state(aircraft, FlightState::Landing, bundle);
    approach.phase = IlsPhase::Landing;
    approach.rollout = 0.0;
  } else {
    set_state(aircraft, FlightState::Approach, bundle);
  }
}

/// Clears an aircraft for the ILS via `entry`.
pub fn clear(aircraft: &Aircraft, entry: IlsEntry, bundle: &mut Bundle) {
  info!(
    "{}: ILS {} cleared via {}",
    aircraft.callsign,
    ILS_30R.runway,
    entry.fix_name()
  );

  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Navigation(Navigation::Ils(IlsApproach::new(entry))),
  ));
  assign_altitude(
    aircraft,
    entry.initial_altitude(aircraft.assigned_altitude),
    bundle,
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entities::aircraft::procedures::testing::{airborne, fly_until},
    geometry::project,
    performance::AircraftKind,
  };

  fn cleared(mut aircraft: Aircraft, entry: IlsEntry) -> Aircraft {
    aircraft.navigation = Navigation::Ils(IlsApproach::new(entry));
    aircraft.assigned_altitude =
      entry.initial_altitude(aircraft.assigned_altitude);
    aircraft
  }

  fn phase(aircraft: &Aircraft) -> Option<IlsPhase> {
    match aircraft.navigation {
      Navigation::Ils(approach) => Some(approach.phase),
      _ => None,
    }
  }

  #[test]
  fn test_arc_direction_takes_short_way() {
    assert_eq!(
      ArcDirection::toward(164.0, 118.0),
      ArcDirection::Counterclockwise
    );
    assert_eq!(ArcDirection::toward(78.0, 118.0), ArcDirection::Clockwise);
  }

  #[test]
  fn test_tangent_turns_toward_center() {
    // Clockwise on the 180 radial flies west, the center is north
    assert_eq!(ArcDirection::Clockwise.tangent(180.0, 0.0), 270.0);
    assert_eq!(ArcDirection::Clockwise.tangent(180.0, 10.0), 280.0);
    assert_eq!(ArcDirection::Counterclockwise.tangent(180.0, 0.0), 90.0);
    assert_eq!(ArcDirection::Counterclockwise.tangent(180.0, 10.0), 80.0);
  }

  #[test]
  fn test_straight_in_entries_skip_the_arc() {
    assert_eq!(IlsApproach::new(IlsEntry::Kekag).phase, IlsPhase::IfToFap);
    assert_eq!(IlsApproach::new(IlsEntry::IfIls).phase, IlsPhase::IfToFap);
    assert_eq!(IlsApproach::new(IlsEntry::Yarzu).phase, IlsPhase::ToEntry);
    assert_eq!(IlsApproach::new(IlsEntry::Godpi).phase, IlsPhase::ToEntry);
  }

  #[test]
  fn test_kekag_lands_after_seven_seconds_on_the_ground() {
    let kekag = WAYPOINTS.get("KEKAG").unwrap().pos;
    let inbound = bearing(kekag, ARP);
    let start = project(kekag, inbound + 180.0, 250.0 * 2.0 / 60.0);
    let aircraft = airborne(AircraftKind::Ifr, start, inbound, 6000.0);
    let mut aircraft = cleared(aircraft, IlsEntry::Kekag);
    assert_eq!(aircraft.assigned_altitude, 5000.0);

    let mut reached_landing = false;
    let ticks = fly_until(&mut aircraft, 1.0, 3600, |a| {
      reached_landing |= phase(a) == Some(IlsPhase::Landing);
      a.landed
    });

    assert!(ticks.is_some(), "never landed: {:?}", aircraft.navigation);
    assert!(reached_landing);
    assert_eq!(aircraft.state, FlightState::Landing);
    assert_eq!(aircraft.altitude, 0.0);
    match aircraft.navigation {
      Navigation::Ils(approach) => assert_eq!(approach.rollout, 7.0),
      ref other => panic!("unexpected navigation {other:?}"),
    }
  }

  #[test]
  fn test_godpi_flies_the_arc() {
    let godpi = WAYPOINTS.get("GODPI").unwrap().pos;
    let start = project(godpi, 40.0, 10.0);
    let aircraft = airborne(AircraftKind::Ifr, start, 220.0, 8000.0);
    let mut aircraft = cleared(aircraft, IlsEntry::Godpi);

    let mut seen = Vec::new();
    let ticks = fly_until(&mut aircraft, 1.0, 5400, |a| {
      if let Some(p) = phase(a) {
        if seen.last() != Some(&p) {
          seen.push(p);
        }
      }
      a.landed
    });

    assert!(ticks.is_some(), "stuck in {:?}", seen.last());
    assert_eq!(
      seen,
      vec![
        IlsPhase::ToEntry,
        IlsPhase::ToArc,
        IlsPhase::Arc,
        IlsPhase::ToIf,
        IlsPhase::IfToFap,
        IlsPhase::FinalApproach,
        IlsPhase::Landing,
      ]
    );
  }
}
