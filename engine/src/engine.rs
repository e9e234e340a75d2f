use std::collections::BTreeMap;

use internment::Intern;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use turborand::{SeededCore, rng::Rng};

use crate::{
  ARP, FORMATION_SPACING_NM, MAX_FORMATION_SIZE,
  command::{AirborneSpawn, Command, CommandError, CommandReply, RunwaySpawn},
  data::{
    WAYPOINTS, Waypoint, WaypointKind,
    approaches::{IlsEntry, ProcedureEntry},
    fixes::RouteError,
    runway, sid,
    visual::{VisualEntry, VisualPattern},
  },
  entities::{
    aircraft::{
      Action, Aircraft, FlightState, Formation, Navigation, SidClearance,
      events::{
        AircraftEventHandler, Event, EventKind, HandleAircraftEvent,
      },
      procedures::route::RouteNav,
    },
    airspace::Airspace,
  },
  geometry::{bearing, inverse_degrees, normalize_angle, project},
  heading::TurnDirection,
  performance::AircraftKind,
  scenario::{Scenario, ScheduledSpawn},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type", content = "value")]
pub enum OutgoingReply {
  // Partial/Small Updates
  Reply(CommandReply),
  Error(String),
  Clock {
    sim_time: f64,
    multiplier: f64,
    paused: bool,
  },

  // Full State Updates
  Aircraft(Vec<Aircraft>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IncomingUpdate {
  Command(Command),
}

/// Everything an effect may look at during one aircraft update, and the
/// actions it queues.
pub struct Bundle<'a> {
  pub dt: f64,
  /// The arena as it was before this tick.
  pub snapshot: &'a BTreeMap<u32, Aircraft>,
  pub airspace: &'a Airspace,
  pub rng: &'a mut Rng,

  pub actions: Vec<Action>,
}

impl<'a> Bundle<'a> {
  pub fn new(
    dt: f64,
    snapshot: &'a BTreeMap<u32, Aircraft>,
    airspace: &'a Airspace,
    rng: &'a mut Rng,
  ) -> Self {
    Self {
      dt,
      snapshot,
      airspace,
      rng,
      actions: Vec::new(),
    }
  }
}

pub struct Engine {
  pub aircraft: BTreeMap<u32, Aircraft>,
  pub airspace: Airspace,

  pub sim_time: f64,
  pub multiplier: f64,
  pub paused: bool,

  /// Pending scenario spawns, in absolute sim time.
  pub scheduled: Vec<ScheduledSpawn>,

  next_id: u32,
  rng: Rng,
}

impl Engine {
  pub fn new(airspace: Airspace, seed: u64) -> Self {
    Self {
      aircraft: BTreeMap::new(),
      airspace,

      sim_time: 0.0,
      multiplier: 1.0,
      paused: false,

      scheduled: Vec::new(),

      next_id: 1,
      rng: Rng::with_seed(seed),
    }
  }

  pub fn get(&self, id: u32) -> Result<&Aircraft, CommandError> {
    self.aircraft.get(&id).ok_or(CommandError::UnknownAircraft(id))
  }

  pub fn snapshot(&self) -> Vec<Aircraft> {
    self.aircraft.values().cloned().collect()
  }

  pub fn clock(&self) -> OutgoingReply {
    OutgoingReply::Clock {
      sim_time: self.sim_time,
      multiplier: self.multiplier,
      paused: self.paused,
    }
  }

  fn next_id(&mut self) -> u32 {
    let id = self.next_id;
    self.next_id += 1;
    id
  }
}

// Clock
impl Engine {
  /// Ticks with scaled wall time unless paused.
  pub fn advance(&mut self, wall_dt: f64) {
    if self.paused {
      return;
    }

    self.tick(wall_dt * self.multiplier);
  }

  pub fn tick(&mut self, dt: f64) {
    let snapshot = self.aircraft.clone();
    for aircraft in self.aircraft.values_mut() {
      let mut bundle =
        Bundle::new(dt, &snapshot, &self.airspace, &mut self.rng);
      aircraft.update(&mut bundle);
    }

    self.sim_time += dt;
    self.spawn_scheduled();
    self.cleanup();
  }

  fn spawn_scheduled(&mut self) {
    let now = self.sim_time;
    let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
      .into_iter()
      .partition(|spawn| spawn.spawn_time <= now);
    self.scheduled = pending;

    for spawn in due {
      if let Err(e) = self.spawn_airborne(&spawn.to_spawn()) {
        warn!("failed to spawn {}: {}", spawn.callsign, e);
      }
    }
  }

  /// Drops landed and expired aircraft, along with followers still attached
  /// to a leader that just landed.
  pub fn cleanup(&mut self) {
    let landed_leaders: Vec<u32> = self
      .aircraft
      .values()
      .filter(|a| a.landed && a.formation.is_some_and(|f| f.leader))
      .map(|a| a.id)
      .collect();

    self.aircraft.retain(|_, aircraft| {
      let orphaned = aircraft.formation.is_some_and(|f| {
        !f.leader && !f.split && landed_leaders.contains(&f.leader_id)
      });
      let remove = aircraft.is_removable() || orphaned;
      if remove {
        info!("{} removed", aircraft.callsign);
      }

      !remove
    });
  }

  pub fn load_scenario(&mut self, scenario: Scenario) -> usize {
    info!(
      "loading scenario {:?} with {} aircraft",
      scenario.name,
      scenario.aircraft.len()
    );

    let now = self.sim_time;
    let count = scenario.aircraft.len();
    self
      .scheduled
      .extend(scenario.aircraft.into_iter().map(|spawn| ScheduledSpawn {
        spawn_time: now + spawn.spawn_time,
        ..spawn
      }));

    count
  }
}

// Spawning
impl Engine {
  fn formation_callsigns(
    callsign: &str,
    size: usize,
  ) -> Result<Vec<Intern<String>>, CommandError> {
    let callsign = callsign.trim();
    if callsign.is_empty() {
      return Err(CommandError::EmptyCallsign);
    }
    if !(1..=MAX_FORMATION_SIZE).contains(&size) {
      return Err(CommandError::FormationSize(size));
    }

    Ok(
      (0..size)
        .map(|i| match i {
          0 => Intern::from_ref(callsign),
          i => Intern::new(format!("{callsign}{i}")),
        })
        .collect(),
    )
  }

  fn formation_slot(
    size: usize,
    position: usize,
    leader_id: u32,
  ) -> Option<Formation> {
    (size > 1).then_some(Formation {
      position,
      leader: position == 0,
      leader_id,
      split: false,
    })
  }

  /// Lines a departure (or a formation of them) up on a runway threshold.
  pub fn spawn_runway(
    &mut self,
    spawn: &RunwaySpawn,
  ) -> Result<Vec<u32>, CommandError> {
    let callsigns =
      Self::formation_callsigns(&spawn.callsign, spawn.formation_size)?;
    let runway = runway(&spawn.runway)
      .ok_or_else(|| CommandError::UnknownRunway(spawn.runway.clone()))?;
    if let Some(cap) = spawn.altitude_cap {
      validate_altitude(cap)?;
    }

    let clearance = match &spawn.sid {
      Some(designator) => {
        let sid = sid(designator)
          .ok_or_else(|| CommandError::UnknownSid(designator.clone()))?;
        if !sid.serves_runway(runway.id) {
          return Err(CommandError::SidNotForRunway {
            sid: sid.designator.to_owned(),
            runway: runway.id.to_owned(),
          });
        }
        if sid.military && !spawn.kind.is_military() {
          return Err(CommandError::MilitaryOnly(spawn.callsign.clone()));
        }

        Some(SidClearance::new(
          Intern::from_ref(sid.designator),
          spawn.altitude_cap,
        ))
      }
      None => None,
    };

    let leader_id = self.next_id;
    let size = callsigns.len();
    let mut ids = Vec::with_capacity(size);
    for (position, callsign) in callsigns.into_iter().enumerate() {
      let id = self.next_id();
      let aircraft = Aircraft {
        pos: runway.threshold,
        heading: runway.heading,
        state: FlightState::Parked,
        navigation: Navigation::Sid,
        sid: clearance.clone(),
        formation: Self::formation_slot(size, position, leader_id),
        ..Aircraft::new(id, callsign, spawn.kind)
      };

      info!("{} lined up on {}", aircraft.callsign, runway.id);
      self.aircraft.insert(id, aircraft);
      ids.push(id);
    }

    Ok(ids)
  }

  /// Places an arrival upstream of a waypoint so that it crosses it after
  /// `time_to_waypoint` minutes at cruise speed, heading for the field.
  pub fn spawn_airborne(
    &mut self,
    spawn: &AirborneSpawn,
  ) -> Result<Vec<u32>, CommandError> {
    let callsigns =
      Self::formation_callsigns(&spawn.callsign, spawn.formation_size)?;
    if !(10.0..=600.0).contains(&spawn.flight_level) {
      return Err(CommandError::InvalidFlightLevel(spawn.flight_level));
    }
    if !(1.0..=20.0).contains(&spawn.time_to_waypoint) {
      return Err(CommandError::InvalidTimeToWaypoint(spawn.time_to_waypoint));
    }
    let waypoint = WAYPOINTS
      .get(&spawn.waypoint)
      .ok_or_else(|| CommandError::UnknownWaypoint(spawn.waypoint.clone()))?;

    let cruise = spawn.kind.performance().cruise_speed;
    let altitude = spawn.flight_level * 100.0;
    let inbound = bearing(waypoint.pos, ARP);
    let outbound = inverse_degrees(inbound);
    let start = project(
      waypoint.pos,
      outbound,
      cruise * spawn.time_to_waypoint / 60.0,
    );

    let leader_id = self.next_id;
    let size = callsigns.len();
    let mut ids = Vec::with_capacity(size);
    for (position, callsign) in callsigns.into_iter().enumerate() {
      let id = self.next_id();
      let aircraft = Aircraft {
        pos: project(start, outbound, FORMATION_SPACING_NM * position as f64),
        altitude,
        heading: inbound,
        speed: cruise,
        assigned_altitude: altitude,
        assigned_speed: Some(cruise),
        assigned_heading: Some(inbound),
        state: FlightState::Cruise,
        navigation: Navigation::Heading,
        formation: Self::formation_slot(size, position, leader_id),
        ..Aircraft::new(id, callsign, spawn.kind)
      };

      info!(
        "{} spawned at FL{:03.0}, {:.1} min from {}",
        aircraft.callsign, spawn.flight_level, spawn.time_to_waypoint,
        waypoint.name
      );
      self.aircraft.insert(id, aircraft);
      ids.push(id);
    }

    Ok(ids)
  }
}

fn validate_heading(heading: f64) -> Result<f64, CommandError> {
  if (0.0..=360.0).contains(&heading) {
    Ok(normalize_angle(heading))
  } else {
    Err(CommandError::InvalidHeading(heading))
  }
}

fn validate_altitude(altitude: f64) -> Result<f64, CommandError> {
  if altitude.is_finite() && altitude >= 0.0 {
    Ok(altitude)
  } else {
    Err(CommandError::InvalidAltitude(altitude))
  }
}

// Commands
impl Engine {
  /// Hands an already validated instruction to one aircraft.
  fn fire(&mut self, event: Event) -> Result<(), CommandError> {
    let snapshot = BTreeMap::new();
    let aircraft = self
      .aircraft
      .get_mut(&event.id)
      .ok_or(CommandError::UnknownAircraft(event.id))?;

    let mut bundle = Bundle::new(0.0, &snapshot, &self.airspace, &mut self.rng);
    HandleAircraftEvent::run(aircraft, &event.kind, &mut bundle);
    let actions = bundle.actions;
    aircraft.apply(actions);

    Ok(())
  }

  fn require_kind(
    &self,
    id: u32,
    kind: AircraftKind,
  ) -> Result<&Aircraft, CommandError> {
    let aircraft = self.get(id)?;
    if aircraft.kind == kind {
      return Ok(aircraft);
    }

    let callsign = aircraft.callsign.to_string();
    Err(match kind {
      AircraftKind::Military => CommandError::MilitaryOnly(callsign),
      _ => CommandError::VfrOnly(callsign),
    })
  }

  /// Clears an aircraft for takeoff. Parked followers of a formation leader
  /// roll with it.
  fn takeoff(&mut self, id: u32) -> Result<(), CommandError> {
    let aircraft = self.get(id)?;
    let followers: Vec<u32> = if aircraft.formation.is_some_and(|f| f.leader) {
      self
        .aircraft
        .values()
        .filter(|a| {
          a.state == FlightState::Parked
            && a.formation.is_some_and(|f| !f.leader && f.leader_id == id)
        })
        .map(|a| a.id)
        .collect()
    } else {
      Vec::new()
    };

    self.fire(Event::new(id, EventKind::Takeoff))?;
    for follower in followers {
      self.fire(Event::new(follower, EventKind::Takeoff))?;
    }

    Ok(())
  }

  fn holding(
    &mut self,
    id: u32,
    fix: Option<String>,
    inbound: Option<f64>,
    direction: TurnDirection,
    leg_minutes: Option<f64>,
  ) -> Result<EventKind, CommandError> {
    let aircraft = self.get(id)?;
    let (fix_name, fix) = match fix {
      Some(name) => {
        let waypoint = WAYPOINTS
          .get(&name)
          .ok_or(CommandError::UnknownWaypoint(name))?;
        (Some(waypoint.name), waypoint.pos)
      }
      None => (None, aircraft.pos),
    };

    let inbound = match inbound {
      Some(inbound) => validate_heading(inbound)?,
      None if fix_name.is_some() => bearing(aircraft.pos, fix),
      None => aircraft.heading,
    };

    let leg_minutes = leg_minutes.unwrap_or(1.0);
    if !(leg_minutes > 0.0 && leg_minutes <= 5.0) {
      return Err(CommandError::InvalidLegTime(leg_minutes));
    }

    Ok(EventKind::Holding {
      fix_name,
      fix,
      inbound,
      direction,
      leg_minutes,
    })
  }

  pub fn execute(
    &mut self,
    command: Command,
  ) -> Result<CommandReply, CommandError> {
    debug!("executing {:?}", command);

    let (id, event) = match command {
      Command::SpawnRunway(spawn) => {
        return self.spawn_runway(&spawn).map(CommandReply::Spawned);
      }
      Command::SpawnAirborne(spawn) => {
        return self.spawn_airborne(&spawn).map(CommandReply::Spawned);
      }

      Command::Takeoff { id } => {
        self.takeoff(id)?;
        return Ok(CommandReply::Ok);
      }
      Command::AssignSid {
        id,
        designator,
        altitude_cap,
      } => {
        let aircraft = self.get(id)?;
        let sid =
          sid(&designator).ok_or(CommandError::UnknownSid(designator))?;
        if sid.military && !aircraft.kind.is_military() {
          return Err(CommandError::MilitaryOnly(
            aircraft.callsign.to_string(),
          ));
        }
        if let Some(cap) = altitude_cap {
          validate_altitude(cap)?;
        }

        (id, EventKind::Sid {
          designator: Intern::from_ref(sid.designator),
          altitude_cap,
        })
      }
      Command::AssignHeading { id, heading } => {
        (id, EventKind::Heading(validate_heading(heading)?))
      }
      Command::AssignAltitude { id, altitude } => {
        (id, EventKind::Altitude(validate_altitude(altitude)?))
      }
      Command::AssignSpeed { id, speed } => {
        let aircraft = self.get(id)?;
        if !(speed > 0.0 && speed <= aircraft.performance().max_speed) {
          return Err(CommandError::InvalidSpeed(speed));
        }

        (id, EventKind::Speed(speed))
      }
      Command::AssignRoute { id, waypoints } => {
        let resolved = WAYPOINTS.resolve(waypoints.iter().map(String::as_str))?;
        let names = resolved.into_iter().map(|w| w.name).collect();

        (id, EventKind::Route(RouteNav::named(names)))
      }
      Command::AssignDrawnRoute { id, points } => {
        if points.is_empty() {
          return Err(CommandError::Route(RouteError::Empty));
        }
        let waypoints = points
          .into_iter()
          .enumerate()
          .map(|(i, pos)| {
            Waypoint::new(format!("WP{}", i + 1), WaypointKind::Drawn, pos)
          })
          .collect();

        (id, EventKind::Route(RouteNav::drawn(waypoints)))
      }

      // Approaches
      Command::AssignIls { id, entry } => {
        let entry =
          IlsEntry::from_name(&entry).ok_or(CommandError::UnknownEntry(entry))?;
        (id, EventKind::Ils(entry))
      }
      Command::AssignVor { id, runway, entry } => {
        let entry = ProcedureEntry::from_name(&entry)
          .ok_or(CommandError::UnknownEntry(entry))?;
        let event = match runway.to_ascii_uppercase().as_str() {
          "12R" => EventKind::Vor12R(entry),
          "30R" => EventKind::Vor30R(entry),
          _ => return Err(CommandError::UnknownRunway(runway)),
        };
        (id, event)
      }
      Command::AssignHitac { id, entry } => {
        self.require_kind(id, AircraftKind::Military)?;
        let entry = ProcedureEntry::from_name(&entry)
          .ok_or(CommandError::UnknownEntry(entry))?;
        (id, EventKind::Hitac(entry))
      }
      Command::AssignVisual { id, pattern, entry } => {
        let pattern = VisualPattern::from_code(&pattern)
          .ok_or(CommandError::UnknownPattern(pattern))?;
        let entry = VisualEntry::from_name(&entry)
          .ok_or(CommandError::UnknownEntry(entry))?;
        (id, EventKind::Visual { pattern, entry })
      }

      Command::AssignHolding {
        id,
        fix,
        inbound,
        direction,
        leg_minutes,
      } => (id, self.holding(id, fix, inbound, direction, leg_minutes)?),
      Command::AssignOrbit { id, direction } => {
        (id, EventKind::Orbit(direction))
      }

      Command::Split { id } => {
        let aircraft = self.get(id)?;
        if !aircraft.formation.is_some_and(|f| !f.leader && !f.split) {
          return Err(CommandError::NotAFollower(
            aircraft.callsign.to_string(),
          ));
        }
        (id, EventKind::Split)
      }
      Command::RandomAutopilot { id } => {
        self.require_kind(id, AircraftKind::Vfr)?;
        (id, EventKind::RandomAutopilot)
      }
      Command::Delete { id } => (id, EventKind::Delete),

      // Clock
      Command::Pause => {
        info!("paused at {:.1} s", self.sim_time);
        self.paused = true;
        return Ok(CommandReply::Ok);
      }
      Command::Resume => {
        info!("resumed at {:.1} s", self.sim_time);
        self.paused = false;
        return Ok(CommandReply::Ok);
      }
      Command::SetMultiplier(multiplier) => {
        if !(multiplier.is_finite() && multiplier > 0.0) {
          return Err(CommandError::InvalidMultiplier(multiplier));
        }
        info!("time multiplier {}x", multiplier);
        self.multiplier = multiplier;
        return Ok(CommandReply::Ok);
      }

      Command::LoadScenario(scenario) => {
        scenario.validate()?;
        return Ok(CommandReply::Scheduled(self.load_scenario(scenario)));
      }
    };

    self.fire(Event::new(id, event))?;
    Ok(CommandReply::Ok)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entities::aircraft::procedures::formation,
    geometry::distance_nm,
  };

  fn engine() -> Engine {
    Engine::new(Airspace::default(), 7)
  }

  fn spawn_runway(
    engine: &mut Engine,
    kind: AircraftKind,
    runway: &str,
    sid: Option<&str>,
    formation_size: usize,
  ) -> Result<Vec<u32>, CommandError> {
    engine.spawn_runway(&RunwaySpawn {
      callsign: "IBE123".to_owned(),
      kind,
      runway: runway.to_owned(),
      sid: sid.map(str::to_owned),
      altitude_cap: None,
      formation_size,
    })
  }

  fn spawn_airborne(
    engine: &mut Engine,
    kind: AircraftKind,
    waypoint: &str,
    formation_size: usize,
  ) -> Vec<u32> {
    engine
      .spawn_airborne(&AirborneSpawn {
        callsign: "ASCOT".to_owned(),
        kind,
        flight_level: 80.0,
        waypoint: waypoint.to_owned(),
        time_to_waypoint: 5.0,
        formation_size,
      })
      .unwrap()
  }

  mod spawning {
    use super::*;

    #[test]
    fn test_runway_formation() {
      let mut engine = engine();
      let ids =
        spawn_runway(&mut engine, AircraftKind::Military, "30R", None, 3)
          .unwrap();
      assert_eq!(ids, vec![1, 2, 3]);

      let callsigns: Vec<&str> = ids
        .iter()
        .map(|id| engine.aircraft[id].callsign.as_str())
        .collect();
      assert_eq!(callsigns, vec!["IBE123", "IBE1231", "IBE1232"]);

      let follower = &engine.aircraft[&3];
      assert_eq!(follower.state, FlightState::Parked);
      assert_eq!(follower.heading, 300.0);
      assert_eq!(follower.formation.map(|f| f.leader_id), Some(1));
      assert_eq!(follower.formation.map(|f| f.position), Some(2));
    }

    #[test]
    fn test_single_aircraft_has_no_formation() {
      let mut engine = engine();
      let ids =
        spawn_runway(&mut engine, AircraftKind::Ifr, "12L", Some("CMA3D"), 1)
          .unwrap();

      let aircraft = &engine.aircraft[&ids[0]];
      assert!(aircraft.formation.is_none());
      assert_eq!(
        aircraft.sid.as_ref().map(|s| s.designator.as_str()),
        Some("CMA3D")
      );
    }

    #[test]
    fn test_runway_spawn_errors() {
      let mut engine = engine();
      assert_eq!(
        spawn_runway(&mut engine, AircraftKind::Ifr, "30R", Some("CMA3D"), 1),
        Err(CommandError::SidNotForRunway {
          sid: "CMA3D".to_owned(),
          runway: "30R".to_owned()
        })
      );
      assert_eq!(
        spawn_runway(&mut engine, AircraftKind::Ifr, "09", None, 1),
        Err(CommandError::UnknownRunway("09".to_owned()))
      );
      assert_eq!(
        spawn_runway(&mut engine, AircraftKind::Ifr, "12L", None, 5),
        Err(CommandError::FormationSize(5))
      );
      assert!(engine.aircraft.is_empty());
    }

    #[test]
    fn test_airborne_spawn_is_inbound() {
      let mut engine = engine();
      let ids = spawn_airborne(&mut engine, AircraftKind::Ifr, "PONEN", 2);
      let ponen = WAYPOINTS.get("PONEN").unwrap().pos;

      let leader = &engine.aircraft[&ids[0]];
      assert_eq!(leader.altitude, 8000.0);
      assert_eq!(leader.state, FlightState::Cruise);
      assert_eq!(leader.navigation, Navigation::Heading);
      assert!((leader.heading - bearing(ponen, ARP)).abs() < 1e-9);

      // Five minutes at 250 kt
      assert!((distance_nm(leader.pos, ponen) - 250.0 / 12.0).abs() < 0.2);

      let follower = &engine.aircraft[&ids[1]];
      assert!((distance_nm(leader.pos, follower.pos) - 0.5).abs() < 0.01);
      assert!(
        distance_nm(follower.pos, ponen) > distance_nm(leader.pos, ponen)
      );
    }

    #[test]
    fn test_airborne_spawn_errors() {
      let mut engine = engine();
      let mut spawn = AirborneSpawn {
        callsign: "ASCOT".to_owned(),
        kind: AircraftKind::Ifr,
        flight_level: 5.0,
        waypoint: "PONEN".to_owned(),
        time_to_waypoint: 5.0,
        formation_size: 1,
      };
      assert_eq!(
        engine.spawn_airborne(&spawn),
        Err(CommandError::InvalidFlightLevel(5.0))
      );

      spawn.flight_level = 100.0;
      spawn.waypoint = "NOWHERE".to_owned();
      assert_eq!(
        engine.spawn_airborne(&spawn),
        Err(CommandError::UnknownWaypoint("NOWHERE".to_owned()))
      );

      spawn.callsign = "  ".to_owned();
      assert_eq!(
        engine.spawn_airborne(&spawn),
        Err(CommandError::EmptyCallsign)
      );
    }
  }

  mod commands {
    use super::*;

    #[test]
    fn test_unknown_aircraft() {
      let mut engine = engine();
      assert_eq!(
        engine.execute(Command::AssignHeading {
          id: 9,
          heading: 90.0
        }),
        Err(CommandError::UnknownAircraft(9))
      );
    }

    #[test]
    fn test_range_checks() {
      let mut engine = engine();
      let id = spawn_airborne(&mut engine, AircraftKind::Ifr, "PONEN", 1)[0];

      assert_eq!(
        engine.execute(Command::AssignHeading { id, heading: 361.0 }),
        Err(CommandError::InvalidHeading(361.0))
      );
      assert_eq!(
        engine.execute(Command::AssignAltitude {
          id,
          altitude: -100.0
        }),
        Err(CommandError::InvalidAltitude(-100.0))
      );
      assert_eq!(
        engine.execute(Command::AssignSpeed { id, speed: 900.0 }),
        Err(CommandError::InvalidSpeed(900.0))
      );
      assert_eq!(
        engine.execute(Command::SetMultiplier(0.0)),
        Err(CommandError::InvalidMultiplier(0.0))
      );

      assert_eq!(
        engine.execute(Command::AssignHeading { id, heading: 360.0 }),
        Ok(CommandReply::Ok)
      );
      assert_eq!(engine.aircraft[&id].assigned_heading, Some(0.0));
    }

    #[test]
    fn test_kind_restrictions() {
      let mut engine = engine();
      let id = spawn_airborne(&mut engine, AircraftKind::Ifr, "PONEN", 1)[0];

      assert_eq!(
        engine.execute(Command::RandomAutopilot { id }),
        Err(CommandError::VfrOnly("ASCOT".to_owned()))
      );
      assert_eq!(
        engine.execute(Command::AssignHitac {
          id,
          entry: "FULL".to_owned()
        }),
        Err(CommandError::MilitaryOnly("ASCOT".to_owned()))
      );
    }

    #[test]
    fn test_unknown_names() {
      let mut engine = engine();
      let id = spawn_airborne(&mut engine, AircraftKind::Ifr, "PONEN", 1)[0];

      assert_eq!(
        engine.execute(Command::AssignIls {
          id,
          entry: "NOWHERE".to_owned()
        }),
        Err(CommandError::UnknownEntry("NOWHERE".to_owned()))
      );
      assert_eq!(
        engine.execute(Command::AssignVor {
          id,
          runway: "30L".to_owned(),
          entry: "FULL".to_owned()
        }),
        Err(CommandError::UnknownRunway("30L".to_owned()))
      );
      assert_eq!(
        engine.execute(Command::AssignVisual {
          id,
          pattern: "30R_LEFT".to_owned(),
          entry: "RN".to_owned()
        }),
        Err(CommandError::UnknownPattern("30R_LEFT".to_owned()))
      );
      assert!(matches!(
        engine.execute(Command::AssignRoute {
          id,
          waypoints: vec!["PONEN".to_owned(), "NOWHERE".to_owned()]
        }),
        Err(CommandError::Route(_))
      ));
    }

    #[test]
    fn test_route_and_approach_switch_navigation() {
      let mut engine = engine();
      let id = spawn_airborne(&mut engine, AircraftKind::Ifr, "PONEN", 1)[0];

      engine
        .execute(Command::AssignRoute {
          id,
          waypoints: vec!["ponen".to_owned(), "ZRZ".to_owned()],
        })
        .unwrap();
      let Navigation::Route(route) = &engine.aircraft[&id].navigation else {
        panic!("not on a route");
      };
      assert_eq!(route.names[0].as_str(), "PONEN");

      engine
        .execute(Command::AssignIls {
          id,
          entry: "KEKAG".to_owned(),
        })
        .unwrap();
      assert!(matches!(
        engine.aircraft[&id].navigation,
        Navigation::Ils(..)
      ));
    }

    #[test]
    fn test_holding_defaults() {
      let mut engine = engine();
      let id = spawn_airborne(&mut engine, AircraftKind::Ifr, "PONEN", 1)[0];
      let aircraft = engine.aircraft[&id].clone();

      engine
        .execute(Command::AssignHolding {
          id,
          fix: None,
          inbound: None,
          direction: TurnDirection::Left,
          leg_minutes: None,
        })
        .unwrap();
      let Navigation::Holding(holding) = &engine.aircraft[&id].navigation
      else {
        panic!("not holding");
      };
      assert_eq!(holding.fix, aircraft.pos);
      assert_eq!(holding.inbound, aircraft.heading);
      assert_eq!(holding.direction, TurnDirection::Left);
      assert_eq!(holding.leg_minutes, 1.0);

      assert_eq!(
        engine.execute(Command::AssignHolding {
          id,
          fix: Some("ZRZ".to_owned()),
          inbound: None,
          direction: TurnDirection::Right,
          leg_minutes: Some(6.0),
        }),
        Err(CommandError::InvalidLegTime(6.0))
      );
    }

    #[test]
    fn test_split_only_followers() {
      let mut engine = engine();
      let ids = spawn_airborne(&mut engine, AircraftKind::Military, "Q", 2);

      assert_eq!(
        engine.execute(Command::Split { id: ids[0] }),
        Err(CommandError::NotAFollower("ASCOT".to_owned()))
      );
      assert_eq!(
        engine.execute(Command::Split { id: ids[1] }),
        Ok(CommandReply::Ok)
      );
      assert!(engine.aircraft[&ids[1]].formation.is_some_and(|f| f.split));
    }

    #[test]
    fn test_takeoff_cascades_to_parked_followers() {
      let mut engine = engine();
      let ids =
        spawn_runway(&mut engine, AircraftKind::Military, "30L", None, 3)
          .unwrap();

      engine.execute(Command::Takeoff { id: ids[0] }).unwrap();
      for id in ids {
        assert_eq!(engine.aircraft[&id].state, FlightState::TakeoffRoll);
      }
    }
  }

  mod clock {
    use super::*;

    #[test]
    fn test_pause_and_multiplier() {
      let mut engine = engine();
      engine.execute(Command::Pause).unwrap();
      engine.advance(1.0);
      assert_eq!(engine.sim_time, 0.0);

      engine.execute(Command::Resume).unwrap();
      engine.execute(Command::SetMultiplier(4.0)).unwrap();
      engine.advance(0.5);
      assert_eq!(engine.sim_time, 2.0);
    }

    #[test]
    fn test_delete_countdown() {
      let mut engine = engine();
      let id = spawn_airborne(&mut engine, AircraftKind::Vfr, "Q", 1)[0];
      engine.execute(Command::Delete { id }).unwrap();

      engine.tick(1.0);
      engine.tick(1.0);
      assert!(engine.aircraft.contains_key(&id));

      engine.tick(1.0);
      assert!(!engine.aircraft.contains_key(&id));
    }

    #[test]
    fn test_followers_leave_with_landed_leader() {
      let mut engine = engine();
      let ids = spawn_airborne(&mut engine, AircraftKind::Military, "Q", 3);
      engine.execute(Command::Split { id: ids[2] }).unwrap();

      if let Some(leader) = engine.aircraft.get_mut(&ids[0]) {
        leader.landed = true;
      }
      engine.cleanup();

      assert_eq!(engine.aircraft.keys().copied().collect::<Vec<_>>(), vec![
        ids[2]
      ]);
    }

    #[test]
    fn test_scenario_spawns_on_schedule() {
      let mut engine = engine();
      engine.tick(10.0);

      let scenario: Scenario = serde_json::from_str(
        r#"{
          "name": "Two arrivals",
          "aircraft": [
            {
              "callsign": "IBE101", "type": "IFR", "flight_level": 120,
              "waypoint": "PONEN", "time_to_waypoint": 5, "spawn_time": 0
            },
            {
              "callsign": "IBE202", "type": "IFR", "flight_level": 140,
              "waypoint": "AMBEL", "time_to_waypoint": 5, "spawn_time": 60
            }
          ]
        }"#,
      )
      .unwrap();
      assert_eq!(
        engine.execute(Command::LoadScenario(scenario)),
        Ok(CommandReply::Scheduled(2))
      );
      assert!(engine.aircraft.is_empty());

      engine.tick(1.0);
      assert_eq!(engine.aircraft.len(), 1);
      assert_eq!(engine.scheduled.len(), 1);

      for _ in 0..59 {
        engine.tick(1.0);
      }
      assert_eq!(engine.aircraft.len(), 2);
      assert!(engine.scheduled.is_empty());
    }
  }

  mod scenarios {
    use super::*;

    #[test]
    fn test_cma3d_departure_levels_off() {
      let mut engine = engine();
      let id =
        spawn_runway(&mut engine, AircraftKind::Ifr, "12L", Some("CMA3D"), 1)
          .unwrap()[0];
      engine.execute(Command::Takeoff { id }).unwrap();
      assert_eq!(engine.aircraft[&id].assigned_altitude, 24000.0);

      let mut ticks = 0;
      while !engine.aircraft[&id].sid.as_ref().is_some_and(|s| s.complete) {
        engine.tick(1.0);
        ticks += 1;
        assert!(ticks < 3600, "SID never completed");
      }
      for _ in 0..600 {
        engine.tick(1.0);
      }

      let aircraft = &engine.aircraft[&id];
      assert_eq!(aircraft.assigned_altitude, 23000.0);
      assert_eq!(aircraft.altitude, 23000.0);
      assert_eq!(aircraft.state, FlightState::Cruise);
    }

    #[test]
    fn test_follower_trails_turning_leader() {
      let mut engine = engine();
      let ids = spawn_airborne(&mut engine, AircraftKind::Military, "Q", 2);
      engine
        .execute(Command::AssignHeading {
          id: ids[0],
          heading: 90.0,
        })
        .unwrap();

      for _ in 0..300 {
        engine.tick(1.0);
      }
      let before = engine.aircraft[&ids[0]].clone();
      engine.tick(1.0);

      let follower = &engine.aircraft[&ids[1]];
      assert_eq!(before.heading, 90.0);
      assert_eq!(follower.heading, 90.0);
      assert_eq!(follower.pos, formation::slot(&before, 1));
      assert!((distance_nm(before.pos, follower.pos) - 0.5).abs() < 0.01);
      assert!((bearing(before.pos, follower.pos) - 270.0).abs() < 0.1);
    }
  }
}
