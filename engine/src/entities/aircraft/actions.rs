use glam::DVec2;

use super::{Aircraft, FlightState, Formation, Navigation, SidClearance};

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
  Pos(DVec2),

  Speed(f64),
  Heading(f64),
  Altitude(f64),

  AssignedSpeed(Option<f64>),
  AssignedHeading(Option<f64>),
  AssignedAltitude(f64),

  State(FlightState),
  Navigation(Navigation),
  Sid(Option<SidClearance>),
  Formation(Option<Formation>),

  // Removal
  Landed,
  ShouldDelete,
  PendingDelete(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
  pub id: u32,
  pub kind: ActionKind,
}

impl Action {
  pub fn new(id: u32, kind: ActionKind) -> Self {
    Self { id, kind }
  }
}

pub trait AircraftActionHandler {
  fn run(aircraft: &mut Aircraft, action: &Action);
}

pub struct AircraftAllActionHandler;
impl AircraftActionHandler for AircraftAllActionHandler {
  fn run(aircraft: &mut Aircraft, action: &Action) {
    match &action.kind {
      ActionKind::Pos(pos) => aircraft.pos = *pos,

      ActionKind::Speed(speed) => aircraft.speed = *speed,
      ActionKind::Heading(heading) => aircraft.heading = *heading,
      ActionKind::Altitude(altitude) => aircraft.altitude = *altitude,

      ActionKind::AssignedSpeed(speed) => aircraft.assigned_speed = *speed,
      ActionKind::AssignedHeading(heading) => {
        aircraft.assigned_heading = *heading
      }
      ActionKind::AssignedAltitude(altitude) => {
        aircraft.assigned_altitude = *altitude
      }

      ActionKind::State(state) => aircraft.state = *state,
      ActionKind::Navigation(navigation) => {
        aircraft.navigation = navigation.clone()
      }
      ActionKind::Sid(sid) => aircraft.sid = sid.clone(),
      ActionKind::Formation(formation) => aircraft.formation = *formation,

      ActionKind::Landed => aircraft.landed = true,
      ActionKind::ShouldDelete => aircraft.should_delete = true,
      ActionKind::PendingDelete(seconds) => {
        aircraft.pending_delete = Some(*seconds)
      }
    }
  }
}
