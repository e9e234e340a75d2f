use tracing::info;

use crate::{
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, Navigation},
  geometry::normalize_angle,
  heading::TurnDirection,
};

/// Standard rate, degrees per second.
pub const ORBIT_TURN_RATE: f64 = 3.0;

pub fn update(
  aircraft: &Aircraft,
  direction: TurnDirection,
  bundle: &mut Bundle,
) {
  let heading = normalize_angle(
    aircraft.heading + direction.sign() * ORBIT_TURN_RATE * bundle.dt,
  );
  bundle
    .actions
    .push(Action::new(aircraft.id, ActionKind::Heading(heading)));
}

pub fn enter(
  aircraft: &Aircraft,
  direction: TurnDirection,
  bundle: &mut Bundle,
) {
  info!("{}: orbiting {:?} in place", aircraft.callsign, direction);

  bundle.actions.extend([
    Action::new(aircraft.id, ActionKind::Navigation(Navigation::Orbit {
      direction,
    })),
    Action::new(aircraft.id, ActionKind::AssignedHeading(None)),
    Action::new(aircraft.id, ActionKind::Sid(None)),
  ]);
}
