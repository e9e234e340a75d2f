use std::collections::BTreeMap;

use glam::DVec2;
use tracing::info;

use crate::{
  FORMATION_SPACING_NM,
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, Formation},
  geometry::{inverse_degrees, project},
};

/// Where the `position`th member trails behind its leader.
pub fn slot(leader: &Aircraft, position: usize) -> DVec2 {
  project(
    leader.pos,
    inverse_degrees(leader.heading),
    FORMATION_SPACING_NM * position as f64,
  )
}

/// The airborne leader a follower should copy this tick, if any.
pub fn leader<'a>(
  aircraft: &Aircraft,
  snapshot: &'a BTreeMap<u32, Aircraft>,
) -> Option<&'a Aircraft> {
  let formation = aircraft.formation.filter(|f| !f.leader && !f.split)?;
  snapshot
    .get(&formation.leader_id)
    .filter(|leader| leader.state.is_airborne())
}

/// Snaps a follower onto its slot with the leader's state.
pub fn update(
  aircraft: &Aircraft,
  formation: &Formation,
  leader: &Aircraft,
  bundle: &mut Bundle,
) {
  let id = aircraft.id;
  bundle.actions.extend([
    Action::new(id, ActionKind::Pos(slot(leader, formation.position))),
    Action::new(id, ActionKind::Heading(leader.heading)),
    Action::new(id, ActionKind::Speed(leader.speed)),
    Action::new(id, ActionKind::Altitude(leader.altitude)),
    Action::new(id, ActionKind::AssignedAltitude(leader.assigned_altitude)),
    Action::new(id, ActionKind::AssignedSpeed(leader.assigned_speed)),
    Action::new(id, ActionKind::AssignedHeading(leader.assigned_heading)),
    Action::new(id, ActionKind::State(leader.state)),
    Action::new(id, ActionKind::Navigation(leader.navigation.clone())),
    Action::new(id, ActionKind::Sid(leader.sid.clone())),
  ]);
}

/// Detaches a follower for good.
pub fn split(aircraft: &Aircraft, bundle: &mut Bundle) -> bool {
  let Some(formation) = aircraft.formation.filter(|f| !f.leader && !f.split)
  else {
    return false;
  };

  info!("{} split from formation", aircraft.callsign);
  bundle.actions.push(Action::new(
    aircraft.id,
    ActionKind::Formation(Some(Formation {
      split: true,
      ..formation
    })),
  ));

  true
}
