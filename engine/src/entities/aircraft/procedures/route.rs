use internment::Intern;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  FIX_CROSSING_NM,
  data::{WAYPOINTS, Waypoint},
  engine::Bundle,
  entities::aircraft::{Action, ActionKind, Aircraft, Navigation},
  geometry::{bearing, distance_nm},
};

use super::turn_to;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteNav {
  pub names: Vec<Intern<String>>,
  /// Literal points of a drawn route. They take priority over the names.
  pub drawn: Option<Vec<Waypoint>>,
  pub index: usize,
}

impl RouteNav {
  pub fn named(names: Vec<Intern<String>>) -> Self {
    Self {
      names,
      drawn: None,
      index: 0,
    }
  }

  pub fn drawn(waypoints: Vec<Waypoint>) -> Self {
    Self {
      names: waypoints.iter().map(|w| w.name).collect(),
      drawn: Some(waypoints),
      index: 0,
    }
  }

  pub fn is_complete(&self) -> bool {
    self.index >= self.names.len()
  }

  /// The waypoint currently flown to, if it can be resolved.
  pub fn current(&self) -> Option<Waypoint> {
    if let Some(waypoint) =
      self.drawn.as_ref().and_then(|drawn| drawn.get(self.index))
    {
      return Some(waypoint.clone());
    }

    let name = self.names.get(self.index)?;
    WAYPOINTS.get(name).cloned()
  }
}

pub fn update(aircraft: &Aircraft, route: &RouteNav, bundle: &mut Bundle) {
  if route.is_complete() {
    info!("{}: route complete", aircraft.callsign);
    bundle
      .actions
      .push(Action::new(aircraft.id, ActionKind::Navigation(Navigation::Sid)));
    return;
  }

  let Some(waypoint) = route.current() else {
    if let Some(name) = route.names.get(route.index) {
      warn!("{}: waypoint {} not found", aircraft.callsign, name);
    }
    return;
  };

  turn_to(aircraft, bearing(aircraft.pos, waypoint.pos), bundle);

  if distance_nm(aircraft.pos, waypoint.pos) <= FIX_CROSSING_NM {
    info!(
      "{} crossed {} at {:.0} ft",
      aircraft.callsign, waypoint.name, aircraft.altitude
    );

    bundle.actions.push(Action::new(
      aircraft.id,
      ActionKind::Navigation(Navigation::Route(RouteNav {
        index: route.index + 1,
        ..route.clone()
      })),
    ));
  }
}
