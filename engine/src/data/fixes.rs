use std::{collections::BTreeMap, sync::LazyLock};

use glam::DVec2;
use internment::Intern;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  ARP,
  geometry::{dms, latlon, radial_point},
};

use super::sids::SIDS;

/// Zaragoza NDB.
pub const ZRZ: DVec2 = latlon(dms(41.0, 43.0, 50.0), -dms(1.0, 11.0, 36.0));
/// ZAR VOR/DME with the co-located TACAN.
pub const ZAR: DVec2 = latlon(dms(41.0, 39.0, 28.4), -dms(1.0, 1.0, 51.1));

pub fn from_arp(radial: f64, distance: f64) -> DVec2 {
  radial_point(ARP, radial, distance)
}

pub fn from_zrz(radial: f64, distance: f64) -> DVec2 {
  radial_point(ZRZ, radial, distance)
}

pub const VISUAL_POINTS: [(&str, f64, f64); 6] = [
  ("RN", 341.0, 6.7),
  ("Q", 280.0, 8.2),
  ("S", 209.0, 6.0),
  ("P", 190.0, 12.1),
  ("M", 94.0, 12.0),
  ("E", 86.0, 12.8),
];

pub const INSTRUMENTAL_POINTS: [(&str, f64, f64); 29] = [
  ("PONEN", 133.0, 29.4),
  ("ALEPO", 317.0, 57.7),
  ("CMA", 192.0, 56.5),
  ("GRAUS", 75.0, 66.7),
  ("MARIO", 46.0, 48.4),
  ("TON", 60.0, 29.0),
  ("SURCO", 27.0, 45.3),
  ("EMBEX", 334.0, 19.6),
  ("AMBEL", 284.0, 30.8),
  ("RONKO", 2.0, 50.5),
  ("POSSY", 67.0, 58.4),
  ("LOBAR", 87.0, 61.1),
  ("SEROX", 110.0, 29.2),
  ("CASPE", 114.0, 60.0),
  ("MLA", 122.0, 62.6),
  // ILS 30R
  ("YARZU", 164.38, 19.5),
  ("KEKAG", 118.55, 19.5),
  ("GODPI", 78.19, 20.0),
  ("IF_ILS", 118.51, 14.4),
  // VOR 30R
  ("IF_VOR30R", 108.0, 16.0),
  ("FAF_VOR30R", 108.0, 6.0),
  // Huesca
  ("W1_HUE", 32.0, 30.0),
  ("SW_HUE", 58.0, 29.5),
  ("S1_HUE", 81.0, 40.7),
  ("HUE_HUE", 58.0, 40.9),
  ("W_HUE", 50.0, 36.9),
  ("N_HUE", 49.0, 43.1),
  ("E_HUE", 56.0, 46.6),
  ("S_HUE", 60.0, 38.7),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaypointKind {
  Visual,
  Fix,
  Ndb,
  VorDme,
  Airport,
  /// Literal coordinates from a drawn route.
  Drawn,
  /// Generated by the random autopilot.
  Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
  pub name: Intern<String>,
  pub kind: WaypointKind,
  pub pos: DVec2,
}

impl Waypoint {
  pub fn new(name: impl AsRef<str>, kind: WaypointKind, pos: DVec2) -> Self {
    Self {
      name: Intern::from_ref(name.as_ref()),
      kind,
      pos,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Runway {
  pub id: &'static str,
  pub heading: f64,
  pub threshold: DVec2,
}

pub static RUNWAYS: [Runway; 4] = [
  Runway {
    id: "12L",
    heading: 120.0,
    threshold: latlon(dms(41.0, 40.0, 8.62), -dms(1.0, 2.0, 23.40)),
  },
  Runway {
    id: "30R",
    heading: 300.0,
    threshold: latlon(dms(41.0, 39.0, 19.42), -dms(1.0, 0.0, 29.94)),
  },
  Runway {
    id: "12R",
    heading: 120.0,
    threshold: latlon(dms(41.0, 40.0, 48.74), -dms(1.0, 4.0, 56.54)),
  },
  Runway {
    id: "30L",
    heading: 300.0,
    threshold: latlon(dms(41.0, 39.0, 48.46), -dms(1.0, 2.0, 37.37)),
  },
];

pub fn runway(id: &str) -> Option<&'static Runway> {
  RUNWAYS.iter().find(|r| r.id.eq_ignore_ascii_case(id.trim()))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
  #[error("route is empty")]
  Empty,
  #[error("unknown waypoints: {}", .0.join(", "))]
  Unknown(Vec<String>),
}

/// Named waypoints that routes, spawns and holds can refer to.
#[derive(Debug, Clone, Default)]
pub struct WaypointDatabase {
  waypoints: BTreeMap<String, Waypoint>,
}

pub static WAYPOINTS: LazyLock<WaypointDatabase> =
  LazyLock::new(WaypointDatabase::zaragoza);

impl WaypointDatabase {
  fn zaragoza() -> Self {
    let mut database = Self::default();

    for (name, radial, distance) in VISUAL_POINTS {
      database.insert(Waypoint::new(
        name,
        WaypointKind::Visual,
        from_arp(radial, distance),
      ));
    }
    for (name, radial, distance) in INSTRUMENTAL_POINTS {
      database.insert(Waypoint::new(
        name,
        WaypointKind::Fix,
        from_arp(radial, distance),
      ));
    }
    database.insert(Waypoint::new("ZRZ", WaypointKind::Ndb, ZRZ));

    // SID fixes only fill gaps, the tables above are more precise.
    for fix in SIDS.iter().flat_map(|sid| sid.fixes.iter()) {
      database
        .waypoints
        .entry(fix.name.to_uppercase())
        .or_insert_with(|| fix.clone());
    }

    database.insert(Waypoint::new("ARP", WaypointKind::Airport, ARP));
    database
  }

  pub fn insert(&mut self, mut waypoint: Waypoint) {
    let key = waypoint.name.to_uppercase();
    waypoint.name = Intern::from_ref(key.as_str());
    self.waypoints.insert(key, waypoint);
  }

  /// Case-insensitive lookup.
  pub fn get(&self, name: &str) -> Option<&Waypoint> {
    self.waypoints.get(&name.trim().to_uppercase())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  /// All names, sorted.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.waypoints.keys().map(String::as_str)
  }

  pub fn search(&self, query: &str) -> Vec<&Waypoint> {
    let query = query.trim().to_uppercase();
    self
      .waypoints
      .iter()
      .filter(|(name, _)| name.contains(&query))
      .map(|(_, waypoint)| waypoint)
      .collect()
  }

  pub fn resolve<'a, I>(&self, names: I) -> Result<Vec<Waypoint>, RouteError>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut waypoints = Vec::new();
    let mut unknown = Vec::new();

    for (i, name) in names.into_iter().enumerate() {
      match self.get(name) {
        Some(waypoint) => waypoints.push(waypoint.clone()),
        None => unknown.push(format!("\"{name}\" (position {})", i + 1)),
      }
    }

    if !unknown.is_empty() {
      Err(RouteError::Unknown(unknown))
    } else if waypoints.is_empty() {
      Err(RouteError::Empty)
    } else {
      Ok(waypoints)
    }
  }

  /// Parses a comma separated route such as `"ZRZ, FESTA, CMA"`.
  pub fn validate_route(
    &self,
    route: &str,
  ) -> Result<Vec<Waypoint>, RouteError> {
    self.resolve(route.split(',').map(str::trim).filter(|s| !s.is_empty()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::distance_nm;

  #[test]
  fn test_lookup_is_case_insensitive() {
    let upper = WAYPOINTS.get("PONEN").unwrap();
    let lower = WAYPOINTS.get(" ponen ").unwrap();
    assert_eq!(upper, lower);
    assert_eq!(upper.kind, WaypointKind::Fix);
  }

  #[test]
  fn test_radial_points_resolve_from_arp() {
    let kekag = WAYPOINTS.get("KEKAG").unwrap();
    assert!((distance_nm(ARP, kekag.pos) - 19.5).abs() < 0.1);
  }

  #[test]
  fn test_database_contains_special_points() {
    assert_eq!(WAYPOINTS.get("ZRZ").unwrap().kind, WaypointKind::Ndb);
    assert_eq!(WAYPOINTS.get("ARP").unwrap().pos, ARP);
    assert_eq!(WAYPOINTS.get("RN").unwrap().kind, WaypointKind::Visual);
  }

  #[test]
  fn test_database_includes_sid_only_fixes() {
    assert!(WAYPOINTS.contains("BUROV"));
    assert!(WAYPOINTS.contains("FESTA"));
    assert!(WAYPOINTS.contains("R248_15DME"));
  }

  #[test]
  fn test_names_are_sorted() {
    let names: Vec<&str> = WAYPOINTS.names().collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
  }

  #[test]
  fn test_search_by_substring() {
    let found = WAYPOINTS.search("hue");
    assert_eq!(found.len(), 8);
    assert!(found.iter().all(|w| w.name.contains("HUE")));
  }

  #[test]
  fn test_validate_route() {
    let route = WAYPOINTS.validate_route("ZRZ, festa,CMA").unwrap();
    let names: Vec<&str> = route.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["ZRZ", "FESTA", "CMA"]);
  }

  #[test]
  fn test_validate_route_reports_every_unknown_name() {
    let error = WAYPOINTS.validate_route("ZRZ, NOPE, TON, NADA").unwrap_err();
    assert_eq!(
      error,
      RouteError::Unknown(vec![
        "\"NOPE\" (position 2)".to_owned(),
        "\"NADA\" (position 4)".to_owned(),
      ])
    );
  }

  #[test]
  fn test_validate_empty_route() {
    assert_eq!(WAYPOINTS.validate_route(" , "), Err(RouteError::Empty));
  }

  #[test]
  fn test_runway_lookup() {
    assert_eq!(runway("30r").unwrap().heading, 300.0);
    assert!(runway("27").is_none());
  }
}
