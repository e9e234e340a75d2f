use glam::DVec2;
use serde::Serialize;
use thiserror::Error;

use crate::{
  data::{
    airspace::{CTR, DELTAS, DeltaShape, HUESCA_ZONE, TMA, resolve_polygon},
    fixes::{RUNWAYS, from_arp},
  },
  geometry::{
    bearing, delta_angle, distance_nm, point_in_circle, point_in_polygon,
  },
};

pub const CORRIDOR_HALF_WIDTH_NM: f64 = 2.0;
pub const CORRIDOR_LENGTH_NM: f64 = 20.0;
/// Runways further away than this are not checked for corridors.
pub const CORRIDOR_SEARCH_NM: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown restricted area {0:?}")]
pub struct UnknownDelta(pub String);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Area {
  Polygon { vertices: Vec<DVec2> },
  Circle { center: DVec2, radius: f64 },
}

impl Area {
  pub fn contains(&self, point: DVec2) -> bool {
    match self {
      Self::Polygon { vertices } => point_in_polygon(point, vertices),
      Self::Circle { center, radius } => {
        point_in_circle(point, *center, *radius)
      }
    }
  }
}

impl From<DeltaShape> for Area {
  fn from(shape: DeltaShape) -> Self {
    match shape {
      DeltaShape::Polygon { vertices } => Self::Polygon {
        vertices: resolve_polygon(vertices),
      },
      DeltaShape::Circle {
        radial,
        distance,
        radius,
      } => Self::Circle {
        center: from_arp(radial, distance),
        radius,
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestrictedArea {
  pub name: &'static str,
  pub area: Area,
  pub active: bool,
}

/// Resolved airspace of the TMA, used to keep the random autopilot out of
/// controlled and restricted areas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airspace {
  pub tma: Vec<DVec2>,
  pub ctr: Vec<DVec2>,
  pub huesca: Vec<DVec2>,
  pub deltas: Vec<RestrictedArea>,
}

impl Default for Airspace {
  fn default() -> Self {
    Self {
      tma: resolve_polygon(TMA),
      ctr: CTR.to_vec(),
      huesca: resolve_polygon(HUESCA_ZONE),
      deltas: DELTAS
        .iter()
        .map(|delta| RestrictedArea {
          name: delta.name,
          area: delta.shape.into(),
          active: true,
        })
        .collect(),
    }
  }
}

impl Airspace {
  /// Builds the airspace with only the named deltas active. `None` activates
  /// every delta.
  pub fn with_active_deltas(
    names: Option<&[String]>,
  ) -> Result<Self, UnknownDelta> {
    let mut airspace = Self::default();
    if let Some(names) = names {
      for delta in airspace.deltas.iter_mut() {
        delta.active = false;
      }
      for name in names {
        airspace.set_active(name, true)?;
      }
    }

    Ok(airspace)
  }

  pub fn set_active(
    &mut self,
    name: &str,
    active: bool,
  ) -> Result<(), UnknownDelta> {
    let delta = self
      .deltas
      .iter_mut()
      .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
      .ok_or_else(|| UnknownDelta(name.to_owned()))?;
    delta.active = active;

    Ok(())
  }

  pub fn in_tma(&self, point: DVec2) -> bool {
    point_in_polygon(point, &self.tma)
  }

  pub fn in_ctr(&self, point: DVec2) -> bool {
    point_in_polygon(point, &self.ctr)
  }

  pub fn in_huesca(&self, point: DVec2) -> bool {
    point_in_polygon(point, &self.huesca)
  }

  pub fn in_any_delta(&self, point: DVec2) -> bool {
    self
      .deltas
      .iter()
      .filter(|d| d.active)
      .any(|d| d.area.contains(point))
  }

  pub fn in_runway_corridor(&self, point: DVec2) -> bool {
    RUNWAYS.iter().any(|runway| {
      let distance = distance_nm(point, runway.threshold);
      if distance > CORRIDOR_SEARCH_NM {
        return false;
      }

      let angle =
        delta_angle(runway.heading, bearing(runway.threshold, point))
          .to_radians();
      if angle.abs() >= core::f64::consts::FRAC_PI_2 {
        return false;
      }

      let cross_track = distance * angle.sin();
      let along_track = distance * angle.cos();

      cross_track.abs() <= CORRIDOR_HALF_WIDTH_NM
        && (0.0..=CORRIDOR_LENGTH_NM).contains(&along_track)
    })
  }

  pub fn is_restricted(&self, point: DVec2) -> bool {
    self.in_ctr(point)
      || self.in_any_delta(point)
      || self.in_runway_corridor(point)
  }
}
