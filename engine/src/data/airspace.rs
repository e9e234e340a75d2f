use glam::DVec2;
use serde::Serialize;

use crate::geometry::{dms, latlon};

use super::fixes::from_arp;

/// Radial/distance vertices measured from the ARP.
pub type RadialPolygon = &'static [(f64, f64)];

pub const TMA: RadialPolygon = &[
  (337.0, 62.0),
  (259.0, 69.0),
  (242.0, 80.0),
  (200.0, 40.0),
  (120.0, 55.0),
  (77.0, 59.0),
];

pub const CTR: [DVec2; 4] = [
  latlon(dms(41.0, 38.0, 37.0), -dms(0.0, 53.0, 27.0)),
  latlon(dms(41.0, 35.0, 25.0), -dms(0.0, 45.0, 50.0)),
  latlon(dms(41.0, 31.0, 55.0), -dms(0.0, 48.0, 30.0)),
  latlon(dms(41.0, 35.0, 2.0), -dms(0.0, 56.0, 4.0)),
];

pub const HUESCA_ZONE: RadialPolygon = &[
  (32.0, 27.6),
  (33.0, 42.7),
  (68.0, 52.3),
  (81.0, 40.7),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeltaShape {
  Polygon {
    vertices: RadialPolygon,
  },
  Circle {
    radial: f64,
    distance: f64,
    radius: f64,
  },
}

/// A restricted area that can be switched on and off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
  pub name: &'static str,
  pub shape: DeltaShape,
}

pub static DELTAS: [Delta; 5] = [
  Delta {
    name: "LED50",
    shape: DeltaShape::Polygon {
      vertices: &[(335.0, 57.9), (322.0, 52.2), (329.0, 26.2), (352.0, 31.4)],
    },
  },
  Delta {
    name: "Area C",
    shape: DeltaShape::Polygon {
      vertices: &[
        (268.0, 61.0),
        (259.0, 69.0),
        (247.0, 75.5),
        (212.0, 19.7),
        (269.0, 20.5),
      ],
    },
  },
  Delta {
    name: "A123",
    shape: DeltaShape::Polygon {
      vertices: &[
        (360.0, 19.5),
        (37.0, 20.0),
        (70.0, 20.0),
        (94.0, 20.0),
        (95.0, 53.0),
        (77.0, 59.0),
        (357.0, 46.0),
      ],
    },
  },
  Delta {
    name: "LED70",
    shape: DeltaShape::Polygon {
      vertices: &[
        (343.0, 12.5),
        (3.0, 15.0),
        (17.0, 16.7),
        (35.0, 12.8),
        (49.0, 9.8),
        (69.0, 9.5),
        (80.0, 7.6),
        (338.0, 9.6),
      ],
    },
  },
  Delta {
    name: "LED107",
    shape: DeltaShape::Circle {
      radial: 311.0,
      distance: 32.6,
      radius: 5.0,
    },
  },
];

pub fn delta(name: &str) -> Option<&'static Delta> {
  let name = name.trim();
  DELTAS.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

pub fn resolve_polygon(vertices: RadialPolygon) -> Vec<DVec2> {
  vertices
    .iter()
    .map(|(radial, distance)| from_arp(*radial, *distance))
    .collect()
}
