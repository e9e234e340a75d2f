use glam::DVec2;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::EARTH_RADIUS_NM;

/// Degrees, minutes and seconds to decimal degrees.
pub const fn dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
  degrees + minutes / 60.0 + seconds / 3600.0
}

/// Builds a position. Positions store longitude in `x` and latitude in `y`.
pub const fn latlon(lat: f64, lon: f64) -> DVec2 {
  DVec2::new(lon, lat)
}

pub fn normalize_angle(angle: f64) -> f64 {
  angle.rem_euclid(360.0)
}

/// Signed shortest turn from `current` to `target`, in (-180, 180].
pub fn delta_angle(current: f64, target: f64) -> f64 {
  let delta = (target - current).rem_euclid(360.0);
  if delta > 180.0 { delta - 360.0 } else { delta }
}

pub fn add_degrees(degrees: f64, add: f64) -> f64 {
  normalize_angle(degrees + add)
}

pub fn inverse_degrees(degrees: f64) -> f64 {
  add_degrees(degrees, 180.0)
}

/// Great-circle distance in nautical miles (haversine).
pub fn distance_nm(a: DVec2, b: DVec2) -> f64 {
  let d_lat = (b.y - a.y).to_radians();
  let d_lon = (b.x - a.x).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + a.y.to_radians().cos()
      * b.y.to_radians().cos()
      * (d_lon / 2.0).sin().powi(2);

  EARTH_RADIUS_NM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial great-circle bearing from `a` to `b`, in [0, 360).
pub fn bearing(a: DVec2, b: DVec2) -> f64 {
  let lat_a = a.y.to_radians();
  let lat_b = b.y.to_radians();
  let d_lon = (b.x - a.x).to_radians();

  let y = d_lon.sin() * lat_b.cos();
  let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lon.cos();

  normalize_angle(y.atan2(x).to_degrees())
}

/// Moves a point along a bearing using the local flat-earth approximation.
pub fn project(point: DVec2, degrees: f64, distance: f64) -> DVec2 {
  let radians = degrees.to_radians();

  let lat = point.y + distance * radians.cos() / 60.0;
  let lon =
    point.x + distance * radians.sin() / (60.0 * point.y.to_radians().cos());

  latlon(lat, lon)
}

/// Point on `radial` at `distance` NM from a navaid.
pub fn radial_point(origin: DVec2, radial: f64, distance: f64) -> DVec2 {
  project(origin, radial, distance)
}

pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
  polygon
    .iter()
    .circular_tuple_windows()
    .filter(|(a, b)| {
      (a.y > point.y) != (b.y > point.y)
        && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
    })
    .count()
    % 2
    == 1
}

pub fn point_in_circle(point: DVec2, center: DVec2, radius: f64) -> bool {
  distance_nm(point, center) <= radius
}

/// Flat-earth mapping between positions and a scrolled, zoomed canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
  pub width: f64,
  pub height: f64,
  pub center: DVec2,
  /// Pixels per nautical mile.
  pub scale: f64,
  pub offset: DVec2,
}

impl Viewport {
  fn lon_factor(&self) -> f64 {
    self.center.y.to_radians().cos()
  }

  pub fn to_canvas(&self, point: DVec2) -> DVec2 {
    let lat_nm = (point.y - self.center.y) * 60.0;
    let lon_nm = (point.x - self.center.x) * 60.0 * self.lon_factor();

    DVec2::new(
      self.width / 2.0 + lon_nm * self.scale + self.offset.x,
      self.height / 2.0 - lat_nm * self.scale + self.offset.y,
    )
  }

  pub fn to_latlon(&self, canvas: DVec2) -> DVec2 {
    let x = canvas.x - self.width / 2.0 - self.offset.x;
    let y = self.height / 2.0 - canvas.y + self.offset.y;

    let lat_nm = y / self.scale;
    let lon_nm = x / self.scale / self.lon_factor();

    latlon(self.center.y + lat_nm / 60.0, self.center.x + lon_nm / 60.0)
  }
}
