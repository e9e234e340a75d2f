use glam::DVec2;

pub mod command;
pub mod data;
pub mod engine;
pub mod entities;
pub mod geometry;
pub mod heading;
pub mod performance;
pub mod scenario;

pub use geometry::*;

pub const DEFAULT_TICK_RATE_TPS: usize = 15;

pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Aerodrome reference point of Zaragoza (LEZG). Every radial/distance fix
/// without an explicit navaid is measured from here.
pub const ARP: DVec2 = latlon(dms(41.0, 39.0, 58.0), -dms(1.0, 2.0, 30.0));

/// Distance at which a fix counts as crossed.
pub const FIX_CROSSING_NM: f64 = 0.5;

/// Altitude error below which an aircraft is considered level.
pub const LEVEL_OFF_BAND_FT: f64 = 10.0;

/// Ceiling used for SID departures cleared without an explicit cap.
pub const DEFAULT_SID_CEILING_FT: f64 = 24000.0;
/// Initial climb for departures without a SID.
pub const DEFAULT_DEPARTURE_ALTITUDE_FT: f64 = 5000.0;

pub const FORMATION_SPACING_NM: f64 = 0.5;
pub const MAX_FORMATION_SIZE: usize = 4;

pub const TOUCHDOWN_ALTITUDE_FT: f64 = 50.0;
pub const ROLLOUT_SECONDS: f64 = 7.0;

/// Sim-time countdown between a delete command and the removal.
pub const DELETE_DELAY_SECONDS: f64 = 3.0;

/// Abbreviates an altitude to feet or flight level (depending on the altitude).
pub fn abbreviate_altitude(altitude: f64) -> String {
  if altitude < 6000.0 {
    format!("{} ft", altitude.round() as i64)
  } else {
    format!("FL{:03}", (altitude / 100.0).round() as i64)
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    abbreviate_altitude,
    geometry::{delta_angle, inverse_degrees, normalize_angle},
  };

  #[test]
  fn test_abbreviate_altitude() {
    assert_eq!(abbreviate_altitude(2900.0), "2900 ft");
    assert_eq!(abbreviate_altitude(23000.0), "FL230");
    assert_eq!(abbreviate_altitude(7000.0), "FL070");
  }

  mod delta_angle {
    use super::*;

    #[test]
    fn test_delta_angle_zero() {
      assert_eq!(delta_angle(0.0, 0.0), 0.0)
    }

    #[test]
    fn test_delta_angle_90() {
      assert_eq!(delta_angle(0.0, 90.0), 90.0)
    }

    #[test]
    fn test_delta_angle_negative() {
      assert_eq!(delta_angle(0.0, -90.0), -90.0)
    }

    #[test]
    fn test_delta_angle_not_zero() {
      assert_eq!(delta_angle(90.0, 180.0), 90.0)
    }

    #[test]
    fn test_delta_angle_not_zero_negative() {
      assert_eq!(delta_angle(180.0, 90.0), -90.0)
    }

    #[test]
    fn test_delta_angle_wraps_north() {
      assert_eq!(delta_angle(350.0, 10.0), 20.0);
      assert_eq!(delta_angle(10.0, 350.0), -20.0);
    }

    #[test]
    fn test_delta_angle_opposite_is_positive() {
      assert_eq!(delta_angle(0.0, 180.0), 180.0);
      assert_eq!(delta_angle(180.0, 0.0), 180.0);
    }
  }

  mod normalize_angle {
    use super::*;

    #[test]
    fn test_normalize_angle() {
      assert_eq!(normalize_angle(360.0), 0.0);
      assert_eq!(normalize_angle(-90.0), 270.0);
      assert_eq!(normalize_angle(725.0), 5.0);
    }

    #[test]
    fn test_inverse_degrees() {
      assert_eq!(inverse_degrees(90.0), 270.0);
      assert_eq!(inverse_degrees(300.0), 120.0);
    }
  }
}
