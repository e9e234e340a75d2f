//! Static geography and procedure definitions for the Zaragoza TMA.
//!
//! Everything here is read-only. Radial/distance definitions are resolved to
//! positions once, the first time a table is touched.

pub mod airspace;
pub mod approaches;
pub mod fixes;
pub mod sids;
pub mod visual;

pub use fixes::{Runway, WAYPOINTS, Waypoint, WaypointKind, runway};
pub use sids::{Sid, sid, sids_for_runway};
