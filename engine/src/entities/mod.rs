pub mod aircraft;
pub mod airspace;
