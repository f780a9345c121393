//! Platform-agnostic model and interaction logic.

pub mod dimensions;
pub mod format;
pub mod model;
pub mod slider;
