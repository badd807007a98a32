//! Panel commands - front end to backend bridge

mod bridge;
mod resilience;

pub use bridge::*;
pub use resilience::*;
