pub mod application;

pub use application::*;

/// Placeholder stored when a lodgement date can't be parsed.
pub const NOT_AVAILABLE: &str = "N/A";
