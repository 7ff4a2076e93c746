//! Useful re-exports.

pub use crate::errors::*;
pub use log::{debug, error, info, trace, warn};
