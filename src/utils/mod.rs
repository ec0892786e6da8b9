//! Utilities for gameconf.
//!
//! Submodules:
//! - `paths`: platform-specific default locations (game data, configuration directory).

pub mod paths;
