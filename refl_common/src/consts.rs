//! Workspace-wide constants.
//!
//! Single source of truth for tolerances and defaults. Imported by all
//! crates, no duplication permitted.

/// Tolerance used when comparing two angles [degrees].
///
/// A movement axis and a beam closer than this to parallel (mod 180°) have
/// no interception.
pub const ANGULAR_TOLERANCE: f64 = 1e-12;

/// Offset between a tilting component's tilt angle and the beam [degrees].
pub const TILT_ANGULAR_OFFSET: f64 = 90.0;

/// Default beamline configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/beamline.toml";

/// Default simulation step [s].
pub const DEFAULT_SIM_STEP_S: f64 = 0.01;

/// Default upper bound on simulation steps while waiting for axes to settle.
pub const DEFAULT_MAX_SIM_STEPS: u32 = 100_000;

/// Distance below which a simulated axis is considered at its target.
pub const IN_POSITION_WINDOW: f64 = 1e-9;
