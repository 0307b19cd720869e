//! # Reflectometry Beamline Simulator
//!
//! Simulated motor axes and a runner that drives a beamline model built
//! from a TOML description, without any hardware.
//!
//! # Module Structure
//!
//! - [`axis`] - Constant-velocity simulated axes and the bank holding them
//! - [`runner`] - Loads a beamline, applies operator writes, steps axes until settled
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         refl_sim                             │
//! │  ┌──────────────┐    ┌────────────────┐    ┌─────────────┐   │
//! │  │ beamline.toml│───►│SimulationRunner│───►│ AxisBank    │   │
//! │  └──────────────┘    └───────┬────────┘    │ (step loop) │   │
//! │                              │             └──────▲──────┘   │
//! │                              ▼                    │          │
//! │                      ┌────────────────┐   set_value/velocity │
//! │                      │ BeamlineServer │───────────┘          │
//! │                      │  (refl_core)   │                      │
//! │                      └────────────────┘                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod axis;
pub mod runner;

pub use axis::{AxisBank, AxisSnapshot, SimulatedAxis};
pub use runner::{RunPlan, SimError, SimulationRunner, SimulationSnapshot};
