//! Reflectometry Common Library
//!
//! This crate provides the value types, the motor axis contract and the
//! configuration loading utilities shared by all workspace crates.
//!
//! # Module Structure
//!
//! - [`axis`] - Contract every physical (or simulated) motor axis fulfils
//! - [`beamline`] - Declarative beamline description loaded from TOML
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide constants
//! - [`value`] - Parameter set point values
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use refl_common::config::{ConfigLoader, SharedConfig};
//! use refl_common::value::ParameterValue;
//! ```

pub mod axis;
pub mod beamline;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod value;
