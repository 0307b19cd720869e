//! # Reflectometry Beamline Core
//!
//! Geometry and control model of a neutron reflectometry beamline.
//!
//! Operators set high-level parameters (theta, supermirror angle, slit
//! heights above the beam). The model turns them into per-component
//! positions by propagating a ray through the ordered components, and
//! drives the motor axes so that every axis finishes its move at the same
//! time.
//!
//! ## Layers
//!
//! 1. **Geometry** ([`geometry`], [`movement`]): rays, movement axes and
//!    their interceptions
//! 2. **Components** ([`component`]): how each element changes the beam
//! 3. **Parameters & modes** ([`parameter`], [`mode`]): set points and the
//!    cascade of dependent parameters
//! 4. **Beamline** ([`beamline`]): the aggregate owning all of the above
//! 5. **Drivers** ([`driver`]): synchronized motor moves
//! 6. **Server** ([`server`]): thread-safe control surface
//!
//! ## Example
//!
//! ```rust
//! use refl_core::beamline::Beamline;
//! use refl_core::component::{Component, ComponentId};
//! use refl_core::geometry::PositionAndAngle;
//! use refl_core::mode::BeamlineMode;
//! use refl_core::movement::LinearMovement;
//! use refl_core::parameter::BeamlineParameter;
//!
//! let components = vec![
//!     Component::passive("s2", LinearMovement::new(0.0, 10.0, 90.0)),
//!     Component::reflecting("sample", LinearMovement::new(0.0, 20.0, 90.0)),
//! ];
//! let parameters = vec![
//!     BeamlineParameter::tracking_position("s2height", ComponentId(0)),
//!     BeamlineParameter::theta("theta", ComponentId(1)),
//! ];
//! let modes = vec![BeamlineMode::new("nr", ["s2height", "theta"])];
//!
//! let mut beamline = Beamline::new(components, parameters, vec![], modes)?;
//! beamline.set_incoming_beam(PositionAndAngle::new(0.0, 0.0, 0.0))?;
//! beamline.set_active_mode("nr")?;
//! beamline.set_parameter_setpoint_and_move("theta", 2.0)?;
//! # Ok::<(), refl_core::error::BeamlineError>(())
//! ```

pub mod beamline;
pub mod component;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod mode;
pub mod movement;
pub mod parameter;
pub mod server;

pub use beamline::Beamline;
pub use error::BeamlineError;
pub use server::{BeamlineServer, ParameterSnapshot};
