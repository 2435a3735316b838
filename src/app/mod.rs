//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the pet model and the mini-games into a mode FSM
//! behind [`controller::AppController`].  All interaction with the
//! outside world happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod controller;
pub mod events;
pub mod gestures;
pub mod ports;
pub mod snapshot;
