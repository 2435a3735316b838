//! PocketPet engine library.
//!
//! A virtual pet with three needs, a coin economy and three button-driven
//! mini-games.  Everything here is pure logic behind port traits; the host
//! binary in `main.rs` is one possible outer ring.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod games;
pub mod pet;
