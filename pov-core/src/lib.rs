//! Portable control core for a spinning persistence-of-vision display.
//!
//! Everything in this crate is independent of the MCU: the rotor state
//! machine, the fixed-point speed PID, the double-buffered image raster,
//! the beacon angle estimator and the local wall clock. The firmware
//! crate wires these to real peripherals through the narrow capability
//! traits in [`hal`].
#![cfg_attr(not(test), no_std)]

pub mod angle;
pub mod clock;
pub mod config;
pub mod fsm;
pub mod hal;
pub mod image;
pub mod pid;
pub mod timing;
