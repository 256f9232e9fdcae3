//! Host module - Interfaces to the windowing system
//!
//! This module provides abstractions for:
//! - Enumerating displays
//! - Reading and writing a window's scroll state
//! - Identifying a window's owner, title and display
//! - Receiving raw scroll notifications
//!
//! Real platform backends live outside this crate; `SimulatedHost` and
//! `ChannelScrollSource` back the CLI and the tests.

mod channel;
mod events;
mod simulated;
mod traits;

pub use channel::ChannelScrollSource;
pub use events::*;
pub use simulated::{SimulatedHost, SimulatedWindow};
pub use traits::*;
