//! ScrollRelay - Split-screen scroll relay
//!
//! Continues scrolled content across adjacent display regions: when a reader
//! scrolls to the end of one pane, the neighboring pane picks up where it
//! left off.

pub mod config;
pub mod host;
pub mod policy;
pub mod relay;
pub mod screen;
pub mod service;
