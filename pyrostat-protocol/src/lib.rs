//! Wire formats for the Pyrostat pit controller
//!
//! This crate defines the data that crosses the boundary between the control
//! core and its collaborators (UI, network server, persistent storage):
//!
//! - The packed cook-session log record and session file layout
//! - The state snapshot published to subscribers
//! - The command set accepted by the control core
//!
//! # Session file layout
//!
//! The session file is a flat append-only log, all fields little-endian:
//!
//! ```text
//! ┌────────────┬──────────────────────────────────────────┐
//! │ startEpoch │ DataPoint records ...                    │
//! │ u32 (4B)   │ 13 B each, see `record`                  │
//! └────────────┴──────────────────────────────────────────┘
//! ```
//!
//! Temperatures are stored as `i16` in tenths of a degree, so the file is
//! unit-agnostic: whatever unit the controller was configured with is the
//! unit on disk.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod command;
pub mod record;
pub mod snapshot;

pub use command::{Command, MeatProbe};
pub use record::{DataPoint, RecordError, HEADER_LEN, RECORD_LEN};
pub use snapshot::{StateSnapshot, ERROR_MSG_LEN, MAX_SNAPSHOT_ERRORS};
