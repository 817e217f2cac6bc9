//! Packet schemas
//!
//! - [`fh4`]: the built-in Forza Horizon 4 layout
//! - [`layout`]: schemas loaded from YAML layout files

pub mod fh4;
pub mod layout;

pub use fh4::forza_horizon_4;
pub use layout::{EntryKind, LayoutEntry, LayoutFile};
