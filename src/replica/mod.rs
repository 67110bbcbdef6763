//! Replica module for producing a per-student copy of a template sheet.
//!
//! This module provides:
//! - The field map linking logical fields to cells
//! - Destination folder lookup next to the active workbook
//! - Timestamped titles in a fixed time zone
//! - The replication workflow itself

pub mod types;
pub mod folder;
pub mod naming;
pub mod replicator;

pub use types::*;
pub use folder::resolve_or_create_folder;
pub use replicator::replicate_sheet;
