//! Class module for keeping one protected sheet per class in a workbook.
//!
//! This module provides:
//! - Reading the class roster from the control sheet
//! - A name index of the workbook's sheets
//! - Batched duplication, protection and labelling of new class sheets
//! - The creation workflow with its aggregate refresh hook
//! - Removing and re-applying class-sheet protections

pub mod types;
pub mod index;
pub mod roster;
pub mod batch;
pub mod aggregate;
pub mod orchestrator;
pub mod protections;

// Re-export commonly used types and functions
pub use types::*;
pub use index::SheetIndex;
pub use roster::{read_roster, missing_classes};
pub use batch::{duplicate_sheets, protect_sheets, write_labels};
pub use aggregate::{ClassSheetHooks, WorkbookHooks};
pub use orchestrator::create_class_sheets;
pub use protections::{remove_protections, reprotect_class_sheets};
