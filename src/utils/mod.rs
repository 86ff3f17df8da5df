//! Shared helpers for HTML handling, MIME detection and paths.

pub mod html;
pub mod mime;
pub mod path;
pub mod plural;

pub use plural::plural_count;
