//! Command-line front end: turns images into print-ready stencils.
//!
//! The flow per input is decode, place on the sheet, threshold, auto-bridge
//! (see [`stencil_fast_bridge`]) and export.

pub mod cli;
pub mod error;
pub mod export;
pub mod layout;
pub mod logging;
pub mod pipeline;
mod progress;
pub mod settings;
pub mod stencil;

pub use error::StencilError;
