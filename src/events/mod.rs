//! Message types exchanged across systems.
//!
//! Submodules:
//! - [`audio`] – playback requests, host voice commands, finished notifications
pub mod audio;
