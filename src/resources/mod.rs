//! ECS resources made available to systems.
//!
//! Overview
//! - `activescope` – key of the currently loaded scope
//! - `audio` – bridge and channel for the backend audio thread
//! - `audioconfig` – pool sizing, singleton defaults and clip lengths from INI
//! - `clipstore` – named clips and their lengths
//! - `identity` – single-instance registry per role type
//! - `worldtime` – simulation time and delta
pub mod activescope;
pub mod audio;
pub mod audioconfig;
pub mod clipstore;
pub mod identity;
pub mod worldtime;
