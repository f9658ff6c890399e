//! ECS components for entities.
//!
//! Submodules overview:
//! - [`audioplayer`] – pooled voice player with timed reclamation
//! - [`persistent`] – marker for entities that persist across scope changes
//! - [`scopemember`] – the scope an entity belongs to
//! - [`singleton`] – singleton mode and registration state of an entity

pub mod audioplayer;
pub mod persistent;
pub mod scopemember;
pub mod singleton;
