//! Headless core for the atrium portfolio viewer.
//!
//! Everything interactive lives here: the content catalog, ring layouts,
//! the entity registry and its scene graph, pointer picking, hover and
//! selection state, the tween scheduler, the per-section gallery
//! controller, and the section router that keeps exactly one gallery
//! active at a time. `atrium_viewer` consumes frame snapshots produced by
//! this crate and never reaches into gallery internals directly.

pub mod catalog;
pub mod error;
pub mod gallery;
pub mod interaction;
pub mod layout;
pub mod loader;
pub mod picking;
pub mod registry;
pub mod resources;
pub mod router;
pub mod tween;
pub mod viewport;
