//! Timeline Module
//!
//! Sources, tracks, clips and effects.

mod models;

pub use models::*;
