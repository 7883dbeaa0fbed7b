//! Repository implementations.
//!
//! Read paths and simple writes live here; anything that touches sale rows
//! or stock goes through the engine instead.

pub mod product;
pub mod sale;
pub mod settings;
pub mod user;
