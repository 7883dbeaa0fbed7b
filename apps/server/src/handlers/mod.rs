//! Request handlers, grouped by API surface.

pub mod pos;
pub mod settings;
