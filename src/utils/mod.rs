//! Small helpers shared by the server modules.

pub mod mime;
