//! Chart payloads for the browser front-end.

pub mod colours;
pub mod figure;
pub mod plots;

pub use colours::{DriverStyle, resolve_pair};
pub use figure::{Axis, Figure, Layout, Trace};
