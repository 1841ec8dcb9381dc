//! CLI library components for stattab.

pub mod logging;
