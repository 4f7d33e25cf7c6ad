//! Calendar module
//!
//! Solar-term reference data and the day-difference calculation behind the
//! `calc_daewoon` tool.

pub mod daewoon;
pub mod solar_terms;

pub use daewoon::{calc_daewoon, parse_yyyymmdd, DaewoonDiff};
pub use solar_terms::{load_terms, SolarTermEntry, SolarTermTable};
