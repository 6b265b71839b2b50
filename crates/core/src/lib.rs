#![forbid(unsafe_code)]

pub mod model;
pub mod runner;
pub mod time;

pub use time::Clock;
