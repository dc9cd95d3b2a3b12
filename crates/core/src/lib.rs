#![forbid(unsafe_code)]

pub mod geo;
pub mod model;
pub mod time;

pub use time::Clock;
