//! Concrete sensor categories of the weather station.

pub mod environment;
pub mod power;
pub mod rain;
pub mod wind;
