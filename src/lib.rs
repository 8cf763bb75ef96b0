pub mod cli;
pub mod cobertura;
pub mod error;
pub mod lines;
pub mod model;
pub mod report;
pub mod runner;
pub mod strip;
pub mod trace;
