//! src/lib.rs
// make public to other binaries (main, test)
pub mod configuration;
pub mod database;
pub mod domain;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
