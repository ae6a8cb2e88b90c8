//! Implementations that are useful accross the whole project
//!
//! Date management, payment records and the supporter status engine

pub mod date;
pub mod payment;
pub mod report;
pub mod repository;
pub mod status;
