// src/lib.rs

#[macro_use]
pub mod macros;

pub mod config;
pub mod error;
pub mod model;
pub mod params;
pub mod teams;

pub mod outcome;
pub mod stats;
pub mod zone;

pub mod net;
pub mod store;

pub mod affiliation;
pub mod reconcile;
pub mod scrape;

pub mod runner;
