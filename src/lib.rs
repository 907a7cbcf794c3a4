// src/lib.rs

pub mod cascade;
pub mod cli;
pub mod config;
pub mod core;
pub mod csv;
pub mod error;
pub mod extract;
pub mod filter;
pub mod gui;
pub mod ledger;
pub mod log;
pub mod model;
pub mod normalize;
pub mod payload;
pub mod probe;
pub mod progress;
pub mod runner;
pub mod store;
