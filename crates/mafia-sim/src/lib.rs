#![deny(warnings)]

pub mod bots;
pub mod config;
pub mod driver;
pub mod logging;
pub mod narrator;
pub mod runner;
