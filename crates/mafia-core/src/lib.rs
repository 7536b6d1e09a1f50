#![deny(warnings)]
pub mod belief;
pub mod config;
pub mod game;
pub mod model;
