pub mod engine;
mod discussion;
mod night;
mod roles;
pub mod state;
mod tally;
mod voting;
