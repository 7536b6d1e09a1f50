pub mod action;
pub mod log;
pub mod player;
pub mod role;
pub mod serialization;
pub mod session;
