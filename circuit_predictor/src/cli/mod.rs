pub mod commands;
pub mod target;
