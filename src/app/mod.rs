//! Command line front end

pub mod cli;
pub mod config;
pub mod renderer;
pub mod startup;
