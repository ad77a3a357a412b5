pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod indexer;
pub mod model;
pub mod process;
pub mod repo;
pub mod search;
pub mod util;
pub mod vcs;
pub mod watch;
