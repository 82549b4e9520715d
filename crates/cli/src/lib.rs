//! treewatch command-line front end
//!
//! Argument parsing, configuration merging and the fatal-exit policy live
//! here; the watching itself is the `watcher` crate.

pub mod args;
pub mod cmd;
pub mod logging;

pub use args::Cli;
