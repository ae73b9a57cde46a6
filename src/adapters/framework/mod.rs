//! Command framework adapters.

mod clap_framework;

pub use clap_framework::{ClapCommandFramework, ClapHandler};
