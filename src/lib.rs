#![allow(unused_assignments)] // thiserror/miette proc macros trigger false positives

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod machine_readable;
pub mod plugin;
pub mod status;
pub mod vagrant;

pub use command::{Runner, ShellRunner};
pub use error::VexError;
pub use machine_readable::{Escapes, Record};
pub use plugin::Plugin;
pub use status::{MachineState, MachineStatus};
pub use vagrant::Vagrant;
