//! CLI command handlers.

mod config;
mod list;
mod maintenance;
mod set;

pub use config::run_config_show_command;
pub use list::run_list_command;
pub use maintenance::{run_clear_command, run_sweep_command};
pub use set::{run_add_raw_command, run_set_command};
