//! Command handlers behind the `repo-fleet` binary

pub mod check;
pub mod maintain;

pub use check::{handle_check_command, CheckOptions};
pub use maintain::{handle_maintain_command, parse_dirs, MaintainOptions};
