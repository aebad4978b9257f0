//! nx integration
//!
//! The only place nx-matrix talks to the monorepo tool. Affected-project
//! detection itself is entirely up to nx.

pub mod cli;
pub mod command;

pub use cli::{parse_project_list, GitBoundaries, NxCli, DEFAULT_AFFECTED_SELECT, DEFAULT_NX_BIN};
pub use command::{capture_stdout, CommandSpec};
