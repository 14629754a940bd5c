//! Command-line interface module.

mod auth;
mod commands;
mod run;

pub use auth::handle_auth_command;
pub use commands::{AuthCommands, Cli, Commands};
pub use run::{mirror_posts, post_media, run_bot};
