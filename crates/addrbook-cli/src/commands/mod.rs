//! CLI commands

mod address;
mod auth;
mod check;
mod shell;

pub use check::check;
pub use shell::shell;
