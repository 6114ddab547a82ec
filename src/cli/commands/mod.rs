//! One module per `fort` subcommand.

pub mod add;
pub mod config_cmd;
pub mod copy;
pub mod edit;
pub mod export;
pub mod favorite;
pub mod init;
pub mod list;
pub mod lock;
pub mod passwd;
pub mod remove;
pub mod session;
pub mod show;
pub mod status;
