//! One module per subcommand, each exposing an `execute` entry point.

pub mod address;
#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod completions;
pub mod delete;
pub mod init;
pub mod list;
pub mod rotate;
pub mod sign;
pub mod version;
