//! CLI command implementations

pub mod error;
pub mod export;
pub mod networks;
pub mod validate;

pub use error::CliError;
pub use export::{Cli, Commands, ExportArgs, OutputFormat};
pub use networks::NetworksCommand;
pub use validate::ValidateCommand;
