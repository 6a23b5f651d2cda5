mod category;
mod config_cmd;
mod item;
mod menu;
mod search;
mod status;

use clap::ValueEnum;

pub use category::CategoryCommand;
pub use config_cmd::ConfigCommand;
pub use item::ItemCommand;
pub use menu::MenuCommand;
pub use search::SearchCommand;
pub use status::StatusCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A failure that has already been shown to the user as a notice.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation failed")
    }
}

impl std::error::Error for Reported {}
