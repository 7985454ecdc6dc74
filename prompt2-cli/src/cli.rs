use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "prompt2")]
#[command(about = "Dynamic shell prompt generator")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Terminal width in columns (default: detect)
    #[arg(short, long, global = true)]
    pub width: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the prompt for the current directory (default)
    Render,

    /// Print every widget token and its value
    Status,

    /// Validate the configured templates
    Check,

    /// Print the escape sequence for a terminal attribute combo
    Attribute {
        /// Comma separated attribute names, e.g. "bold,fg blue"
        #[arg(index = 1, required_unless_present = "list")]
        combo: Option<String>,

        /// List known attribute names instead
        #[arg(short, long, value_enum)]
        list: Option<AttributeList>,
    },

    /// Write the default configuration file
    InitConfig {
        /// Where to write it (default: ~/.config/prompt2/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttributeList {
    All,
    Styles,
    Colours,
    Resets,
    Rgb,
}
