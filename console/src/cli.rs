use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct Cli {
    /// Directory holding `_conf_schema.json` and the optional `config.json`
    #[arg(short, long)]
    pub plugin_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Without a subcommand, chat messages are read line by line from stdin.
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Handle a single chat message, e.g. `run "/draw a cat --n 2"`
    Run { text: String },
}
