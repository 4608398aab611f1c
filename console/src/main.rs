use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use draw_engine::{ConfigLoader, DrawPlugin, METADATA};
use draw_md::{
    cli::{Cli, Command},
    forward_replies, print_reply, resolve_plugin_dir, serve_stdin,
};
use log::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let cli = Cli::parse();

    let plugin_dir = resolve_plugin_dir(cli.plugin_dir);
    info!(
        "Loading {} {} from {}",
        METADATA.name,
        METADATA.version,
        plugin_dir.display()
    );
    let plugin = Arc::new(DrawPlugin::new(ConfigLoader::new(plugin_dir).load()));

    match cli.command {
        Some(Command::Run { text }) => {
            if !forward_replies(&plugin, &text, print_reply).await {
                warn!("Not a draw command: {text:?}");
            }
        }
        None => serve_stdin(plugin.clone()).await?,
    }

    plugin.terminate();
    Ok(())
}
