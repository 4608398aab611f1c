use std::{path::PathBuf, sync::Arc};

use color_eyre::Result;
use draw_engine::{DrawPlugin, Reply};
use log::{debug, error};
use tokio::{
    io::{AsyncBufReadExt, BufReader, stdin},
    task::{JoinError, JoinSet},
};
use tokio_stream::StreamExt;

pub mod cli;

const APP_DIR: &str = "draw-md";

/// `--plugin-dir` if given, else `<config dir>/draw-md` if it exists, else the working dir.
pub fn resolve_plugin_dir(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| {
        dirs::config_local_dir()
            .map(|d| d.join(APP_DIR))
            .filter(|d| d.is_dir())
    })
    .unwrap_or_else(|| PathBuf::from("."))
}

pub fn render(reply: &Reply) -> String {
    match reply {
        Reply::Text(text) => text.clone(),
        Reply::Image { caption, path } => format!("{caption}\n[image] {}", path.display()),
    }
}

pub fn print_reply(reply: Reply) {
    println!("{}", render(&reply));
}

/// Feeds one chat message to the plugin. Returns false if no command matched.
pub async fn forward_replies(plugin: &DrawPlugin, text: &str, mut sink: impl FnMut(Reply)) -> bool {
    let Some(mut replies) = plugin.handle(text) else {
        return false;
    };

    while let Some(reply) = replies.next().await {
        sink(reply);
    }
    true
}

/// Every stdin line is an independent chat event, handled on its own task.
pub async fn serve_stdin(plugin: Arc<DrawPlugin>) -> Result<()> {
    let mut lines = BufReader::new(stdin()).lines();
    let mut tasks = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        let plugin = plugin.clone();
        tasks.spawn(async move {
            if !forward_replies(&plugin, &line, print_reply).await {
                debug!("Ignoring non-command message {line:?}");
            }
        });
        reap_finished(&mut tasks);
    }

    while let Some(res) = tasks.join_next().await {
        report_task(res);
    }
    Ok(())
}

/// Drops completed message tasks without waiting for the running ones.
fn reap_finished(tasks: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(res) = tasks.try_join_next() {
        report_task(res);
        reaped += 1;
    }
    reaped
}

fn report_task(res: Result<(), JoinError>) {
    if let Err(e) = res {
        error!("Message task failed: {e}");
    }
}
