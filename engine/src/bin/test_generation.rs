use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use draw_engine::{
    Config, ImageGenerationClient, ImageGenerator,
    config::{FALLBACK_API_URL, FALLBACK_MODEL, FALLBACK_OUTPUT_DIR},
    parser::DEFAULT_SIZE,
};

#[derive(clap::Parser)]
struct Arg {
    key: String,
    prompt: String,

    #[arg(long, default_value = FALLBACK_API_URL)]
    url: String,

    #[arg(long, default_value = FALLBACK_MODEL)]
    model: String,

    #[arg(long, default_value = DEFAULT_SIZE)]
    size: String,

    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    n: u8,

    #[arg(short, long, default_value = FALLBACK_OUTPUT_DIR)]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let Arg {
        key,
        prompt,
        url,
        model,
        size,
        n,
        output_dir,
    } = Arg::parse();

    let client = ImageGenerationClient::new(Arc::new(Config {
        api_url: url,
        api_key: key,
        model,
        output_dir,
    }));

    let result = client.generate(&prompt, n, &size).await;
    if !result.success {
        return Err(eyre!(result.error.unwrap_or_default()));
    }

    for path in result.image_paths {
        println!("Saved {}", path.display());
    }

    Ok(())
}
