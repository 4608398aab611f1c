use std::{
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::Arc,
};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::Local;
use image::ImageFormat;
use log::{debug, info, warn};
use reqwest::{Client, header};
use uuid::Uuid;

use crate::{
    config::Config,
    error::DrawError,
    image_client::api::{GenerationRequest, ImageSource},
};

pub mod api;

/// Outcome of one generation request. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub success: bool,
    pub image_paths: Vec<PathBuf>,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn from_paths(image_paths: Vec<PathBuf>) -> Self {
        if image_paths.is_empty() {
            return Self {
                success: false,
                image_paths,
                error: Some("API response contained no usable images".into()),
            };
        }

        Self {
            success: true,
            image_paths,
            error: None,
        }
    }

    pub fn failure(error: &DrawError) -> Self {
        Self {
            success: false,
            image_paths: vec![],
            error: Some(error.to_string()),
        }
    }
}

pub trait ImageGenerator {
    /// Must not fail: every error is reported through [`GenerationResult::error`].
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        count: u8,
        size: &'a str,
    ) -> Pin<Box<dyn Future<Output = GenerationResult> + Send + 'a>>;
}

#[derive(Clone)]
pub struct ImageGenerationClient {
    config: Arc<Config>,
    client: Client,
}

impl ImageGenerationClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn try_generate(
        &self,
        prompt: &str,
        count: u8,
        size: &str,
    ) -> Result<Vec<PathBuf>, DrawError> {
        let body = self.request_generation(prompt, count, size).await?;
        let items = api::image_items(&body)?;

        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| DrawError::persist(output_dir, e))?;

        let mut paths = vec![];
        for (index, item) in items.into_iter().enumerate() {
            let bytes = match ImageSource::from_item(item) {
                Some(ImageSource::Inline(data)) => BASE64
                    .decode(data.trim())
                    .map_err(|e| DrawError::ImagePersist(format!("invalid base64 data: {e}")))?,
                Some(ImageSource::Remote(url)) => self.fetch(&url).await?,
                None => {
                    warn!("Skipping image item {} without data or url", index + 1);
                    continue;
                }
            };

            let path = save_png(bytes, output_dir.join(image_file_name(index))).await?;
            info!("Saved generated image to {}", path.display());
            paths.push(path);
        }

        Ok(paths)
    }

    async fn request_generation(
        &self,
        prompt: &str,
        count: u8,
        size: &str,
    ) -> Result<String, DrawError> {
        let payload = GenerationRequest {
            model: &self.config.model,
            prompt,
            n: count,
            size,
        };
        debug!("Generation request to {}: {payload:?}", self.config.api_url);

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            debug!("Backend answered {status}: {body}");
            return Err(DrawError::http_status(status, &body));
        }

        Ok(body)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DrawError> {
        debug!("Downloading image from {url}");
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

impl ImageGenerator for ImageGenerationClient {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        count: u8,
        size: &'a str,
    ) -> Pin<Box<dyn Future<Output = GenerationResult> + Send + 'a>> {
        Box::pin(async move {
            match self.try_generate(prompt, count, size).await {
                Ok(paths) => GenerationResult::from_paths(paths),
                Err(e) => {
                    warn!("Image generation failed ({}): {e}", e.kind());
                    GenerationResult::failure(&e)
                }
            }
        })
    }
}

/// `<YYYYMMDD_HHMMSS>_<8 char id>_<index + 1>.png`
pub fn image_file_name(index: usize) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let id = Uuid::new_v4().simple().to_string();
    format!("{timestamp}_{}_{}.png", &id[..8], index + 1)
}

/// Decodes whatever format the backend sent and re-encodes it as PNG.
async fn save_png(bytes: Vec<u8>, path: PathBuf) -> Result<PathBuf, DrawError> {
    tokio::task::spawn_blocking(move || write_png(&bytes, &path).map(|()| path))
        .await
        .map_err(|e| DrawError::ImagePersist(format!("image task failed: {e}")))?
}

fn write_png(bytes: &[u8], path: &Path) -> Result<(), DrawError> {
    let img = image::load_from_memory(bytes).map_err(|e| DrawError::persist(path, e))?;
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| DrawError::persist(path, e))
}
