pub mod config;
pub mod error;
pub mod handler;
pub mod image_client;
pub mod parser;

pub use config::{Config, ConfigLoader};
pub use error::{DrawError, ErrorKind};
pub use handler::{Command, DrawPlugin, Reply, ReplyStream};
pub use image_client::{GenerationResult, ImageGenerationClient, ImageGenerator};
pub use parser::ParsedCommand;

pub struct PluginMetadata {
    pub name: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

pub const METADATA: PluginMetadata = PluginMetadata {
    name: "draw-md",
    author: "xiaohan",
    description: "Generates images from chat commands through the ModelScope image API",
    version: "v1.5",
};
