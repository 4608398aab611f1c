//! Routes `/draw` and `/draw_help` messages and turns them into replies.

use std::{path::PathBuf, pin::Pin, sync::Arc};

use async_stream::stream;
use indoc::indoc;
use log::{debug, info};
use strum::{Display, EnumIter, EnumString};
use tokio_stream::Stream;

use crate::{
    config::Config,
    image_client::{ImageGenerationClient, ImageGenerator},
    parser,
};

pub const USAGE_HINT: &str = "请提供图像描述，例如：/draw 一只可爱的猫";

pub const HELP_TEXT: &str = indoc! {"
    绘图插件使用帮助:
    /draw [描述] - 生成图像
      可选参数:
      --size small - 生成512x512的图像
      --size large - 生成1024x1024的图像(默认)
      --size 宽x高 - 生成自定义尺寸的图像
      --n 数量 - 生成指定数量的图像(1-4)

    示例:
    /draw 一只可爱的猫
    /draw 一座山脉风景 --size small
    /draw 科幻城市 --size 768x512 --n 2

    /draw_help - 显示此帮助信息"};

/// A message handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Image { caption: String, path: PathBuf },
}

pub type ReplyStream<'a> = Pin<Box<dyn Stream<Item = Reply> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Draw,
    DrawHelp,
}

impl Command {
    /// Reads the command name from the first token of a message, `/` optional.
    pub fn from_message(raw: &str) -> Option<Self> {
        let token = raw.split_whitespace().next()?;
        token.strip_prefix('/').unwrap_or(token).parse().ok()
    }
}

pub struct DrawPlugin {
    generator: Arc<dyn ImageGenerator + Send + Sync>,
}

impl DrawPlugin {
    pub fn new(config: Config) -> Self {
        Self::with_generator(Arc::new(ImageGenerationClient::new(Arc::new(config))))
    }

    pub fn with_generator(generator: Arc<dyn ImageGenerator + Send + Sync>) -> Self {
        Self { generator }
    }

    /// `None` if the message isn't one of our commands.
    pub fn handle<'a>(&'a self, raw: &'a str) -> Option<ReplyStream<'a>> {
        let command = Command::from_message(raw)?;
        debug!("Dispatching {command} for {raw:?}");
        Some(self.run(command, raw))
    }

    pub fn run<'a>(&'a self, command: Command, raw: &'a str) -> ReplyStream<'a> {
        match command {
            Command::Draw => Box::pin(self.draw(raw)),
            Command::DrawHelp => Box::pin(tokio_stream::once(Reply::Text(HELP_TEXT.into()))),
        }
    }

    fn draw<'a>(&'a self, raw: &'a str) -> impl Stream<Item = Reply> + Send + 'a {
        stream! {
            let cmd = match parser::parse(raw) {
                Ok(cmd) => cmd,
                Err(e) => {
                    debug!("Rejected draw command {raw:?}: {e}");
                    yield Reply::Text(USAGE_HINT.into());
                    return;
                }
            };

            info!("Generating {} image(s) of size {} for {:?}", cmd.count, cmd.size, cmd.prompt);
            yield Reply::Text(format!("正在生成图像: '{}'，请稍候...", cmd.prompt));

            let result = self.generator.generate(&cmd.prompt, cmd.count, &cmd.size).await;
            if result.success {
                for path in result.image_paths {
                    yield Reply::Image {
                        caption: format!("生成的图像 - '{}'", cmd.prompt),
                        path,
                    };
                }
            } else {
                yield Reply::Text(format!("图像生成失败: {}", result.error.unwrap_or_default()));
            }
        }
    }

    pub fn terminate(&self) {
        info!("Draw plugin unloaded");
    }
}

#[cfg(test)]
mod tests {
    use std::{future::Future, sync::Mutex};

    use expect_test::expect;
    use strum::IntoEnumIterator;
    use tokio_stream::StreamExt;

    use super::*;
    use crate::image_client::GenerationResult;

    struct FakeGenerator {
        result: GenerationResult,
        calls: Mutex<Vec<(String, u8, String)>>,
    }

    impl FakeGenerator {
        fn new(result: GenerationResult) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: Mutex::new(vec![]),
            })
        }
    }

    impl ImageGenerator for FakeGenerator {
        fn generate<'a>(
            &'a self,
            prompt: &'a str,
            count: u8,
            size: &'a str,
        ) -> Pin<Box<dyn Future<Output = GenerationResult> + Send + 'a>> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.into(), count, size.into()));
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    fn plugin(generator: Arc<FakeGenerator>) -> DrawPlugin {
        DrawPlugin::with_generator(generator)
    }

    async fn replies(plugin: &DrawPlugin, raw: &str) -> Vec<Reply> {
        plugin.handle(raw).unwrap().collect().await
    }

    #[test]
    fn command_names() {
        assert_eq!(Command::from_message("/draw a cat"), Some(Command::Draw));
        assert_eq!(Command::from_message("draw_help"), Some(Command::DrawHelp));
        assert_eq!(Command::from_message("/drawing"), None);
        assert_eq!(Command::from_message("   "), None);
        let names: Vec<String> = Command::iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["draw", "draw_help"]);
    }

    #[test]
    fn help_text_is_literal() {
        expect![[r#"
            绘图插件使用帮助:
            /draw [描述] - 生成图像
              可选参数:
              --size small - 生成512x512的图像
              --size large - 生成1024x1024的图像(默认)
              --size 宽x高 - 生成自定义尺寸的图像
              --n 数量 - 生成指定数量的图像(1-4)

            示例:
            /draw 一只可爱的猫
            /draw 一座山脉风景 --size small
            /draw 科幻城市 --size 768x512 --n 2

            /draw_help - 显示此帮助信息"#]]
        .assert_eq(HELP_TEXT);
    }

    #[tokio::test]
    async fn help_ignores_arguments() {
        let fake = FakeGenerator::new(GenerationResult::default());
        let plugin = plugin(fake.clone());
        for raw in ["/draw_help", "/draw_help --n 3 whatever"] {
            assert_eq!(
                replies(&plugin, raw).await,
                vec![Reply::Text(HELP_TEXT.into())]
            );
        }
        assert!(fake.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_prompt_gets_usage_hint() {
        let fake = FakeGenerator::new(GenerationResult::default());
        let plugin = plugin(fake.clone());
        assert_eq!(
            replies(&plugin, "/draw   ").await,
            vec![Reply::Text(USAGE_HINT.into())]
        );
        assert!(fake.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_draw_replies_per_image() {
        let fake = FakeGenerator::new(GenerationResult::from_paths(vec![
            "out/a_1.png".into(),
            "out/a_2.png".into(),
        ]));
        let plugin = plugin(fake.clone());

        let replies = replies(&plugin, "/draw a cute cat --size small --n 2").await;

        assert_eq!(
            replies,
            vec![
                Reply::Text("正在生成图像: 'a cute cat'，请稍候...".into()),
                Reply::Image {
                    caption: "生成的图像 - 'a cute cat'".into(),
                    path: "out/a_1.png".into(),
                },
                Reply::Image {
                    caption: "生成的图像 - 'a cute cat'".into(),
                    path: "out/a_2.png".into(),
                },
            ]
        );
        assert_eq!(
            *fake.calls.lock().unwrap(),
            vec![("a cute cat".to_string(), 2, "512x512".to_string())]
        );
    }

    #[tokio::test]
    async fn failed_draw_replies_with_error() {
        let fake = FakeGenerator::new(GenerationResult {
            success: false,
            image_paths: vec![],
            error: Some("API request failed (status code: 500 Internal Server Error): x".into()),
        });
        let plugin = plugin(fake);

        let replies = replies(&plugin, "/draw mountains").await;

        assert_eq!(replies.len(), 2);
        assert_eq!(
            replies[1],
            Reply::Text(
                "图像生成失败: API request failed (status code: 500 Internal Server Error): x"
                    .into()
            )
        );
    }

    #[test]
    fn unknown_commands_are_not_handled() {
        let plugin = plugin(FakeGenerator::new(GenerationResult::default()));
        assert!(plugin.handle("/paint a cat").is_none());
        assert!(plugin.handle("").is_none());
    }
}
