use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::clipboard::{create_service, ClipboardService, MemoryClipboard};
use crate::config::Config;
use crate::history::{classify, preview, ClipboardEntry, HistoryStore};
use crate::monitor::ClipboardMonitor;
use crate::sink::{JsonLinesSink, Publisher, Visibility};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ntarget: ",
    env!("TARGET"),
    "\nprofile: ",
    env!("PROFILE"),
    "\nrustc: ",
    env!("RUSTC_VERSION"),
    "\nbuilt: ",
    env!("BUILD_DATE")
);

#[derive(Parser)]
#[command(name = "edgeboard")]
#[command(about = "Clipboard history for the EdgeBoard overlay")]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Monitor the clipboard and stream history updates as JSON lines")]
    Watch {
        /// Start with the overlay hidden (no updates are streamed)
        #[arg(long)]
        hidden: bool,

        /// Read simulated clipboard copies from stdin instead of the system clipboard
        #[arg(long)]
        simulate: bool,

        /// Export the history to this JSON file on exit
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    #[command(about = "Print the content kind of TEXT")]
    Classify { text: String },

    #[command(about = "Print the overlay preview markup for TEXT")]
    Preview { text: String },

    #[command(about = "Copy text to clipboard")]
    Copy { text: String },

    #[command(about = "Get current clipboard content")]
    Paste,

    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Generate example configuration")]
    Init {
        #[arg(long)]
        force: bool,
    },

    #[command(about = "Validate configuration")]
    Validate,
}

pub struct CliHandler {
    config: Config,
}

impl CliHandler {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_config(config_path)?;
        Ok(Self { config })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Watch {
                hidden,
                simulate,
                export,
            } => self.watch(hidden, simulate, export).await,
            Commands::Classify { text } => {
                println!("{}", classify(&text));
                Ok(())
            }
            Commands::Preview { text } => {
                println!("{}", self.render_preview(&text));
                Ok(())
            }
            Commands::Copy { text } => self.copy_text(&text).await,
            Commands::Paste => self.paste_text().await,
            Commands::Config { action } => self.handle_config_action(action),
        }
    }

    /// Preview markup for `text` as if it had just been copied
    pub fn render_preview(&self, text: &str) -> String {
        let entry = ClipboardEntry::new(text, classify(text));
        preview(&entry, &self.config.preview)
    }

    /// Where an export requested as `path` ends up
    pub fn export_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.history.export_dir.join(path)
        }
    }

    async fn watch(&self, hidden: bool, simulate: bool, export: Option<PathBuf>) -> Result<()> {
        let simulated = simulate.then(|| Arc::new(MemoryClipboard::new()));
        let clipboard: Arc<dyn ClipboardService> = match &simulated {
            Some(memory) => memory.clone(),
            None => Arc::from(create_service()?),
        };

        let history = Arc::new(RwLock::new(HistoryStore::new(
            self.config.history.max_history,
        )));
        let publisher = Publisher::new(
            Arc::new(JsonLinesSink::new(std::io::stdout())),
            Visibility::new(!hidden),
            self.config.history.publish_limit,
            self.config.preview,
        );
        let monitor = ClipboardMonitor::new(
            clipboard,
            Arc::clone(&history),
            publisher,
            self.config.poller.clone(),
        );
        let handle = monitor.spawn();

        match simulated {
            Some(memory) => {
                tokio::select! {
                    result = feed_stdin(memory, self.config.poller.interval()) => result?,
                    result = tokio::signal::ctrl_c() => result?,
                }
            }
            None => tokio::signal::ctrl_c().await?,
        }

        info!("Shutting down");
        handle.shutdown().await?;

        let history = history.read().await;
        let stats = history.stats();
        info!(
            entries = stats.total_items,
            bytes = stats.total_bytes,
            "Clipboard history at exit"
        );

        if let Some(path) = export {
            let path = self.export_path(&path);
            history.export_to_path(&path)?;
            info!("Exported history to {}", path.display());
        }

        Ok(())
    }

    async fn copy_text(&self, text: &str) -> Result<()> {
        let clipboard = create_service()?;
        clipboard.write_text(text).await?;
        println!("Text copied to clipboard");
        Ok(())
    }

    async fn paste_text(&self) -> Result<()> {
        let clipboard = create_service()?;
        match clipboard.read_text().await {
            Ok(Some(text)) => println!("{}", text),
            Ok(None) => println!("Clipboard has no text content"),
            Err(e) => error!("Failed to get clipboard content: {}", e),
        }
        Ok(())
    }

    fn handle_config_action(&self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                println!("Current Configuration:");
                println!("{}", toml::to_string_pretty(&self.config)?);
            }
            ConfigAction::Init { force } => {
                let path = Config::generate_example_config(force)?;
                println!("Example configuration written to {}", path.display());
            }
            ConfigAction::Validate => {
                // Config is already loaded and validated in CliHandler::new()
                println!("Configuration is valid");
            }
        }
        Ok(())
    }
}

/// Treat every stdin line as a clipboard copy, one per poll interval
///
/// A literal `\n` in a line is turned into a newline so multi-line content can
/// be simulated.
async fn feed_stdin(clipboard: Arc<MemoryClipboard>, interval: Duration) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        clipboard.copy(line.replace("\\n", "\n"));
        tokio::time::sleep(interval).await;
    }

    // Give the monitor one more poll to pick up the last line
    tokio::time::sleep(interval).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_long_version_includes_build_info() {
        let version = Cli::command().render_long_version();
        assert!(version.contains(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(&format!("target: {}", env!("TARGET"))));
        assert!(version.contains("rustc: "));
        assert!(version.contains(&format!("built: {}", env!("BUILD_DATE"))));
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["edgeboard", "watch", "--simulate"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watch {
                hidden: false,
                simulate: true,
                export: None
            }
        ));

        let cli = Cli::try_parse_from(["edgeboard", "-v", "classify", "import os"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Classify { ref text } if text == "import os"));

        let cli = Cli::try_parse_from(["edgeboard", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn test_render_preview() {
        let handler = CliHandler::with_config(Config::default());
        assert_eq!(handler.render_preview("hello"), "<span>hello</span>");
        assert!(handler
            .render_preview("https://example.com")
            .starts_with("<a href="));
    }

    #[test]
    fn test_export_path() {
        let mut config = Config::default();
        config.history.export_dir = PathBuf::from("/tmp/exports");
        let handler = CliHandler::with_config(config);

        assert_eq!(
            handler.export_path(Path::new("history.json")),
            PathBuf::from("/tmp/exports/history.json")
        );
        assert_eq!(
            handler.export_path(Path::new("/var/out.json")),
            PathBuf::from("/var/out.json")
        );
    }

    #[tokio::test]
    async fn test_config_commands() {
        let handler = CliHandler::with_config(Config::default());
        handler
            .handle_command(Commands::Config {
                action: ConfigAction::Show,
            })
            .await
            .unwrap();
        handler
            .handle_command(Commands::Classify {
                text: "a/b.c".to_string(),
            })
            .await
            .unwrap();
    }
}
