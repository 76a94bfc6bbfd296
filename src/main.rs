use std::fs::File;
use std::path::PathBuf;

use bubbles::core::config::{self, CliOverrides};
use bubbles::core::transcript::{self, Transcript};
use bubbles::tui;
use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "bubbles", about = "Message bubble viewer with swipe-to-reply")]
struct Args {
    /// Conversation transcript (JSON). Defaults to a built-in sample.
    #[arg(short, long)]
    transcript: Option<PathBuf>,

    /// Treat the conversation as a group chat (shows sender avatars)
    #[arg(short, long)]
    group: bool,

    /// Reply swipe commit distance in pixels
    #[arg(long, value_name = "PX")]
    reply_threshold: Option<f32>,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to bubbles.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("bubbles.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        warn!("Falling back to default config: {}", e);
        config::BubblesConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        CliOverrides {
            reply_threshold: args.reply_threshold,
            group_chat: args.group,
        },
    );

    let transcript = match &args.transcript {
        Some(path) => match transcript::load_transcript(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Could not load {}: {}", path.display(), e);
                return Err(std::io::Error::other(e));
            }
        },
        None => transcript::sample_transcript(),
    };
    log_startup(&transcript);

    tui::run(resolved, transcript)
}

fn log_startup(transcript: &Transcript) {
    info!(
        "Bubbles starting up with {} messages (group chat: {})",
        transcript.messages.len(),
        transcript.group_chat
    );
}
