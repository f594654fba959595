use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;

use nexus_gateway::stories::{Playback, PlaybackState, StoryEntry};

#[derive(Parser)]
#[command(name = "nexus-cli")]
#[command(about = "Management CLI for the Nexus gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "NEXUS_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Inspect breaker, caches and in-flight calls
    Gateway,
    /// List an owner's active stories
    Stories {
        owner: String,
        /// Play the stories in the terminal
        #[arg(long)]
        play: bool,
        /// Playback tick in milliseconds
        #[arg(long, default_value_t = 50)]
        tick_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Gateway => {
            let res = client
                .get(format!("{}/admin/gateway", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Stories {
            owner,
            play,
            tick_ms,
        } => {
            let res = client
                .get(format!("{}/stories/{}", cli.url, owner))
                .send()
                .await?;
            if !play {
                print_response(res).await?;
                return Ok(());
            }
            let stories: Vec<StoryEntry> = res.error_for_status()?.json().await?;
            play_stories(stories, tick_ms).await;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn play_stories(stories: Vec<StoryEntry>, tick_ms: u64) {
    let mut playback = Playback::new(tick_ms);
    if playback.open(stories, 0) == PlaybackState::Closed {
        println!("No active stories.");
        return;
    }

    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    let mut shown: Option<usize> = None;
    loop {
        let index = match playback.state() {
            PlaybackState::Viewing { index } => index,
            PlaybackState::Closed => break,
        };
        if shown != Some(index) {
            if let Some(story) = playback.current() {
                let text = story.text.as_deref().unwrap_or("");
                let image = if story.image.is_some() { " [image]" } else { "" };
                println!("[{}] {}: {}{}", index + 1, story.author_name, text, image);
            }
            shown = Some(index);
        }
        interval.tick().await;
        playback.tick();
    }
}
