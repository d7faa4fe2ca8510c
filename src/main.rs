use anyhow::{bail, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use signflow::notify::NoticeLevel;
use signflow::output::{ClipboardSink, LogSpeech, SystemClipboard};
use signflow::{ControllerConfig, SessionController, SessionState, UiEvent};

/// Stands in when no system clipboard is reachable (headless hosts).
struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn copy_text(&mut self, _text: &str) -> Result<()> {
        bail!("no system clipboard available")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("signflow starting up...");

    let config = ControllerConfig::from_env();
    info!("backend: {}", config.base_url);

    let clipboard: Box<dyn ClipboardSink> = match SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(err) => {
            warn!("{err:#}; copy will be unavailable");
            Box::new(NoClipboard)
        }
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let controller =
        SessionController::new(config, events_tx, clipboard, Box::new(LogSpeech::default()))?;

    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            render_event(&event);
        }
    });

    let shutdown = CancellationToken::new();
    {
        let controller = controller.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            controller.run_health_loop(shutdown).await;
        });
    }

    // First probe right away instead of waiting a full period.
    controller.check_health().await;

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "start" => {
                if let Err(err) = controller.start().await {
                    warn!("{err:#}");
                }
            }
            "stop" => {
                if let Err(err) = controller.stop().await {
                    warn!("{err:#}");
                }
            }
            "clear" => controller.clear_transcript().await,
            "copy" => controller.copy_transcript().await,
            "speak" => controller.speak_transcript().await,
            // hide/show simulate the hosting surface's visibility.
            "hide" => controller.surface_hidden().await,
            "show" => controller.surface_visible().await,
            "text" => println!("{}", controller.transcript().await),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command: {other}"),
        }
    }

    shutdown.cancel();
    if controller.session_state().await == SessionState::Running {
        let _ = controller.stop().await;
    }

    Ok(())
}

fn print_help() {
    println!("commands: start stop clear copy speak hide show text help quit");
}

fn render_event(event: &UiEvent) {
    match event {
        UiEvent::Connection { connected } => {
            println!(
                "[link] {}",
                if *connected { "connected" } else { "disconnected" }
            );
        }
        UiEvent::Camera { running } => {
            println!("[camera] {}", if *running { "running" } else { "stopped" });
        }
        UiEvent::Prediction { label, confidence } => {
            if label.is_empty() {
                println!("[prediction] no gesture detected");
            } else {
                println!("[prediction] {label} ({confidence:.1}%)");
            }
        }
        UiEvent::TranscriptAppended { transcript, .. } => {
            println!("[text] {transcript}");
        }
        UiEvent::TranscriptCleared => {
            println!("[text] (cleared)");
        }
        UiEvent::Notice(notice) => {
            let level = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Warning => "warn",
                NoticeLevel::Error => "error",
            };
            println!("[{level}] {}", notice.message);
        }
    }
}
