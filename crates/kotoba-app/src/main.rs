use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use kotoba_app::replay::{ScriptedHost, parse_script, run_script, serve_canned_response};
use kotoba_app::{AppController, AppState, logging, profile};
use kotoba_core::{decode_stream, snapshot_from_text};
use kotoba_translator::{ChannelTransport, HttpTransport, Transport};
use tokio::signal;

#[derive(Parser)]
#[command(name = "kotoba", about = "Selection translation popup")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive the popup with a scripted page
    Replay {
        script: PathBuf,

        /// Serve this file as the translation response instead of calling the backend
        #[arg(long)]
        response: Option<PathBuf>,

        #[arg(long, default_value_t = 16)]
        chunk_size: usize,

        #[arg(long, default_value_t = 50)]
        chunk_delay_ms: u64,

        /// Keep running after the script ends so in-flight sessions can finish
        #[arg(long, default_value_t = 2000)]
        linger_ms: u64,
    },
    /// Translate text once, printing the final document
    Translate { text: String },
    /// Print the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.json_logs);

    let config = profile::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Config => {
            println!("{}", profile::dump_config(&config)?);
        }
        Command::Translate { text } => {
            let transport = HttpTransport::new(
                config.translator.api_url.clone(),
                config.translator.text_field.clone(),
            );
            translate_once(&transport, &text).await?;
        }
        Command::Replay {
            script,
            response,
            chunk_size,
            chunk_delay_ms,
            linger_ms,
        } => {
            let steps = parse_script(&std::fs::read_to_string(&script)?)?;

            let transport: Arc<dyn Transport> = match response {
                Some(path) => {
                    let body = std::fs::read(path)?;
                    let (transport, requests) = ChannelTransport::new(config.channel_capacity);
                    serve_canned_response(
                        requests,
                        body,
                        chunk_size,
                        Duration::from_millis(chunk_delay_ms),
                    );
                    Arc::new(transport)
                }
                None => Arc::new(HttpTransport::new(
                    config.translator.api_url.clone(),
                    config.translator.text_field.clone(),
                )),
            };

            let state = Arc::new(AppState::new(config));
            let controller = AppController::new(state).await;
            let host = Arc::new(ScriptedHost::new());
            let mut tasks = controller.spawn_tasks(host.clone(), transport).await;

            let events = controller.page_events();
            tokio::select! {
                result = run_script(steps, &host, &events) => {
                    result?;
                    tokio::time::sleep(Duration::from_millis(linger_ms)).await;
                }
                _ = signal::ctrl_c() => {
                    tracing::info!("Shutdown requested");
                }
            }

            controller.shutdown();
            while let Some(result) = tasks.join_next().await {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!("task exited: {e}"),
                    Err(e) => tracing::error!("task panicked: {e}"),
                }
            }
        }
    }

    Ok(())
}

async fn translate_once(transport: &dyn Transport, text: &str) -> anyhow::Result<()> {
    let mut stream = transport.translate(text).await?;

    let mut shown = 0;
    let result = decode_stream(stream.as_mut(), |_chunk, accumulated| {
        let snapshot = snapshot_from_text(accumulated);
        // A chunk is settled once the next one has started
        while shown + 1 < snapshot.chunks.len() {
            let chunk = &snapshot.chunks[shown];
            eprintln!(
                "{}: {}",
                chunk.text.as_deref().unwrap_or_default(),
                chunk.meaning.as_deref().unwrap_or_default()
            );
            shown += 1;
        }
    })
    .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
