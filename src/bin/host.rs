//! Headless host binary for the voice assistant.
//!
//! Opens a voice session for the configured video and writes
//! `AssistantEvent` messages to stdout as newline-delimited JSON until
//! interrupted. All tracing/diagnostic output goes to stderr so that
//! stdout remains a clean event channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use cutscene::assistant::{ASSISTANT_EVENT_CAPACITY, TRANSPORT_EVENT_CAPACITY};
use cutscene::auth::fetch_access_token;
use cutscene::context::ContextInjector;
use cutscene::{
    Assistant, AssistantConfig, AssistantEvent, ConnectRequest, LiveMediaBackends,
    RealtimeVoiceClient, SessionController, SharedSession, ToolRouter, VideoContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the event
    // stream).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("cutscene-host starting");

    run().await.map_err(|e| {
        tracing::error!(error = %e, "cutscene-host exited with error");
        e
    })?;

    tracing::info!("cutscene-host shut down cleanly");
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let mut config = load_config()?;
    config.resolve_media_secrets()?;
    config.validate()?;

    let access_token = fetch_access_token(&config.voice).await?;
    tracing::info!("access token obtained");

    let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_EVENT_CAPACITY);
    let (event_tx, event_rx) = broadcast::channel(ASSISTANT_EVENT_CAPACITY);

    let transport = Arc::new(RealtimeVoiceClient::new(
        config.voice.endpoint_url.clone(),
        transport_tx,
    ));
    let session = SharedSession::new();
    let injector = ContextInjector::new(
        session.clone(),
        transport.clone(),
        Duration::from_millis(config.context.inject_delay_ms),
    );
    let controller = Arc::new(SessionController::new(
        session,
        transport.clone(),
        event_tx.clone(),
        injector,
        config.context.inline,
    ));
    let backends = Arc::new(LiveMediaBackends::new(&config.media)?);
    let router = ToolRouter::new(backends, event_tx.clone());
    let assistant = Assistant::new(controller.clone(), router, transport, event_tx);

    let forwarder = tokio::spawn(forward_events(event_rx));
    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    let run_loop = tokio::spawn(async move {
        assistant.run(transport_rx, loop_cancel).await;
    });

    controller
        .connect(ConnectRequest {
            access_token,
            config_id: config.voice.config_id.clone(),
            video: configured_video(&config),
            chat_session_id: config.context.session_id.clone(),
        })
        .await?;
    tracing::info!("voice session open");

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, disconnecting");

    controller.disconnect().await?;
    cancel.cancel();
    let _ = run_loop.await;
    forwarder.abort();
    let _ = forwarder.await;

    Ok(())
}

/// Configuration from `CUTSCENE_CONFIG` when set, otherwise the default
/// path (falling back to defaults when no file exists).
fn load_config() -> anyhow::Result<AssistantConfig> {
    match std::env::var("CUTSCENE_CONFIG") {
        Ok(path) => {
            tracing::info!(%path, "loading configuration");
            Ok(AssistantConfig::from_file(std::path::Path::new(&path))?)
        }
        Err(_) => Ok(AssistantConfig::load_default()?),
    }
}

/// The video described in the configuration, when one is set.
fn configured_video(config: &AssistantConfig) -> Option<VideoContext> {
    let video_no = config
        .context
        .video_no
        .clone()
        .filter(|v| !v.trim().is_empty())?;
    Some(VideoContext {
        video_no,
        video_url: config
            .context
            .video_url
            .clone()
            .filter(|u| !u.trim().is_empty()),
    })
}

/// Forwards published events to stdout as JSON lines.
async fn forward_events(mut events: broadcast::Receiver<AssistantEvent>) {
    let mut writer = BufWriter::new(tokio::io::stdout());
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    if let Err(e) = write_line(&mut writer, &json).await {
                        tracing::warn!(error = %e, "failed to write event to stdout; stopping");
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize event; skipping");
                }
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "event forwarder lagged; some events were dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn write_line(
    writer: &mut BufWriter<tokio::io::Stdout>,
    json: &str,
) -> std::io::Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
