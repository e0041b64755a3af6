//! gambit-back binary entrypoint wiring the session core to a local
//! line-oriented transport.
//!
//! The production chat transport and board renderer are external
//! collaborators; this binary reads `<sender>: <text>` lines from stdin and
//! prints replies to stdout, which is enough to drive every command and game
//! flow during development.

use std::sync::Arc;

use anyhow::Context;
use futures::{FutureExt, future::BoxFuture, future::ready};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gambit_back::{
    config::AppConfig,
    dao::{
        puzzles::{self, DailyPuzzleSource},
        rating_store::{RatingStore, json_file::JsonFileRatingStore},
    },
    dto::{
        message::{ChannelId, InboundMessage},
        reply::OutboundMessage,
    },
    engine::shakmaty::ShakmatyRules,
    services::{
        dispatch,
        outbound::{BoardRenderer, ChatOutbound, RenderError, TransportError},
        sweeper,
    },
    state::{AppState, SharedState, puzzles::PuzzleCatalog, ratings::RatingLedger, session::ParticipantId},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let catalog = match &config.puzzles_path {
        Some(path) => match puzzles::file::load_catalog(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(error = %err, "failed to load puzzle corpus; starting with an empty catalog");
                PuzzleCatalog::empty()
            }
        },
        None => {
            info!("no puzzle corpus configured; the `puzzle` command will report an empty catalog");
            PuzzleCatalog::empty()
        }
    };

    let store = Arc::new(JsonFileRatingStore::new(config.ratings_path.clone()));
    let ratings = match store.load().await {
        Ok(Some(snapshot)) => {
            let records = snapshot.into_records();
            info!(count = records.len(), "loaded rating snapshot");
            RatingLedger::with_records(store, records)
        }
        Ok(None) => {
            info!("no rating snapshot found; starting with an empty ledger");
            RatingLedger::new(store)
        }
        Err(err) => {
            warn!(error = %err, "failed to load rating snapshot; starting with an empty ledger");
            RatingLedger::new(store)
        }
    };

    let daily = daily_source();

    let state = AppState::new(
        config,
        Arc::new(ShakmatyRules),
        catalog,
        daily,
        Arc::new(NoRenderer),
        Arc::new(StdoutTransport),
        ratings,
    );

    tokio::spawn(sweeper::run(state.clone()));

    info!("ready; type `<sender>: <text>`, e.g. `alice: start @bob` or `alice: e4`");
    tokio::select! {
        result = run_console(state) => result,
        _ = shutdown_signal() => {
            info!("shutting down");
            Ok(())
        }
    }
}

#[cfg(feature = "daily-puzzle")]
fn daily_source() -> Option<Arc<dyn DailyPuzzleSource>> {
    Some(Arc::new(puzzles::lichess::LichessDailySource::new()))
}

#[cfg(not(feature = "daily-puzzle"))]
fn daily_source() -> Option<Arc<dyn DailyPuzzleSource>> {
    None
}

/// Feed stdin lines through the orchestrator until EOF.
async fn run_console(state: SharedState) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let Some(message) = parse_line(&line) else {
            continue;
        };
        dispatch::handle_message(&state, message).await;
    }
    Ok(())
}

/// Parse `<sender>: <text>` into an inbound message; `@name` tokens in the
/// text become mentions, the way a chat transport would resolve them.
fn parse_line(line: &str) -> Option<InboundMessage> {
    let (sender, text) = line.split_once(':')?;
    let sender = sender.trim();
    let text = text.trim();
    if sender.is_empty() || text.is_empty() {
        return None;
    }

    let mentions = text
        .split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .map(ParticipantId::from)
        .collect();

    Some(InboundMessage {
        channel: ChannelId::new("console"),
        sender: ParticipantId::from(sender),
        text: text.to_string(),
        mentions,
    })
}

/// Transport that prints replies to stdout.
struct StdoutTransport;

impl ChatOutbound for StdoutTransport {
    fn send(
        &self,
        channel: &ChannelId,
        message: OutboundMessage,
    ) -> BoxFuture<'static, Result<(), TransportError>> {
        match &message.attachment {
            Some(image) => println!(
                "[{channel}] {} (+ {} bytes of {})",
                message.text,
                image.bytes.len(),
                image.file_name
            ),
            None => println!("[{channel}] {}", message.text),
        }
        ready(Ok(())).boxed()
    }
}

/// Board images come from an external renderer; locally the notify path
/// falls back to printing the FEN.
struct NoRenderer;

impl BoardRenderer for NoRenderer {
    fn render(&self, _fen: &str) -> BoxFuture<'static, Result<Vec<u8>, RenderError>> {
        ready(Err(RenderError::Unavailable)).boxed()
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
