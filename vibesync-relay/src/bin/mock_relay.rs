//! mock-relay - Demo status stream for dashboard development
//!
//! Serves the same `/events` SSE stream as the real relay, but with canned
//! statuses that alternate between VIBE_MISMATCH and SYNCED on a fixed
//! interval. No classifier or upstream producer is needed.

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;
use vibesync_common::events::{
    CalendarEvent, MusicContext, Severity, SongRecommendation, StatusBus, VibeStatus,
};

/// Command-line arguments for mock-relay
#[derive(Parser, Debug)]
#[command(name = "mock-relay")]
#[command(about = "Alternates canned VibeSync statuses for dashboard development")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3002", env = "VIBESYNC_MOCK_PORT")]
    port: u16,

    /// Seconds between status flips
    #[arg(short, long, default_value = "60")]
    interval: u64,
}

fn recommendation(title: &str, artist: &str, reason: &str) -> SongRecommendation {
    SongRecommendation {
        title: title.to_string(),
        artist: artist.to_string(),
        reason: reason.to_string(),
    }
}

fn mismatch_status() -> VibeStatus {
    let now = chrono::Utc::now();
    VibeStatus::Mismatch {
        severity: Severity::Medium,
        compatibility_score: 38,
        music_mood: "High-energy, aggressive hip-hop with heavy bass".to_string(),
        task_intent: "Deep focus study session requiring concentration".to_string(),
        transition_suggestion: Some(
            "Try switching to lo-fi or ambient music to match your upcoming study session. \
             Instrumental tracks can help maintain focus without lyrical distraction."
                .to_string(),
        ),
        song_recommendations: vec![
            recommendation(
                "Weightless",
                "Marconi Union",
                "Scientifically designed to reduce anxiety and aid focus",
            ),
            recommendation(
                "Gymnopédie No.1",
                "Erik Satie",
                "Gentle classical piano ideal for deep concentration",
            ),
            recommendation(
                "Intro",
                "The xx",
                "Minimal, atmospheric instrumental to ease into study mode",
            ),
        ],
        next_event: CalendarEvent {
            summary: "CS 531 Final Exam Study Group".to_string(),
            description: "Review algorithms and data structures for the final".to_string(),
            start_time: (now + chrono::Duration::minutes(25)).to_rfc3339(),
            minutes_until: 25,
            location: "Perkins Library Room 217".to_string(),
        },
        now_playing: Some(MusicContext {
            name: "HUMBLE.".to_string(),
            artist: "Kendrick Lamar".to_string(),
            album: "DAMN.".to_string(),
            album_art_url: Some(
                "https://i.scdn.co/image/ab67616d0000b2738b52c6b9bc4e43d873869699".to_string(),
            ),
            artist_genres: vec![
                "conscious hip hop".to_string(),
                "hip hop".to_string(),
                "rap".to_string(),
                "west coast rap".to_string(),
            ],
            popularity: 88,
            audio_features: None,
        }),
        timestamp: now,
    }
}

fn synced_status() -> VibeStatus {
    VibeStatus::Synced {
        compatibility_score: 85,
        music_mood: "Calm, atmospheric lo-fi with mellow beats".to_string(),
        task_intent: "Light reading and note review".to_string(),
        song_recommendations: vec![
            recommendation(
                "Coffee",
                "beabadoobee",
                "Relaxed indie vibes that complement light study",
            ),
            recommendation(
                "Electric Feel",
                "MGMT",
                "Upbeat but not distracting, great background energy",
            ),
        ],
        now_playing: Some(MusicContext {
            name: "Snowman".to_string(),
            artist: "WYS".to_string(),
            album: "Snowman".to_string(),
            album_art_url: Some(
                "https://i.scdn.co/image/ab67616d0000b273b36949bee43217a4b6c5627c".to_string(),
            ),
            artist_genres: vec!["lo-fi beats".to_string(), "chillhop".to_string()],
            popularity: 62,
            audio_features: None,
        }),
        timestamp: chrono::Utc::now(),
    }
}

async fn event_stream(
    State(bus): State<StatusBus>,
) -> axum::response::sse::Sse<
    impl futures::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>,
> {
    vibesync_common::sse::create_status_sse_stream(&bus, "mock-relay").await
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "module": "mock-relay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let bus = StatusBus::with_initial(16, mismatch_status());

    let ticker_bus = bus.clone();
    let interval = Duration::from_secs(args.interval.max(1));
    tokio::spawn(async move {
        let mut use_mismatch = true;
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            use_mismatch = !use_mismatch;
            let status = if use_mismatch {
                mismatch_status()
            } else {
                synced_status()
            };
            info!("Sending {} state", status.kind());
            ticker_bus.publish(status).await;
        }
    });

    let app = Router::new()
        .route("/events", get(event_stream))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(bus);

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Mock relay running on http://{}", addr);
    info!(
        "Alternates between VIBE_MISMATCH and SYNCED every {}s",
        interval.as_secs()
    );

    axum::serve(listener, app).await?;
    Ok(())
}
