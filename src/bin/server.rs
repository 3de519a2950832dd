//! Real-time relay server for the tutoring platform.
//!
//! Carries direct chat, the moderated community channel, schedule proposals
//! and WebRTC signaling over one WebSocket endpoint.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server -- --auth-secret dev-secret
//! cargo run --bin server -- --host 0.0.0.0 --port 3000 --auth-secret dev-secret \
//!     --moderation-url http://localhost:9090/evaluate
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use morpheus_relay::{
    common::{logger::setup_logger, time::SystemClock},
    domain::ModerationGate,
    infrastructure::{
        auth::HmacTokenVerifier,
        calls::CallDirectory,
        moderation::{HttpModerationGate, PermissiveModerationGate},
        pusher::WebSocketEventPusher,
        registry::ConnectionRegistry,
        repository::{InMemoryMessageStore, InMemorySessionStore},
        router::RoomRouter,
    },
    ui::{Server, state::AppState},
    usecase::{
        CallUseCase, CommunityMessageUseCase, ConnectUseCase, DisconnectUseCase, JoinRoomUseCase,
        MarkReadUseCase, ScheduleUseCase, SendMessageUseCase, TypingUseCase,
    },
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Real-time tutoring relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Secret for verifying bearer tokens (shared with the account service)
    #[arg(long, env = "RELAY_AUTH_SECRET")]
    auth_secret: String,

    /// Moderation classifier endpoint; community messages are approved
    /// unchecked when omitted (development only)
    #[arg(long, env = "RELAY_MODERATION_URL")]
    moderation_url: Option<String>,

    /// Moderation timeout in milliseconds; a slower verdict rejects the message
    #[arg(long, default_value = "3000")]
    moderation_timeout_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Clock, stores and moderation gate
    // 2. Pusher, registry, router, call directory
    // 3. UseCases
    // 4. AppState
    // 5. Server

    let clock = Arc::new(SystemClock);
    let store = Arc::new(InMemoryMessageStore::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let gate: Arc<dyn ModerationGate> = match args.moderation_url {
        Some(url) => {
            tracing::info!("Moderation classifier: {}", url);
            Arc::new(HttpModerationGate::new(url))
        }
        None => {
            tracing::warn!("No moderation classifier configured; approving all community messages");
            Arc::new(PermissiveModerationGate)
        }
    };
    let verifier = Arc::new(HmacTokenVerifier::new(
        args.auth_secret.into_bytes(),
        clock.clone(),
    ));

    let pusher = Arc::new(WebSocketEventPusher::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let router = Arc::new(RoomRouter::new(pusher.clone()));
    let calls = Arc::new(CallDirectory::new());

    let connect_usecase = Arc::new(ConnectUseCase::new(
        verifier,
        registry.clone(),
        pusher.clone(),
    ));
    let join_usecase = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        router.clone(),
        store.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        router.clone(),
        store.clone(),
        clock.clone(),
    ));
    let mark_read_usecase = Arc::new(MarkReadUseCase::new(
        registry.clone(),
        router.clone(),
        store.clone(),
    ));
    let community_usecase = Arc::new(CommunityMessageUseCase::new(
        registry.clone(),
        router.clone(),
        store.clone(),
        pusher.clone(),
        gate,
        clock.clone(),
        Duration::from_millis(args.moderation_timeout_ms),
    ));
    let schedule_usecase = Arc::new(ScheduleUseCase::new(
        registry.clone(),
        router.clone(),
        store.clone(),
        clock.clone(),
    ));
    let call_usecase = Arc::new(CallUseCase::new(
        registry.clone(),
        router.clone(),
        pusher.clone(),
        calls,
        sessions,
        clock,
    ));
    let typing_usecase = Arc::new(TypingUseCase::new(registry.clone(), router.clone()));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(
        registry,
        router,
        pusher,
        call_usecase.clone(),
    ));

    let state = AppState {
        connect_usecase,
        disconnect_usecase,
        join_usecase,
        send_message_usecase,
        mark_read_usecase,
        community_usecase,
        schedule_usecase,
        call_usecase,
        typing_usecase,
        store,
    };

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
