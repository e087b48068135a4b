use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use vitrine_shared::protocol::{
    ConversationDto, MarkReadResponse, MessageDto, SendMessageRequest, UnreadCountResponse,
    UpsertUserRequest, UserRef,
};
use vitrine_shared::{MessageId, UserId};
use vitrine_store::{Database, Message, StoreError, User};

use crate::auth::AuthedUser;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::read_state;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", post(upsert_user))
        .route("/api/messages", get(list_conversations).post(send_message))
        .route("/api/messages/conversation/:peer_id", get(get_thread))
        .route("/api/messages/unread/count", get(unread_count))
        .route("/api/messages/:id/read", put(mark_read))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    instance: String,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        instance: state.config.instance_name.clone(),
    })
}

/// Identity provider sync.  Reachable only from the auth proxy, so it
/// carries no identity header of its own.
async fn upsert_user(
    State(state): State<AppState>,
    Json(req): Json<UpsertUserRequest>,
) -> Result<Json<UserRef>, ServerError> {
    let now = chrono::Utc::now();
    let user = User {
        id: req.id,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        profile_image_url: req.profile_image_url,
        role: req.role,
        created_at: now,
        updated_at: now,
    };

    let db = state.db.lock().await;
    let stored = db.upsert_user(&user)?;

    debug!(user = %stored.id, role = %stored.role, "directory record upserted");

    Ok(Json(user_ref(&stored)))
}

/// Conversation list for the caller, most recently active first.
async fn list_conversations(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
) -> Result<Json<Vec<ConversationDto>>, ServerError> {
    let db = state.db.lock().await;
    let messages = db.list_messages_for_user(user.id)?;
    let summaries = vitrine_store::aggregate_conversations(user.id, &messages);

    let mut conversations = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let peer = match db.get_user(summary.other_user) {
            Ok(peer) => peer,
            Err(StoreError::NotFound) => {
                // A message referencing a user the directory no longer
                // knows; skip the conversation rather than fail the list.
                warn!(peer = %summary.other_user, "peer missing from directory");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        conversations.push(ConversationDto {
            other_user: user_ref(&peer),
            last_message: message_dto(&summary.last_message),
            unread_count: summary.unread_count,
        });
    }

    Ok(Json(conversations))
}

/// Thread between the caller and a peer, oldest first.
///
/// Viewing is what marks incoming messages read (best-effort, after the
/// snapshot is taken, so the response reflects the pre-view state).
async fn get_thread(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(peer_id): Path<UserId>,
) -> Result<Json<Vec<MessageDto>>, ServerError> {
    let snapshot = {
        let db = state.db.lock().await;
        db.list_conversation(user.id, peer_id)?
    };

    let marked = read_state::mark_thread_read(&state.db, user.id, &snapshot).await;
    if marked > 0 {
        debug!(viewer = %user.id, peer = %peer_id, marked, "thread viewed");
    }

    Ok(Json(snapshot.iter().map(message_dto).collect()))
}

async fn send_message(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), ServerError> {
    let db = state.db.lock().await;
    let message = db.send_message(user.id, req.recipient_id, &req.body)?;

    info!(
        id = %message.id,
        sender = %message.sender_id,
        recipient = %message.recipient_id,
        "message sent"
    );

    Ok((StatusCode::CREATED, Json(message_dto(&message))))
}

async fn unread_count(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
) -> Result<Json<UnreadCountResponse>, ServerError> {
    let db = state.db.lock().await;
    let count = db.count_unread(user.id)?;
    Ok(Json(UnreadCountResponse { count }))
}

async fn mark_read(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<MessageId>,
) -> Result<Json<MarkReadResponse>, ServerError> {
    let db = state.db.lock().await;
    db.mark_message_read(id, user.id)?;
    Ok(Json(MarkReadResponse { marked: true }))
}

// ---------------------------------------------------------------------------
// DTO conversions
// ---------------------------------------------------------------------------

fn message_dto(m: &Message) -> MessageDto {
    MessageDto {
        id: m.id,
        sender_id: m.sender_id,
        recipient_id: m.recipient_id,
        body: m.body.clone(),
        is_read: m.is_read,
        created_at: m.created_at,
    }
}

fn user_ref(u: &User) -> UserRef {
    UserRef {
        id: u.id,
        email: u.email.clone(),
        first_name: u.first_name.clone(),
        last_name: u.last_name.clone(),
        profile_image_url: u.profile_image_url.clone(),
        role: u.role,
    }
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
