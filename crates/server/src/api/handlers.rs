use crate::config::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
};
use baas_sdk::API_KEY_HEADER;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use super::ApiResult;

/// Open an SSE stream and the session behind it.
///
/// The first event tells the client where to post its messages. A
/// `x-meeting-baas-api-key` header replaces the configured key for this
/// connection.
pub async fn sse(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let server = state.factory.build(api_key)?;

    let (session_id, rx) = state.sessions.open(server);
    let guard = state.sessions.guard(session_id);
    tracing::info!(
        session_id = %session_id,
        own_credentials = api_key.is_some(),
        "SSE session opened"
    );

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/message?sessionId={session_id}"));

    let messages = ReceiverStream::new(rx).map(move |message| {
        // The stream owns the guard; dropping the stream closes the session.
        let _session = &guard;
        Ok(Event::default().event("message").data(message))
    });

    let stream = stream::once(async move { Ok(endpoint) }).chain(messages);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Accept one JSON-RPC message for a session. The response is delivered on
/// the session's event stream.
pub async fn message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let Some(session_id) = query
        .session_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id).ok())
    else {
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };

    let Some(session) = state.sessions.get(&session_id) else {
        tracing::debug!(session_id = %session_id, "Message for unknown session");
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };

    let message = String::from_utf8_lossy(&body).into_owned();
    tokio::spawn(async move {
        if let Some(response) = session.server.handle_message(&message).await {
            if session.outbound.send(response).await.is_err() {
                tracing::debug!(session_id = %session_id, "Session closed before response was sent");
            }
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
