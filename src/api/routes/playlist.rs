//! Playlist download progress stream.
//!
//! The response body owns the job's [`EventChannel`]; when the client
//! disconnects axum drops the body, which cancels the job and kills yt-dlp.
//! Server shutdown ends the body the same way.

use crate::api::AppState;
use crate::progress::EventChannel;
use crate::types::UrlRequest;
use axum::{
    Json,
    extract::{Query, State},
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

/// POST /api/download/playlist - Download a playlist as audio, streaming progress
#[utoipa::path(
    post,
    path = "/api/download/playlist",
    tag = "playlist",
    request_body = crate::types::UrlRequest,
    responses(
        (status = 200, description = "Progress events (text/event-stream), one JSON `Event` per frame", content_type = "text/event-stream", body = crate::types::Event),
        (status = 400, description = "Missing URL or no playlist identifier"),
        (status = 500, description = "Job directory could not be created")
    )
)]
pub async fn stream_playlist(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Response {
    start_stream(&state, &request.url).await
}

/// GET /api/download/playlist - Same as the POST form, for `EventSource` clients
#[utoipa::path(
    get,
    path = "/api/download/playlist",
    tag = "playlist",
    params(crate::types::UrlRequest),
    responses(
        (status = 200, description = "Progress events (text/event-stream)", content_type = "text/event-stream", body = crate::types::Event),
        (status = 400, description = "Missing URL or no playlist identifier"),
        (status = 500, description = "Job directory could not be created")
    )
)]
pub async fn stream_playlist_query(
    State(state): State<AppState>,
    Query(request): Query<UrlRequest>,
) -> Response {
    start_stream(&state, &request.url).await
}

async fn start_stream(state: &AppState, url: &str) -> Response {
    match state.tools.stream_playlist(url).await {
        Ok(channel) => {
            tracing::info!(job_id = %channel.job_id(), %url, "streaming playlist progress");
            Sse::new(sse_frames(channel, state.shutdown.clone()))
                .keep_alive(KeepAlive::default())
                .into_response()
        }
        Err(e) => {
            tracing::warn!(%url, error = %e, "playlist request rejected");
            e.into_response()
        }
    }
}

/// One SSE frame per event: `event: <type>` and single-line JSON data
///
/// The stream ends early, dropping `channel`, once `shutdown` is cancelled.
fn sse_frames(
    channel: EventChannel,
    shutdown: CancellationToken,
) -> impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>> {
    let frames = channel.filter_map(|event| match serde_json::to_string(&event) {
        Ok(json_data) => Some(Ok(SseEvent::default().event(event.kind()).data(json_data))),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize progress event");
            None
        }
    });
    futures::StreamExt::take_until(frames, shutdown.cancelled_owned())
}
