//! services/app/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every mutation handler answers with the snapshot that results from it.

use crate::jobs::JobStatus;
use crate::web::state::ServerState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use summarizer_core::{
    handoff::{handoff_url, is_video_page, Handoff},
    PortError, SelectionError, Store, SummaryDraft, SummaryPatch, SummaryRequest, YouTubeVideo,
};
use tracing::{error, info};
use utoipa::{IntoParams, OpenApi, ToSchema};
use url::Url;
use uuid::Uuid;

type ApiResult<T> = Result<T, (StatusCode, String)>;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_state_handler,
        toggle_theme_handler,
        toggle_sidebar_handler,
        add_summary_handler,
        update_summary_handler,
        delete_summary_handler,
        toggle_favorite_handler,
        set_selection_handler,
        set_loading_handler,
        set_youtube_videos_handler,
        summarize_handler,
        job_status_handler,
        handoff_handler,
    ),
    components(
        schemas(SelectionPayload, LoadingPayload, JobAccepted, JobStatus, HandoffResponse)
    ),
    tags(
        (name = "Summarizer API", description = "State store endpoints for the summarizer front end.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, Serialize, ToSchema)]
pub struct SelectionPayload {
    /// The summary to select, or `null` to clear the selection.
    pub id: Option<String>,
}

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadingPayload {
    pub is_loading: bool,
}

/// The response sent after a summarization job has been accepted.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobAccepted {
    pub job_id: Uuid,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HandoffParams {
    pub video: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HandoffResponse {
    pub title: String,
    #[schema(value_type = Object)]
    pub request: SummaryRequest,
    /// Whether `video` points at a YouTube watch page.
    pub is_video_page: bool,
    /// The canonical handoff link on this application's origin, when `video` is a URL.
    pub link: Option<String>,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn snapshot_json(store: &Store) -> ApiResult<Json<Value>> {
    serde_json::to_value(store.state().snapshot())
        .map(Json)
        .map_err(|e| {
            error!("Failed to serialize snapshot: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to serialize state".to_string(),
            )
        })
}

fn port_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        other => {
            error!("Request failed: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

//=========================================================================================
// State Handlers
//=========================================================================================

/// Read the current state.
#[utoipa::path(
    get,
    path = "/api/state",
    responses((status = 200, description = "The current snapshot"))
)]
pub async fn get_state_handler(State(state): State<Arc<ServerState>>) -> ApiResult<Json<Value>> {
    let store = state.store.lock().await;
    snapshot_json(&store)
}

/// Flip between light and dark mode.
#[utoipa::path(
    post,
    path = "/api/theme/toggle",
    responses((status = 200, description = "The updated snapshot"))
)]
pub async fn toggle_theme_handler(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().await;
    store.toggle_theme();
    snapshot_json(&store)
}

/// Open or collapse the sidebar.
#[utoipa::path(
    post,
    path = "/api/sidebar/toggle",
    responses((status = 200, description = "The updated snapshot"))
)]
pub async fn toggle_sidebar_handler(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().await;
    store.toggle_sidebar();
    snapshot_json(&store)
}

/// Store a new summary. The server assigns its id and creation time.
#[utoipa::path(
    post,
    path = "/api/summaries",
    request_body(content_type = "application/json", description = "A summary without `id` or `createdAt`."),
    responses(
        (status = 201, description = "Summary added; the updated snapshot"),
        (status = 422, description = "The payload is not a valid summary draft")
    )
)]
pub async fn add_summary_handler(
    State(state): State<Arc<ServerState>>,
    Json(draft): Json<SummaryDraft>,
) -> ApiResult<impl IntoResponse> {
    let mut store = state.store.lock().await;
    store.add_summary(draft);
    Ok((StatusCode::CREATED, snapshot_json(&store)?))
}

/// Change some fields of a summary. Unknown ids are ignored.
#[utoipa::path(
    patch,
    path = "/api/summaries/{id}",
    request_body(content_type = "application/json", description = "The fields to change. `id` and `createdAt` are rejected."),
    responses(
        (status = 200, description = "The updated snapshot"),
        (status = 422, description = "The payload contains unknown or immutable fields")
    ),
    params(("id" = String, Path, description = "The summary id."))
)]
pub async fn update_summary_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(patch): Json<SummaryPatch>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().await;
    store.update_summary(&id, patch);
    snapshot_json(&store)
}

/// Delete a summary. Unknown ids are ignored.
#[utoipa::path(
    delete,
    path = "/api/summaries/{id}",
    responses((status = 204, description = "Summary removed (or was already absent)")),
    params(("id" = String, Path, description = "The summary id."))
)]
pub async fn delete_summary_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.store.lock().await.delete_summary(&id);
    StatusCode::NO_CONTENT
}

/// Flip the favorite flag of a summary. Unknown ids are ignored.
#[utoipa::path(
    post,
    path = "/api/summaries/{id}/favorite",
    responses((status = 200, description = "The updated snapshot")),
    params(("id" = String, Path, description = "The summary id."))
)]
pub async fn toggle_favorite_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().await;
    store.toggle_favorite(&id);
    snapshot_json(&store)
}

/// Select the summary to show, or clear the selection.
#[utoipa::path(
    put,
    path = "/api/selection",
    request_body = SelectionPayload,
    responses(
        (status = 200, description = "The updated snapshot"),
        (status = 404, description = "No summary with that id exists")
    )
)]
pub async fn set_selection_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<SelectionPayload>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().await;
    store
        .set_current_summary(payload.id.as_deref())
        .map_err(|SelectionError::UnknownSummary(id)| {
            (StatusCode::NOT_FOUND, format!("No summary with id {:?}", id))
        })?;
    snapshot_json(&store)
}

/// Set the loading indicator.
#[utoipa::path(
    put,
    path = "/api/loading",
    request_body = LoadingPayload,
    responses((status = 200, description = "The updated snapshot"))
)]
pub async fn set_loading_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<LoadingPayload>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().await;
    store.set_is_loading(payload.is_loading);
    snapshot_json(&store)
}

/// Replace the transient YouTube search results.
#[utoipa::path(
    put,
    path = "/api/youtube-videos",
    request_body(content_type = "application/json", description = "The search results to show."),
    responses((status = 200, description = "The updated snapshot"))
)]
pub async fn set_youtube_videos_handler(
    State(state): State<Arc<ServerState>>,
    Json(videos): Json<Vec<YouTubeVideo>>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().await;
    store.set_youtube_videos(videos);
    snapshot_json(&store)
}

//=========================================================================================
// Summarization Handlers
//=========================================================================================

/// Start summarizing. Any summarization still in flight is cancelled.
#[utoipa::path(
    post,
    path = "/api/summarize",
    request_body(content_type = "application/json", description = "The input and options to summarize."),
    responses(
        (status = 202, description = "Job accepted", body = JobAccepted),
        (status = 400, description = "The input is empty")
    )
)]
pub async fn summarize_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<impl IntoResponse> {
    let job = state
        .jobs
        .start(request)
        .await
        .map_err(port_error_response)?;
    Ok((StatusCode::ACCEPTED, Json(JobAccepted { job_id: job.id })))
}

/// Read the status of a summarization job.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    responses(
        (status = 200, description = "The job status", body = JobStatus),
        (status = 404, description = "Unknown job")
    ),
    params(("id" = Uuid, Path, description = "The job id."))
)]
pub async fn job_status_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JobStatus>> {
    state
        .jobs
        .status(id)
        .await
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No job with id {}", id)))
}

/// Turn the parameters opened by the browser extension into a prefilled request.
#[utoipa::path(
    get,
    path = "/api/handoff",
    params(HandoffParams),
    responses(
        (status = 200, description = "The prefilled request", body = HandoffResponse),
        (status = 400, description = "The `video` parameter is missing")
    )
)]
pub async fn handoff_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HandoffParams>,
) -> ApiResult<Json<HandoffResponse>> {
    let handoff =
        Handoff::from_params(params.video, params.title).map_err(port_error_response)?;
    info!("Received handoff for {}", handoff.video);

    let page = Url::parse(&handoff.video).ok();
    let video_page = page.as_ref().is_some_and(is_video_page);
    let link = page.as_ref().map(|page| {
        handoff_url(&state.config.app_origin, page, Some(&handoff.title)).to_string()
    });
    let title = handoff.title.clone();
    Ok(Json(HandoffResponse {
        title,
        request: handoff.into_request(),
        is_video_page: video_page,
        link,
    }))
}

#[cfg(test)]
mod tests {
    use crate::adapters::MockSummarizer;
    use crate::config::Config;
    use crate::web::{router, state::ServerState};
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use summarizer_core::Store;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<ServerState>) {
        let config = Config::from_lookup(|_| None).expect("default config should load");
        let state = Arc::new(ServerState::new(
            Store::in_memory(),
            Arc::new(MockSummarizer::new(Duration::ZERO)),
            Arc::new(config),
        ));
        (router(state.clone()), state)
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request should build"),
            None => builder.body(Body::empty()).expect("request should build"),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.expect("request should complete");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body should read");
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn state_starts_from_seed() {
        let (app, _) = test_app();
        let (status, body) = send(&app, request(Method::GET, "/api/state", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summaries"].as_array().unwrap().len(), 5);
        assert_eq!(body["isDarkMode"], false);
        assert_eq!(body["currentSummary"], Value::Null);
    }

    #[tokio::test]
    async fn add_then_select_then_delete() {
        let (app, _) = test_app();
        let draft = json!({
            "title": "X",
            "content": "Y",
            "source": "Z",
            "sourceType": "text",
            "outputType": "text",
            "summaryLength": "short",
            "knowledgeLevel": "beginner",
            "isFavorite": false,
            "tags": ["text", "short", "beginner"]
        });
        let (status, body) = send(&app, request(Method::POST, "/api/summaries", Some(draft))).await;
        assert_eq!(status, StatusCode::CREATED);
        let head = body["summaries"][0].clone();
        assert_eq!(head["title"], "X");
        let id = head["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            request(Method::PUT, "/api/selection", Some(json!({ "id": id }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentSummary"]["id"], id.as_str());

        let (status, _) = send(
            &app,
            request(Method::DELETE, &format!("/api/summaries/{id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, request(Method::GET, "/api/state", None)).await;
        assert_eq!(body["currentSummary"], Value::Null);
        assert_eq!(body["summaries"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn draft_with_identity_fields_is_rejected() {
        let (app, _) = test_app();
        let draft = json!({
            "id": "999",
            "title": "X",
            "content": "Y",
            "source": "Z",
            "sourceType": "text",
            "outputType": "text",
            "summaryLength": "short",
            "knowledgeLevel": "beginner"
        });
        let (status, _) = send(&app, request(Method::POST, "/api/summaries", Some(draft))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn patch_cannot_touch_identity() {
        let (app, _) = test_app();
        let (status, _) = send(
            &app,
            request(
                Method::PATCH,
                "/api/summaries/1",
                Some(json!({ "createdAt": "2030-01-01T00:00:00Z" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            request(Method::PATCH, "/api/summaries/1", Some(json!({ "title": "New" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summaries"][0]["title"], "New");
        assert_eq!(body["summaries"][0]["createdAt"], "2024-01-15T00:00:00Z");
    }

    #[tokio::test]
    async fn unknown_selection_is_not_found() {
        let (app, state) = test_app();
        let (status, _) = send(
            &app,
            request(Method::PUT, "/api/selection", Some(json!({ "id": "nope" }))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(state.store.lock().await.state().current_summary().is_none());
    }

    #[tokio::test]
    async fn toggles_and_flags() {
        let (app, _) = test_app();
        let (_, body) = send(&app, request(Method::POST, "/api/theme/toggle", None)).await;
        assert_eq!(body["isDarkMode"], true);
        let (_, body) = send(&app, request(Method::POST, "/api/sidebar/toggle", None)).await;
        assert_eq!(body["isSidebarOpen"], false);
        let (_, body) = send(&app, request(Method::POST, "/api/summaries/2/favorite", None)).await;
        assert_eq!(body["summaries"][1]["isFavorite"], true);
        let (_, body) = send(
            &app,
            request(Method::PUT, "/api/loading", Some(json!({ "isLoading": true }))),
        )
        .await;
        assert_eq!(body["isLoading"], true);

        let videos = json!([{
            "id": "v1",
            "title": "Sample YouTube Video 1",
            "thumbnail": "",
            "channelTitle": "Channel Name",
            "publishedAt": "2024-01-01",
            "duration": "10:30"
        }]);
        let (status, body) =
            send(&app, request(Method::PUT, "/api/youtube-videos", Some(videos))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["youtubeVideos"][0]["channelTitle"], "Channel Name");
    }

    #[tokio::test]
    async fn summarize_runs_a_job_to_completion() {
        let (app, state) = test_app();
        let payload = json!({
            "input": { "kind": "url", "value": "https://example.com/article" },
            "options": { "summaryLength": "long", "knowledgeLevel": "advanced" }
        });
        let (status, body) = send(&app, request(Method::POST, "/api/summarize", Some(payload))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_id = body["jobId"].as_str().unwrap().to_string();

        let mut job = Value::Null;
        for _ in 0..100 {
            let (_, body) = send(&app, request(Method::GET, &format!("/api/jobs/{job_id}"), None)).await;
            if body["status"] != "pending" {
                job = body;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(job["status"], "completed");

        let store = state.store.lock().await;
        let head = &store.state().summaries()[0];
        assert_eq!(job["summary_id"], head.id());
        assert_eq!(head.source, "https://example.com/article");
        assert_eq!(head.tags, vec!["url", "long", "advanced"]);
        assert!(!store.state().is_loading());
    }

    #[tokio::test]
    async fn blank_summarize_request_is_bad_request() {
        let (app, _) = test_app();
        let payload = json!({ "input": { "kind": "text", "value": "  " } });
        let (status, _) = send(&app, request(Method::POST, "/api/summarize", Some(payload))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = uuid::Uuid::new_v4();
        let (status, _) = send(&app, request(Method::GET, &format!("/api/jobs/{unknown}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handoff_prefills_a_url_request() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            request(
                Method::GET,
                "/api/handoff?video=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc&title=Rust%20Talk",
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Rust Talk");
        assert_eq!(body["request"]["input"]["kind"], "url");
        assert_eq!(body["request"]["input"]["value"], "https://www.youtube.com/watch?v=abc");
        assert_eq!(body["isVideoPage"], true);
        assert_eq!(
            body["link"],
            "http://localhost:3000/?video=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc&title=Rust%20Talk"
        );

        let (_, body) = send(&app, request(Method::GET, "/api/handoff?video=not-a-url", None)).await;
        assert_eq!(body["isVideoPage"], false);
        assert_eq!(body["link"], Value::Null);

        let (status, _) = send(&app, request(Method::GET, "/api/handoff?title=x", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
