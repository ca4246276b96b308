use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ErrorKind, StoreError};
use crate::feed::FeedDraft;
use crate::store::Store;

pub(crate) struct ServerState {
    store: Store,
    list_limit: usize,
}

#[derive(Debug, Deserialize)]
struct CreateChannelRequest {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    offset: usize,
    limit: Option<usize>,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            ErrorKind::StorageFailure => {
                warn!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

pub(crate) fn router(store: Store, list_limit: usize) -> Router {
    let state = Arc::new(ServerState { store, list_limit });
    Router::new()
        .route("/c", put(create_channel).get(list_channels))
        .route("/c/:channel", get(list_feeds).post(post_feed))
        .route("/c/:channel/:id", delete(remove_feed))
        .route("/rss/:channel", get(channel_rss))
        .with_state(state)
}

pub(crate) async fn run_server(store: Store, config: &Config) -> anyhow::Result<()> {
    let app = router(store, config.list_limit);
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(
        addr = %config.listen_addr,
        db = %config.db_path.display(),
        "anyrss listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Store calls block on the engine and on the id handoff, so they run on
/// the blocking pool.
async fn with_store<T, F>(state: &Arc<ServerState>, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&Store) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.store))
        .await
        .map_err(|err| StoreError::Background(err.to_string()))?
}

/// Route names are limited to ASCII letters and digits; anything else
/// cannot name a channel over HTTP.
fn check_channel_name(name: &str) -> Result<(), StoreError> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(StoreError::NotFound(format!("channel {name}")))
    }
}

fn pretty_json<T: Serialize>(value: &T) -> Result<Response, StoreError> {
    let body = serde_json::to_string_pretty(value)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn create_channel(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateChannelRequest>,
) -> Result<Response, StoreError> {
    let channel = with_store(&state, move |store| store.create_channel(&request.name)).await?;
    pretty_json(&channel)
}

async fn list_channels(State(state): State<Arc<ServerState>>) -> Result<Response, StoreError> {
    let channels = with_store(&state, |store| store.list_channels()).await?;
    pretty_json(&channels)
}

async fn list_feeds(
    State(state): State<Arc<ServerState>>,
    Path(channel): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Response, StoreError> {
    check_channel_name(&channel)?;
    let limit = query.limit.unwrap_or(state.list_limit);
    let feeds = with_store(&state, move |store| {
        store.list_feeds(&channel, query.offset, limit)
    })
    .await?;
    pretty_json(&feeds)
}

async fn post_feed(
    State(state): State<Arc<ServerState>>,
    Path(channel): Path<String>,
    Json(draft): Json<FeedDraft>,
) -> Result<Response, StoreError> {
    check_channel_name(&channel)?;
    let feed = with_store(&state, move |store| store.post_feed(&channel, draft)).await?;
    pretty_json(&feed)
}

async fn remove_feed(
    State(state): State<Arc<ServerState>>,
    Path((channel, id)): Path<(String, u64)>,
) -> Result<Response, StoreError> {
    check_channel_name(&channel)?;
    let feed = with_store(&state, move |store| store.remove_feed(&channel, id)).await?;
    pretty_json(&feed)
}

async fn channel_rss(
    State(state): State<Arc<ServerState>>,
    Path(channel): Path<String>,
) -> Result<Response, StoreError> {
    check_channel_name(&channel)?;
    let limit = state.list_limit;
    let xml = with_store(&state, move |store| store.render_rss(&channel, limit)).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        xml,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestServer {
        _dir: TempDir,
        store: Store,
    }

    impl TestServer {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = Store::open(&dir.path().join("server.redb")).unwrap();
            Self { _dir: dir, store }
        }

        async fn send(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, String) {
            let mut request = Request::builder().method(method).uri(uri);
            if body.is_some() {
                request = request.header(header::CONTENT_TYPE, "application/json");
            }
            let request = request
                .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
                .unwrap();

            let response = router(self.store.clone(), 100)
                .oneshot(request)
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        }
    }

    #[tokio::test]
    async fn test_create_and_list_channels() {
        let server = TestServer::new();

        let (status, body) = server.send("PUT", "/c", Some(r#"{"name":"news"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let created: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(created["name"], "news");

        let (status, body) = server.send("PUT", "/c", Some(r#"{"name":"news"}"#)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("already exists"));

        let (status, body) = server.send("GET", "/c", None).await;
        assert_eq!(status, StatusCode::OK);
        let channels: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(channels.len(), 1);
    }

    #[tokio::test]
    async fn test_create_channel_without_name() {
        let server = TestServer::new();
        let (status, _) = server.send("PUT", "/c", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_and_list_feeds() {
        let server = TestServer::new();
        server.send("PUT", "/c", Some(r#"{"name":"news"}"#)).await;

        let (status, body) = server
            .send(
                "POST",
                "/c/news",
                Some(r#"{"title":"A","url":"http://x","description":"d"}"#),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let posted: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(posted["id"].as_u64().unwrap() >= 1001);
        assert_eq!(posted["channel"], "news");

        let (status, _) = server
            .send(
                "POST",
                "/c/news",
                Some(r#"{"title":"A","url":"http://x","description":"d"}"#),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = server.send("GET", "/c/news", None).await;
        assert_eq!(status, StatusCode::OK);
        let feeds: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0]["title"], "A");
    }

    #[tokio::test]
    async fn test_post_invalid_feed() {
        let server = TestServer::new();
        server.send("PUT", "/c", Some(r#"{"name":"news"}"#)).await;

        let (status, _) = server
            .send("POST", "/c/news", Some(r#"{"title":"A","url":"http://x"}"#))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_found() {
        let server = TestServer::new();
        let (status, _) = server.send("GET", "/c/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = server.send("GET", "/rss/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_alphanumeric_channel_is_not_found() {
        let server = TestServer::new();
        server.store.create_channel("with-dash").unwrap();
        let (status, _) = server.send("GET", "/c/with-dash", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_feeds_offset_and_limit() {
        let server = TestServer::new();
        server.store.create_channel("news").unwrap();
        for title in ["one", "two", "three"] {
            let draft = FeedDraft {
                title: title.to_string(),
                url: format!("http://x/{title}"),
                description: "d".to_string(),
                author: String::new(),
            };
            server.store.post_feed("news", draft).unwrap();
        }

        let (_, body) = server.send("GET", "/c/news?offset=1&limit=1", None).await;
        let feeds: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0]["title"], "two");
    }

    #[tokio::test]
    async fn test_rss_route() {
        let server = TestServer::new();
        server.store.create_channel("news").unwrap();
        let draft = FeedDraft {
            title: "Hello".to_string(),
            url: "http://x".to_string(),
            description: "d".to_string(),
            author: String::new(),
        };
        server.store.post_feed("news", draft).unwrap();

        let (status, body) = server.send("GET", "/rss/news", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<rss"));
        assert!(body.contains("<title>Hello</title>"));
    }

    #[tokio::test]
    async fn test_delete_feed() {
        let server = TestServer::new();
        server.store.create_channel("news").unwrap();
        let draft = FeedDraft {
            title: "Hello".to_string(),
            url: "http://x".to_string(),
            description: "d".to_string(),
            author: String::new(),
        };
        let posted = server.store.post_feed("news", draft).unwrap();

        let uri = format!("/c/news/{}", posted.id);
        let (status, _) = server.send("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = server.send("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
