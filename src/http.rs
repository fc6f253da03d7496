use crate::types::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
use crate::{Result, SongStatsError};
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use std::sync::Arc;

/// User agent sent with every request; MusicBrainz rejects anonymous clients.
pub const USER_AGENT: &str = concat!(
    "song-stats/",
    env!("CARGO_PKG_VERSION"),
    " (personal listening statistics)"
);

/// Thin JSON-over-HTTP layer shared by all external data clients.
///
/// The gateway issues GET requests through any [`HttpClient`] implementation,
/// turns non-success statuses into [`SongStatsError::Status`], decodes the body
/// as JSON, and broadcasts a [`ClientEvent`] before and after every request.
/// Clones share the underlying client and the event broadcaster.
///
/// # Examples
///
/// ```rust,no_run
/// use song_stats::HttpGateway;
///
/// let gateway = HttpGateway::new(Box::new(http_client::native::NativeClient::new()));
/// let mut events = gateway.subscribe();
/// ```
#[derive(Clone)]
pub struct HttpGateway {
    client: Arc<dyn HttpClient>,
    broadcaster: Arc<SharedEventBroadcaster>,
    user_agent: String,
}

impl HttpGateway {
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self {
            client: Arc::from(client),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Replace the `User-Agent` header sent with each request.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    /// GET `url` and decode the response body as JSON.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let parsed = url
            .parse::<Url>()
            .map_err(|e| SongStatsError::Http(format!("Invalid URL: {e}")))?;

        let request_info = RequestInfo::from_url_and_method(url, "GET");
        let request_start = std::time::Instant::now();

        log::debug!("Sending {}", request_info.short_description());
        self.broadcaster.broadcast_event(ClientEvent::RequestStarted {
            request: request_info.clone(),
        });

        let mut request = Request::new(Method::Get, parsed);
        request.insert_header("User-Agent", self.user_agent.as_str());
        request.insert_header("Accept", "application/json");

        let mut response = match self.client.send(request).await {
            Ok(response) => response,
            Err(e) => {
                self.broadcaster.broadcast_event(ClientEvent::RequestFailed {
                    request: request_info,
                    error: e.to_string(),
                });
                return Err(SongStatsError::Http(e.to_string()));
            }
        };

        let status_code: u16 = response.status().into();
        self.broadcaster.broadcast_event(ClientEvent::RequestCompleted {
            request: request_info.clone(),
            status_code,
            duration_ms: request_start.elapsed().as_millis() as u64,
        });

        log::debug!(
            "{} answered {status_code}",
            request_info.short_description()
        );

        if !response.status().is_success() {
            return Err(SongStatsError::Status(status_code));
        }

        let body = response
            .body_string()
            .await
            .map_err(|e| SongStatsError::Http(e.to_string()))?;
        log::trace!("Response body: {body}");

        serde_json::from_str(&body).map_err(|e| SongStatsError::Parse(e.to_string()))
    }
}
