#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use http_types::StatusCode;
use song_stats::{HostUi, StatsView, LOADING_MESSAGE};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Route {
    patterns: Vec<String>,
    status: u16,
    body: String,
}

#[derive(Debug, Default)]
struct FakeState {
    routes: Vec<Route>,
    requests: Vec<String>,
}

/// Scripted HTTP client: answers each request with the first route whose
/// patterns all occur in the URL, and records every URL it was asked for.
/// Requests without a route fail like an unreachable host.
#[derive(Debug, Default, Clone)]
pub struct FakeHttpClient {
    state: Arc<Mutex<FakeState>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, patterns: &[&str], status: u16, body: serde_json::Value) -> Self {
        self.state.lock().unwrap().routes.push(Route {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn send(&self, req: Request) -> Result<Response, http_types::Error> {
        let url = req.url().to_string();

        let route = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(url.clone());
            state
                .routes
                .iter()
                .find(|r| r.patterns.iter().all(|p| url.contains(p.as_str())))
                .cloned()
        };

        match route {
            Some(route) => {
                let mut response = Response::new(StatusCode::try_from(route.status).unwrap());
                response.set_body(route.body);
                Ok(response)
            }
            None => Err(http_types::Error::from_str(
                StatusCode::BadGateway,
                format!("connection refused: {url}"),
            )),
        }
    }
}

/// Records everything the widget does to its views.
#[derive(Debug, Default, Clone)]
pub struct RecordingUi {
    pub log: Rc<RefCell<Vec<String>>>,
    pub container_missing: Rc<RefCell<bool>>,
}

pub struct RecordingView {
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingUi {
    pub fn rendered(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter_map(|entry| entry.strip_prefix("render: ").map(str::to_string))
            .collect()
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl HostUi for RecordingUi {
    type View = RecordingView;

    fn mount_stats_view(&self) -> Option<RecordingView> {
        if *self.container_missing.borrow() {
            return None;
        }
        self.log.borrow_mut().push("mount".to_string());
        Some(RecordingView {
            log: Rc::clone(&self.log),
        })
    }
}

impl StatsView for RecordingView {
    fn show_loading(&mut self) {
        self.log.borrow_mut().push(format!("loading: {LOADING_MESSAGE}"));
    }

    fn render(&mut self, line: &str) {
        self.log.borrow_mut().push(format!("render: {line}"));
    }

    fn remove(&mut self) {
        self.log.borrow_mut().push("remove".to_string());
    }
}

pub fn host_track(uri: &str, artist: &str, title: &str) -> song_stats::HostTrack {
    serde_json::from_value(serde_json::json!({
        "uri": uri,
        "metadata": {"artist_name": artist, "title": title}
    }))
    .unwrap()
}

pub fn credentials() -> song_stats::Credentials {
    song_stats::Credentials::new(Some("test-key".to_string()), Some("listener".to_string()))
}
