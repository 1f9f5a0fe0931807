//! Fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::app::ApiError;
use crate::clock::{Clock, ManualClock};
use crate::fetcher::{FetchResponse, Fetcher};

#[derive(Debug, Clone)]
pub enum Step {
    Respond {
        status: u16,
        content_type: Option<String>,
        body: String,
    },
    Fail(ApiError),
    Delayed(Duration, Box<Step>),
    Hang,
}

impl Step {
    pub fn json(body: &str) -> Self {
        Self::body(Some("application/json; charset=UTF-8"), body)
    }

    pub fn value(value: &Value) -> Self {
        Self::json(&value.to_string())
    }

    pub fn html(body: &str) -> Self {
        Self::body(Some("text/html; charset=utf-8"), body)
    }

    pub fn status(status: u16) -> Self {
        Step::Respond {
            status,
            content_type: Some("application/json".into()),
            body: "{}".into(),
        }
    }

    pub fn body(content_type: Option<&str>, body: &str) -> Self {
        Step::Respond {
            status: 200,
            content_type: content_type.map(String::from),
            body: body.to_string(),
        }
    }

    pub fn after(self, delay: Duration) -> Self {
        Step::Delayed(delay, Box::new(self))
    }
}

/// Fetcher answering from URL routes first, then from a queue.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<Vec<(String, Step)>>,
    queue: Mutex<VecDeque<Step>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            queue: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    /// Answer every URL containing `pattern` with `step`.
    pub fn route(self, pattern: &str, step: Step) -> Self {
        self.routes.lock().unwrap().push((pattern.to_string(), step));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    fn next_step(&self, url: &str) -> Option<Step> {
        let routed = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, step)| step.clone());
        routed.or_else(|| self.queue.lock().unwrap().pop_front())
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ApiError> {
        self.requested.lock().unwrap().push(url.to_string());
        let mut step = self
            .next_step(url)
            .ok_or_else(|| ApiError::Transport(format!("no scripted response for {url}")))?;
        loop {
            match step {
                Step::Respond {
                    status,
                    content_type,
                    body,
                } => {
                    return Ok(FetchResponse {
                        status,
                        content_type,
                        body: body.into_bytes(),
                    })
                }
                Step::Fail(err) => return Err(err),
                Step::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    step = *inner;
                }
                Step::Hang => std::future::pending::<()>().await,
            }
        }
    }
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(1_700_000_000_000))
}

pub fn as_clock(clock: &Arc<ManualClock>) -> Arc<dyn Clock> {
    clock.clone()
}

pub fn raw_post(id: &str, score: i64, created_utc: i64) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "subreddit": "LiverpoolFC",
            "title": format!("Post {id}"),
            "author": "klopp",
            "score": score,
            "num_comments": 3,
            "created_utc": created_utc as f64,
            "is_self": true,
            "selftext": "",
            "thumbnail": "self",
        }
    })
}

pub fn listing_envelope(children: Vec<Value>) -> Value {
    json!({ "kind": "Listing", "data": { "children": children } })
}

pub fn raw_comment(id: &str, replies: Vec<Value>) -> Value {
    let replies = if replies.is_empty() {
        json!("")
    } else {
        json!({ "kind": "Listing", "data": { "children": replies } })
    };
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "author": "robbo",
            "body": format!("comment {id}"),
            "score": 5,
            "created_utc": 1_700_000_100.0,
            "edited": false,
            "is_submitter": false,
            "stickied": false,
            "distinguished": null,
            "replies": replies,
        }
    })
}

pub fn comments_payload(roots: Vec<Value>) -> Value {
    json!([listing_envelope(vec![raw_post("p1", 1, 0)]), listing_envelope(roots)])
}
