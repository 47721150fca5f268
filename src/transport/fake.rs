//! Scripted transport for controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use super::{Method, Reply, Session, Transport};
use crate::error::HttpError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub cookie: Option<String>,
}

#[derive(Default)]
struct State {
    routes: HashMap<(Method, String), VecDeque<Result<Reply, HttpError>>>,
    last: HashMap<(Method, String), Result<Reply, HttpError>>,
    calls: Vec<Call>,
}

/// Responses are queued per `(method, path)` and consumed in order. Once a
/// route's queue is empty its most recent response is replayed.
#[derive(Default)]
pub(crate) struct FakeTransport {
    state: Mutex<State>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, path: &str, body: Value) {
        self.push(
            method,
            path,
            Ok(Reply {
                body,
                set_cookies: Vec::new(),
            }),
        );
    }

    pub fn on_with_cookies(&self, method: Method, path: &str, body: Value, cookies: &[&str]) {
        self.push(
            method,
            path,
            Ok(Reply {
                body,
                set_cookies: cookies.iter().map(|c| c.to_string()).collect(),
            }),
        );
    }

    pub fn fail(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Err(HttpError::from_response(status, body)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn push(&self, method: Method, path: &str, response: Result<Reply, HttpError>) {
        self.state
            .lock()
            .unwrap()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }
}

impl Transport for FakeTransport {
    async fn send(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Reply, HttpError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
            cookie: session.cookie_header(),
        });

        let key = (method, path.to_string());
        let next = state.routes.get_mut(&key).and_then(|queue| queue.pop_front());
        match next {
            Some(response) => {
                state.last.insert(key, response.clone());
                response
            }
            None => state.last.get(&key).cloned().unwrap_or_else(|| {
                Err(HttpError::Transport(format!(
                    "no fake route for {} {}",
                    method.as_str(),
                    path
                )))
            }),
        }
    }
}
