// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! A local stand-in for the chart store's CGI endpoint. It keeps charts in
//! memory, answers the four actions the board uses, and records every request
//! so tests can assert on exactly what went over the wire.

use anyhow::{Result, anyhow};
use chartboard_app::RemoteAction;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Method, Request, Response, Server};

pub const ENDPOINT_PATH: &str = "/cgi/chartboard.py";

#[derive(Debug, Clone, PartialEq)]
pub struct StoreChart {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub action: Option<String>,
    pub params: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
struct Scripted {
    status: u16,
    body: String,
}

#[derive(Debug, Default)]
struct StoreState {
    charts: Vec<StoreChart>,
    default_chart: Option<String>,
    days: usize,
    scripted: HashMap<RemoteAction, Scripted>,
    requests: Vec<RecordedRequest>,
}

pub struct MockStore {
    server: Arc<Server>,
    state: Arc<Mutex<StoreState>>,
    handle: Option<JoinHandle<()>>,
    endpoint: String,
}

impl MockStore {
    /// Starts an empty store on an ephemeral localhost port.
    pub fn start() -> Result<Self> {
        Self::start_on("127.0.0.1:0")
    }

    pub fn start_on(addr: &str) -> Result<Self> {
        let server =
            Server::http(addr).map_err(|error| anyhow!("start mock store on {addr}: {error}"))?;
        let endpoint = format!("http://{}{ENDPOINT_PATH}", server.server_addr());
        let server = Arc::new(server);
        let state = Arc::new(Mutex::new(StoreState {
            days: crate::DEMO_DAYS,
            ..StoreState::default()
        }));

        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    serve(&state, request);
                }
            })
        };

        Ok(Self {
            server,
            state,
            handle: Some(handle),
            endpoint,
        })
    }

    /// Starts a store seeded with the deterministic demo charts.
    pub fn start_demo(addr: &str, seed: u64) -> Result<Self> {
        let store = Self::start_on(addr)?;
        for chart in crate::StickerFaker::new(seed).demo_charts() {
            store.insert_chart(chart);
        }
        store.set_default_chart(crate::DEMO_CHART);
        Ok(store)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn insert_chart(&self, chart: StoreChart) {
        let mut state = lock(&self.state);
        if state.default_chart.is_none() {
            state.default_chart = Some(chart.name.clone());
        }
        state.charts.retain(|existing| existing.name != chart.name);
        state.charts.push(chart);
    }

    pub fn set_default_chart(&self, name: &str) {
        lock(&self.state).default_chart = Some(name.to_owned());
    }

    /// Makes every request for `action` answer with a fixed status and body,
    /// bypassing the in-memory charts.
    pub fn respond(&self, action: RemoteAction, status: u16, body: &str) {
        lock(&self.state).scripted.insert(
            action,
            Scripted {
                status,
                body: body.to_owned(),
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    pub fn requests_for(&self, action: RemoteAction) -> Vec<RecordedRequest> {
        lock(&self.state)
            .requests
            .iter()
            .filter(|request| request.action.as_deref() == Some(action.as_str()))
            .cloned()
            .collect()
    }

    pub fn chart(&self, name: &str) -> Option<StoreChart> {
        lock(&self.state)
            .charts
            .iter()
            .find(|chart| chart.name == name)
            .cloned()
    }
}

impl Drop for MockStore {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn lock(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn serve(state: &Mutex<StoreState>, mut request: Request) {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);

    let (path, params) = split_url(request.url());
    let action = params
        .iter()
        .find(|(key, _)| key == "action")
        .map(|(_, value)| value.clone());
    let recorded = RecordedRequest {
        method: request.method().as_str().to_owned(),
        path: path.clone(),
        action: action.clone(),
        params,
        body,
    };

    let (status, text, json) = {
        let mut state = lock(state);
        state.requests.push(recorded.clone());
        if path != ENDPOINT_PATH {
            (404, format!("no such script {path}"), false)
        } else {
            match action.as_deref().and_then(RemoteAction::parse) {
                None => (400, "ERROR: No action was given in the query string.".to_owned(), false),
                Some(action) => handle_action(&mut state, action, request.method(), &recorded),
            }
        }
    };

    let content_type = if json { "application/json" } else { "text/plain" };
    let mut response = Response::from_string(text).with_status_code(status);
    if let Ok(header) = Header::from_bytes("Content-Type", content_type) {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}

fn split_url(raw: &str) -> (String, Vec<(String, String)>) {
    match url::Url::parse(&format!("http://store.local{raw}")) {
        Ok(url) => (
            url.path().to_owned(),
            url.query_pairs()
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        ),
        Err(_) => (raw.to_owned(), Vec::new()),
    }
}

fn handle_action(
    state: &mut StoreState,
    action: RemoteAction,
    method: &Method,
    request: &RecordedRequest,
) -> (u16, String, bool) {
    if let Some(scripted) = state.scripted.get(&action) {
        return (scripted.status, scripted.body.clone(), false);
    }

    let expected = if action.is_post() {
        Method::Post
    } else {
        Method::Get
    };
    if *method != expected {
        return (405, format!("{} expects {}", action.as_str(), expected), false);
    }

    match action {
        RemoteAction::GetDefaultChartName => match &state.default_chart {
            Some(name) => (200, name.clone(), false),
            None => (404, "no charts yet".to_owned(), false),
        },
        RemoteAction::LoadChart => {
            let Some(name) = request.param("chartname") else {
                return (400, "missing chartname".to_owned(), false);
            };
            match state.charts.iter().find(|chart| chart.name == name) {
                Some(chart) => {
                    let rows = chart.rows.iter().cloned().map(Value::Object).collect();
                    (200, Value::Array(rows).to_string(), true)
                }
                None => (404, format!("no chart named {name}"), false),
            }
        }
        RemoteAction::CreateChart => {
            let Some(name) = body_field(&request.body, "CHARTNAME") else {
                return (400, "body needs CHARTNAME".to_owned(), false);
            };
            if state.charts.iter().any(|chart| chart.name == name) {
                return (409, format!("chart {name} exists"), false);
            }
            let days = state.days;
            state.charts.push(StoreChart {
                name: name.clone(),
                columns: Vec::new(),
                rows: vec![Map::new(); days],
            });
            if state.default_chart.is_none() {
                state.default_chart = Some(name);
            }
            (200, String::new(), false)
        }
        RemoteAction::CreateColumn => {
            let (Some(chart_name), Some(column)) = (
                body_field(&request.body, "CHARTNAME"),
                body_field(&request.body, "COLUMNNAME"),
            ) else {
                return (400, "body needs CHARTNAME and COLUMNNAME".to_owned(), false);
            };
            let Some(chart) = state.charts.iter_mut().find(|chart| chart.name == chart_name)
            else {
                return (404, format!("no chart named {chart_name}"), false);
            };
            if chart.columns.contains(&column) {
                return (409, format!("column {column} exists in {chart_name}"), false);
            }
            for row in &mut chart.rows {
                row.insert(column.clone(), Value::Null);
            }
            chart.columns.push(column);
            (200, String::new(), false)
        }
    }
}

fn body_field(body: &str, key: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get(key)?.as_str().map(str::to_owned)
}
