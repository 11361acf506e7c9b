// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod dispatch;

pub use dispatch::{Dispatcher, ErrorReporter, RemoteFailure, TracingReporter};

use anyhow::{Context, bail};
use chartboard_app::{
    Chart, ChartName, ColumnName, RemoteAction, RemoteReply, RemoteRequest, Row,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never completed.
    #[error("{action} request to {endpoint} failed: {source}")]
    Network {
        action: &'static str,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The store answered with anything other than 200.
    #[error("{action} returned HTTP {}{}", .status.as_u16(), detail_suffix(.body))]
    Server {
        action: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The body was not the shape the action promises.
    #[error("{action} payload could not be read: {reason}")]
    Parse {
        action: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Network,
    Server,
    Parse,
}

impl RemoteError {
    pub const fn kind(&self) -> RemoteErrorKind {
        match self {
            Self::Network { .. } => RemoteErrorKind::Network,
            Self::Server { .. } => RemoteErrorKind::Server,
            Self::Parse { .. } => RemoteErrorKind::Parse,
        }
    }

    fn parse(action: RemoteAction, reason: impl Into<String>) -> Self {
        Self::Parse {
            action: action.as_str(),
            reason: reason.into(),
        }
    }
}

fn detail_suffix(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.len() >= 100 || trimmed.contains('<') {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

#[derive(Debug, Serialize)]
struct CreateChartBody<'a> {
    #[serde(rename = "CHARTNAME")]
    chart: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateColumnBody<'a> {
    #[serde(rename = "CHARTNAME")]
    chart: &'a str,
    #[serde(rename = "COLUMNNAME")]
    column: &'a str,
}

/// Blocking client for the chart store. Every call sends exactly one request.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            endpoint,
            timeout,
            http,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn action_url(&self, action: RemoteAction, params: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", action.as_str());
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url
    }

    pub fn fetch_default_chart_name(&self) -> Result<ChartName, RemoteError> {
        let action = RemoteAction::GetDefaultChartName;
        let body = self.send(action, self.http.get(self.action_url(action, &[])))?;
        ChartName::from_store(&body).map_err(|error| RemoteError::parse(action, error.to_string()))
    }

    pub fn fetch_chart(&self, chart: &ChartName) -> Result<Chart, RemoteError> {
        let action = RemoteAction::LoadChart;
        let url = self.action_url(action, &[("chartname", chart.as_str())]);
        let body = self.send(action, self.http.get(url))?;
        parse_chart_payload(chart, &body)
    }

    pub fn create_chart(&self, chart: &ChartName) -> Result<(), RemoteError> {
        let action = RemoteAction::CreateChart;
        let body = CreateChartBody {
            chart: chart.as_str(),
        };
        self.post(action, &body)
    }

    pub fn create_column(&self, chart: &ChartName, column: &ColumnName) -> Result<(), RemoteError> {
        let action = RemoteAction::CreateColumn;
        let body = CreateColumnBody {
            chart: chart.as_str(),
            column: column.as_str(),
        };
        self.post(action, &body)
    }

    pub fn execute(&self, request: &RemoteRequest) -> Result<RemoteReply, RemoteError> {
        match request {
            RemoteRequest::DefaultChartName => self
                .fetch_default_chart_name()
                .map(RemoteReply::DefaultChartName),
            RemoteRequest::LoadChart { chart } => {
                self.fetch_chart(chart).map(RemoteReply::ChartLoaded)
            }
            RemoteRequest::CreateChart { chart } => self
                .create_chart(chart)
                .map(|()| RemoteReply::ChartCreated(chart.clone())),
            RemoteRequest::CreateColumn { chart, column } => {
                self.create_column(chart, column)
                    .map(|()| RemoteReply::ColumnCreated {
                        chart: chart.clone(),
                        column: column.clone(),
                    })
            }
        }
    }

    fn post<T: Serialize>(&self, action: RemoteAction, body: &T) -> Result<(), RemoteError> {
        let payload = serde_json::to_string(body)
            .map_err(|error| RemoteError::parse(action, format!("encode body: {error}")))?;
        let request = self
            .http
            .post(self.action_url(action, &[]))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        self.send(action, request).map(|_| ())
    }

    fn send(&self, action: RemoteAction, request: RequestBuilder) -> Result<String, RemoteError> {
        let response = request.send().map_err(|source| RemoteError::Network {
            action: action.as_str(),
            endpoint: self.endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(RemoteError::Server {
                action: action.as_str(),
                status,
                body,
            });
        }

        response.text().map_err(|source| RemoteError::Network {
            action: action.as_str(),
            endpoint: self.endpoint.to_string(),
            source,
        })
    }
}

pub fn parse_endpoint(raw: &str) -> anyhow::Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("remote.endpoint must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("parse endpoint URL {trimmed:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "endpoint {trimmed:?} uses scheme {:?}; use http:// or https://",
            url.scheme()
        );
    }
    if url.query().is_some() {
        bail!("endpoint {trimmed:?} has a query string; the action parameter is added per request");
    }
    Ok(url)
}

/// Reads a `load_chart` body: a JSON array of row objects. Columns come from
/// the first row's keys in payload order; later rows are aligned to them.
pub fn parse_chart_payload(chart: &ChartName, body: &str) -> Result<Chart, RemoteError> {
    let action = RemoteAction::LoadChart;
    let value: Value = serde_json::from_str(body)
        .map_err(|error| RemoteError::parse(action, format!("invalid JSON: {error}")))?;
    let Value::Array(items) = value else {
        return Err(RemoteError::parse(
            action,
            format!("expected an array of rows, got {}", json_kind(&value)),
        ));
    };

    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => objects.push(map),
            other => {
                return Err(RemoteError::parse(
                    action,
                    format!("row {index} is {}, expected an object", json_kind(&other)),
                ));
            }
        }
    }

    let columns: Vec<String> = objects
        .first()
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();
    let rows = objects
        .iter()
        .map(|object| align_row(object, &columns))
        .collect();

    Ok(Chart {
        name: chart.clone(),
        columns,
        rows,
    })
}

fn align_row(object: &Map<String, Value>, columns: &[String]) -> Row {
    Row {
        values: columns
            .iter()
            .map(|column| object.get(column).cloned().unwrap_or(Value::Null))
            .collect(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
