// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ids::RequestId;

pub const MAX_NAME_LEN: usize = 25;

/// Tri-state status of a body cell. The colour attribute on the cell is the
/// only place the status is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellStatus {
    Empty,
    InProgress,
    Blocked,
}

impl CellStatus {
    pub const ALL: [Self; 3] = [Self::Empty, Self::InProgress, Self::Blocked];

    pub const fn as_color(self) -> &'static str {
        match self {
            Self::Empty => "white",
            Self::InProgress => "lime",
            Self::Blocked => "red",
        }
    }

    pub fn from_color(value: &str) -> Option<Self> {
        match value {
            "white" => Some(Self::Empty),
            "lime" => Some(Self::InProgress),
            "red" => Some(Self::Blocked),
            _ => None,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Empty => Self::InProgress,
            Self::InProgress => Self::Blocked,
            Self::Blocked => Self::Empty,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::InProgress => "in progress",
            Self::Blocked => "blocked",
        }
    }
}

/// Checks a user-entered chart or column name: 1 to 25 ASCII alphanumeric,
/// dash or underscore characters.
pub fn validate_name(kind: &str, raw: &str) -> Result<()> {
    if raw.is_empty() {
        bail!("{kind} must not be empty");
    }
    let len = raw.chars().count();
    if len > MAX_NAME_LEN {
        bail!("{kind} {raw:?} is {len} characters; the limit is {MAX_NAME_LEN}");
    }
    if let Some(bad) = raw
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        bail!("{kind} {raw:?} contains {bad:?}; use letters, digits, '-' or '_'");
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartName(String);

impl ChartName {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        validate_name("chart name", trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Accepts a name reported by the store. The store is the authority on
    /// its own names, so only blank or control-character names are refused.
    pub fn from_store(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("store returned an empty chart name");
        }
        if trimmed.chars().any(char::is_control) {
            bail!("store returned chart name {trimmed:?} with control characters");
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnName(String);

impl ColumnName {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        validate_name("column name", trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One data row, values aligned with `Chart::columns`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub name: ChartName,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Chart {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Text shown for a stored cell value. Booleans use the sticker marks.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "\u{263A}".to_owned(),
        Value::Bool(false) => "\\".to_owned(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Operation selector sent as the `action` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteAction {
    GetDefaultChartName,
    LoadChart,
    CreateChart,
    CreateColumn,
}

impl RemoteAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetDefaultChartName => "get_default_chartname",
            Self::LoadChart => "load_chart",
            Self::CreateChart => "create_chart",
            Self::CreateColumn => "create_column",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "get_default_chartname" => Some(Self::GetDefaultChartName),
            "load_chart" => Some(Self::LoadChart),
            "create_chart" => Some(Self::CreateChart),
            "create_column" => Some(Self::CreateColumn),
            _ => None,
        }
    }

    pub const fn is_post(self) -> bool {
        matches!(self, Self::CreateChart | Self::CreateColumn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    DefaultChartName,
    LoadChart { chart: ChartName },
    CreateChart { chart: ChartName },
    CreateColumn { chart: ChartName, column: ColumnName },
}

impl RemoteRequest {
    pub const fn action(&self) -> RemoteAction {
        match self {
            Self::DefaultChartName => RemoteAction::GetDefaultChartName,
            Self::LoadChart { .. } => RemoteAction::LoadChart,
            Self::CreateChart { .. } => RemoteAction::CreateChart,
            Self::CreateColumn { .. } => RemoteAction::CreateColumn,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteReply {
    DefaultChartName(ChartName),
    ChartLoaded(Chart),
    ChartCreated(ChartName),
    ColumnCreated { chart: ChartName, column: ColumnName },
}

/// A request tagged with the id its completion will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub id: RequestId,
    pub request: RemoteRequest,
}

/// Delivered once per successful request. Failed requests produce none.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub id: RequestId,
    pub reply: RemoteReply,
}
