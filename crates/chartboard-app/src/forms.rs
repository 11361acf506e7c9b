// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};

use crate::{ChartName, ColumnName, RemoteRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    NewChart,
    NewColumn,
}

impl PromptKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::NewChart => "new chart",
            Self::NewColumn => "new column",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChartInput {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewColumnInput {
    pub chart: ChartName,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Chart(NewChartInput),
    Column(NewColumnInput),
}

impl FormPayload {
    pub const fn kind(&self) -> PromptKind {
        match self {
            Self::Chart(_) => PromptKind::NewChart,
            Self::Column(_) => PromptKind::NewColumn,
        }
    }

    /// Validates the typed names and builds the create request to issue.
    pub fn into_request(self) -> Result<RemoteRequest> {
        match self {
            Self::Chart(input) => {
                let chart = ChartName::new(&input.name).context("invalid chart")?;
                Ok(RemoteRequest::CreateChart { chart })
            }
            Self::Column(input) => {
                let column = ColumnName::new(&input.column)
                    .with_context(|| format!("invalid column for chart {}", input.chart))?;
                Ok(RemoteRequest::CreateColumn {
                    chart: input.chart,
                    column,
                })
            }
        }
    }
}
