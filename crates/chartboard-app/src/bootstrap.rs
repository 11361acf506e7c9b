// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Startup chain: resolve the default chart name, load that chart, render it.
//!
//! Each step is issued only from the completion of the step before it. The
//! sequence never waits; it hands back the next request to issue and is
//! driven forward again when that request's completion arrives.

use crate::{Chart, ChartName, OutboundRequest, RemoteRequest, RequestId, RequestIds};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BootstrapPhase {
    #[default]
    NotStarted,
    ResolvingName {
        request: RequestId,
    },
    LoadingChart {
        request: RequestId,
        chart: ChartName,
    },
    Rendered {
        chart: ChartName,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bootstrap {
    phase: BootstrapPhase,
}

impl Bootstrap {
    pub fn phase(&self) -> &BootstrapPhase {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self.phase,
            BootstrapPhase::ResolvingName { .. } | BootstrapPhase::LoadingChart { .. }
        )
    }

    /// Issues the first request. With `chart` set the name lookup is skipped.
    /// Returns `None` once the sequence has already started.
    pub fn start(
        &mut self,
        chart: Option<ChartName>,
        ids: &mut RequestIds,
    ) -> Option<OutboundRequest> {
        if self.phase != BootstrapPhase::NotStarted {
            return None;
        }

        let id = ids.next_id();
        match chart {
            Some(chart) => {
                self.phase = BootstrapPhase::LoadingChart {
                    request: id,
                    chart: chart.clone(),
                };
                Some(OutboundRequest {
                    id,
                    request: RemoteRequest::LoadChart { chart },
                })
            }
            None => {
                self.phase = BootstrapPhase::ResolvingName { request: id };
                Some(OutboundRequest {
                    id,
                    request: RemoteRequest::DefaultChartName,
                })
            }
        }
    }

    /// Continuation for step 1. Returns the chart load to issue, or `None`
    /// when the completion does not belong to the pending lookup.
    pub fn on_default_chart_name(
        &mut self,
        id: RequestId,
        chart: ChartName,
        ids: &mut RequestIds,
    ) -> Option<OutboundRequest> {
        match self.phase {
            BootstrapPhase::ResolvingName { request } if request == id => {}
            _ => return None,
        }

        let next = ids.next_id();
        self.phase = BootstrapPhase::LoadingChart {
            request: next,
            chart: chart.clone(),
        };
        Some(OutboundRequest {
            id: next,
            request: RemoteRequest::LoadChart { chart },
        })
    }

    /// Continuation for step 2. Returns the chart to render, or `None` when
    /// the completion does not belong to the pending load.
    pub fn on_chart_loaded(&mut self, id: RequestId, chart: Chart) -> Option<Chart> {
        match &self.phase {
            BootstrapPhase::LoadingChart { request, .. } if *request == id => {}
            _ => return None,
        }

        self.phase = BootstrapPhase::Rendered {
            chart: chart.name.clone(),
        };
        Some(chart)
    }
}
