// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::table::{self, ResultsTable};
use crate::{
    Bootstrap, CellRef, CellStatus, ChartName, Completion, FormPayload, OutboundRequest,
    PromptKind, RemoteReply, RequestIds,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardMode {
    Nav,
    Prompt(PromptKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub mode: BoardMode,
    pub table: ResultsTable,
    pub cursor: CellRef,
    pub chart: Option<ChartName>,
    pub bootstrap: Bootstrap,
    pub status_line: Option<String>,
    request_ids: RequestIds,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            mode: BoardMode::Nav,
            table: ResultsTable::new(),
            cursor: CellRef::default(),
            chart: None,
            bootstrap: Bootstrap::default(),
            status_line: None,
            request_ids: RequestIds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardCommand {
    StartBootstrap { chart: Option<ChartName> },
    ClickCell(CellRef),
    ClickCursor,
    MoveCursor { rows: isize, columns: isize },
    OpenPrompt(PromptKind),
    ClosePrompt,
    Submit(FormPayload),
    Completed(Completion),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    RequestIssued(OutboundRequest),
    HeaderRendered { chart: ChartName, columns: usize },
    RowsRendered { count: usize },
    CellToggled { cell: CellRef, status: CellStatus },
    CursorMoved(CellRef),
    ModeChanged(BoardMode),
    StatusUpdated(String),
    StatusCleared,
}

impl BoardState {
    pub fn dispatch(&mut self, command: BoardCommand) -> Vec<BoardEvent> {
        match command {
            BoardCommand::StartBootstrap { chart } => self
                .bootstrap
                .start(chart, &mut self.request_ids)
                .map(BoardEvent::RequestIssued)
                .into_iter()
                .collect(),
            BoardCommand::ClickCell(cell) => self.click(cell),
            BoardCommand::ClickCursor => self.click(self.cursor),
            BoardCommand::MoveCursor { rows, columns } => self.move_cursor(rows, columns),
            BoardCommand::OpenPrompt(PromptKind::NewColumn) if self.chart.is_none() => {
                vec![self.set_status("no chart loaded; columns need an existing chart")]
            }
            BoardCommand::OpenPrompt(kind) => {
                self.mode = BoardMode::Prompt(kind);
                vec![BoardEvent::ModeChanged(self.mode)]
            }
            BoardCommand::ClosePrompt => {
                self.mode = BoardMode::Nav;
                vec![BoardEvent::ModeChanged(self.mode)]
            }
            BoardCommand::Submit(payload) => self.submit(payload),
            BoardCommand::Completed(completion) => self.complete(completion),
            BoardCommand::SetStatus(message) => vec![self.set_status(&message)],
            BoardCommand::ClearStatus => {
                self.status_line = None;
                vec![BoardEvent::StatusCleared]
            }
        }
    }

    fn click(&mut self, cell: CellRef) -> Vec<BoardEvent> {
        match table::click(&mut self.table, cell) {
            Some(status) => vec![BoardEvent::CellToggled { cell, status }],
            None => Vec::new(),
        }
    }

    fn move_cursor(&mut self, rows: isize, columns: isize) -> Vec<BoardEvent> {
        let row_count = self.table.row_count();
        let column_count = self.table.column_count();
        if row_count == 0 || column_count == 0 {
            return Vec::new();
        }

        let row = clamp_offset(self.cursor.row, rows, row_count);
        let column = clamp_offset(self.cursor.column, columns, column_count);
        let next = CellRef::new(row, column);
        if next == self.cursor {
            return Vec::new();
        }
        self.cursor = next;
        vec![BoardEvent::CursorMoved(next)]
    }

    fn submit(&mut self, payload: FormPayload) -> Vec<BoardEvent> {
        match payload.into_request() {
            Ok(request) => {
                self.mode = BoardMode::Nav;
                let id = self.request_ids.next_id();
                vec![
                    BoardEvent::ModeChanged(self.mode),
                    BoardEvent::RequestIssued(OutboundRequest { id, request }),
                ]
            }
            Err(error) => vec![self.set_status(&format!("{error:#}"))],
        }
    }

    fn complete(&mut self, completion: Completion) -> Vec<BoardEvent> {
        let Completion { id, reply } = completion;
        match reply {
            RemoteReply::DefaultChartName(chart) => self
                .bootstrap
                .on_default_chart_name(id, chart, &mut self.request_ids)
                .map(BoardEvent::RequestIssued)
                .into_iter()
                .collect(),
            RemoteReply::ChartLoaded(chart) => {
                let Some(chart) = self.bootstrap.on_chart_loaded(id, chart) else {
                    return Vec::new();
                };
                table::render_header(&mut self.table, &chart.columns);
                let count = table::render_rows(&mut self.table, &chart);
                self.cursor = if count > 0 && chart.column_count() > 0 {
                    CellRef::new(1, 0)
                } else {
                    CellRef::default()
                };
                self.chart = Some(chart.name.clone());
                vec![
                    BoardEvent::HeaderRendered {
                        chart: chart.name,
                        columns: chart.columns.len(),
                    },
                    BoardEvent::RowsRendered { count },
                ]
            }
            RemoteReply::ChartCreated(chart) => {
                vec![self.set_status(&format!("created chart {chart}"))]
            }
            RemoteReply::ColumnCreated { chart, column } => {
                vec![self.set_status(&format!("created column {column} in {chart}"))]
            }
        }
    }

    fn set_status(&mut self, message: &str) -> BoardEvent {
        self.status_line = Some(message.to_owned());
        BoardEvent::StatusUpdated(message.to_owned())
    }
}

fn clamp_offset(current: usize, delta: isize, len: usize) -> usize {
    let max = len.saturating_sub(1);
    if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta.unsigned_abs()).min(max)
    }
}
