// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use chartboard_app::{
    BoardCommand, BoardEvent, BoardMode, BoardState, BootstrapPhase, CellRef, ChartName,
    Completion, FormPayload, NewChartInput, NewColumnInput, OutboundRequest, PromptKind,
    TableCell,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const HALF_PAGE_ROWS: isize = 10;
const MAX_PROMPT_CHARS: usize = 64;
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// What the board needs from the outside world: a way to send requests to
/// the store and a way to collect the completions that have arrived since
/// the last frame.
pub trait BoardRuntime {
    fn issue(&mut self, request: OutboundRequest) -> Result<()>;
    fn drain_completions(&mut self) -> Vec<Completion>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardOptions {
    pub chart: Option<ChartName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PromptUiState {
    input: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewData {
    prompt: PromptUiState,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: BoardRuntime>(
    state: &mut BoardState,
    runtime: &mut R,
    options: BoardOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    start_board(state, runtime, &mut view_data, &internal_tx, options);

    let mut result = Ok(());
    loop {
        process_completions(state, runtime, &mut view_data, &internal_tx);
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start_board<R: BoardRuntime>(
    state: &mut BoardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: BoardOptions,
) {
    dispatch_and_apply(
        state,
        runtime,
        view_data,
        internal_tx,
        BoardCommand::StartBootstrap {
            chart: options.chart,
        },
    );
}

fn process_completions<R: BoardRuntime>(
    state: &mut BoardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    for completion in runtime.drain_completions() {
        dispatch_and_apply(
            state,
            runtime,
            view_data,
            internal_tx,
            BoardCommand::Completed(completion),
        );
    }
}

fn process_internal_events(
    state: &mut BoardState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(BoardCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn dispatch_and_apply<R: BoardRuntime>(
    state: &mut BoardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: BoardCommand,
) {
    let events = state.dispatch(command);
    for event in events {
        match event {
            BoardEvent::RequestIssued(request) => {
                let action = request.request.action();
                if let Err(error) = runtime.issue(request) {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("{} not sent: {error}", action.as_str()),
                    );
                }
            }
            BoardEvent::ModeChanged(BoardMode::Nav) => {
                view_data.prompt = PromptUiState::default();
            }
            BoardEvent::StatusUpdated(_) => {
                bump_status_token(view_data, internal_tx);
            }
            BoardEvent::HeaderRendered { .. }
            | BoardEvent::RowsRendered { .. }
            | BoardEvent::CellToggled { .. }
            | BoardEvent::CursorMoved(_)
            | BoardEvent::ModeChanged(_)
            | BoardEvent::StatusCleared => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut BoardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(BoardCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

/// Returns true when the board should exit.
fn handle_key_event<R: BoardRuntime>(
    state: &mut BoardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if let BoardMode::Prompt(kind) = state.mode {
        handle_prompt_key(state, runtime, view_data, internal_tx, kind, key);
        return false;
    }

    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('h') | KeyCode::Left, _) => BoardCommand::MoveCursor {
            rows: 0,
            columns: -1,
        },
        (KeyCode::Char('l') | KeyCode::Right, _) => BoardCommand::MoveCursor {
            rows: 0,
            columns: 1,
        },
        (KeyCode::Char('j') | KeyCode::Down, _) => BoardCommand::MoveCursor {
            rows: 1,
            columns: 0,
        },
        (KeyCode::Char('k') | KeyCode::Up, _) => BoardCommand::MoveCursor {
            rows: -1,
            columns: 0,
        },
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            BoardCommand::MoveCursor {
                rows: HALF_PAGE_ROWS,
                columns: 0,
            }
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            BoardCommand::MoveCursor {
                rows: -HALF_PAGE_ROWS,
                columns: 0,
            }
        }
        (KeyCode::Char('g'), _) => BoardCommand::MoveCursor {
            rows: isize::MIN,
            columns: 0,
        },
        (KeyCode::Char('G'), _) => BoardCommand::MoveCursor {
            rows: isize::MAX,
            columns: 0,
        },
        (KeyCode::Char(' ') | KeyCode::Enter, _) => BoardCommand::ClickCursor,
        (KeyCode::Char('c'), KeyModifiers::NONE) => BoardCommand::OpenPrompt(PromptKind::NewChart),
        (KeyCode::Char('n'), KeyModifiers::NONE) => {
            BoardCommand::OpenPrompt(PromptKind::NewColumn)
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            return false;
        }
        _ => return false,
    };

    dispatch_and_apply(state, runtime, view_data, internal_tx, command);
    false
}

fn handle_prompt_key<R: BoardRuntime>(
    state: &mut BoardState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: PromptKind,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch_and_apply(
                state,
                runtime,
                view_data,
                internal_tx,
                BoardCommand::ClosePrompt,
            );
        }
        (KeyCode::Enter, _) => {
            let Some(payload) = prompt_payload(state, kind, &view_data.prompt.input) else {
                emit_status(state, view_data, internal_tx, "no chart loaded");
                return;
            };
            dispatch_and_apply(
                state,
                runtime,
                view_data,
                internal_tx,
                BoardCommand::Submit(payload),
            );
        }
        (KeyCode::Backspace, _) => {
            view_data.prompt.input.pop();
        }
        (KeyCode::Char(ch), modifiers) => {
            if (modifiers.is_empty() || modifiers == KeyModifiers::SHIFT)
                && view_data.prompt.input.chars().count() < MAX_PROMPT_CHARS
            {
                view_data.prompt.input.push(ch);
            }
        }
        _ => {}
    }
}

fn prompt_payload(state: &BoardState, kind: PromptKind, input: &str) -> Option<FormPayload> {
    match kind {
        PromptKind::NewChart => Some(FormPayload::Chart(NewChartInput {
            name: input.to_owned(),
        })),
        PromptKind::NewColumn => state.chart.clone().map(|chart| {
            FormPayload::Column(NewColumnInput {
                chart,
                column: input.to_owned(),
            })
        }),
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &BoardState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let title = Paragraph::new(title_text(state))
        .block(Block::default().title("chartboard").borders(Borders::ALL));
    frame.render_widget(title, layout[0]);

    render_table(frame, layout[1], state);

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let BoardMode::Prompt(kind) = state.mode {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let prompt = Paragraph::new(prompt_text(state, kind, &view_data.prompt))
            .block(Block::default().title(kind.title()).borders(Borders::ALL));
        frame.render_widget(prompt, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &BoardState) {
    let columns = state.table.column_count();
    if columns == 0 {
        let empty = Paragraph::new(empty_table_text(state))
            .block(Block::default().borders(Borders::ALL).title("chart"));
        frame.render_widget(empty, area);
        return;
    }

    let widths = vec![Constraint::Min(8); columns];
    let rows = state
        .table
        .rows()
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let cells = row
                .cells
                .iter()
                .enumerate()
                .map(|(column_index, cell)| {
                    let selected = state.cursor == CellRef::new(row_index, column_index);
                    Cell::from(cell.text.clone()).style(cell_style(cell, selected))
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        });

    let table = Table::new(rows, widths).column_spacing(1).block(
        Block::default()
            .title(
                state
                    .chart
                    .as_ref()
                    .map_or_else(|| "chart".to_owned(), ToString::to_string),
            )
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn cell_style(cell: &TableCell, selected: bool) -> Style {
    let mut style = match cell.bgcolor.as_deref() {
        Some("white") => Style::default().fg(Color::Black).bg(Color::White),
        Some("lime") => Style::default().fg(Color::Black).bg(Color::LightGreen),
        Some("red") => Style::default().fg(Color::White).bg(Color::Red),
        Some(_) => Style::default(),
        None => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    };
    if selected {
        style = style.add_modifier(Modifier::REVERSED | Modifier::UNDERLINED);
    }
    style
}

fn title_text(state: &BoardState) -> String {
    match state.bootstrap.phase() {
        BootstrapPhase::NotStarted => "starting".to_owned(),
        BootstrapPhase::ResolvingName { .. } => "resolving default chart...".to_owned(),
        BootstrapPhase::LoadingChart { chart, .. } => format!("loading {chart}..."),
        BootstrapPhase::Rendered { chart } => format!(
            "{chart} | {} columns | {} rows",
            state.table.column_count(),
            state.table.row_count().saturating_sub(1)
        ),
    }
}

fn empty_table_text(state: &BoardState) -> String {
    if state.bootstrap.is_pending() {
        "waiting for the store; press ctrl+q to quit".to_owned()
    } else {
        "no columns to show; press n to add one or c to create a chart".to_owned()
    }
}

fn status_text(state: &BoardState) -> String {
    let mode = match state.mode {
        BoardMode::Nav => "NAV",
        BoardMode::Prompt(_) => "INPUT",
    };
    let hints = match state.mode {
        BoardMode::Nav => "h/j/k/l move | space toggle | c chart | n column | ? help | ctrl+q",
        BoardMode::Prompt(_) => "type a name | enter create | esc cancel",
    };
    let cell = state
        .table
        .cell(state.cursor)
        .and_then(TableCell::status)
        .map(|status| format!(" | cell {}", status.label()))
        .unwrap_or_default();
    match &state.status_line {
        Some(status) => format!("{mode} | {status}{cell} | {hints}"),
        None => format!("{mode}{cell} | {hints}"),
    }
}

fn prompt_text(state: &BoardState, kind: PromptKind, prompt: &PromptUiState) -> String {
    let target = match kind {
        PromptKind::NewChart => "chart name".to_owned(),
        PromptKind::NewColumn => match &state.chart {
            Some(chart) => format!("column name for {chart}"),
            None => "column name".to_owned(),
        },
    };
    format!(
        "{target}: {}_\n\nletters, digits, '-' or '_' (max 25)\nenter create | esc cancel",
        prompt.input
    )
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: h/j/k/l or arrows move | g/G first/last row | ctrl+d/ctrl+u half page\n\
nav: space/enter toggle cell (white -> lime -> red -> white)\n\
nav: c create chart | n create column in loaded chart\n\
input: type name | backspace delete | enter create | esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        BoardOptions, BoardRuntime, InternalEvent, ViewData, cell_style, handle_key_event,
        help_overlay_text, process_completions, process_internal_events, prompt_text,
        start_board, status_text, title_text,
    };
    use anyhow::{Result, anyhow};
    use chartboard_app::{
        BoardMode, BoardState, CellRef, CellStatus, Chart, ChartName, ColumnName, Completion,
        OutboundRequest, PromptKind, RemoteReply, RemoteRequest, Row, TableCell,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::{Color, Modifier};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::mpsc;

    #[derive(Debug, Default)]
    struct TestRuntime {
        issued: Vec<OutboundRequest>,
        pending: VecDeque<Completion>,
        fail_issue: bool,
    }

    impl TestRuntime {
        fn reply_to_last(&mut self, reply: RemoteReply) {
            let id = self.issued.last().expect("a request was issued").id;
            self.pending.push_back(Completion { id, reply });
        }
    }

    impl BoardRuntime for TestRuntime {
        fn issue(&mut self, request: OutboundRequest) -> Result<()> {
            if self.fail_issue {
                return Err(anyhow!("worker pool closed"));
            }
            self.issued.push(request);
            Ok(())
        }

        fn drain_completions(&mut self) -> Vec<Completion> {
            self.pending.drain(..).collect()
        }
    }

    fn internal_tx() -> mpsc::Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sales_chart() -> Chart {
        Chart {
            name: ChartName::new("Sales").expect("valid chart name"),
            columns: vec!["Q1".to_owned(), "Q2".to_owned()],
            rows: vec![
                Row {
                    values: vec![json!(0), json!(0)],
                },
                Row {
                    values: vec![json!(1), json!(true)],
                },
            ],
        }
    }

    fn loaded_board() -> (BoardState, TestRuntime, ViewData) {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let tx = internal_tx();

        start_board(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            BoardOptions::default(),
        );
        runtime.reply_to_last(RemoteReply::DefaultChartName(
            ChartName::new("Sales").expect("valid chart name"),
        ));
        process_completions(&mut state, &mut runtime, &mut view_data, &tx);
        runtime.reply_to_last(RemoteReply::ChartLoaded(sales_chart()));
        process_completions(&mut state, &mut runtime, &mut view_data, &tx);
        (state, runtime, view_data)
    }

    fn type_text(
        state: &mut BoardState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        text: &str,
    ) {
        let tx = internal_tx();
        for ch in text.chars() {
            handle_key_event(state, runtime, view_data, &tx, key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn startup_issues_name_lookup_then_chart_load() -> Result<()> {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let tx = internal_tx();

        start_board(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            BoardOptions::default(),
        );
        assert_eq!(runtime.issued.len(), 1);
        assert_eq!(runtime.issued[0].request, RemoteRequest::DefaultChartName);

        process_completions(&mut state, &mut runtime, &mut view_data, &tx);
        assert_eq!(runtime.issued.len(), 1);

        runtime.reply_to_last(RemoteReply::DefaultChartName(ChartName::new("Sales")?));
        process_completions(&mut state, &mut runtime, &mut view_data, &tx);
        assert_eq!(runtime.issued.len(), 2);
        assert_eq!(
            runtime.issued[1].request,
            RemoteRequest::LoadChart {
                chart: ChartName::new("Sales")?,
            }
        );
        assert!(state.table.is_empty());

        runtime.reply_to_last(RemoteReply::ChartLoaded(sales_chart()));
        process_completions(&mut state, &mut runtime, &mut view_data, &tx);
        assert_eq!(state.table.header_texts(), Some(vec!["Q1", "Q2"]));
        assert_eq!(state.table.row_count(), 3);
        Ok(())
    }

    #[test]
    fn chart_option_skips_name_lookup() -> Result<()> {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();

        start_board(
            &mut state,
            &mut runtime,
            &mut view_data,
            &internal_tx(),
            BoardOptions {
                chart: Some(ChartName::new("chores")?),
            },
        );
        assert_eq!(
            runtime.issued[0].request,
            RemoteRequest::LoadChart {
                chart: ChartName::new("chores")?,
            }
        );
        Ok(())
    }

    #[test]
    fn space_toggles_cursor_cell_through_ring() {
        let (mut state, mut runtime, mut view_data) = loaded_board();
        let tx = internal_tx();
        let cursor = state.cursor;
        assert_eq!(cursor, CellRef::new(1, 0));

        let mut seen = Vec::new();
        for _ in 0..3 {
            handle_key_event(
                &mut state,
                &mut runtime,
                &mut view_data,
                &tx,
                key(KeyCode::Char(' ')),
            );
            seen.push(state.table.cell(cursor).and_then(TableCell::status));
        }
        assert_eq!(
            seen,
            vec![
                Some(CellStatus::InProgress),
                Some(CellStatus::Blocked),
                Some(CellStatus::Empty),
            ]
        );
        assert_eq!(runtime.issued.len(), 2, "clicks never reach the store");
    }

    #[test]
    fn movement_keys_move_cursor() {
        let (mut state, mut runtime, mut view_data) = loaded_board();
        let tx = internal_tx();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('l')));
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Down));
        assert_eq!(state.cursor, CellRef::new(2, 1));

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('g')));
        assert_eq!(state.cursor, CellRef::new(0, 1));

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('G')));
        assert_eq!(state.cursor, CellRef::new(2, 1));
    }

    #[test]
    fn chart_prompt_submits_create_chart() -> Result<()> {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let tx = internal_tx();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('c')));
        assert_eq!(state.mode, BoardMode::Prompt(PromptKind::NewChart));

        type_text(&mut state, &mut runtime, &mut view_data, "Fooo");
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Backspace));
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Enter));

        assert_eq!(state.mode, BoardMode::Nav);
        assert_eq!(runtime.issued.len(), 1);
        assert_eq!(
            runtime.issued[0].request,
            RemoteRequest::CreateChart {
                chart: ChartName::new("Foo")?,
            }
        );
        assert!(view_data.prompt.input.is_empty());
        Ok(())
    }

    #[test]
    fn column_prompt_targets_loaded_chart() -> Result<()> {
        let (mut state, mut runtime, mut view_data) = loaded_board();
        let tx = internal_tx();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('n')));
        type_text(&mut state, &mut runtime, &mut view_data, "Bar");
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Enter));

        assert_eq!(
            runtime.issued.last().map(|request| request.request.clone()),
            Some(RemoteRequest::CreateColumn {
                chart: ChartName::new("Sales")?,
                column: ColumnName::new("Bar")?,
            })
        );
        Ok(())
    }

    #[test]
    fn invalid_prompt_input_stays_open_and_sends_nothing() {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let tx = internal_tx();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('c')));
        type_text(&mut state, &mut runtime, &mut view_data, "a b");
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Enter));

        assert!(runtime.issued.is_empty());
        assert_eq!(state.mode, BoardMode::Prompt(PromptKind::NewChart));
        assert_eq!(view_data.prompt.input, "a b");
        assert!(status_text(&state).contains("invalid chart"));
    }

    #[test]
    fn esc_closes_prompt_and_clears_input() {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let tx = internal_tx();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('c')));
        type_text(&mut state, &mut runtime, &mut view_data, "draft");
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Esc));

        assert_eq!(state.mode, BoardMode::Nav);
        assert!(view_data.prompt.input.is_empty());
        assert!(runtime.issued.is_empty());
    }

    #[test]
    fn prompt_keys_do_not_move_cursor_or_toggle() {
        let (mut state, mut runtime, mut view_data) = loaded_board();
        let tx = internal_tx();
        let table_before = state.table.clone();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('c')));
        type_text(&mut state, &mut runtime, &mut view_data, "jl ");
        assert_eq!(state.cursor, CellRef::new(1, 0));
        assert_eq!(state.table, table_before);
        assert_eq!(view_data.prompt.input, "jl ");
    }

    #[test]
    fn failed_issue_surfaces_status() {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime {
            fail_issue: true,
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::default();

        start_board(
            &mut state,
            &mut runtime,
            &mut view_data,
            &internal_tx(),
            BoardOptions::default(),
        );
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("get_default_chartname not sent"))
        );
    }

    #[test]
    fn stale_status_clear_token_is_ignored() {
        let mut state = BoardState::default();
        state.status_line = Some("created chart Foo".to_owned());
        let view_data = ViewData {
            status_token: 2,
            ..ViewData::default()
        };
        let (tx, rx) = mpsc::channel();

        tx.send(InternalEvent::ClearStatus { token: 1 })
            .expect("send clear");
        process_internal_events(&mut state, &view_data, &rx);
        assert!(state.status_line.is_some());

        tx.send(InternalEvent::ClearStatus { token: 2 })
            .expect("send clear");
        process_internal_events(&mut state, &view_data, &rx);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn help_toggles_and_swallows_keys() {
        let (mut state, mut runtime, mut view_data) = loaded_board();
        let tx = internal_tx();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char('?')));
        assert!(view_data.help_visible);
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Char(' ')));
        assert_eq!(
            state.table.cell(state.cursor).and_then(TableCell::status),
            Some(CellStatus::Empty)
        );
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Esc));
        assert!(!view_data.help_visible);
        assert!(help_overlay_text().contains("white -> lime -> red"));
    }

    #[test]
    fn ctrl_q_quits() {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        assert!(handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &internal_tx(),
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        ));
    }

    #[test]
    fn cell_style_maps_status_colors() {
        let white = cell_style(&TableCell::with_status("", CellStatus::Empty), false);
        assert_eq!(white.bg, Some(Color::White));
        let lime = cell_style(&TableCell::with_status("", CellStatus::InProgress), false);
        assert_eq!(lime.bg, Some(Color::LightGreen));
        let red = cell_style(&TableCell::with_status("", CellStatus::Blocked), true);
        assert_eq!(red.bg, Some(Color::Red));
        assert!(red.add_modifier.contains(Modifier::REVERSED));

        let header = cell_style(&TableCell::header("Q1"), false);
        assert_eq!(header.bg, None);
        assert!(header.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn title_tracks_bootstrap_phase() {
        let mut state = BoardState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        assert_eq!(title_text(&state), "starting");

        start_board(
            &mut state,
            &mut runtime,
            &mut view_data,
            &internal_tx(),
            BoardOptions::default(),
        );
        assert_eq!(title_text(&state), "resolving default chart...");

        let (loaded, _, _) = loaded_board();
        assert_eq!(title_text(&loaded), "Sales | 2 columns | 2 rows");
    }

    #[test]
    fn status_text_shows_mode_cell_and_message() {
        let (mut state, _, _) = loaded_board();
        assert!(status_text(&state).starts_with("NAV | cell empty |"));

        state.status_line = Some("created chart Foo".to_owned());
        assert!(status_text(&state).starts_with("NAV | created chart Foo | cell empty"));
    }

    #[test]
    fn prompt_text_names_target_chart() {
        let (state, _, _) = loaded_board();
        let text = prompt_text(
            &state,
            PromptKind::NewColumn,
            &super::PromptUiState {
                input: "Q3".to_owned(),
            },
        );
        assert!(text.starts_with("column name for Sales: Q3_"));
    }
}
