// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The results table: the one grid the board draws, mutated by the header
//! and row renderers and by cell clicks. Callers pass it in explicitly.

use crate::{CellRef, CellStatus, Chart, display_value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
    /// Colour attribute. `None` for header cells, which never toggle.
    pub bgcolor: Option<String>,
}

impl TableCell {
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bgcolor: None,
        }
    }

    pub fn with_status(text: impl Into<String>, status: CellStatus) -> Self {
        Self {
            text: text.into(),
            bgcolor: Some(status.as_color().to_owned()),
        }
    }

    pub fn status(&self) -> Option<CellStatus> {
        self.bgcolor.as_deref().and_then(CellStatus::from_color)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsTable {
    rows: Vec<TableRow>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, cell: CellRef) -> Option<&TableCell> {
        self.rows.get(cell.row)?.cells.get(cell.column)
    }

    pub fn cell_mut(&mut self, cell: CellRef) -> Option<&mut TableCell> {
        self.rows.get_mut(cell.row)?.cells.get_mut(cell.column)
    }

    pub fn append_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn header_texts(&self) -> Option<Vec<&str>> {
        self.rows
            .first()
            .map(|row| row.cells.iter().map(|cell| cell.text.as_str()).collect())
    }
}

/// Appends one header row: a cell per column name, in schema order.
pub fn render_header(table: &mut ResultsTable, columns: &[String]) {
    let cells = columns.iter().map(TableCell::header).collect();
    table.append_row(TableRow { cells });
}

/// Appends the chart's data rows, every cell starting out empty (white).
/// Returns the number of rows appended.
pub fn render_rows(table: &mut ResultsTable, chart: &Chart) -> usize {
    for row in &chart.rows {
        let cells = (0..chart.column_count())
            .map(|index| {
                let text = row.values.get(index).map(display_value).unwrap_or_default();
                TableCell::with_status(text, CellStatus::Empty)
            })
            .collect();
        table.append_row(TableRow { cells });
    }
    chart.row_count()
}

/// Advances the clicked cell one step around white -> lime -> red -> white.
///
/// The current status is read back from the cell's colour attribute, so a
/// cell without a recognised colour (header cells, out-of-range indices) is
/// left untouched and `None` is returned.
pub fn click(table: &mut ResultsTable, cell: CellRef) -> Option<CellStatus> {
    let target = table.cell_mut(cell)?;
    let next = target.status()?.next();
    target.bgcolor = Some(next.as_color().to_owned());
    Some(next)
}
