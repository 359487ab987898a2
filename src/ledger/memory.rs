use super::{CellRange, InputMode, Ledger};
use crate::errors::AppResult;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// Sheet kept in memory, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    rows: Mutex<Vec<Vec<String>>>,
    appends: Mutex<usize>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing rows (header row included).
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            appends: Mutex::new(0),
        }
    }

    /// Snapshot of every row.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.lock_rows().clone()
    }

    /// Number of `append_row` calls served.
    pub fn append_count(&self) -> usize {
        *self.appends.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_rows(&self) -> MutexGuard<'_, Vec<Vec<String>>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn set_cell(rows: &mut Vec<Vec<String>>, row: u32, col: u32, value: String) {
    let (r, c) = (row as usize - 1, col as usize - 1);
    if rows.len() <= r {
        rows.resize(r + 1, Vec::new());
    }
    if rows[r].len() <= c {
        rows[r].resize(c + 1, String::new());
    }
    rows[r][c] = value;
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn clear_range(&self, range: &CellRange) -> AppResult<()> {
        let mut rows = self.lock_rows();
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                if range.contains(r as u32 + 1, c as u32 + 1) {
                    cell.clear();
                }
            }
        }
        Ok(())
    }

    async fn read_column(&self, column: u32, from_row: u32) -> AppResult<Vec<String>> {
        let rows = self.lock_rows();
        let skip = from_row.max(1) as usize - 1;
        Ok(rows
            .iter()
            .skip(skip)
            .map(|row| {
                row.get(column.max(1) as usize - 1)
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }

    async fn read_all(&self) -> AppResult<Vec<Vec<String>>> {
        Ok(self.rows())
    }

    async fn append_row(&self, fields: &[String], _mode: InputMode) -> AppResult<()> {
        let mut rows = self.lock_rows();
        // Like a spreadsheet, append after the last row holding any value.
        let last_used = rows
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
            .map_or(0, |idx| idx + 1);
        rows.truncate(last_used);
        rows.push(fields.to_vec());
        drop(rows);

        *self.appends.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    async fn update_range(&self, values: &[Vec<String>], range: &CellRange) -> AppResult<()> {
        let mut rows = self.lock_rows();
        for (r, value_row) in values.iter().enumerate() {
            for (c, value) in value_row.iter().enumerate() {
                let (row, col) = (range.start_row + r as u32, range.start_col + c as u32);
                if range.contains(row, col) {
                    set_cell(&mut rows, row, col, value.clone());
                }
            }
        }
        Ok(())
    }
}
