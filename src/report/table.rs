//! Plain-text column tables.
//!
//! A `Table` holds labelled `Record`s of named values. Rendering right-aligns
//! every cell to a fixed width and splits the columns into chunks that fit
//! the line width:
//!
//! ```text
//!        Grids |          r21 |          r32 |            p |      f_exact |
//!  =========================================================================
//!        1 2 3 |     2.000000 |     2.000000 |     1.786170 |     0.971300 |
//!  -------------------------------------------------------------------------
//! ```
//!
//! Absent values render as blank cells. Columns and records keep their
//! insertion order.

/// One labelled row of named values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub label: String,
    pub values: Vec<(String, Option<f64>)>,
}

impl Record {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: Vec::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: Option<f64>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a value, replacing an existing one for the same column.
    pub fn set(&mut self, column: impl Into<String>, value: Option<f64>) {
        let column = column.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| *value)
    }
}

/// Layout options for [`Table::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub col_width: usize,
    pub decimals: usize,
    pub line_width: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            col_width: 12,
            decimals: 6,
            line_width: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    row_type: String,
    records: Vec<Record>,
}

impl Table {
    pub fn new(row_type: impl Into<String>) -> Self {
        Self {
            row_type: row_type.into(),
            records: Vec::new(),
        }
    }

    /// Add a record; a record whose label already exists is merged into it.
    pub fn add_record(&mut self, record: Record) {
        match self.records.iter_mut().find(|r| r.label == record.label) {
            Some(existing) => {
                for (column, value) in record.values {
                    existing.set(column, value);
                }
            }
            None => self.records.push(record),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Column names in first-seen order across all records.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for record in &self.records {
            for (name, _) in &record.values {
                if !columns.contains(&name.as_str()) {
                    columns.push(name);
                }
            }
        }
        columns
    }

    /// Render to lines, one chunk of columns at a time. Each chunk ends with
    /// an empty line.
    pub fn render(&self, layout: TableLayout) -> Vec<String> {
        let mut lines = Vec::new();
        let columns = self.columns();
        let mut rest = columns.as_slice();

        while !rest.is_empty() {
            let take = self.chunk_len(rest, layout);
            let (chunk, remaining) = rest.split_at(take);
            self.render_chunk(chunk, layout, &mut lines);
            lines.push(String::new());
            rest = remaining;
        }

        lines
    }

    // At least one column per chunk, even if it overflows the line.
    fn chunk_len(&self, columns: &[&str], layout: TableLayout) -> usize {
        let mut width = cell(&self.row_type, layout.col_width).len();
        let mut take = 0;
        for column in columns {
            width += cell(column, layout.col_width).len();
            if width > layout.line_width && take > 0 {
                break;
            }
            take += 1;
        }
        take
    }

    fn render_chunk(&self, columns: &[&str], layout: TableLayout, lines: &mut Vec<String>) {
        let w = layout.col_width;

        let mut heading = cell(&self.row_type, w);
        for column in columns {
            heading.push_str(&cell(column, w));
        }
        let rule_len = heading.len().saturating_sub(2);

        lines.push(heading.trim_end().to_string());
        lines.push(format!(" {}", "=".repeat(rule_len)));

        for record in &self.records {
            let mut row = cell(&record.label, w);
            for column in columns {
                match record.get(column) {
                    Some(value) => row.push_str(&format!("{value:>w$.d$} | ", d = layout.decimals)),
                    None => row.push_str(&cell("", w)),
                }
            }
            lines.push(row.trim_end().to_string());
        }

        lines.push(format!(" {}", "-".repeat(rule_len)));
    }
}

fn cell(text: &str, width: usize) -> String {
    format!("{text:>width$} | ")
}
