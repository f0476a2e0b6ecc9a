//! Table formatting utilities for CLI list commands

use chrono::NaiveDate;
use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, format_date, truncate_str};
use crate::cli::OutputFormat;
use crate::core::identity::ProjectRole;
use crate::core::project::ProjectStatus;
use crate::core::sprint::SprintStatus;
use crate::core::work_item::{Priority, WorkItemStatus};

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Project key, item key or row id (cyan)
    Key(String),
    /// Plain text, truncated to the column width
    Text(String),
    ItemStatus(WorkItemStatus),
    SprintStatus(SprintStatus),
    ProjectStatus(ProjectStatus),
    Priority(Priority),
    Role(ProjectRole),
    Date(Option<NaiveDate>),
    Number(Option<i64>),
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Key(key) => format!("{:<width$}", style(key).cyan(), width = width),
            CellValue::Text(s) => {
                format!(
                    "{:<width$}",
                    truncate_str(s, width.saturating_sub(2)),
                    width = width
                )
            }
            CellValue::ItemStatus(status) => {
                let s = status.to_string();
                let styled = match status {
                    WorkItemStatus::ToDo => style(s).dim(),
                    WorkItemStatus::InProgress => style(s).yellow(),
                    WorkItemStatus::InReview => style(s).magenta(),
                    WorkItemStatus::Done => style(s).green(),
                    WorkItemStatus::Cancelled => style(s).red().dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::SprintStatus(status) => {
                let s = status.to_string();
                let styled = match status {
                    SprintStatus::Planning => style(s).dim(),
                    SprintStatus::Active => style(s).cyan().bold(),
                    SprintStatus::Completed => style(s).green(),
                    SprintStatus::Cancelled => style(s).red().dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::ProjectStatus(status) => {
                let s = status.to_string();
                let styled = match status {
                    ProjectStatus::Active => style(s).green(),
                    ProjectStatus::OnHold => style(s).yellow(),
                    ProjectStatus::Completed => style(s).cyan(),
                    ProjectStatus::Archived => style(s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Priority(priority) => {
                let s = priority.to_string();
                let styled = match priority {
                    Priority::Lowest | Priority::Low => style(s).dim(),
                    Priority::Medium => style(s).white(),
                    Priority::High | Priority::Highest => style(s).yellow(),
                    Priority::Critical => style(s).red().bold(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Role(role) => {
                let s = role.to_string();
                let styled = match role {
                    ProjectRole::Manager => style(s).cyan().bold(),
                    ProjectRole::TeamMember => style(s).white(),
                    ProjectRole::Observer => style(s).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Number(Some(n)) => format!("{:>width$}", n, width = width),
            CellValue::Date(_) | CellValue::Number(None) | CellValue::Empty => {
                format!("{:<width$}", self.raw_or_dash(), width = width)
            }
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Key(s) | CellValue::Text(s) => escape_csv(s),
            _ => self.raw(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        self.raw_or_dash().replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Key(s) | CellValue::Text(s) => s.clone(),
            CellValue::ItemStatus(s) => s.to_string(),
            CellValue::SprintStatus(s) => s.to_string(),
            CellValue::ProjectStatus(s) => s.to_string(),
            CellValue::Priority(p) => p.to_string(),
            CellValue::Role(r) => r.to_string(),
            CellValue::Date(Some(d)) => format_date(Some(*d)),
            CellValue::Number(Some(n)) => n.to_string(),
            CellValue::Date(None) | CellValue::Number(None) | CellValue::Empty => String::new(),
        }
    }

    fn raw_or_dash(&self) -> String {
        match self.raw() {
            s if s.is_empty() => "-".to_string(),
            s => s,
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        self.raw_or_dash().chars().count()
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    /// Value printed by `--format id`
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Drop the trailing "N item(s) found" line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => println!("{}", self.render_md(&rows)),
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.id);
                }
            }
            _ => self.output_tsv(&rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                // +2 leaves room for the truncation buffer used by Text cells
                col.header
                    .len()
                    .max(max_content.saturating_add(2))
                    .min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = *w),
                })
                .collect();
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        println!("{}", headers.join(","));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(CellValue::format_csv).unwrap_or_default())
                .collect();
            println!("{}", values.join(","));
        }
    }

    /// Render rows as a markdown table
    pub fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(self.columns.iter().map(|col| {
                row.get(col.key)
                    .map(CellValue::format_md)
                    .unwrap_or_else(|| "-".to_string())
            }));
        }
        builder.build().with(Style::markdown()).to_string()
    }
}
