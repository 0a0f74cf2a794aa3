use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::calendar::MonthGrid;
use crate::config::Config;
use crate::task::{Task, date_sorted};

const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    /// Builds the full list view: date-ascending rows with id, date, text.
    #[tracing::instrument(skip(self, tasks))]
    pub fn render_task_list(&self, tasks: &[Task]) -> anyhow::Result<String> {
        let headers = vec!["ID".to_string(), "Date".to_string(), "Task".to_string()];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in date_sorted(tasks) {
            let id = self.paint(&task.id.to_string(), "33");
            let date = task.date.format("%Y-%m-%d").to_string();
            rows.push(vec![id, date, task.text.clone()]);
        }

        let mut buf = Vec::new();
        write_table(&mut buf, headers, rows)?;
        String::from_utf8(buf).map_err(|e| anyhow!("rendered table was not utf-8: {e}"))
    }

    /// Builds the month view: header label, weekday row, the day grid with
    /// today highlighted and task days marked, then one line per task under
    /// the grid.
    #[tracing::instrument(skip(self, grid))]
    pub fn render_month_grid(&self, grid: &MonthGrid) -> anyhow::Result<String> {
        let mut out = String::new();

        out.push_str(&format!("{:^34}\n", grid.label));
        for name in WEEKDAY_HEADER {
            out.push_str(&format!("{name:>4} "));
        }
        out.push('\n');

        let mut slot = 0u32;
        for _ in 0..grid.leading_blanks {
            out.push_str("     ");
            slot += 1;
        }

        for cell in &grid.cells {
            let day = format!("{:>3}", cell.day);
            let day = if cell.is_today {
                self.paint(&day, "7")
            } else {
                day
            };
            let marker = if cell.tasks.is_empty() { ' ' } else { '*' };
            out.push_str(&format!("{day}{marker} "));

            slot += 1;
            if slot % 7 == 0 {
                out.push('\n');
            }
        }
        if slot % 7 != 0 {
            out.push('\n');
        }

        let mut wrote_gap = false;
        for cell in &grid.cells {
            for task in &cell.tasks {
                if !wrote_gap {
                    out.push('\n');
                    wrote_gap = true;
                }
                out.push_str(&format!("{:>4}  {}\n", cell.day, task.text));
            }
        }

        Ok(out)
    }

    pub fn print(&self, rendered: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(rendered.as_bytes())?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
