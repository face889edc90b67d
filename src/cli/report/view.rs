use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::attachments::{AttachmentIndex, AttachmentState};
use crate::error::Result;
use crate::fmt::{self, display_date, format_bytes, money};
use crate::loader::TableCache;
use crate::models::{DaySummary, ReportSummary, AMOUNT_COLUMN};
use crate::report;
use crate::tui::{
    money_span, run_report_view, ReportView, ReportViewAction, CARD_VALUE_STYLE, ERROR_STYLE,
    FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE, WARNING_STYLE,
};

/// Build the interactive day-by-day report and run it. Attachments resolve
/// once here: one read attempt per day for this render pass.
pub fn run(cache: &mut TableCache, attachments_dir: &Path) -> Result<()> {
    let table = cache.load()?;
    let summary = report::summarize(table)?;
    let days = report::group_by_day(table);
    let index = AttachmentIndex::build(attachments_dir)?;

    let entries: Vec<DayEntry> = days
        .into_iter()
        .map(|day| {
            let state = index.load(day.date);
            DayEntry {
                day,
                state,
                expanded: false,
            }
        })
        .collect();
    let warnings: Vec<String> = index.warnings().iter().map(|w| w.to_string()).collect();

    let save_dir = std::env::current_dir()?;
    let mut browser = DayBrowser::new(summary, entries, warnings, table.columns.clone(), save_dir);
    run_report_view(&mut browser)
}

struct DayEntry {
    day: DaySummary,
    state: AttachmentState,
    expanded: bool,
}

pub struct DayBrowser {
    summary: ReportSummary,
    entries: Vec<DayEntry>,
    warnings: Vec<String>,
    columns: Vec<String>,
    amount_idx: Option<usize>,
    save_dir: PathBuf,
    selected: usize,
    scroll: usize,
    status_message: Option<String>,
}

impl DayBrowser {
    fn new(
        summary: ReportSummary,
        entries: Vec<DayEntry>,
        warnings: Vec<String>,
        columns: Vec<String>,
        save_dir: PathBuf,
    ) -> Self {
        let amount_idx = columns.iter().position(|c| c.trim() == AMOUNT_COLUMN);
        Self {
            summary,
            entries,
            warnings,
            columns,
            amount_idx,
            save_dir,
            selected: 0,
            scroll: 0,
            status_message: None,
        }
    }

    fn attachment_tag(state: &AttachmentState) -> (String, ratatui::style::Style) {
        match state {
            AttachmentState::Loaded(att) => (format!("[{}]", att.file_name), FOOTER_STYLE),
            AttachmentState::ReadFailed { .. } => ("[read failed]".to_string(), ERROR_STYLE),
            AttachmentState::NotFound => ("[no PDF]".to_string(), WARNING_STYLE),
        }
    }

    fn cell_display(&self, day_row: &crate::models::TransactionRow, col: usize) -> String {
        if Some(col) == self.amount_idx {
            if let Some(a) = day_row.amount {
                return fmt::amount(a);
            }
        }
        day_row.cells.get(col).cloned().unwrap_or_default()
    }

    /// Flatten the day sections into display lines; returns the line index
    /// of each day's title so scrolling can keep the selection visible.
    fn day_lines(&self) -> (Vec<Line<'static>>, Vec<usize>) {
        let mut lines: Vec<Line> = Vec::new();
        let mut markers = Vec::new();

        for (i, entry) in self.entries.iter().enumerate() {
            markers.push(lines.len());
            let arrow = if entry.expanded { "\u{25BE}" } else { "\u{25B8}" };
            let (tag, tag_style) = Self::attachment_tag(&entry.state);
            let mut line = Line::from(vec![
                Span::raw(format!(
                    " {arrow} {} \u{2014} ",
                    display_date(entry.day.date)
                )),
                money_span(entry.day.total_amount),
                Span::raw(format!(" | {} txns ", entry.day.count)),
                Span::styled(tag, tag_style),
            ]);
            if i == self.selected {
                line = line.style(SELECTED_STYLE);
            }
            lines.push(line);

            if !entry.expanded {
                continue;
            }

            // Column widths sized to this day's rows.
            let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
            for row in &entry.day.rows {
                for (c, w) in widths.iter_mut().enumerate() {
                    *w = (*w).max(self.cell_display(row, c).len());
                }
            }

            let header = self
                .columns
                .iter()
                .enumerate()
                .map(|(c, name)| format!("{:<w$}", name, w = widths[c]))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(Line::from(Span::styled(
                format!("     {header}"),
                HEADER_STYLE,
            )));

            for row in &entry.day.rows {
                let cells = (0..self.columns.len())
                    .map(|c| format!("{:<w$}", self.cell_display(row, c), w = widths[c]))
                    .collect::<Vec<_>>()
                    .join("  ");
                lines.push(Line::from(format!("     {cells}")));
            }

            match &entry.state {
                AttachmentState::Loaded(att) => {
                    lines.push(Line::from(Span::styled(
                        format!(
                            "     Attachment: {} ({}) \u{2014} press s to save",
                            att.file_name,
                            format_bytes(att.bytes.len() as u64)
                        ),
                        FOOTER_STYLE,
                    )));
                }
                AttachmentState::ReadFailed { file_name, detail } => {
                    lines.push(Line::from(Span::styled(
                        format!("     Error reading attachment {file_name}: {detail}"),
                        ERROR_STYLE,
                    )));
                }
                AttachmentState::NotFound => {
                    lines.push(Line::from(Span::styled(
                        "     No PDF found for this date.",
                        WARNING_STYLE,
                    )));
                }
            }
            lines.push(Line::from(""));
        }

        (lines, markers)
    }

    fn toggle_selected(&mut self) {
        if let Some(entry) = self.entries.get_mut(self.selected) {
            entry.expanded = !entry.expanded;
        }
    }

    fn toggle_all(&mut self) {
        let any_collapsed = self.entries.iter().any(|e| !e.expanded);
        for entry in &mut self.entries {
            entry.expanded = any_collapsed;
        }
    }

    fn save_selected(&mut self) {
        let Some(entry) = self.entries.get(self.selected) else {
            return;
        };
        match &entry.state {
            AttachmentState::Loaded(att) => {
                let path = self.save_dir.join(&att.file_name);
                match std::fs::write(&path, &att.bytes) {
                    Ok(()) => self.status_message = Some(format!("Saved {}", path.display())),
                    Err(e) => self.status_message = Some(format!("Save failed: {e}")),
                }
            }
            AttachmentState::ReadFailed { file_name, detail } => {
                self.status_message = Some(format!("Cannot save {file_name}: {detail}"));
            }
            AttachmentState::NotFound => {
                self.status_message = Some("No PDF found for this day.".to_string());
            }
        }
    }

    fn ensure_visible(&mut self, marker_line: usize, viewport: usize) {
        if marker_line < self.scroll {
            self.scroll = marker_line;
        } else if viewport > 0 && marker_line >= self.scroll + viewport {
            self.scroll = marker_line + 1 - viewport;
        }
    }
}

impl ReportView for DayBrowser {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let warn_rows = self.warnings.len().min(3) as u16;

        let [header_area, sep_area, cards_area, warn_area, days_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(warn_rows),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(" Disputed Transactions Report").style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(
            Paragraph::new("\u{2501}".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );

        // Summary cards
        let [amount_area, count_area, range_area] = Layout::horizontal([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .areas(cards_area);
        let card = |title: &'static str, value: String| {
            Paragraph::new(Span::styled(value, CARD_VALUE_STYLE))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title))
        };
        frame.render_widget(
            card("Total Disputed Amount", money(self.summary.total_amount)),
            amount_area,
        );
        frame.render_widget(
            card(
                "Total Disputed Transactions",
                self.summary.total_count.to_string(),
            ),
            count_area,
        );
        frame.render_widget(card("Date Range", self.summary.date_range()), range_area);

        if warn_rows > 0 {
            let warn_lines: Vec<Line> = self
                .warnings
                .iter()
                .take(warn_rows as usize)
                .map(|w| Line::from(format!(" Warning: {w}")))
                .collect();
            frame.render_widget(Paragraph::new(warn_lines).style(WARNING_STYLE), warn_area);
        }

        let (lines, markers) = self.day_lines();
        if let Some(&marker_line) = markers.get(self.selected) {
            self.ensure_visible(marker_line, days_area.height as usize);
        }
        frame.render_widget(
            Paragraph::new(lines).scroll((self.scroll as u16, 0)),
            days_area,
        );

        let footer = match &self.status_message {
            Some(msg) => Paragraph::new(format!(" {msg}")).style(WARNING_STYLE),
            None => Paragraph::new(
                " \u{2191}/\u{2193}=select  Enter=expand  a=expand all  s=save PDF  q=quit",
            )
            .style(FOOTER_STYLE),
        };
        frame.render_widget(footer, footer_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        self.status_message = None;
        match code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if !self.entries.is_empty() {
                    self.selected = (self.selected + 1).min(self.entries.len() - 1);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('a') => self.toggle_all(),
            KeyCode::Char('s') => self.save_selected(),
            KeyCode::Char('q') | KeyCode::Esc => return ReportViewAction::Close,
            _ => {}
        }
        ReportViewAction::Continue
    }
}
