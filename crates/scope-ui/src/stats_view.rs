//! Statistics table: one row per selected measurement with min/max/average.

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use scope_core::formatting::format_number;
use scope_core::models::StatisticsRecord;

use crate::themes::Theme;

/// Rows the table needs for `records`, including borders and header.
pub fn table_height(records: &[StatisticsRecord]) -> u16 {
    records.len() as u16 + 3
}

/// Render the statistics of the selected measurements into `area`.
pub fn render_statistics(frame: &mut Frame, area: Rect, records: &[StatisticsRecord], theme: &Theme) {
    let header_cells = ["Measurement", "Min", "Max", "Avg", "Samples"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(record.name.clone()),
                Cell::from(format_number(record.min, 2)),
                Cell::from(format_number(record.max, 2)),
                Cell::from(format_number(record.average, 2)),
                Cell::from(format_number(record.count as f64, 0)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Statistics "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
