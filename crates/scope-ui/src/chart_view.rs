//! Time chart of the selected series.
//!
//! Each series becomes a braille line [`Dataset`] plotted against Unix
//! seconds on the x axis; axis labels show `HH:MM:SS` and two-decimal values.

use ratatui::{
    layout::Rect,
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use scope_core::formatting::{format_number, format_time_label};
use scope_core::models::{Measurement, Series};

use crate::themes::Theme;

/// Fraction of the value range added above and below the data.
const Y_PADDING: f64 = 0.05;

/// `[min, max]` for the x (time) and y (value) axes over all points.
///
/// Degenerate ranges (one timestamp, one value) are widened so the chart
/// always has a non-zero extent. Returns `None` when there are no points.
pub fn chart_bounds(data: &[Vec<(f64, f64)>]) -> Option<([f64; 2], [f64; 2])> {
    let mut points = data.iter().flatten();
    let &(x0, y0) = points.next()?;
    let (mut x_min, mut x_max, mut y_min, mut y_max) = (x0, x0, y0, y0);

    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if x_max - x_min < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let span = y_max - y_min;
    if span < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    } else {
        y_min -= span * Y_PADDING;
        y_max += span * Y_PADDING;
    }

    Some(([x_min, x_max], [y_min, y_max]))
}

/// Render the selected series into `area`, or a hint when nothing is plotted.
///
/// `measurements` supplies the legend labels (name plus unit).
pub fn render_chart(
    frame: &mut Frame,
    area: Rect,
    series: &[Series],
    measurements: &[Measurement],
    theme: &Theme,
) {
    let data: Vec<Vec<(f64, f64)>> = series.iter().map(Series::as_xy).collect();

    let Some((x_bounds, y_bounds)) = chart_bounds(&data) else {
        render_empty_chart(frame, area, theme);
        return;
    };

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&data)
        .enumerate()
        .map(|(i, (s, points))| {
            Dataset::default()
                .name(legend_label(&s.name, measurements))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.series_style(i))
                .data(points)
        })
        .collect();

    let x_mid = (x_bounds[0] + x_bounds[1]) / 2.0;
    let x_labels = [x_bounds[0], x_mid, x_bounds[1]]
        .into_iter()
        .map(|x| Span::styled(format_time_label(x), theme.chart_axis))
        .collect::<Vec<_>>();

    let y_mid = (y_bounds[0] + y_bounds[1]) / 2.0;
    let y_labels = [y_bounds[0], y_mid, y_bounds[1]]
        .into_iter()
        .map(|y| Span::styled(format_number(y, 2), theme.chart_axis))
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Series "),
        )
        .x_axis(
            Axis::default()
                .title("Time")
                .style(theme.chart_axis)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds(y_bounds)
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn render_empty_chart(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Nothing to plot", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Select a measurement with <space> to draw its series.",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Series "),
        ),
        area,
    );
}

fn legend_label(name: &str, measurements: &[Measurement]) -> String {
    measurements
        .iter()
        .find(|m| m.name == name)
        .map(Measurement::label)
        .unwrap_or_else(|| name.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use scope_core::models::Point;

    fn series(name: &str, values: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut s = Series::new(name);
        for (i, v) in values.iter().enumerate() {
            s.points.push(Point {
                time: start + chrono::Duration::seconds(i as i64),
                value: *v,
            });
        }
        s
    }

    // ── chart_bounds ──────────────────────────────────────────────────────────

    #[test]
    fn test_chart_bounds_empty() {
        assert!(chart_bounds(&[]).is_none());
        assert!(chart_bounds(&[vec![]]).is_none());
    }

    #[test]
    fn test_chart_bounds_pads_values() {
        let (x, y) = chart_bounds(&[vec![(10.0, 0.0), (20.0, 100.0)]]).unwrap();
        assert_eq!(x, [10.0, 20.0]);
        assert!((y[0] + 5.0).abs() < 1e-9);
        assert!((y[1] - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_chart_bounds_single_point_widened() {
        let (x, y) = chart_bounds(&[vec![(10.0, 3.0)]]).unwrap();
        assert_eq!(x, [9.0, 11.0]);
        assert_eq!(y, [2.0, 4.0]);
    }

    #[test]
    fn test_chart_bounds_across_series() {
        let (x, _) = chart_bounds(&[vec![(5.0, 1.0)], vec![(1.0, 2.0), (9.0, 3.0)]]).unwrap();
        assert_eq!(x, [1.0, 9.0]);
    }

    #[test]
    fn test_legend_label_uses_unit() {
        let measurements = vec![Measurement::new("v", Some("V".to_string()))];
        assert_eq!(legend_label("v", &measurements), "v [V]");
        assert_eq!(legend_label("other", &measurements), "other");
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_chart_does_not_panic() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let data = vec![series("a", &[1.0, 2.0, 3.0]), series("b", &[5.0])];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chart(frame, area, &data, &[], &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_chart_empty_shows_hint() {
        let backend = TestBackend::new(80, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chart(frame, area, &[series("a", &[])], &[], &theme);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Nothing to plot"));
    }
}
