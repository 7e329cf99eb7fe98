use std::io::{self, Write};

use anyhow::{Context, Result};
use ratatui::{
    Terminal, TerminalOptions, Viewport,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
};

use crate::chart::{ChartSpec, LegendHighlight};

use super::chart_view::ChartView;

const FALLBACK_WIDTH: u16 = 80;
const MAX_WIDTH: u16 = 100;

/// Width used for inline drawing: the terminal's, capped, or a fallback
/// when stdout is not a terminal.
pub fn render_width() -> u16 {
    crossterm::terminal::size()
        .map(|(columns, _)| columns)
        .unwrap_or(FALLBACK_WIDTH)
        .clamp(20, MAX_WIDTH)
}

/// Draw the charts below the cursor without taking over the screen.
/// `legend` applies to the pie chart, if any.
pub fn draw_inline(charts: &[ChartSpec], legend: Option<&LegendHighlight>) -> Result<()> {
    if charts.is_empty() {
        return Ok(());
    }
    let width = render_width();
    let views = charts
        .iter()
        .map(|chart| {
            let view = ChartView::new(chart);
            match legend {
                Some(legend) if chart.kind == crate::chart::ChartKind::Pie => {
                    view.with_legend(legend)
                }
                _ => view,
            }
        })
        .collect::<Vec<_>>();
    let heights = views
        .iter()
        .map(|view| view.height_hint(width))
        .collect::<Vec<_>>();
    let total = heights.iter().fold(0u16, |sum, height| sum.saturating_add(*height));

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(total),
        },
    )
    .context("failed to initialize inline terminal")?;
    terminal
        .draw(|frame| {
            let area = frame.area();
            let area = ratatui::layout::Rect {
                width: area.width.min(width),
                ..area
            };
            let rows = Layout::vertical(heights.iter().map(|height| Constraint::Length(*height)))
                .split(area);
            for (view, row) in views.into_iter().zip(rows.iter()) {
                frame.render_widget(view, *row);
            }
        })
        .context("failed to draw charts")?;
    drop(terminal);
    let mut stdout = io::stdout();
    writeln!(stdout).context("failed to finish inline output")?;
    Ok(())
}
