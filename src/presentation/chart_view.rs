use std::borrow::Cow;

use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Widget},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::chart::{ChartKind, ChartSpec, LegendHighlight, Rgba, format_number};

const STRIP_SYMBOL: &str = "█";
const LEGEND_MARK: &str = "■ ";
const BAR_ROWS: u16 = 10;

/// Terminal rendering of one chart.
#[derive(Debug, Clone)]
pub struct ChartView<'a> {
    chart: &'a ChartSpec,
    colors: Cow<'a, [Rgba]>,
    background: Rgba,
}

impl<'a> ChartView<'a> {
    pub fn new(chart: &'a ChartSpec) -> Self {
        Self {
            chart,
            colors: Cow::Borrowed(&chart.colors),
            background: Rgba::opaque(0, 0, 0),
        }
    }

    /// Use the legend's current colors (dimmed while an entry is hovered).
    pub fn with_legend(mut self, legend: &LegendHighlight) -> Self {
        self.colors = Cow::Owned(legend.colors());
        self
    }

    /// Background that dimmed colors are blended over.
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    /// Rows needed to draw the chart at `width` columns.
    pub fn height_hint(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(2);
        let body = match self.chart.kind {
            ChartKind::Pie => 2 + self.legend_lines(inner).len() as u16,
            ChartKind::Bar => BAR_ROWS,
            ChartKind::HorizontalBar => (self.chart.len() as u16).saturating_mul(2).max(1),
        };
        body.saturating_add(2)
    }

    fn color(&self, index: usize) -> Color {
        let rgba = self
            .colors
            .get(index)
            .copied()
            .unwrap_or(Rgba::opaque(0x80, 0x80, 0x80))
            .blend(self.background);
        Color::Rgb(rgba.r, rgba.g, rgba.b)
    }

    fn title(&self) -> String {
        if self.chart.title.is_empty() {
            self.chart.canvas.clone()
        } else {
            self.chart.title.clone()
        }
    }

    fn legend_lines(&self, width: u16) -> Vec<Line<'static>> {
        let mark_width = LEGEND_MARK.width();
        let text_width = usize::from(width).saturating_sub(mark_width).max(1);
        let mut lines = Vec::new();
        for index in 0..self.chart.len() {
            let Some(text) = self.chart.tooltip(index) else {
                continue;
            };
            let style = Style::default().fg(self.color(index));
            for (row, piece) in wrap(&text, text_width).into_iter().enumerate() {
                let lead = if row == 0 {
                    Span::styled(LEGEND_MARK, style)
                } else {
                    Span::raw(" ".repeat(mark_width))
                };
                lines.push(Line::from(vec![lead, Span::raw(piece.into_owned())]));
            }
        }
        lines
    }

    fn render_pie(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(self.title());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let mut x = inner.x;
        for (index, cells) in strip_widths(&self.chart.slice_shares(), inner.width)
            .into_iter()
            .enumerate()
        {
            let color = self.color(index);
            for _ in 0..cells {
                if let Some(cell) = buf.cell_mut((x, inner.y)) {
                    cell.set_symbol(STRIP_SYMBOL).set_fg(color);
                }
                x += 1;
            }
        }

        if inner.height > 2 {
            let legend = Rect {
                y: inner.y + 2,
                height: inner.height - 2,
                ..inner
            };
            Paragraph::new(self.legend_lines(inner.width)).render(legend, buf);
        }
    }

    fn render_bars(&self, area: Rect, buf: &mut Buffer) {
        let horizontal = self.chart.kind == ChartKind::HorizontalBar;
        let bars = (0..self.chart.len())
            .map(|index| {
                let value = self.chart.values[index];
                Bar::default()
                    .value(value.max(0.0).round() as u64)
                    .text_value(format_number(value))
                    .label(Line::from(self.chart.labels[index].clone()))
                    .style(Style::default().fg(self.color(index)))
            })
            .collect::<Vec<_>>();
        let inner_width = area.width.saturating_sub(2);
        let bar_width = if horizontal {
            1
        } else {
            let count = self.chart.len().max(1) as u16;
            (inner_width / count).saturating_sub(1).clamp(1, 9)
        };
        BarChart::default()
            .block(Block::default().borders(Borders::ALL).title(self.title()))
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .direction(if horizontal {
                Direction::Horizontal
            } else {
                Direction::Vertical
            })
            .render(area, buf);
    }
}

impl Widget for ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.chart.kind {
            ChartKind::Pie => self.render_pie(area, buf),
            ChartKind::Bar | ChartKind::HorizontalBar => self.render_bars(area, buf),
        }
    }
}

/// Split `width` cells across slices by largest remainder so the strip is
/// always exactly `width` cells wide.
pub fn strip_widths(shares: &[f64], width: u16) -> Vec<u16> {
    if shares.is_empty() {
        return Vec::new();
    }
    let total = f64::from(width);
    let exact = shares
        .iter()
        .map(|share| share / 100.0 * total)
        .collect::<Vec<_>>();
    let mut cells = exact.iter().map(|value| value.floor() as u16).collect::<Vec<_>>();
    let assigned: u16 = cells.iter().sum();
    let mut order = (0..exact.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| {
        let ra = exact[*a] - exact[*a].floor();
        let rb = exact[*b] - exact[*b].floor();
        rb.total_cmp(&ra).then(a.cmp(b))
    });
    for index in order.into_iter().take(usize::from(width.saturating_sub(assigned))) {
        cells[index] += 1;
    }
    cells
}

/// Draw a chart into an off-screen buffer and return its rows as text.
pub fn render_to_lines(view: ChartView<'_>, width: u16) -> Vec<String> {
    let height = view.height_hint(width);
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    view.render(area, &mut buffer);
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
