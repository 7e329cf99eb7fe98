use super::island::DataIslands;
use super::legend::LegendHighlight;
use super::palette::{BAR_ACTIVE_COLOR, BAR_CREATED_COLOR, BAR_WAIT_COLOR, Palette, Rgba};

pub const LABELS_ISLAND: &str = "labels_json";
pub const DATA_ISLAND: &str = "data_json";
pub const PERCENTAGES_ISLAND: &str = "percentages_json";
pub const LABELS_BAR_ISLAND: &str = "labels_bar_json";
pub const DATA_BAR_ISLAND: &str = "data_bar_json";
pub const LABELS_PROC_COUNT_ISLAND: &str = "labels_proc_count_json";
pub const DATA_PROC_COUNT_ISLAND: &str = "data_proc_count_json";
pub const LABELS_PROC_WAIT_ISLAND: &str = "labels_proc_wait_json";
pub const DATA_PROC_WAIT_ISLAND: &str = "data_proc_wait_json";

pub const PIE_CANVAS: &str = "pieChart";
pub const BAR_CANVAS: &str = "barChart";
pub const PROC_COUNT_CANVAS: &str = "procCountChart";
pub const PROC_WAIT_CANVAS: &str = "procWaitChart";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
    /// Bars laid out along the y axis (ranked "top N" lists).
    HorizontalBar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub canvas: String,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Server-computed percentages shown in pie tooltips.
    pub percentages: Vec<f64>,
    pub colors: Vec<Rgba>,
}

impl ChartSpec {
    pub fn pie(
        labels: Vec<String>,
        values: Vec<f64>,
        percentages: Vec<f64>,
        palette: &Palette,
    ) -> Self {
        let colors = palette.assign(labels.len());
        Self {
            canvas: PIE_CANVAS.to_string(),
            kind: ChartKind::Pie,
            title: String::new(),
            labels,
            values,
            percentages,
            colors,
        }
    }

    pub fn bar(
        canvas: impl Into<String>,
        kind: ChartKind,
        title: impl Into<String>,
        labels: Vec<String>,
        values: Vec<f64>,
        color: Rgba,
    ) -> Self {
        let colors = vec![color; labels.len()];
        Self {
            canvas: canvas.into(),
            kind,
            title: title.into(),
            labels,
            values,
            percentages: Vec::new(),
            colors,
        }
    }

    /// Entries with both a label and a value.
    pub fn len(&self) -> usize {
        self.labels.len().min(self.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_value(&self) -> f64 {
        self.values[..self.len()]
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }

    /// Share of each entry in percent. Negative values count as zero; the
    /// shares always add up to 100 (evenly split when every value is zero).
    pub fn slice_shares(&self) -> Vec<f64> {
        let values = self.values[..self.len()]
            .iter()
            .map(|value| value.max(0.0))
            .collect::<Vec<_>>();
        let total: f64 = values.iter().sum();
        if values.is_empty() {
            return Vec::new();
        }
        if total <= 0.0 {
            let even = 100.0 / values.len() as f64;
            return vec![even; values.len()];
        }
        values.iter().map(|value| value * 100.0 / total).collect()
    }

    pub fn legend(&self) -> LegendHighlight {
        LegendHighlight::new(self.colors.clone())
    }

    /// Tooltip for entry `index`: `"<label>: <value> (<pct>%)"` on pies, with
    /// the percentage taken from the percentages island (0 when missing).
    pub fn tooltip(&self, index: usize) -> Option<String> {
        if index >= self.len() {
            return None;
        }
        let label = &self.labels[index];
        let value = format_number(self.values[index]);
        Some(match self.kind {
            ChartKind::Pie => {
                let pct = self.percentages.get(index).copied().unwrap_or(0.0);
                format!("{label}: {value} ({}%)", format_number(pct))
            }
            ChartKind::Bar | ChartKind::HorizontalBar => format!("{}: {value}", self.title),
        })
    }
}

/// Integers print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub charts: Vec<ChartSpec>,
}

impl Dashboard {
    pub fn chart(&self, canvas: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|chart| chart.canvas == canvas)
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// Build every chart whose labels and values are both non-empty and whose
/// canvas exists on the page. Missing data renders nothing.
pub fn build_dashboard(islands: &DataIslands, palette: &Palette) -> Dashboard {
    let mut charts = Vec::new();

    let labels = islands.strings(LABELS_ISLAND);
    let values = islands.numbers(DATA_ISLAND);
    if ready(islands, PIE_CANVAS, &labels, &values) {
        let percentages = islands.numbers(PERCENTAGES_ISLAND);
        charts.push(ChartSpec::pie(labels, values, percentages, palette));
    }

    let bars = [
        (
            BAR_CANVAS,
            ChartKind::Bar,
            "Entradas criadas",
            LABELS_BAR_ISLAND,
            DATA_BAR_ISLAND,
            BAR_CREATED_COLOR,
        ),
        (
            PROC_COUNT_CANVAS,
            ChartKind::HorizontalBar,
            "Pacientes (ativos)",
            LABELS_PROC_COUNT_ISLAND,
            DATA_PROC_COUNT_ISLAND,
            BAR_ACTIVE_COLOR,
        ),
        (
            PROC_WAIT_CANVAS,
            ChartKind::HorizontalBar,
            "Dias de espera (ativos)",
            LABELS_PROC_WAIT_ISLAND,
            DATA_PROC_WAIT_ISLAND,
            BAR_WAIT_COLOR,
        ),
    ];
    for (canvas, kind, title, labels_id, data_id, color) in bars {
        let labels = islands.strings(labels_id);
        let values = islands.numbers(data_id);
        if !ready(islands, canvas, &labels, &values) {
            continue;
        }
        let color = Rgba::parse_hex(color).unwrap_or(Rgba::opaque(0x80, 0x80, 0x80));
        charts.push(ChartSpec::bar(canvas, kind, title, labels, values, color));
    }

    Dashboard { charts }
}

fn ready(islands: &DataIslands, canvas: &str, labels: &[String], values: &[f64]) -> bool {
    if labels.is_empty() || values.is_empty() {
        tracing::debug!(canvas, "no data; chart skipped");
        return false;
    }
    if !islands.has_element(canvas) {
        tracing::debug!(canvas, "canvas absent; chart skipped");
        return false;
    }
    true
}
