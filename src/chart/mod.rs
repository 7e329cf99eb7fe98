mod dashboard;
mod island;
mod legend;
mod palette;

pub use dashboard::{
    BAR_CANVAS, ChartKind, ChartSpec, DATA_BAR_ISLAND, DATA_ISLAND, DATA_PROC_COUNT_ISLAND,
    DATA_PROC_WAIT_ISLAND, Dashboard, LABELS_BAR_ISLAND, LABELS_ISLAND, LABELS_PROC_COUNT_ISLAND,
    LABELS_PROC_WAIT_ISLAND, PERCENTAGES_ISLAND, PIE_CANVAS, PROC_COUNT_CANVAS, PROC_WAIT_CANVAS,
    build_dashboard, format_number,
};
pub use island::DataIslands;
pub use legend::LegendHighlight;
pub use palette::{
    BAR_ACTIVE_COLOR, BAR_CREATED_COLOR, BAR_WAIT_COLOR, DEFAULT_COLORS, DIM_ALPHA, Palette, Rgba,
};
