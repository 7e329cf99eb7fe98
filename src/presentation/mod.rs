mod chart_view;
mod terminal;

pub use chart_view::{ChartView, render_to_lines, strip_widths};
pub use terminal::{draw_inline, render_width};
