use filaform::chart::{
    BAR_CANVAS, ChartKind, DIM_ALPHA, DataIslands, PIE_CANVAS, PROC_WAIT_CANVAS, Palette, Rgba,
    build_dashboard,
};
use filaform::presentation::{ChartView, render_to_lines};

const PAGE: &str = r##"
<div class="card"><canvas id="pieChart"></canvas></div>
<div class="card"><canvas id="barChart"></canvas></div>
<script type="application/json" id="labels_json">["A", "B"]</script>
<script type="application/json" id="data_json">[3, 7]</script>
<script type="application/json" id="percentages_json">[30, 70]</script>
<script type="application/json" id="labels_bar_json">["2024-01", "2024-02"]</script>
<script type="application/json" id="data_bar_json">[12, "4"]</script>
<script type="application/json" id="labels_proc_wait_json">["Hernioplastia"]</script>
<script type="application/json" id="data_proc_wait_json">[210]</script>
"##;

#[test]
fn builds_charts_present_on_the_page() {
    let dashboard = build_dashboard(&DataIslands::from_html(PAGE), &Palette::default());
    let canvases = dashboard
        .charts
        .iter()
        .map(|chart| chart.canvas.as_str())
        .collect::<Vec<_>>();
    assert_eq!(canvases, [PIE_CANVAS, BAR_CANVAS]);
    // Data without a canvas draws nothing.
    assert!(dashboard.chart(PROC_WAIT_CANVAS).is_none());

    let bars = dashboard.chart(BAR_CANVAS).unwrap();
    assert_eq!(bars.kind, ChartKind::Bar);
    assert_eq!(bars.values, [12.0, 4.0]);
    assert_eq!(bars.tooltip(1).as_deref(), Some("Entradas criadas: 4"));
}

#[test]
fn hovering_a_legend_entry_dims_the_rest() {
    let dashboard = build_dashboard(&DataIslands::from_html(PAGE), &Palette::default());
    let pie = dashboard.chart(PIE_CANVAS).unwrap();
    assert_eq!(pie.slice_shares(), [30.0, 70.0]);
    assert_eq!(pie.tooltip(0).as_deref(), Some("A: 3 (30%)"));
    assert_eq!(pie.tooltip(1).as_deref(), Some("B: 7 (70%)"));

    let mut legend = pie.legend();
    let original = legend.original().to_vec();
    legend.hover(0);
    let hovered = legend.colors();
    assert_eq!(hovered[0], original[0]);
    assert_eq!(hovered[1], original[1].with_alpha(DIM_ALPHA));
    assert_eq!(hovered[1].a, 0x4D);

    legend.leave();
    assert_eq!(legend.colors(), original);
}

#[test]
fn custom_palette_cycles_over_slices() {
    let islands = DataIslands::from_html(
        r#"<script type="application/json" id="labels_json">["A", "B", "C"]</script>
           <script type="application/json" id="data_json">[1, 1, 2]</script>"#,
    )
    .with_elements([PIE_CANVAS]);
    let palette = Palette::from_hex(&["#ff0000", "00ff00"]);
    let dashboard = build_dashboard(&islands, &palette);
    let pie = dashboard.chart(PIE_CANVAS).unwrap();
    assert_eq!(
        pie.colors,
        [
            Rgba::opaque(0xFF, 0, 0),
            Rgba::opaque(0, 0xFF, 0),
            Rgba::opaque(0xFF, 0, 0)
        ]
    );
    assert_eq!(pie.tooltip(2).as_deref(), Some("C: 2 (0%)"));
}

#[test]
fn pie_renders_legend_text() {
    let dashboard = build_dashboard(&DataIslands::from_html(PAGE), &Palette::default());
    let pie = dashboard.chart(PIE_CANVAS).unwrap();
    let lines = render_to_lines(ChartView::new(pie), 40);
    let text = lines.join("\n");
    assert!(text.contains("A: 3 (30%)"));
    assert!(text.contains("B: 7 (70%)"));
    assert!(text.contains('█'));
}

#[test]
fn empty_page_builds_no_charts() {
    let dashboard = build_dashboard(&DataIslands::from_html("<p>sem dados</p>"), &Palette::default());
    assert!(dashboard.is_empty());
}
