use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde::Deserialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use filaform::{
    DocumentFormat, FormDefinition, FormPage, PageOptions, SubmitOutcome,
    chart::{ChartKind, DataIslands, Palette, build_dashboard},
    definition_schema,
    domain::preset,
    lookup::{HttpTransport, LookupAdapter, LookupEndpoint, LookupItem, LookupQuery},
    parse_document_str, parse_form_definition,
    presentation::{ChartView, draw_inline, render_to_lines, render_width},
    serialize_value,
};

const LOG_ENV: &str = "FILAFORM_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "filaform",
    version,
    about = "Check surgical-queue form submissions, query lookups and draw dashboards"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the JSON Schema that form definitions are checked against
    Schema(SchemaArgs),
    /// Apply values to a form, run the submit gate and print the payload
    Validate(ValidateArgs),
    /// Query a lookup endpoint and print the normalized results
    Lookup(LookupArgs),
    /// Draw the dashboard charts from a rendered page or an islands document
    Dashboard(DashboardArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Emit compact JSON rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,
}

#[derive(Debug, Args)]
struct FormArgs {
    /// Form definition spec: file path, inline payload, or "-" for stdin.
    /// Defaults to the built-in queue entry form.
    #[arg(short = 'f', long = "form", value_name = "SPEC")]
    form: Option<String>,

    /// Fail on rules that reference undeclared fields instead of skipping them
    #[arg(long = "strict")]
    strict: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    form: FormArgs,

    /// Values spec: an object of field -> value applied in order, or a list
    /// of steps ({"set", "value"}, {"select", "id", "label"}, {"clear"}, {"toggle"})
    #[arg(short = 'v', long = "values", value_name = "SPEC")]
    values: Option<String>,

    /// Clear a field's error as soon as it is edited
    #[arg(long = "clear-on-edit")]
    clear_on_edit: bool,

    /// Emit compact JSON rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,
}

#[derive(Debug, Args)]
struct LookupArgs {
    #[command(flatten)]
    form: FormArgs,

    /// Lookup field whose endpoint is used
    #[arg(long = "field", value_name = "ID", conflicts_with = "url", required_unless_present = "url")]
    field: Option<String>,

    /// Endpoint URL, used instead of a form field
    #[arg(long = "url", value_name = "URL")]
    url: Option<String>,

    /// Base URL joined onto relative endpoints
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,

    #[arg(short = 't', long = "term", default_value = "")]
    term: String,

    #[arg(long = "page", default_value_t = 1)]
    page: u32,

    #[arg(long = "limit")]
    limit: Option<u32>,

    /// Extra filter parameters, e.g. especialidade_id=7
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

#[derive(Debug, Args)]
struct DashboardArgs {
    /// Rendered HTML page holding the JSON data islands
    #[arg(long = "page", value_name = "PATH", conflicts_with = "islands", required_unless_present = "islands")]
    page: Option<PathBuf>,

    /// Islands spec (object of island id -> payload): file path, inline payload, or "-"
    #[arg(long = "islands", value_name = "SPEC")]
    islands: Option<String>,

    /// Comma separated palette overriding the default colors
    #[arg(long = "colors", value_name = "HEX,...", value_delimiter = ',')]
    colors: Vec<String>,

    /// Highlight this pie legend entry, dimming the others
    #[arg(long = "hover", value_name = "LABEL")]
    hover: Option<String>,

    /// Print plain text instead of drawing on the terminal
    #[arg(long = "text")]
    text: bool,

    /// Width used with --text
    #[arg(long = "width", value_name = "COLUMNS")]
    width: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Set { set: String, value: Value },
    Select { select: String, id: String, label: String },
    Clear { clear: String },
    Toggle { toggle: String },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Schema(args) => run_schema(args),
        Command::Validate(args) => run_validate(args),
        Command::Lookup(args) => run_lookup(args),
        Command::Dashboard(args) => run_dashboard(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run_schema(args: SchemaArgs) -> Result<()> {
    let schema = definition_schema().map_err(Report::msg)?;
    let text = serialize_value(&schema, DocumentFormat::Json, !args.no_pretty)
        .map_err(Report::msg)?;
    println!("{text}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let definition = load_definition(&args.form)?;
    let options = PageOptions::default()
        .with_strict(args.form.strict)
        .with_clear_errors_on_edit(args.clear_on_edit);
    let mut page = FormPage::from_definition(&definition, options).map_err(Report::msg)?;

    if let Some(spec) = args.values.as_deref() {
        let values = load_value(spec, "values")?;
        apply_values(&mut page, values)?;
    }

    match page.submit() {
        SubmitOutcome::Proceed(payload) => {
            let text = serialize_value(&payload, DocumentFormat::Json, !args.no_pretty)
                .map_err(Report::msg)?;
            println!("{text}");
            Ok(())
        }
        SubmitOutcome::Blocked(report) => {
            for id in &report.invalid {
                let message = page
                    .field(id.as_str())
                    .and_then(|field| field.error.clone())
                    .unwrap_or_default();
                println!("{id}: {message}");
            }
            for message in &report.global_errors {
                println!("{message}");
            }
            if let Some(scroll) = page.scroll_request() {
                tracing::info!(field = %scroll.field, margin = scroll.margin, "focus first invalid field");
            }
            Err(eyre!("submission blocked: {} issue(s)", report.issues()))
        }
    }
}

fn apply_values(page: &mut FormPage, values: Value) -> Result<()> {
    match values {
        Value::Object(map) => {
            for (field, value) in map {
                page.set_json(&field, &value)
                    .wrap_err_with(|| format!("failed to set '{field}'"))?;
            }
        }
        Value::Array(_) => {
            let steps: Vec<Step> =
                serde_json::from_value(values).wrap_err("values list must contain steps")?;
            for step in steps {
                match step {
                    Step::Set { set, value } => {
                        page.set_json(&set, &value)
                            .wrap_err_with(|| format!("failed to set '{set}'"))?;
                    }
                    Step::Select { select, id, label } => {
                        page.select_option(&select, LookupItem::new(id, label))
                            .wrap_err_with(|| format!("failed to select on '{select}'"))?;
                    }
                    Step::Clear { clear } => {
                        page.clear(&clear)
                            .wrap_err_with(|| format!("failed to clear '{clear}'"))?;
                    }
                    Step::Toggle { toggle } => {
                        page.toggle_section(&toggle)
                            .wrap_err_with(|| format!("failed to toggle '{toggle}'"))?;
                    }
                }
            }
        }
        other => return Err(eyre!("values must be an object or a list of steps, found {other}")),
    }
    Ok(())
}

fn run_lookup(args: LookupArgs) -> Result<()> {
    let adapter = match (&args.url, &args.field) {
        (Some(url), _) => LookupAdapter::new(LookupEndpoint::new(url.clone())),
        (None, Some(field)) => {
            let definition = load_definition(&args.form)?;
            let page = FormPage::from_definition(&definition, PageOptions::default())
                .map_err(Report::msg)?;
            page.endpoint(field)
                .cloned()
                .ok_or_else(|| eyre!("field '{field}' has no lookup endpoint"))?
        }
        (None, None) => return Err(eyre!("provide --field or --url")),
    };

    let mut query = LookupQuery::new(args.term.clone())
        .with_page(args.page)
        .with_limit(args.limit.unwrap_or(adapter.endpoint.settings.limit));
    for (key, value) in args.params {
        query = query.with_param(key, value);
    }

    let mut transport = HttpTransport::new();
    if let Some(base) = args.base_url.as_deref() {
        transport = transport.with_base_url(base);
    }
    let results = adapter
        .query(&transport, &query)
        .map_err(|err| eyre!("lookup failed: {err}"))?;
    let text = serde_json::to_string_pretty(&results).wrap_err("failed to encode results")?;
    println!("{text}");
    Ok(())
}

fn run_dashboard(args: DashboardArgs) -> Result<()> {
    let islands = match (&args.page, &args.islands) {
        (Some(path), _) => {
            let html = fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read page {}", path.display()))?;
            DataIslands::from_html(&html)
        }
        (None, Some(spec)) => DataIslands::from_value(&load_value(spec, "islands")?),
        (None, None) => return Err(eyre!("provide --page or --islands")),
    };
    let palette = Palette::from_hex(&args.colors);
    let dashboard = build_dashboard(&islands, &palette);
    if dashboard.is_empty() {
        eprintln!("no chart has data to show");
        return Ok(());
    }

    let legend = dashboard
        .charts
        .iter()
        .find(|chart| chart.kind == ChartKind::Pie)
        .map(|pie| {
            let mut legend = pie.legend();
            if let Some(label) = args.hover.as_deref() {
                match pie.labels.iter().position(|candidate| candidate == label) {
                    Some(index) => legend.hover(index),
                    None => tracing::warn!(label, "no pie entry with that label"),
                }
            }
            legend
        });

    if args.text {
        let width = args.width.unwrap_or_else(render_width);
        for chart in &dashboard.charts {
            let mut view = ChartView::new(chart);
            if chart.kind == ChartKind::Pie {
                if let Some(legend) = &legend {
                    view = view.with_legend(legend);
                }
            }
            for line in render_to_lines(view, width) {
                println!("{line}");
            }
        }
        return Ok(());
    }

    draw_inline(&dashboard.charts, legend.as_ref()).map_err(Report::msg)
}

fn load_definition(args: &FormArgs) -> Result<FormDefinition> {
    match args.form.as_deref() {
        Some(spec) => {
            let value = load_value(spec, "form")?;
            parse_form_definition(&value).map_err(Report::msg)
        }
        None => Ok(preset::fila_form()),
    }
}

/// Read a spec that is a file path, "-" for stdin, or the document itself.
fn load_value(spec: &str, label: &str) -> Result<Value> {
    let format = if spec == "-" {
        DocumentFormat::default()
    } else {
        DocumentFormat::from_path(Path::new(spec)).unwrap_or_default()
    };
    if spec == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read from stdin")?;
        return parse_contents(&buffer, format, label);
    }
    let path = Path::new(spec);
    if !path.is_file() {
        return parse_contents(spec, format, &format!("inline {label}"));
    }
    let contents =
        fs::read_to_string(path).wrap_err_with(|| format!("failed to load {label} from {spec}"))?;
    parse_contents(&contents, format, label)
}

fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::available_formats() {
                if candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            Err(eyre!("failed to parse {label}: {primary:#}"))
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_key_value_params() {
        assert_eq!(
            parse_param("especialidade_id=7").unwrap(),
            ("especialidade_id".to_string(), "7".to_string())
        );
        assert!(parse_param("=7").is_err());
        assert!(parse_param("nada").is_err());
    }

    #[test]
    fn steps_deserialize_by_shape() {
        let steps: Vec<Step> = serde_json::from_value(json!([
            {"set": "a", "value": "1"},
            {"select": "b", "id": "2", "label": "Dois"},
            {"clear": "a"},
            {"toggle": "secondary-block"}
        ]))
        .unwrap();
        assert!(matches!(steps[0], Step::Set { .. }));
        assert!(matches!(steps[1], Step::Select { .. }));
        assert!(matches!(steps[2], Step::Clear { .. }));
        assert!(matches!(steps[3], Step::Toggle { .. }));
    }

    #[test]
    fn inline_values_fall_back_to_parsing_the_spec() {
        let value = load_value(r#"{"id_prioridade": "ONC"}"#, "values").unwrap();
        assert_eq!(value, json!({"id_prioridade": "ONC"}));
    }
}
