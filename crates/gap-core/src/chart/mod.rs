//! Chart output.
//!
//! Charts are Vega-Lite v6 specifications built as `serde_json` values. A
//! [`Writer`] turns a [`Chart`] into the text of an output file:
//!
//! - [`HtmlWriter`]: standalone page that embeds the spec with vega-embed
//! - [`JsonWriter`]: the bare spec, for other Vega-Lite front ends

pub mod management;
pub mod protection;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::info;

use crate::error::{GapError, Result};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v6.json";

/// A finished chart specification.
#[derive(Debug, Clone)]
pub struct Chart {
    /// File stem used when the chart is written into a directory.
    pub name: String,
    pub title: String,
    pub spec: Value,
}

/// Renders a chart to the contents of one output file.
pub trait Writer {
    /// Extension of the files this writer produces, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, chart: &Chart) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWriter;

impl Writer for JsonWriter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, chart: &Chart) -> Result<String> {
        Ok(serde_json::to_string_pretty(&chart.spec)?)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlWriter;

impl Writer for HtmlWriter {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, chart: &Chart) -> Result<String> {
        // `</` inside the inline script would end it early.
        let spec_json = serde_json::to_string(&chart.spec)?.replace("</", "<\\/");
        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/vega@6"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-lite@6.4.1"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-embed@7"></script>
</head>
<body>
  <div id="vis"></div>
  <script type="text/javascript">
    const spec = {spec};
    vegaEmbed('#vis', spec, {{"actions": true}}).catch(console.error);
  </script>
</body>
</html>
"#,
            title = escape_html(&chart.title),
            spec = spec_json,
        ))
    }
}

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartFormat {
    #[default]
    Html,
    Json,
}

impl ChartFormat {
    pub fn writer(self) -> Box<dyn Writer> {
        match self {
            ChartFormat::Html => Box::new(HtmlWriter),
            ChartFormat::Json => Box::new(JsonWriter),
        }
    }
}

impl FromStr for ChartFormat {
    type Err = GapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(ChartFormat::Html),
            "json" => Ok(ChartFormat::Json),
            _ => Err(GapError::InvalidOption(format!(
                "chart format {s:?} (expected 'html' or 'json')"
            ))),
        }
    }
}

/// Render `chart` and write it to `path`, creating parent directories.
pub fn write_chart(writer: &dyn Writer, chart: &Chart, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, writer.render(chart)?)?;
    info!(chart = %chart.name, path = %path.display(), "wrote chart");
    Ok(())
}

/// Write `chart` into `dir` as `<name>.<extension>`.
pub fn write_chart_into(writer: &dyn Writer, chart: &Chart, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{}", chart.name, writer.extension()));
    write_chart(writer, chart, &path)?;
    Ok(path)
}

/// Vega-Lite `labelExpr` renaming axis labels; unmatched labels pass through.
///
/// `[("A", "Alpha")]` → `datum.label == 'A' ? 'Alpha' : datum.label`
pub fn label_expr(mappings: &[(&str, &str)]) -> String {
    let mut parts: Vec<String> = mappings
        .iter()
        .map(|(from, to)| {
            format!(
                "datum.label == '{}' ? '{}'",
                from.replace('\'', "\\'"),
                to.replace('\'', "\\'")
            )
        })
        .collect();
    parts.push("datum.label".to_string());
    parts.join(" : ")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Chart {
        Chart {
            name: "sample".to_string(),
            title: "Forest & Woodland </script>".to_string(),
            spec: json!({"$schema": VEGA_LITE_SCHEMA, "mark": "bar", "title": "a </script> b"}),
        }
    }

    #[test]
    fn label_expr_chains_mappings() {
        assert_eq!(label_expr(&[]), "datum.label");
        assert_eq!(
            label_expr(&[("A", "Alpha"), ("B's", "Beta")]),
            "datum.label == 'A' ? 'Alpha' : datum.label == 'B\\'s' ? 'Beta' : datum.label"
        );
    }

    #[test]
    fn html_embeds_spec_and_escapes_title() {
        let html = HtmlWriter.render(&sample()).unwrap();
        assert!(html.contains("vegaEmbed('#vis', spec"));
        assert!(html.contains("<title>Forest &amp; Woodland &lt;/script&gt;</title>"));
        assert!(html.contains(r#""mark":"bar""#));
        assert!(!html.contains("a </script> b"));
        assert_eq!(html.matches("</script>").count(), 4);
    }

    #[test]
    fn json_writer_round_trips_spec() {
        let chart = sample();
        let text = JsonWriter.render(&chart).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, chart.spec);
    }

    #[test]
    fn write_chart_into_uses_name_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out");
        let path = write_chart_into(&HtmlWriter, &sample(), &nested).unwrap();
        assert_eq!(path, nested.join("sample.html"));
        assert!(fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn format_parses() {
        assert_eq!("HTML".parse::<ChartFormat>().unwrap(), ChartFormat::Html);
        assert_eq!("json".parse::<ChartFormat>().unwrap().writer().extension(), "json");
        assert!("png".parse::<ChartFormat>().is_err());
    }
}
