//! NVC class charts: percent-protected box plot and protection bin counts.

use serde_json::{json, Value};

use super::{label_expr, Chart, VEGA_LITE_SCHEMA};
use crate::nvc::NvcClass;
use crate::protection::{ClassBinCounts, PercentMeasure, PercentObservation, ProtectionBin};

pub const BOXPLOT_TITLE: &str = "NVC Classes by Protection Status";
pub const GROUPED_TITLE: &str = "Number of Groups in Protection Categories by Class";
pub const STACKED_X_TITLE: &str = "Number of NVC Groups in a Class By Protection Amount Category";

/// `< 1%`, `1-17%`, `17-50%`, `> 50%`.
pub const BIN_COLORS: [&str; 4] = ["red", "orangered", "#bfbf00", "forestgreen"];
/// Lower bound of the stacked chart's upper x limit.
pub const STACKED_X_MIN_LIMIT: usize = 100;

fn class_domain() -> Vec<&'static str> {
    NvcClass::ALL.iter().map(|c| c.label()).collect()
}

fn bin_domain() -> Vec<&'static str> {
    ProtectionBin::ALL.iter().map(|b| b.label()).collect()
}

/// Axis labels abbreviated to `F & W`, `S & H`, ...
fn class_axis(angle: f64) -> Value {
    let mappings: Vec<(&str, &str)> = NvcClass::ALL
        .iter()
        .map(|c| (c.label(), c.abbreviation()))
        .collect();
    json!({
        "labelAngle": angle,
        "labelExpr": label_expr(&mappings),
        "titleFontSize": 12
    })
}

fn bin_values(counts: &[ClassBinCounts]) -> Vec<Value> {
    counts
        .iter()
        .flat_map(|c| {
            ProtectionBin::ALL.into_iter().enumerate().map(move |(i, bin)| {
                json!({
                    "NVCClass": c.class.label(),
                    "ProtCat": bin.label(),
                    "BinOrder": i,
                    "nGroups": c.bins.get(bin),
                })
            })
        })
        .collect()
}

/// Percent of mapped area per class, one box per percent measure.
pub fn boxplot(observations: &[PercentObservation]) -> Chart {
    let values: Vec<Value> = observations
        .iter()
        .map(|o| {
            json!({
                "NVCClass": o.class.label(),
                "Percent Protected": o.measure.label(),
                "Percent of Mapped Area": o.value,
            })
        })
        .collect();
    let measures: Vec<&str> = PercentMeasure::ALL.iter().map(|m| m.label()).collect();

    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": {"text": BOXPLOT_TITLE, "fontSize": 16},
        "width": 900,
        "height": 450,
        "data": {"values": values},
        "mark": {"type": "boxplot", "extent": 1.5, "size": 24},
        "encoding": {
            "x": {
                "field": "NVCClass",
                "type": "nominal",
                "sort": class_domain(),
                "scale": {"domain": class_domain()},
                "title": "NVC Class",
                "axis": class_axis(-45.0)
            },
            "xOffset": {"field": "Percent Protected", "type": "nominal", "sort": measures},
            "y": {
                "field": "Percent of Mapped Area",
                "type": "quantitative",
                "title": "Percent of Mapped Area",
                "axis": {"titleFontSize": 12}
            },
            "color": {
                "field": "Percent Protected",
                "type": "nominal",
                "sort": measures,
                "legend": {"title": "Percent Protected"}
            }
        }
    });

    Chart {
        name: "nvc_class_protection_boxplot".to_string(),
        title: BOXPLOT_TITLE.to_string(),
        spec,
    }
}

/// Group counts per bin, bins side by side within each class.
pub fn bins_grouped(counts: &[ClassBinCounts]) -> Chart {
    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": {"text": GROUPED_TITLE, "fontSize": 16},
        "width": 450,
        "height": 750,
        "data": {"values": bin_values(counts)},
        "mark": "bar",
        "encoding": {
            "x": {
                "field": "NVCClass",
                "type": "nominal",
                "sort": class_domain(),
                "scale": {"domain": class_domain()},
                "title": "NVC Class",
                "axis": class_axis(-45.0)
            },
            "xOffset": {"field": "ProtCat", "type": "nominal", "sort": bin_domain()},
            "y": {
                "field": "nGroups",
                "type": "quantitative",
                "title": "Number of NVC Groups",
                "axis": {"titleFontSize": 12}
            },
            "color": {
                "field": "ProtCat",
                "type": "nominal",
                "sort": bin_domain(),
                "legend": {"title": "Protection Categories", "titleFontSize": 11}
            }
        }
    });

    Chart {
        name: "nvc_protection_bins_grouped".to_string(),
        title: GROUPED_TITLE.to_string(),
        spec,
    }
}

/// Group counts per bin stacked into one horizontal bar per class.
pub fn bins_stacked(counts: &[ClassBinCounts]) -> Chart {
    let x_max = counts
        .iter()
        .map(|c| c.bins.total())
        .max()
        .unwrap_or(0)
        .max(STACKED_X_MIN_LIMIT);

    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "width": 600,
        "height": 375,
        "data": {"values": bin_values(counts)},
        "mark": "bar",
        "encoding": {
            "y": {
                "field": "NVCClass",
                "type": "nominal",
                "sort": class_domain(),
                "title": null,
                "axis": {"domain": false, "ticks": false}
            },
            "x": {
                "field": "nGroups",
                "type": "quantitative",
                "stack": "zero",
                "title": STACKED_X_TITLE,
                "scale": {"domain": [0, x_max]},
                "axis": {"domain": false}
            },
            "color": {
                "field": "ProtCat",
                "type": "nominal",
                "scale": {"domain": bin_domain(), "range": BIN_COLORS},
                "legend": {
                    "orient": "bottom-right",
                    "title": null,
                    "labelExpr": "datum.label + ' Protected'"
                }
            },
            "order": {"field": "BinOrder", "type": "quantitative"}
        }
    });

    Chart {
        name: "nvc_protection_bins_stacked".to_string(),
        title: STACKED_X_TITLE.to_string(),
        spec,
    }
}
