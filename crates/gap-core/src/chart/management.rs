//! Stacked bar of protected / multiple-use area per management category and
//! NVC class.

use serde_json::{json, Value};

use super::{Chart, VEGA_LITE_SCHEMA};
use crate::management::ManagementCategory;
use crate::nvc::NvcClass;
use crate::records::ProtectionStatus;
use crate::reshape::SummaryRow;

pub const TITLE: &str = "Management by USNVC Class";
pub const WIDTH: u32 = 1100;
pub const HEIGHT: u32 = 600;
pub const Y_DOMAIN_KM2: [f64; 2] = [0.0, 150_000.0];
/// Protected, Multiple Use.
pub const STATUS_COLORS: [&str; 2] = ["#286000", "#a6e883"];
/// x label rotation in radians.
pub const LABEL_ORIENTATION: f64 = 1.55;
/// d3 format for `0,0`: thousands separators, no decimals.
const KM2_FORMAT: &str = ",.0f";

/// Category/class factor shown on the x axis.
pub fn pair_label(category: ManagementCategory, class: NvcClass) -> String {
    format!("{} | {}", category.label(), class.short_label())
}

fn values(rows: &[SummaryRow]) -> Vec<Value> {
    rows.iter()
        .flat_map(|row| {
            ProtectionStatus::ALL
                .into_iter()
                .enumerate()
                .map(move |(stack_order, status)| {
                    json!({
                        "CatCls": pair_label(row.category, row.class),
                        "ManageCat": row.category.label(),
                        "NVCClass": row.class.short_label(),
                        "Status": status.label(),
                        "StackOrder": stack_order,
                        "km2": row.area(status),
                        "Protected": row.protected_km2,
                        "Multiple Use": row.multiple_use_km2,
                        "Total Area": row.total_km2,
                    })
                })
        })
        .collect()
}

/// Rows are drawn in the order given, which should be ranked already.
pub fn stacked_bar(rows: &[SummaryRow]) -> Chart {
    let order: Vec<String> = rows.iter().map(|r| pair_label(r.category, r.class)).collect();
    let status_domain: Vec<&str> = ProtectionStatus::ALL.iter().map(|s| s.label()).collect();

    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": {"text": TITLE, "anchor": "middle", "fontSize": 16},
        "width": WIDTH,
        "height": HEIGHT,
        "data": {"values": values(rows)},
        "mark": {"type": "bar", "width": {"band": 0.8}},
        "encoding": {
            "x": {
                "field": "CatCls",
                "type": "nominal",
                "sort": order,
                "title": null,
                "axis": {
                    "labelAngle": -LABEL_ORIENTATION.to_degrees(),
                    "labelLimit": 0,
                    "titleFontWeight": "normal"
                }
            },
            "y": {
                "field": "km2",
                "type": "quantitative",
                "stack": "zero",
                "title": "Square Kilometers",
                "scale": {"domain": Y_DOMAIN_KM2},
                "axis": {"format": KM2_FORMAT, "titleFontWeight": "normal"}
            },
            "color": {
                "field": "Status",
                "type": "nominal",
                "scale": {"domain": status_domain, "range": STATUS_COLORS},
                "legend": {"orient": "top", "direction": "horizontal", "title": null}
            },
            "order": {"field": "StackOrder", "type": "quantitative"},
            "tooltip": [
                {"field": "Protected", "type": "quantitative", "format": KM2_FORMAT},
                {"field": "Multiple Use", "type": "quantitative", "format": KM2_FORMAT},
                {"field": "Total Area", "type": "quantitative", "title": "Total", "format": KM2_FORMAT}
            ]
        },
        "config": {"legend": {"layout": {"top": {"anchor": "middle"}}}}
    });

    Chart {
        name: "ManagementSummary".to_string(),
        title: TITLE.to_string(),
        spec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn summary_row(category: ManagementCategory, class: NvcClass, p: f64, mu: f64) -> SummaryRow {
        SummaryRow {
            category,
            class,
            protected_km2: p,
            multiple_use_km2: mu,
            total_km2: p + mu,
        }
    }

    fn rows() -> Vec<SummaryRow> {
        vec![
            summary_row(ManagementCategory::BureauOfLandManagement, NvcClass::ForestWoodland, 1200.0, 34000.5),
            summary_row(ManagementCategory::OtherFederal, NvcClass::PolarHighMontane, 0.0, 18.0),
        ]
    }

    #[test]
    fn fixed_visual_parameters() {
        let chart = stacked_bar(&rows());
        let spec = &chart.spec;
        assert_eq!(spec["width"], 1100);
        assert_eq!(spec["title"]["text"], TITLE);
        assert_eq!(spec["encoding"]["y"]["scale"]["domain"], json!([0.0, 150000.0]));
        assert_eq!(spec["encoding"]["y"]["axis"]["format"], ",.0f");
        assert_eq!(spec["encoding"]["color"]["scale"]["range"], json!(["#286000", "#a6e883"]));
        assert_eq!(spec["encoding"]["color"]["scale"]["domain"], json!(["Protected", "Multiple Use"]));
        assert_eq!(spec["encoding"]["color"]["legend"]["orient"], "top");
        assert_eq!(spec["config"]["legend"]["layout"]["top"]["anchor"], "middle");
        let angle = spec["encoding"]["x"]["axis"]["labelAngle"].as_f64().unwrap();
        assert_relative_eq!(angle, -88.808, epsilon = 1e-3);
    }

    #[test]
    fn x_order_follows_rows() {
        let chart = stacked_bar(&rows());
        assert_eq!(
            chart.spec["encoding"]["x"]["sort"],
            json!([
                "Bureau of Land Management | Forest & Woodland",
                "Other Federal | Polar & High Montane"
            ])
        );
    }

    #[test]
    fn one_segment_per_status_with_tooltip_fields() {
        let chart = stacked_bar(&rows());
        let values = chart.spec["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[0]["Status"], "Protected");
        assert_eq!(values[0]["km2"], 1200.0);
        assert_eq!(values[1]["Status"], "Multiple Use");
        assert_eq!(values[1]["km2"], 34000.5);
        assert_eq!(values[1]["Total Area"], 35200.5);
        let tooltip = chart.spec["encoding"]["tooltip"].as_array().unwrap();
        let fields: Vec<&str> = tooltip.iter().map(|t| t["field"].as_str().unwrap()).collect();
        assert_eq!(fields, vec!["Protected", "Multiple Use", "Total Area"]);
        assert!(tooltip.iter().all(|t| t["format"] == ",.0f"));
    }
}
