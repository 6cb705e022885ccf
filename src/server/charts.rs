//! Plotly figure assembly
//!
//! Builds the figure JSON (`data` traces + `layout`) the dashboard page
//! hands to Plotly. Styling follows the dark dashboard theme: donut pie
//! with percent+label text, `#1f1f1f` chart canvas, indianred/lightsalmon
//! grouped bars on the comparison chart.

use serde_json::{json, Value};

use crate::models::{CategoryStats, CategoryTotal, MonthlyTotal, SubcategoryTotal};

const CANVAS_COLOR: &str = "#1f1f1f";
const SLICE_OUTLINE: &str = "#000000";

/// Pie of total spend per category.
pub fn category_pie(summary: &[CategoryTotal]) -> Value {
    pie_figure(
        summary.iter().map(|r| r.category.clone()).collect(),
        summary.iter().map(|r| r.total).collect(),
        "Expenses by Category",
    )
}

/// Pie of total spend per subcategory of one category.
pub fn subcategory_pie(summary: &[SubcategoryTotal], category: &str) -> Value {
    pie_figure(
        summary.iter().map(|r| r.subcategory.clone()).collect(),
        summary.iter().map(|r| r.total).collect(),
        &format!("Expenses for {}", category),
    )
}

/// Bar of total spend per month (no period selected).
pub fn monthly_bar(summary: &[MonthlyTotal]) -> Value {
    bar_figure(
        summary.iter().map(|r| r.month.clone()).collect(),
        summary.iter().map(|r| r.total).collect(),
        "Monthly Expenses",
    )
}

/// Bar of per-category totals within one period.
pub fn period_bar(summary: &[CategoryTotal], period: &str) -> Value {
    bar_figure(
        summary.iter().map(|r| r.category.clone()).collect(),
        summary.iter().map(|r| r.total).collect(),
        &format!("Expenses for {}", period),
    )
}

/// Grouped mean vs median bars per category.
pub fn comparison_bars(stats: &[CategoryStats]) -> Value {
    let categories: Vec<&str> = stats.iter().map(|s| s.category.as_str()).collect();
    let means: Vec<f64> = stats.iter().map(|s| s.mean_expense).collect();
    let medians: Vec<f64> = stats.iter().map(|s| s.median_expense).collect();

    json!({
        "data": [
            {
                "type": "bar",
                "x": categories,
                "y": means,
                "name": "Mean Expense",
                "marker": { "color": "indianred" },
            },
            {
                "type": "bar",
                "x": categories,
                "y": medians,
                "name": "Median Expense",
                "marker": { "color": "lightsalmon" },
            },
        ],
        "layout": {
            "barmode": "group",
            "title": { "text": "Comparison of Mean and Median Expenses by Category" },
            "xaxis": { "title": { "text": "Category" } },
            "yaxis": { "title": { "text": "Expense (RUB)" } },
            "paper_bgcolor": CANVAS_COLOR,
            "plot_bgcolor": CANVAS_COLOR,
            "font": { "color": "white" },
            "legend": { "x": 0.9, "y": 1, "traceorder": "normal", "font": { "size": 12 } },
        },
    })
}

/// Figure served when a query fails: no traces, blank dark canvas.
pub fn empty_figure() -> Value {
    json!({
        "data": [],
        "layout": {
            "paper_bgcolor": CANVAS_COLOR,
            "plot_bgcolor": CANVAS_COLOR,
            "font": { "color": "white" },
        },
    })
}

fn pie_figure(labels: Vec<String>, values: Vec<f64>, title: &str) -> Value {
    json!({
        "data": [{
            "type": "pie",
            "labels": labels,
            "values": values,
            "hole": 0.1,
            "textinfo": "percent+label",
            "marker": { "line": { "color": SLICE_OUTLINE, "width": 0.5 } },
        }],
        "layout": {
            "title": { "text": title },
            "margin": { "t": 30, "b": 30, "l": 30, "r": 180 },
            "height": 500,
            "showlegend": true,
            "legend": {
                "orientation": "v",
                "yanchor": "top",
                "y": 1,
                "xanchor": "left",
                "x": 1.1,
                "font": { "size": 12 },
                "itemsizing": "constant",
                "title": { "text": "Categories" },
            },
            "uniformtext": { "minsize": 10, "mode": "hide" },
            "paper_bgcolor": CANVAS_COLOR,
            "font": { "color": "white" },
        },
    })
}

fn bar_figure(x: Vec<String>, y: Vec<f64>, title: &str) -> Value {
    json!({
        "data": [{ "type": "bar", "x": x, "y": y }],
        "layout": {
            "title": { "text": title },
            "paper_bgcolor": CANVAS_COLOR,
            "plot_bgcolor": CANVAS_COLOR,
            "font": { "color": "white" },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_pie_shape() {
        let summary = vec![
            CategoryTotal {
                category: "food".to_string(),
                total: 180.0,
            },
            CategoryTotal {
                category: "rent".to_string(),
                total: 900.0,
            },
        ];
        let figure = category_pie(&summary);

        assert_eq!(figure["data"][0]["type"], "pie");
        assert_eq!(figure["data"][0]["labels"], json!(["food", "rent"]));
        assert_eq!(figure["data"][0]["values"], json!([180.0, 900.0]));
        assert_eq!(figure["layout"]["title"]["text"], "Expenses by Category");
    }

    #[test]
    fn test_subcategory_pie_title_names_category() {
        let summary = vec![SubcategoryTotal {
            subcategory: "cafe".to_string(),
            total: 50.0,
        }];
        let figure = subcategory_pie(&summary, "food");
        assert_eq!(figure["layout"]["title"]["text"], "Expenses for food");
    }

    #[test]
    fn test_comparison_bars_has_two_grouped_traces() {
        let stats = vec![CategoryStats {
            category: "food".to_string(),
            mean_expense: 60.0,
            median_expense: 50.0,
        }];
        let figure = comparison_bars(&stats);

        assert_eq!(figure["data"].as_array().unwrap().len(), 2);
        assert_eq!(figure["data"][0]["name"], "Mean Expense");
        assert_eq!(figure["data"][1]["name"], "Median Expense");
        assert_eq!(figure["layout"]["barmode"], "group");
    }

    #[test]
    fn test_empty_figure_has_no_traces() {
        let figure = empty_figure();
        assert!(figure["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_monthly_bar_uses_month_labels() {
        let summary = vec![MonthlyTotal {
            month: "2024-01".to_string(),
            total: 150.0,
        }];
        let figure = monthly_bar(&summary);
        assert_eq!(figure["data"][0]["x"], json!(["2024-01"]));
        assert_eq!(figure["layout"]["title"]["text"], "Monthly Expenses");
    }
}
