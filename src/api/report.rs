use crate::api::lib::{escape_html, format_ratio};
use crate::core_logic::analysis::StockReport;
use crate::core_logic::models::Ratio;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css";

fn page_head(title: &str, max_width: u32) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link href="{css}" rel="stylesheet">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: {max_width}px; }}
        h1, h2 {{ color: #2c3e50; margin-top: 30px; }}
        .table {{ margin-bottom: 30px; }}
    </style>
</head>
"#,
        title = escape_html(title),
        css = BOOTSTRAP_CSS,
        max_width = max_width,
    )
}

fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table class=\"table table-striped\">\n    <thead>\n        <tr>\n");
    for header in headers {
        html.push_str(&format!("            <th>{}</th>\n", escape_html(header)));
    }
    html.push_str("        </tr>\n    </thead>\n    <tbody>\n");
    for row in rows {
        html.push_str("        <tr>\n");
        for cell in row {
            html.push_str(&format!("            <td>{}</td>\n", escape_html(cell)));
        }
        html.push_str("        </tr>\n");
    }
    html.push_str("    </tbody>\n</table>\n");
    html
}

pub fn home_page() -> String {
    let mut html = page_head("Stock Analysis API", 800);
    html.push_str(
        r#"<body>
    <div class="container mt-5">
        <h1 class="text-center mb-4">Stock Analysis API</h1>
        <form action="/analyze_earnings" method="get" class="mb-4">
            <div class="input-group">
                <input type="text" name="ticker" class="form-control" placeholder="Enter ticker symbol (e.g., AAPL)" required>
                <button type="submit" class="btn btn-primary">Analyze</button>
            </div>
        </form>
    </div>
</body>
</html>
"#,
    );
    html
}

pub fn render_report(report: &StockReport) -> String {
    let title = format!("Stock Analysis: {}", report.ticker);
    let mut html = page_head(&title, 1200);

    html.push_str("<body>\n<div class=\"container mt-5\">\n");
    html.push_str(&format!(
        "<h1 class=\"text-center mb-4\">{}</h1>\n",
        escape_html(&title)
    ));

    // The narrative is model-generated HTML and is embedded unescaped.
    html.push_str("<h2>Financial Analysis</h2>\n<div>");
    html.push_str(&report.narrative);
    html.push_str("</div>\n");

    html.push_str("<h2>Latest Ratios</h2>\n");
    let latest_rows: Vec<Vec<String>> = report
        .latest_ratios
        .iter()
        .map(|(ratio, value)| vec![ratio.name().to_string(), format_ratio(*value)])
        .collect();
    html.push_str(&table(
        &["Ratio".to_string(), "Value".to_string()],
        &latest_rows,
    ));

    // Columns follow the ratio names of the first dated entry.
    html.push_str("<h2>Historical Ratios</h2>\n");
    let columns: Vec<Ratio> = report
        .historical_ratios
        .entries
        .first()
        .map(|entry| entry.ratios.keys().copied().collect())
        .unwrap_or_default();
    let mut headers = vec!["Date".to_string()];
    headers.extend(columns.iter().map(|ratio| ratio.name().to_string()));
    let historical_rows: Vec<Vec<String>> = report
        .historical_ratios
        .entries
        .iter()
        .map(|entry| {
            let mut row = vec![entry.date.to_string()];
            row.extend(columns.iter().map(|ratio| {
                entry
                    .ratios
                    .get(ratio)
                    .map(|value| format_ratio(*value))
                    .unwrap_or_default()
            }));
            row
        })
        .collect();
    html.push_str(&table(&headers, &historical_rows));

    html.push_str("<h2>Ratio Trend Interpretations</h2>\n");
    let interpretation_rows: Vec<Vec<String>> = report
        .interpretations
        .iter()
        .map(|(ratio, text)| vec![ratio.name().to_string(), text.clone()])
        .collect();
    html.push_str(&table(
        &["Ratio".to_string(), "Interpretation".to_string()],
        &interpretation_rows,
    ));

    html.push_str("<h2>Stock Price Trend</h2>\n");
    html.push_str(&format!(
        "<p>{}</p>\n",
        escape_html(&report.price_interpretation)
    ));

    html.push_str("</div>\n</body>\n</html>\n");
    html
}
