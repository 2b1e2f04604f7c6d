use std::str::FromStr;

use crate::error::{DocError, DocResult};
use crate::models::amount::round_money;
use crate::models::{DocumentBody, StoredDocument};

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            other => Err(DocError::Validation(format!("unsupported export format: {}", other))),
        }
    }
}

/// 导出结果
#[derive(Debug, Clone)]
pub struct Rendered {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 将单据渲染为指定格式
pub fn render(doc: &StoredDocument, format: ExportFormat) -> DocResult<Rendered> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(&doc.body)?,
        ExportFormat::Html => to_html(&doc.body).into_bytes(),
        ExportFormat::Json => serde_json::to_vec_pretty(doc)?,
    };

    Ok(Rendered {
        content_type: format.content_type(),
        file_name: file_name(doc, format),
        bytes,
    })
}

/// 文件名: 优先使用单据编号，否则用ID
fn file_name(doc: &StoredDocument, format: ExportFormat) -> String {
    let stem = if doc.body.number().trim().is_empty() {
        doc.id.as_str()
    } else {
        doc.body.number().trim()
    };
    let safe: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}-{}.{}", doc.kind(), safe, format.extension())
}

/// 明细表 (表头, 行)
fn item_table(body: &DocumentBody) -> (Vec<&'static str>, Vec<Vec<String>>) {
    match body {
        DocumentBody::Invoice(d) => line_items(&d.items),
        DocumentBody::PurchaseOrder(d) => line_items(&d.items),
        DocumentBody::DeliveryNote(d) => (
            vec!["Description", "Quantity", "Unit", "Remarks"],
            d.items
                .iter()
                .map(|i| {
                    vec![
                        i.description.clone(),
                        i.quantity.to_string(),
                        i.unit.clone(),
                        i.remarks.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        DocumentBody::Receipt(_) => (Vec::new(), Vec::new()),
        DocumentBody::Grn(d) => (
            vec![
                "Description",
                "Ordered",
                "Received",
                "Unit",
                "Original Unit Cost",
                "Receiving Cost/Unit",
                "Unit Cost",
                "Total",
                "Batch",
                "Expiry",
                "Remarks",
            ],
            d.items
                .iter()
                .map(|i| {
                    vec![
                        i.description.clone(),
                        i.ordered_quantity.to_string(),
                        i.received_quantity.to_string(),
                        i.unit.clone(),
                        round_money(&i.base_unit_cost()).to_string(),
                        round_money(&i.receiving_cost_per_unit).to_string(),
                        round_money(&i.unit_cost).to_string(),
                        round_money(&i.total_with_receiving_cost).to_string(),
                        i.batch_number.clone().unwrap_or_default(),
                        i.expiry_date.clone().unwrap_or_default(),
                        i.remarks.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        DocumentBody::Settlement(d) => (
            vec!["Description", "Type", "Amount"],
            d.lines
                .iter()
                .map(|l| {
                    vec![
                        l.description.clone(),
                        l.kind.as_str().to_string(),
                        round_money(&l.amount).to_string(),
                    ]
                })
                .collect(),
        ),
    }
}

fn line_items(items: &[crate::models::LineItem]) -> (Vec<&'static str>, Vec<Vec<String>>) {
    (
        vec!["Description", "Quantity", "Unit", "Unit Price", "Amount"],
        items
            .iter()
            .map(|i| {
                vec![
                    i.description.clone(),
                    i.quantity.to_string(),
                    i.unit.clone(),
                    round_money(&i.unit_price).to_string(),
                    round_money(&i.amount).to_string(),
                ]
            })
            .collect(),
    )
}

/// CSV: 先写表头字段 (field,value)，空行，再写明细表
fn to_csv(body: &DocumentBody) -> DocResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(["Document", body.kind().title()])?;
    for (field, value) in body.summary() {
        writer.write_record([field, value.as_str()])?;
    }

    let (header, rows) = item_table(body);
    if !header.is_empty() {
        writer.write_record([""])?;
        writer.write_record(&header)?;
        for row in &rows {
            writer.write_record(row)?;
        }
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| DocError::Io(e.into_error()))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 可打印的 HTML 页面
fn to_html(body: &DocumentBody) -> String {
    let title = body.kind().title();
    let mut html = String::new();

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{} {}</title>\n\
         <style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse;width:100%;margin-bottom:1.5em}}\
         th,td{{border:1px solid #999;padding:4px 8px;text-align:left}}@media print{{.no-print{{display:none}}}}</style>\n\
         </head>\n<body>\n<h1>{}</h1>\n",
        escape_html(title),
        escape_html(body.number()),
        escape_html(title)
    ));

    html.push_str("<table class=\"summary\">\n");
    for (field, value) in body.summary() {
        html.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            escape_html(field),
            escape_html(&value)
        ));
    }
    html.push_str("</table>\n");

    let (header, rows) = item_table(body);
    if !header.is_empty() {
        html.push_str("<table class=\"items\">\n<tr>");
        for h in &header {
            html.push_str(&format!("<th>{}</th>", escape_html(h)));
        }
        html.push_str("</tr>\n");
        for row in &rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
