use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::screen::ScreenedStock;
use crate::stock::Metric;

/// Market cap is reported in crore (1e7) in exported rows.
const CRORE: f64 = 1e7;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    fn number(value: Option<f64>) -> Cell {
        match value {
            Some(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Empty,
        }
    }

    fn to_csv_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Empty => String::new(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Empty => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cell: Cell,
    /// Per-factor score column (name carries the export suffix).
    pub is_factor: bool,
}

/// One flat exported record: summary, raw metrics, then factor scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRow {
    pub columns: Vec<Column>,
}

impl ExportRow {
    fn push(&mut self, name: impl Into<String>, cell: Cell, is_factor: bool) {
        self.columns.push(Column {
            name: name.into(),
            cell,
            is_factor,
        });
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.cell)
    }
}

pub fn build_row(screened: &ScreenedStock, suffix: &str) -> ExportRow {
    let metrics = &screened.stock.metrics;
    let mut row = ExportRow::default();

    row.push("Symbol", Cell::Text(screened.stock.symbol.clone()), false);
    row.push("Price", Cell::number(metrics.known(Metric::StockPrice)), false);
    row.push(
        "Market Cap (Cr)",
        Cell::number(metrics.known(Metric::MarketCap).map(|m| m / CRORE)),
        false,
    );
    row.push("Score (%)", Cell::Number(screened.result.percentage), false);
    row.push("Penny_stock", Cell::Bool(screened.is_penny), false);

    for metric in Metric::ALL {
        row.push(metric.name(), Cell::number(metrics.get(metric)), false);
    }

    for factor in &screened.result.breakdown.factors {
        row.push(
            format!("{}{}", factor.name, suffix),
            Cell::number(Some(factor.score)),
            true,
        );
    }

    row
}

pub fn build_rows(stocks: &[ScreenedStock], suffix: &str) -> Vec<ExportRow> {
    stocks.iter().map(|s| build_row(s, suffix)).collect()
}

/// Render rows as CSV. The header is the union of all column names in
/// first-seen order; rows lacking a column get an empty cell.
pub fn render_csv(rows: &[ExportRow]) -> Result<String> {
    let mut header: Vec<&str> = Vec::new();
    for row in rows {
        for column in &row.columns {
            if !header.contains(&column.name.as_str()) {
                header.push(&column.name);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    if !header.is_empty() {
        writer.write_record(&header).context("Failed to write CSV header")?;
    }
    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|name| row.get(name).map(Cell::to_csv_field).unwrap_or_default())
            .collect();
        writer.write_record(&record).context("Failed to write CSV row")?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Render rows as a JSON array of objects, leaving out per-factor columns.
pub fn render_json(rows: &[ExportRow]) -> Result<String> {
    let records: Vec<Value> = rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = row
                .columns
                .iter()
                .filter(|c| !c.is_factor)
                .map(|c| (c.name.clone(), c.cell.to_json()))
                .collect();
            Value::Object(object)
        })
        .collect();

    serde_json::to_string_pretty(&records).context("Failed to serialize export rows")
}

/// Default export file name, stamped with the given date:
/// `penny_stock_scores_<dd_mm_yy>.csv` (or `.json`).
pub fn default_export_path(date: NaiveDate, json: bool) -> PathBuf {
    let ext = if json { "json" } else { "csv" };
    PathBuf::from(format!(
        "penny_stock_scores_{}.{}",
        date.format("%d_%m_%y"),
        ext
    ))
}

/// Write export contents atomically, so a failed run never leaves a
/// half-written file behind.
pub fn write_export(path: &Path, contents: &str) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save export to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PennyCriteria;
    use crate::screen::screen_stocks;
    use crate::stock::{MetricsRecord, StockRecord};
    use std::env;
    use std::fs;

    fn sample_screened() -> Vec<ScreenedStock> {
        let stock = StockRecord::new(
            "ABC.NS",
            MetricsRecord {
                market_cap: Some(2e9),
                stock_price: Some(40.0),
                promoter_holding: Some(60.0),
                roe: Some(0.18),
                ..Default::default()
            },
        );
        screen_stocks(vec![stock], &PennyCriteria::default(), false)
    }

    #[test]
    fn test_build_row_columns() {
        let rows = build_rows(&sample_screened(), " (s)");
        let row = &rows[0];

        // 5 summary + 21 metrics + 21 factors
        assert_eq!(row.columns.len(), 47);
        assert_eq!(row.columns[0].name, "Symbol");
        assert_eq!(row.get("Market Cap (Cr)"), Some(&Cell::Number(200.0)));
        assert_eq!(row.get("Penny_stock"), Some(&Cell::Bool(true)));
        assert_eq!(row.get("roe"), Some(&Cell::Number(0.18)));
        assert_eq!(row.get("pe_ratio"), Some(&Cell::Empty));
        assert_eq!(row.get("roe (s)"), Some(&Cell::Number(5.0)));
        assert_eq!(row.get("pe_ratio (s)"), Some(&Cell::Number(0.0)));
        assert_eq!(row.columns.iter().filter(|c| c.is_factor).count(), 21);
    }

    #[test]
    fn test_render_csv() {
        let rows = build_rows(&sample_screened(), " (s)");
        let csv = render_csv(&rows).unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("Symbol,Price,Market Cap (Cr),Score (%),Penny_stock,market_cap"));
        assert!(header.ends_with("promoter_holding_growth (s)"));

        let first = lines.next().unwrap();
        assert!(first.starts_with("ABC.NS,40,200,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_render_csv_union_header() {
        let mut short = ExportRow::default();
        short.push("Symbol", Cell::Text("A".to_string()), false);
        let mut long = ExportRow::default();
        long.push("Symbol", Cell::Text("B".to_string()), false);
        long.push("Error", Cell::Text("timeout".to_string()), false);

        let csv = render_csv(&[short, long]).unwrap();
        assert_eq!(csv, "Symbol,Error\nA,\nB,timeout\n");
    }

    #[test]
    fn test_render_csv_empty() {
        assert_eq!(render_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_render_json_drops_factor_columns() {
        let rows = build_rows(&sample_screened(), " (s)");
        let json = render_json(&rows).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        let records = parsed.as_array().unwrap();
        assert_eq!(records.len(), 1);
        let record = records[0].as_object().unwrap();
        assert_eq!(record.len(), 26);
        assert_eq!(record["Symbol"], Value::String("ABC.NS".to_string()));
        assert_eq!(record["Penny_stock"], Value::Bool(true));
        assert_eq!(record["pe_ratio"], Value::Null);
        assert!(!record.contains_key("roe (s)"));
    }

    #[test]
    fn test_default_export_path() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(
            default_export_path(date, false),
            PathBuf::from("penny_stock_scores_07_03_25.csv")
        );
        assert_eq!(
            default_export_path(date, true),
            PathBuf::from("penny_stock_scores_07_03_25.json")
        );
    }

    #[test]
    fn test_write_export() {
        let path = env::temp_dir().join("penny_scan_test_export.csv");
        let _ = fs::remove_file(&path);

        write_export(&path, "Symbol\nABC.NS\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Symbol\nABC.NS\n");

        let _ = fs::remove_file(&path);
    }
}
