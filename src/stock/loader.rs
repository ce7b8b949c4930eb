use super::types::StockRecord;
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Input formats understood by `load_stocks`, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("yaml") | Some("yml") => Ok(InputFormat::Yaml),
            _ => bail!(
                "Unsupported input file {}: expected .json, .yaml or .yml",
                path.display()
            ),
        }
    }
}

/// Parse a list of stock records from text.
pub fn parse_stocks(content: &str, format: InputFormat) -> Result<Vec<StockRecord>> {
    let stocks: Vec<StockRecord> = match format {
        InputFormat::Json => serde_json::from_str(content).context("Invalid JSON stock list")?,
        InputFormat::Yaml => serde_saphyr::from_str(content).context("Invalid YAML stock list")?,
    };
    Ok(stocks)
}

/// Load stock records from a JSON or YAML file.
///
/// Records with an empty symbol are rejected. Duplicate symbols are kept
/// as-is; `screen_stocks` drops them.
pub fn load_stocks(path: &Path) -> Result<Vec<StockRecord>> {
    let format = InputFormat::from_path(path)?;

    if !path.exists() {
        bail!("Input file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file at {}", path.display()))?;

    let stocks = parse_stocks(&content, format)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if let Some(idx) = stocks.iter().position(|s| s.symbol.trim().is_empty()) {
        bail!("Record {} in {} has an empty symbol", idx + 1, path.display());
    }

    debug!(count = stocks.len(), path = %path.display(), "loaded stock records");
    Ok(stocks)
}

/// Drop later records whose symbol was already seen.
pub fn dedupe_stocks(stocks: Vec<StockRecord>) -> Vec<StockRecord> {
    let mut seen = HashSet::new();
    stocks
        .into_iter()
        .filter(|stock| {
            let fresh = seen.insert(stock.symbol.clone());
            if !fresh {
                warn!(symbol = %stock.symbol, "duplicate symbol, keeping first record");
            }
            fresh
        })
        .collect()
}
