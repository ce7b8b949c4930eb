use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::scoring::{FactorKind, FactorScore, FACTOR_TABLE};
use crate::screen::ScreenedStock;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a percentage score with one decimal ("28.6%").
/// If incomplete is true, appends asterisk to indicate defaulted metrics
pub fn format_score(percentage: f64, incomplete: bool) -> String {
    let formatted = format!("{:.1}%", percentage);
    if incomplete {
        format!("{}*", formatted)
    } else {
        formatted
    }
}

/// Format screened stocks as ranked table: Index, Score, Symbol, penny marker
/// No headers.
/// Index column: 3 chars (fits "99."), right-aligned
/// Score column is right-aligned, 7 chars wide (fits "100.0%*")
pub fn format_scored_table(stocks: &[ScreenedStock], use_colors: bool) -> String {
    if stocks.is_empty() {
        return "No stocks found.".to_string();
    }

    let score_width = 7;
    let separator = "  ";

    stocks
        .iter()
        .enumerate()
        .map(|(idx, screened)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format_score(screened.result.percentage, screened.result.incomplete);
            let score_padded = format!("{:>width$}", score_str, width = score_width);
            let symbol = &screened.stock.symbol;

            let mut line = if use_colors {
                format!(
                    "{} {}{}{}",
                    index_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    symbol.cyan()
                )
            } else {
                format!("{} {}{}{}", index_str, score_padded, separator, symbol)
            };
            if screened.is_penny {
                line.push_str(separator);
                if use_colors {
                    line.push_str(&"PENNY".yellow().to_string());
                } else {
                    line.push_str("PENNY");
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format screened stocks as tab-separated values for scripting
/// Columns: percentage, total, symbol, penny (no headers, no colors)
pub fn format_tsv(stocks: &[ScreenedStock]) -> String {
    stocks
        .iter()
        .map(|s| {
            format!(
                "{:.2}\t{}\t{}\t{}",
                s.result.percentage, s.result.total, s.stock.symbol, s.is_penny
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line breakdown of one stock's score.
pub fn format_stock_detail(screened: &ScreenedStock, use_colors: bool) -> String {
    let result = &screened.result;
    let name_width = result
        .breakdown
        .factors
        .iter()
        .map(|f| f.name.len())
        .max()
        .unwrap_or(0);

    let header = format!(
        "Score: {}/{} ({})",
        result.total,
        result.breakdown.max_possible(),
        format_score(result.percentage, result.incomplete)
    );
    let penny = format!("Penny stock: {}", if screened.is_penny { "yes" } else { "no" });

    let mut lines = Vec::with_capacity(result.breakdown.len() + 3);
    if use_colors {
        lines.push(screened.stock.symbol.bold().to_string());
        lines.push(format!("  {}", header.bold()));
    } else {
        lines.push(screened.stock.symbol.clone());
        lines.push(format!("  {}", header));
    }
    lines.push(format!("  {}", penny));

    for factor in &result.breakdown.factors {
        lines.push(format_factor_line(factor, name_width, use_colors));
    }

    if result.incomplete {
        lines.push("  * some metrics were missing and scored from defaults".to_string());
    }

    lines.join("\n")
}

fn format_factor_line(factor: &FactorScore, name_width: usize, use_colors: bool) -> String {
    let name = format!("{:<width$}", factor.name, width = name_width);
    let score = format!("{:>4}", factor.score);
    let tag = match factor.kind {
        FactorKind::Quantitative => "",
        FactorKind::Qualitative => " [q]",
    };

    if !use_colors {
        return format!("    {}  {}  {}{}", name, score, factor.description, tag);
    }

    let score = if factor.score >= 5.0 {
        score.green().to_string()
    } else if factor.score > 0.0 {
        score.yellow().to_string()
    } else {
        score.red().to_string()
    };
    if factor.defaulted {
        format!("    {}  {}  {}{}", name.dimmed(), score, factor.description.dimmed(), tag)
    } else {
        format!("    {}  {}  {}{}", name, score, factor.description, tag)
    }
}

/// Reference listing of the scoring table.
pub fn format_factor_table() -> String {
    let name_width = FACTOR_TABLE
        .iter()
        .map(|r| r.metric.name().len())
        .max()
        .unwrap_or(0);

    FACTOR_TABLE
        .iter()
        .map(|rule| {
            format!(
                "{:<width$}  default {:<5}  {}",
                rule.metric.name(),
                rule.default,
                rule.describe_tiers(),
                width = name_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
