use crate::config::PennyCriteria;
use crate::scoring::{calculate_score, validate_qualitative, ScoreResult};
use crate::stock::{dedupe_stocks, Metric, StockRecord};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// A scored instrument ready for display or export.
#[derive(Debug, Clone)]
pub struct ScreenedStock {
    pub stock: StockRecord,
    pub result: ScoreResult,
    pub is_penny: bool,
}

/// Penny-stock test: cheap, small and promoter-controlled. Any of the three
/// metrics being unknown disqualifies the instrument.
pub fn is_penny_stock(stock: &StockRecord, criteria: &PennyCriteria) -> bool {
    let metrics = &stock.metrics;
    let (Some(price), Some(market_cap), Some(promoter)) = (
        metrics.known(Metric::StockPrice),
        metrics.known(Metric::MarketCap),
        metrics.known(Metric::PromoterHolding),
    ) else {
        return false;
    };

    price < criteria.max_price
        && market_cap < criteria.max_market_cap
        && promoter > criteria.min_promoter_holding
}

/// Deduplicate, score and classify every stock, then sort by percentage score
/// descending with symbol ascending as tie-breaker.
///
/// With `penny_only` set, instruments failing the penny-stock test are dropped.
pub fn screen_stocks(
    stocks: Vec<StockRecord>,
    criteria: &PennyCriteria,
    penny_only: bool,
) -> Vec<ScreenedStock> {
    let mut screened: Vec<ScreenedStock> = dedupe_stocks(stocks)
        .into_iter()
        .filter_map(|stock| {
            if let Err(problems) = validate_qualitative(&stock.symbol, &stock.qualitative) {
                for problem in problems {
                    warn!("{}", problem);
                }
            }

            let is_penny = is_penny_stock(&stock, criteria);
            if penny_only && !is_penny {
                debug!(symbol = %stock.symbol, "skipped, not a penny stock");
                return None;
            }

            let result = calculate_score(&stock.metrics, &stock.qualitative);
            debug!(
                symbol = %stock.symbol,
                total = result.total,
                percentage = result.percentage,
                penny = is_penny,
                "scored"
            );
            Some(ScreenedStock {
                stock,
                result,
                is_penny,
            })
        })
        .collect();

    screened.sort_by(rank_order);
    screened
}

/// Total order: finite scores descending, non-finite scores last, then symbol.
fn rank_order(a: &ScreenedStock, b: &ScreenedStock) -> Ordering {
    let (pa, pb) = (a.result.percentage, b.result.percentage);
    pb.is_finite()
        .cmp(&pa.is_finite())
        .then_with(|| pb.total_cmp(&pa))
        .then_with(|| a.stock.symbol.cmp(&b.stock.symbol))
}
