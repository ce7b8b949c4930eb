use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Caller-supplied qualitative scores, already on the 0-5 scale.
pub type QualitativeOverrides = BTreeMap<String, f64>;

/// A metric counts as known only when it is present and finite.
pub fn is_present(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v.is_finite())
}

/// The quantitative metrics the scoring engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    MarketCap,
    StockPrice,
    EpsGrowth5y,
    Roe,
    Roce,
    OperatingMargin,
    NetMargin,
    DeRatio,
    InterestCoverage,
    CurrentRatio,
    FreeCashFlow,
    RevenueGrowth5y,
    ProfitGrowth5y,
    CashFlowGrowth,
    PeRatio,
    PegRatio,
    PbRatio,
    EvEbitda,
    Liquidity,
    PromoterHolding,
    PromoterHoldingGrowth,
}

impl Metric {
    pub const ALL: [Metric; 21] = [
        Metric::MarketCap,
        Metric::StockPrice,
        Metric::EpsGrowth5y,
        Metric::Roe,
        Metric::Roce,
        Metric::OperatingMargin,
        Metric::NetMargin,
        Metric::DeRatio,
        Metric::InterestCoverage,
        Metric::CurrentRatio,
        Metric::FreeCashFlow,
        Metric::RevenueGrowth5y,
        Metric::ProfitGrowth5y,
        Metric::CashFlowGrowth,
        Metric::PeRatio,
        Metric::PegRatio,
        Metric::PbRatio,
        Metric::EvEbitda,
        Metric::Liquidity,
        Metric::PromoterHolding,
        Metric::PromoterHoldingGrowth,
    ];

    /// Stable snake_case name, used as breakdown key and export column.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::MarketCap => "market_cap",
            Metric::StockPrice => "stock_price",
            Metric::EpsGrowth5y => "eps_growth_5y",
            Metric::Roe => "roe",
            Metric::Roce => "roce",
            Metric::OperatingMargin => "operating_margin",
            Metric::NetMargin => "net_margin",
            Metric::DeRatio => "de_ratio",
            Metric::InterestCoverage => "interest_coverage",
            Metric::CurrentRatio => "current_ratio",
            Metric::FreeCashFlow => "free_cash_flow",
            Metric::RevenueGrowth5y => "revenue_growth_5y",
            Metric::ProfitGrowth5y => "profit_growth_5y",
            Metric::CashFlowGrowth => "cash_flow_growth",
            Metric::PeRatio => "pe_ratio",
            Metric::PegRatio => "peg_ratio",
            Metric::PbRatio => "pb_ratio",
            Metric::EvEbitda => "ev_ebitda",
            Metric::Liquidity => "liquidity",
            Metric::PromoterHolding => "promoter_holding",
            Metric::PromoterHoldingGrowth => "promoter_holding_growth",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.name() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Financial metrics for one instrument. `None` means unknown, never zero.
///
/// Fractional fields (growth rates, margins, returns) are decimals: 0.15 is 15%.
/// `promoter_holding` is already in percentage points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsRecord {
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub stock_price: Option<f64>,
    #[serde(default)]
    pub eps_growth_5y: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub roce: Option<f64>,
    #[serde(default)]
    pub operating_margin: Option<f64>,
    #[serde(default)]
    pub net_margin: Option<f64>,
    #[serde(default)]
    pub de_ratio: Option<f64>,
    #[serde(default)]
    pub interest_coverage: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub free_cash_flow: Option<f64>,
    #[serde(default)]
    pub revenue_growth_5y: Option<f64>,
    #[serde(default)]
    pub profit_growth_5y: Option<f64>,
    /// Not populated by any known data source yet; always scores 0.
    #[serde(default)]
    pub cash_flow_growth: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub peg_ratio: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub ev_ebitda: Option<f64>,
    #[serde(default)]
    pub liquidity: Option<f64>,
    #[serde(default)]
    pub promoter_holding: Option<f64>,
    #[serde(default)]
    pub promoter_holding_growth: Option<f64>,
}

impl MetricsRecord {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::MarketCap => self.market_cap,
            Metric::StockPrice => self.stock_price,
            Metric::EpsGrowth5y => self.eps_growth_5y,
            Metric::Roe => self.roe,
            Metric::Roce => self.roce,
            Metric::OperatingMargin => self.operating_margin,
            Metric::NetMargin => self.net_margin,
            Metric::DeRatio => self.de_ratio,
            Metric::InterestCoverage => self.interest_coverage,
            Metric::CurrentRatio => self.current_ratio,
            Metric::FreeCashFlow => self.free_cash_flow,
            Metric::RevenueGrowth5y => self.revenue_growth_5y,
            Metric::ProfitGrowth5y => self.profit_growth_5y,
            Metric::CashFlowGrowth => self.cash_flow_growth,
            Metric::PeRatio => self.pe_ratio,
            Metric::PegRatio => self.peg_ratio,
            Metric::PbRatio => self.pb_ratio,
            Metric::EvEbitda => self.ev_ebitda,
            Metric::Liquidity => self.liquidity,
            Metric::PromoterHolding => self.promoter_holding,
            Metric::PromoterHoldingGrowth => self.promoter_holding_growth,
        }
    }

    /// Known (present and finite) value of a metric.
    pub fn known(&self, metric: Metric) -> Option<f64> {
        self.get(metric).filter(|v| v.is_finite())
    }

    /// Metrics that are absent or non-finite.
    pub fn missing(&self) -> Vec<Metric> {
        Metric::ALL
            .iter()
            .copied()
            .filter(|m| !is_present(self.get(*m)))
            .collect()
    }
}

/// One instrument as handed over by the data fetcher.
///
/// Metrics come either under `metrics`, which rejects unknown keys, or under
/// `quantitative`, the fetcher's raw dump, where keys outside the 21 scored
/// metrics (and non-numeric values) are skipped with a warning.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawStockRecord")]
pub struct StockRecord {
    pub symbol: String,
    pub metrics: MetricsRecord,
    pub qualitative: QualitativeOverrides,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStockRecord {
    symbol: String,
    #[serde(default)]
    metrics: Option<MetricsRecord>,
    #[serde(default)]
    quantitative: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    qualitative: QualitativeOverrides,
}

impl TryFrom<RawStockRecord> for StockRecord {
    type Error = String;

    fn try_from(raw: RawStockRecord) -> Result<Self, Self::Error> {
        let metrics = match (raw.metrics, raw.quantitative) {
            (Some(_), Some(_)) => {
                return Err(format!(
                    "{}: give either `metrics` or `quantitative`, not both",
                    raw.symbol
                ))
            }
            (Some(metrics), None) => metrics,
            (None, Some(dump)) => metrics_from_dump(&raw.symbol, dump)?,
            (None, None) => MetricsRecord::default(),
        };
        Ok(Self {
            symbol: raw.symbol,
            metrics,
            qualitative: raw.qualitative,
        })
    }
}

/// Keep the scored metrics of a raw fetcher dump, skipping everything else.
fn metrics_from_dump(
    symbol: &str,
    dump: BTreeMap<String, serde_json::Value>,
) -> Result<MetricsRecord, String> {
    let mut kept = serde_json::Map::new();
    let mut skipped = Vec::new();
    for (key, value) in dump {
        if Metric::from_name(&key).is_some() && (value.is_number() || value.is_null()) {
            kept.insert(key, value);
        } else {
            skipped.push(key);
        }
    }
    if !skipped.is_empty() {
        warn!(%symbol, skipped = %skipped.join(", "), "ignoring unscored quantitative keys");
    }
    serde_json::from_value(serde_json::Value::Object(kept))
        .map_err(|e| format!("{}: invalid quantitative metrics: {}", symbol, e))
}

impl StockRecord {
    pub fn new(symbol: impl Into<String>, metrics: MetricsRecord) -> Self {
        Self {
            symbol: symbol.into(),
            metrics,
            qualitative: QualitativeOverrides::new(),
        }
    }
}
