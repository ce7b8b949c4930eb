use crate::stock::types::{is_present, Metric};
use std::fmt;

/// Strict comparison against a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeOp {
    LessThan(f64),
    GreaterThan(f64),
    Equal(f64),
}

impl RangeOp {
    /// Compare `value` against the threshold divided by `scale`.
    ///
    /// Percentage thresholds are written in percent (15 for 15%) while the
    /// metric is a fraction, so they are scaled down instead of scaling the
    /// value up. `15.0 / 100.0` rounds to the same double as the literal
    /// `0.15`, which keeps the boundaries exact for decimal inputs.
    pub fn matches(&self, value: f64, scale: f64) -> bool {
        match *self {
            RangeOp::LessThan(n) => value < n / scale,
            RangeOp::GreaterThan(n) => value > n / scale,
            RangeOp::Equal(n) => value == n / scale,
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeOp::LessThan(n) => write!(f, "<{}", n),
            RangeOp::GreaterThan(n) => write!(f, ">{}", n),
            RangeOp::Equal(n) => write!(f, "=={}", n),
        }
    }
}

/// How a metric's thresholds are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Thresholds are in the metric's own unit.
    Absolute,
    /// Metric is a fraction, thresholds are in percent.
    Percent,
}

impl Unit {
    pub fn scale(&self) -> f64 {
        match self {
            Unit::Absolute => 1.0,
            Unit::Percent => 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub op: RangeOp,
    pub score: u8,
}

const fn lt(n: f64, score: u8) -> Tier {
    Tier { op: RangeOp::LessThan(n), score }
}

const fn gt(n: f64, score: u8) -> Tier {
    Tier { op: RangeOp::GreaterThan(n), score }
}

const fn eq(n: f64, score: u8) -> Tier {
    Tier { op: RangeOp::Equal(n), score }
}

/// Step function for one quantitative factor. Tiers are checked in order and
/// the first match wins; no match scores 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorRule {
    pub metric: Metric,
    /// Substituted when the metric is absent or non-finite.
    pub default: f64,
    pub unit: Unit,
    pub tiers: &'static [Tier],
}

/// Outcome of running one rule against one (possibly missing) metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub defaulted: bool,
    pub score: u8,
    pub matched: Option<Tier>,
}

impl FactorRule {
    pub fn tier_for(&self, value: f64) -> Option<Tier> {
        let scale = self.unit.scale();
        self.tiers.iter().copied().find(|t| t.op.matches(value, scale))
    }

    pub fn score_value(&self, value: f64) -> u8 {
        self.tier_for(value).map(|t| t.score).unwrap_or(0)
    }

    pub fn evaluate(&self, raw: Option<f64>) -> Evaluation {
        let (value, defaulted) = match raw {
            Some(v) if is_present(raw) => (v, false),
            _ => (self.default, true),
        };
        let matched = self.tier_for(value);
        Evaluation {
            value,
            defaulted,
            score: matched.map(|t| t.score).unwrap_or(0),
            matched,
        }
    }

    /// Every score this factor can produce, highest first.
    pub fn possible_scores(&self) -> Vec<u8> {
        let mut scores: Vec<u8> = self.tiers.iter().map(|t| t.score).collect();
        scores.push(0);
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores.dedup();
        scores
    }

    /// Tier list as text, e.g. "<0.5 -> 5, <1 -> 3, else 0".
    pub fn describe_tiers(&self) -> String {
        let suffix = match self.unit {
            Unit::Percent => "%",
            Unit::Absolute => "",
        };
        let mut parts: Vec<String> = self
            .tiers
            .iter()
            .map(|t| format!("{}{} -> {}", t.op, suffix, t.score))
            .collect();
        parts.push("else 0".to_string());
        parts.join(", ")
    }
}

/// Scoring table. One entry per quantitative factor, in breakdown order.
pub static FACTOR_TABLE: [FactorRule; 21] = [
    // Company size and stage. Unknown size defaults to the best tier.
    FactorRule {
        metric: Metric::MarketCap,
        default: 0.0,
        unit: Unit::Absolute,
        tiers: &[lt(100e9, 5), lt(500e9, 4), lt(2000e9, 3), lt(5000e9, 2)],
    },
    FactorRule {
        metric: Metric::StockPrice,
        default: 0.0,
        unit: Unit::Absolute,
        tiers: &[lt(500.0, 5), lt(1000.0, 4), lt(2000.0, 3)],
    },
    // Financial health
    FactorRule {
        metric: Metric::EpsGrowth5y,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(20.0, 5), gt(10.0, 3)],
    },
    FactorRule {
        metric: Metric::Roe,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(15.0, 5), gt(10.0, 3)],
    },
    FactorRule {
        metric: Metric::Roce,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(15.0, 5), gt(10.0, 3)],
    },
    FactorRule {
        metric: Metric::OperatingMargin,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(20.0, 5), gt(10.0, 3)],
    },
    FactorRule {
        metric: Metric::NetMargin,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(15.0, 5), gt(7.0, 3)],
    },
    FactorRule {
        metric: Metric::DeRatio,
        default: f64::INFINITY,
        unit: Unit::Absolute,
        tiers: &[lt(0.5, 5), lt(1.0, 3)],
    },
    FactorRule {
        metric: Metric::InterestCoverage,
        default: 0.0,
        unit: Unit::Absolute,
        tiers: &[gt(3.0, 5), gt(1.5, 3)],
    },
    FactorRule {
        metric: Metric::CurrentRatio,
        default: 0.0,
        unit: Unit::Absolute,
        tiers: &[gt(1.5, 5), gt(1.2, 3)],
    },
    FactorRule {
        metric: Metric::FreeCashFlow,
        default: 0.0,
        unit: Unit::Absolute,
        tiers: &[gt(0.0, 5)],
    },
    // Growth
    FactorRule {
        metric: Metric::RevenueGrowth5y,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(15.0, 5), gt(10.0, 3)],
    },
    FactorRule {
        metric: Metric::ProfitGrowth5y,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(20.0, 5), gt(10.0, 3)],
    },
    FactorRule {
        metric: Metric::CashFlowGrowth,
        default: 0.0,
        unit: Unit::Percent,
        tiers: &[gt(15.0, 5), gt(10.0, 3)],
    },
    // Valuation. Unknown ratios default to the bottom tier.
    FactorRule {
        metric: Metric::PeRatio,
        default: f64::INFINITY,
        unit: Unit::Absolute,
        tiers: &[lt(15.0, 5), lt(25.0, 3)],
    },
    FactorRule {
        metric: Metric::PegRatio,
        default: f64::INFINITY,
        unit: Unit::Absolute,
        tiers: &[lt(1.0, 5), lt(2.0, 3)],
    },
    FactorRule {
        metric: Metric::PbRatio,
        default: f64::INFINITY,
        unit: Unit::Absolute,
        tiers: &[lt(1.5, 5), lt(2.5, 3)],
    },
    FactorRule {
        metric: Metric::EvEbitda,
        default: f64::INFINITY,
        unit: Unit::Absolute,
        tiers: &[lt(10.0, 5), lt(15.0, 3)],
    },
    // Market and ownership
    FactorRule {
        metric: Metric::Liquidity,
        default: 0.0,
        unit: Unit::Absolute,
        tiers: &[gt(100_000.0, 5), gt(50_000.0, 3)],
    },
    FactorRule {
        metric: Metric::PromoterHolding,
        default: 0.0,
        unit: Unit::Absolute,
        tiers: &[gt(50.0, 5), gt(30.0, 3)],
    },
    // A reported flat holding (exactly 0) earns 3; an unknown delta earns nothing.
    FactorRule {
        metric: Metric::PromoterHoldingGrowth,
        default: f64::NEG_INFINITY,
        unit: Unit::Absolute,
        tiers: &[gt(0.0, 5), eq(0.0, 3)],
    },
];

/// Rule for a metric.
pub fn rule_for(metric: Metric) -> &'static FactorRule {
    // Table order follows Metric::ALL.
    &FACTOR_TABLE[metric as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(metric: Metric, value: f64) -> u8 {
        rule_for(metric).score_value(value)
    }

    #[test]
    fn test_table_covers_every_metric_in_order() {
        assert_eq!(FACTOR_TABLE.len(), Metric::ALL.len());
        for (rule, metric) in FACTOR_TABLE.iter().zip(Metric::ALL) {
            assert_eq!(rule.metric, metric);
            assert_eq!(rule_for(metric).metric, metric);
        }
    }

    #[test]
    fn test_range_op_less_than() {
        let op = RangeOp::LessThan(0.5);
        assert!(op.matches(0.49999, 1.0));
        assert!(!op.matches(0.5, 1.0));
        assert!(!op.matches(f64::INFINITY, 1.0));
    }

    #[test]
    fn test_range_op_greater_than_scaled() {
        let op = RangeOp::GreaterThan(15.0);
        assert!(!op.matches(0.15, 100.0));
        assert!(op.matches(0.1501, 100.0));
    }

    #[test]
    fn test_range_op_equal() {
        let op = RangeOp::Equal(0.0);
        assert!(op.matches(0.0, 1.0));
        assert!(op.matches(-0.0, 1.0));
        assert!(!op.matches(0.001, 1.0));
    }

    #[test]
    fn test_range_op_display() {
        assert_eq!(RangeOp::LessThan(0.5).to_string(), "<0.5");
        assert_eq!(RangeOp::GreaterThan(100000.0).to_string(), ">100000");
        assert_eq!(RangeOp::Equal(0.0).to_string(), "==0");
    }

    #[test]
    fn test_market_cap_tiers() {
        assert_eq!(score(Metric::MarketCap, 0.0), 5);
        assert_eq!(score(Metric::MarketCap, 99.9e9), 5);
        assert_eq!(score(Metric::MarketCap, 100e9), 4);
        assert_eq!(score(Metric::MarketCap, 500e9), 3);
        assert_eq!(score(Metric::MarketCap, 2000e9), 2);
        assert_eq!(score(Metric::MarketCap, 4999e9), 2);
        assert_eq!(score(Metric::MarketCap, 5000e9), 0);
    }

    #[test]
    fn test_stock_price_tiers() {
        assert_eq!(score(Metric::StockPrice, 499.99), 5);
        assert_eq!(score(Metric::StockPrice, 500.0), 4);
        assert_eq!(score(Metric::StockPrice, 1000.0), 3);
        assert_eq!(score(Metric::StockPrice, 1999.0), 3);
        assert_eq!(score(Metric::StockPrice, 2000.0), 0);
    }

    #[test]
    fn test_percentage_boundaries_are_strict() {
        let cases = [
            (Metric::EpsGrowth5y, 0.20, 0.10),
            (Metric::Roe, 0.15, 0.10),
            (Metric::Roce, 0.15, 0.10),
            (Metric::OperatingMargin, 0.20, 0.10),
            (Metric::NetMargin, 0.15, 0.07),
            (Metric::RevenueGrowth5y, 0.15, 0.10),
            (Metric::ProfitGrowth5y, 0.20, 0.10),
            (Metric::CashFlowGrowth, 0.15, 0.10),
        ];
        for (metric, top, mid) in cases {
            assert_eq!(score(metric, top), 3, "{} at top boundary", metric);
            assert_eq!(score(metric, top + 0.0001), 5, "{} above top", metric);
            assert_eq!(score(metric, mid), 0, "{} at mid boundary", metric);
            assert_eq!(score(metric, mid + 0.0001), 3, "{} above mid", metric);
        }
    }

    #[test]
    fn test_lower_is_better_boundaries_are_strict() {
        let cases = [
            (Metric::DeRatio, 0.5, 1.0),
            (Metric::PeRatio, 15.0, 25.0),
            (Metric::PegRatio, 1.0, 2.0),
            (Metric::PbRatio, 1.5, 2.5),
            (Metric::EvEbitda, 10.0, 15.0),
        ];
        for (metric, top, mid) in cases {
            assert_eq!(score(metric, top - 0.00001), 5, "{} below top", metric);
            assert_eq!(score(metric, top), 3, "{} at top boundary", metric);
            assert_eq!(score(metric, mid - 0.00001), 3, "{} below mid", metric);
            assert_eq!(score(metric, mid), 0, "{} at mid boundary", metric);
        }
    }

    #[test]
    fn test_absolute_higher_is_better_boundaries() {
        let cases = [
            (Metric::InterestCoverage, 3.0, 1.5),
            (Metric::CurrentRatio, 1.5, 1.2),
            (Metric::Liquidity, 100_000.0, 50_000.0),
            (Metric::PromoterHolding, 50.0, 30.0),
        ];
        for (metric, top, mid) in cases {
            assert_eq!(score(metric, top), 3, "{} at top boundary", metric);
            assert_eq!(score(metric, top + 0.001), 5, "{} above top", metric);
            assert_eq!(score(metric, mid), 0, "{} at mid boundary", metric);
            assert_eq!(score(metric, mid + 0.001), 3, "{} above mid", metric);
        }
    }

    #[test]
    fn test_binary_factors() {
        assert_eq!(score(Metric::FreeCashFlow, 0.0), 0);
        assert_eq!(score(Metric::FreeCashFlow, -1e6), 0);
        assert_eq!(score(Metric::FreeCashFlow, 1.0), 5);

        assert_eq!(score(Metric::PromoterHoldingGrowth, 0.5), 5);
        assert_eq!(score(Metric::PromoterHoldingGrowth, 0.0), 3);
        assert_eq!(score(Metric::PromoterHoldingGrowth, -0.5), 0);
    }

    #[test]
    fn test_evaluate_substitutes_default() {
        let de = rule_for(Metric::DeRatio);
        let eval = de.evaluate(None);
        assert!(eval.defaulted);
        assert_eq!(eval.value, f64::INFINITY);
        assert_eq!(eval.score, 0);
        assert!(eval.matched.is_none());

        let eval = de.evaluate(Some(f64::NAN));
        assert!(eval.defaulted);
        assert_eq!(eval.score, 0);

        let eval = de.evaluate(Some(0.3));
        assert!(!eval.defaulted);
        assert_eq!(eval.score, 5);
        assert_eq!(eval.matched, Some(lt(0.5, 5)));
    }

    #[test]
    fn test_evaluate_missing_size_scores_best_tier() {
        assert_eq!(rule_for(Metric::MarketCap).evaluate(None).score, 5);
        assert_eq!(rule_for(Metric::StockPrice).evaluate(Some(f64::NAN)).score, 5);
    }

    #[test]
    fn test_evaluate_missing_promoter_growth_scores_zero() {
        let eval = rule_for(Metric::PromoterHoldingGrowth).evaluate(None);
        assert!(eval.defaulted);
        assert_eq!(eval.score, 0);
    }

    #[test]
    fn test_possible_scores() {
        assert_eq!(rule_for(Metric::MarketCap).possible_scores(), vec![5, 4, 3, 2, 0]);
        assert_eq!(rule_for(Metric::StockPrice).possible_scores(), vec![5, 4, 3, 0]);
        assert_eq!(rule_for(Metric::FreeCashFlow).possible_scores(), vec![5, 0]);
        assert_eq!(rule_for(Metric::Roe).possible_scores(), vec![5, 3, 0]);
    }

    #[test]
    fn test_describe_tiers() {
        assert_eq!(
            rule_for(Metric::DeRatio).describe_tiers(),
            "<0.5 -> 5, <1 -> 3, else 0"
        );
        assert_eq!(
            rule_for(Metric::NetMargin).describe_tiers(),
            ">15% -> 5, >7% -> 3, else 0"
        );
    }
}
