use super::factors::{Evaluation, FactorRule, Unit, FACTOR_TABLE};
use crate::stock::types::{MetricsRecord, QualitativeOverrides};
use std::collections::BTreeMap;

/// Highest score a single factor is expected to reach.
pub const MAX_FACTOR_SCORE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    Quantitative,
    Qualitative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorScore {
    pub name: String,
    pub score: f64,
    pub kind: FactorKind,
    pub defaulted: bool,     // Metric was missing and the rule default was used
    pub description: String, // e.g. "18.00% matched >15% -> 5"
}

/// Per-factor scores. Names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub factors: Vec<FactorScore>,
}

impl ScoreBreakdown {
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.factors.iter().find(|f| f.name == name).map(|f| f.score)
    }

    pub fn total(&self) -> f64 {
        self.factors.iter().map(|f| f.score).sum()
    }

    pub fn max_possible(&self) -> f64 {
        MAX_FACTOR_SCORE * self.factors.len() as f64
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.factors
            .iter()
            .map(|f| (f.name.clone(), f.score))
            .collect()
    }

    fn upsert(&mut self, entry: FactorScore) {
        match self.factors.iter_mut().find(|f| f.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.factors.push(entry),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub total: f64,
    pub percentage: f64,
    /// At least one quantitative factor was scored from its default.
    pub incomplete: bool,
    pub breakdown: ScoreBreakdown,
}

/// Score one instrument.
///
/// Never fails: missing or non-finite metrics fall back to the per-factor
/// default from the scoring table. Qualitative entries are copied into the
/// breakdown as given; an entry named like a quantitative factor replaces it.
pub fn calculate_score(metrics: &MetricsRecord, qualitative: &QualitativeOverrides) -> ScoreResult {
    let mut breakdown = ScoreBreakdown::default();

    for rule in FACTOR_TABLE.iter() {
        let eval = rule.evaluate(metrics.get(rule.metric));
        breakdown.upsert(FactorScore {
            name: rule.metric.name().to_string(),
            score: f64::from(eval.score),
            kind: FactorKind::Quantitative,
            defaulted: eval.defaulted,
            description: describe(rule, &eval),
        });
    }

    for (name, value) in qualitative {
        breakdown.upsert(FactorScore {
            name: name.clone(),
            score: *value,
            kind: FactorKind::Qualitative,
            defaulted: false,
            description: format!("qualitative -> {}", value),
        });
    }

    let total = breakdown.total();
    let incomplete = breakdown
        .factors
        .iter()
        .any(|f| f.kind == FactorKind::Quantitative && f.defaulted);

    ScoreResult {
        total,
        percentage: percentage_of(total, breakdown.len()),
        incomplete,
        breakdown,
    }
}

/// `total` as a percentage of `factor_count * 5`; 0 when there are no factors.
pub fn percentage_of(total: f64, factor_count: usize) -> f64 {
    if factor_count == 0 {
        return 0.0;
    }
    total / (MAX_FACTOR_SCORE * factor_count as f64) * 100.0
}

fn describe(rule: &FactorRule, eval: &Evaluation) -> String {
    let value = match rule.unit {
        Unit::Percent if eval.value.is_finite() => format!("{:.2}%", eval.value * 100.0),
        _ => format!("{}", eval.value),
    };
    let suffix = match rule.unit {
        Unit::Percent => "%",
        Unit::Absolute => "",
    };

    match (eval.defaulted, eval.matched) {
        (true, Some(tier)) => format!("missing (default {}) matched {}{} -> {}", value, tier.op, suffix, tier.score),
        (true, None) => format!("missing (default {}) -> 0", value),
        (false, Some(tier)) => format!("{} matched {}{} -> {}", value, tier.op, suffix, tier.score),
        (false, None) => format!("{} below every tier -> 0", value),
    }
}
