pub mod factors;
pub mod engine;
pub mod validation;

pub use factors::{rule_for, FactorRule, RangeOp, Tier, Unit, FACTOR_TABLE};
pub use engine::{
    calculate_score, percentage_of, FactorKind, FactorScore, ScoreBreakdown, ScoreResult,
    MAX_FACTOR_SCORE,
};
pub use validation::validate_qualitative;
