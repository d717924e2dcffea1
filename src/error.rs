use thiserror::Error;

/// Everything that can go wrong between a formula string and its number.
///
/// Variants are ordered by pipeline stage: input check, parse, bind,
/// evaluate. A formula that fails an earlier stage never reaches a later
/// one, so callers always see the earliest applicable error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula must be a non-empty string")]
    EmptyFormula,

    #[error("formula is not expressible in the allowed grammar: {0}")]
    UnsafeFormula(String),

    #[error("variable '{0}' has no binding")]
    UndefinedVariable(String),

    #[error("formula produced a non-finite result")]
    NonFiniteResult,
}
