pub mod ast;
pub mod error;
pub mod registry;

pub use ast::{Evaluator, FormulaNode, FormulaParser, Operator};
pub use error::FormulaError;
pub use registry::Registry;

use std::collections::HashMap;
use std::sync::OnceLock;

// One evaluator over the default allow-lists, built on first use. It holds
// no mutable state, so every thread shares it.
fn shared_evaluator() -> &'static Evaluator {
    static EVALUATOR: OnceLock<Evaluator> = OnceLock::new();
    EVALUATOR.get_or_init(Evaluator::new)
}

/// Evaluates a formula string against the given variable bindings using the
/// default allow-lists.
pub fn evaluate_formula(
    formula: &str,
    bindings: &HashMap<String, f64>,
) -> Result<f64, FormulaError> {
    shared_evaluator().evaluate_formula(formula, bindings)
}

/// Checks whether a formula evaluates under the canonical probe bindings.
/// Every failure, from parse to non-finite result, collapses to `false`.
pub fn validate_formula(formula: &str) -> bool {
    shared_evaluator().validate_formula(formula)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_functions_share_default_allow_lists() {
        let context = HashMap::from([
            ("width_m".to_string(), 3.0),
            ("height_m".to_string(), 5.0),
        ]);
        assert_eq!(
            evaluate_formula("(width_m + height_m) * 2", &context).unwrap(),
            16.0
        );
        assert!(validate_formula("(width_m + height_m) * 2"));
        assert!(!validate_formula("window.alert"));
    }

    #[test]
    fn validate_uses_the_canonical_probe() {
        // quantity is 1 under the canonical bindings, so this divides by
        // zero during the probe and must come back false.
        assert!(!validate_formula("1 / (quantity - 1)"));
    }

    #[test]
    fn canonical_bindings_make_every_variable_usable() {
        assert!(validate_formula(
            "width_m + height_m + area_m2 + perimeter_m + quantity + num_hojas"
        ));
    }
}
