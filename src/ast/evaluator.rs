use crate::ast::{FormulaNode, FormulaParser};
use crate::error::FormulaError;
use crate::registry::{canonical_bindings, Registry};
use log::debug;
use std::collections::HashMap;

/// Evaluates formulas against a registry of allowed names.
///
/// The registry is fixed at construction; evaluation itself allocates only
/// per-call state, so one evaluator can serve concurrent callers without
/// locking.
pub struct Evaluator {
    registry: Registry,
}

impl Evaluator {
    /// Creates an evaluator over the default allow-lists.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Creates an evaluator over a caller-built registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse a formula string into a tree, without binding or evaluating.
    pub fn parse_formula(&self, formula: &str) -> Result<FormulaNode, FormulaError> {
        if formula.trim().is_empty() {
            return Err(FormulaError::EmptyFormula);
        }
        FormulaParser::parse_formula(&self.registry, formula)
    }

    /// Evaluates a formula string against the given bindings.
    ///
    /// Runs the full pipeline: parse, resolve variables, reduce, check
    /// finiteness. The stages run strictly in that order, so a parse error
    /// always wins over a missing binding, which wins over a numeric one.
    ///
    /// # Arguments
    ///
    /// * `formula` - the formula text to evaluate.
    /// * `bindings` - variable values for this call; keys the formula does
    ///   not reference are ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` with a finite result.
    /// * `Err(FormulaError)` for the first stage that fails.
    pub fn evaluate_formula(
        &self,
        formula: &str,
        bindings: &HashMap<String, f64>,
    ) -> Result<f64, FormulaError> {
        let ast = self.parse_formula(formula)?;
        let bound = ast.resolve_variables(bindings)?;
        let result = self.evaluate(&bound)?;
        debug!("Evaluated '{}' to {}", formula, result);

        if result.is_finite() {
            Ok(result)
        } else {
            Err(FormulaError::NonFiniteResult)
        }
    }

    /// Reduces a tree to a number, checking finiteness after every operator
    /// and function application so a non-finite intermediate can never
    /// cancel back into a finite answer.
    pub fn evaluate(&self, node: &FormulaNode) -> Result<f64, FormulaError> {
        match node {
            FormulaNode::Number(value) => Ok(*value),

            // Unresolved variables only reach this point when a caller
            // evaluates a tree without binding it first.
            FormulaNode::Variable(name) => Err(FormulaError::UndefinedVariable(name.clone())),

            FormulaNode::UnaryMinus(inner) => Ok(-self.evaluate(inner)?),

            FormulaNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                let left_value = self.evaluate(left)?;
                let right_value = self.evaluate(right)?;
                Self::finite(operator.apply(left_value, right_value))
            }

            FormulaNode::FunctionCall { name, arg } => {
                let function = self.registry.function(name).ok_or_else(|| {
                    FormulaError::UnsafeFormula(format!("unknown function '{name}'"))
                })?;
                let arg_value = self.evaluate(arg)?;
                Self::finite(function(arg_value))
            }
        }
    }

    /// Probes a formula with the canonical bindings and collapses every
    /// failure to `false`. This is a sanity check for formula authors, not
    /// a production evaluation path.
    pub fn validate_formula(&self, formula: &str) -> bool {
        self.validate_formula_with(formula, &canonical_bindings())
    }

    /// Like `validate_formula`, but probing with caller-supplied bindings.
    pub fn validate_formula_with(&self, formula: &str, bindings: &HashMap<String, f64>) -> bool {
        self.evaluate_formula(formula, bindings).is_ok()
    }

    fn finite(value: f64) -> Result<f64, FormulaError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFiniteResult)
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
