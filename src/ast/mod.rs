use std::collections::HashMap;

mod evaluator;
mod parser;

pub use evaluator::Evaluator;
pub use parser::{FormulaParser, MAX_FORMULA_LEN, MAX_NESTING_DEPTH};

use crate::error::FormulaError;

/// Expression tree a formula parses into. Every constructor corresponds to
/// a grammar production, so a node outside the allowed language cannot be
/// built from formula text.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaNode {
    Number(f64),
    Variable(String),
    UnaryMinus(Box<FormulaNode>),
    BinaryOperation {
        left: Box<FormulaNode>,
        operator: Operator,
        right: Box<FormulaNode>,
    },
    FunctionCall {
        name: String,
        arg: Box<FormulaNode>,
    },
}

impl FormulaNode {
    /// Recursively replaces every `Variable` with its bound value from
    /// `bindings`. Bindings never referenced by the tree are ignored;
    /// a referenced variable with no binding fails the whole call.
    pub fn resolve_variables(
        &self,
        bindings: &HashMap<String, f64>,
    ) -> Result<FormulaNode, FormulaError> {
        match self {
            FormulaNode::Number(value) => Ok(FormulaNode::Number(*value)),
            FormulaNode::Variable(name) => bindings.get(name).map_or_else(
                || Err(FormulaError::UndefinedVariable(name.clone())),
                |value| Ok(FormulaNode::Number(*value)),
            ),
            FormulaNode::UnaryMinus(inner) => Ok(FormulaNode::UnaryMinus(Box::new(
                inner.resolve_variables(bindings)?,
            ))),
            FormulaNode::BinaryOperation {
                left,
                operator,
                right,
            } => Ok(FormulaNode::BinaryOperation {
                left: Box::new(left.resolve_variables(bindings)?),
                operator: *operator,
                right: Box::new(right.resolve_variables(bindings)?),
            }),
            FormulaNode::FunctionCall { name, arg } => Ok(FormulaNode::FunctionCall {
                name: name.clone(),
                arg: Box::new(arg.resolve_variables(bindings)?),
            }),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Plain IEEE-754 arithmetic. Division by zero is not special-cased
    /// here; the evaluator's finiteness check catches the inf/NaN it
    /// produces.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_replaces_bound_variables() {
        let tree = FormulaNode::BinaryOperation {
            left: Box::new(FormulaNode::Variable("width_m".to_string())),
            operator: Operator::Multiply,
            right: Box::new(FormulaNode::Number(2.0)),
        };
        let bindings = HashMap::from([("width_m".to_string(), 3.0)]);
        let resolved = tree.resolve_variables(&bindings).unwrap();
        assert_eq!(
            resolved,
            FormulaNode::BinaryOperation {
                left: Box::new(FormulaNode::Number(3.0)),
                operator: Operator::Multiply,
                right: Box::new(FormulaNode::Number(2.0)),
            }
        );
    }

    #[test]
    fn resolve_names_the_missing_variable() {
        let tree = FormulaNode::FunctionCall {
            name: "sqrt".to_string(),
            arg: Box::new(FormulaNode::Variable("area_m2".to_string())),
        };
        let result = tree.resolve_variables(&HashMap::new());
        assert_eq!(
            result,
            Err(FormulaError::UndefinedVariable("area_m2".to_string()))
        );
    }

    #[test]
    fn resolve_ignores_unreferenced_bindings() {
        let tree = FormulaNode::Variable("quantity".to_string());
        let bindings = HashMap::from([
            ("quantity".to_string(), 5.0),
            ("unrelated".to_string(), 99.0),
        ]);
        assert_eq!(
            tree.resolve_variables(&bindings).unwrap(),
            FormulaNode::Number(5.0)
        );
    }

    #[test]
    fn resolve_descends_into_unary_minus() {
        let tree =
            FormulaNode::UnaryMinus(Box::new(FormulaNode::Variable("height_m".to_string())));
        let bindings = HashMap::from([("height_m".to_string(), 2.5)]);
        assert_eq!(
            tree.resolve_variables(&bindings).unwrap(),
            FormulaNode::UnaryMinus(Box::new(FormulaNode::Number(2.5)))
        );
    }

    #[test]
    fn operator_apply_matches_ieee_arithmetic() {
        assert_eq!(Operator::Add.apply(1.5, 2.0), 3.5);
        assert_eq!(Operator::Subtract.apply(1.5, 2.0), -0.5);
        assert_eq!(Operator::Multiply.apply(1.5, 2.0), 3.0);
        assert_eq!(Operator::Divide.apply(3.0, 2.0), 1.5);
        assert!(Operator::Divide.apply(1.0, 0.0).is_infinite());
    }
}
