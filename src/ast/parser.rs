use crate::ast::{FormulaNode, Operator};
use crate::error::FormulaError;
use crate::registry::Registry;
use log::debug;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

/// Longest formula accepted, in bytes. Caps parse cost on hostile input.
pub const MAX_FORMULA_LEN: usize = 512;

/// Deepest parenthesis/function nesting accepted.
pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Parser)]
#[grammar = "./formula.pest"] // Link to the grammar file
pub struct FormulaParser;

impl FormulaParser {
    /// Parses a formula into a tree built solely from allowed constructs.
    ///
    /// Any byte outside the token set, any identifier not in the registry's
    /// variable allow-list, any call to a function not in its function
    /// allow-list, and any structural problem (unmatched parentheses,
    /// trailing tokens, wrong call arity) fails here, before the formula
    /// can reach binding or evaluation.
    pub fn parse_formula(registry: &Registry, input: &str) -> Result<FormulaNode, FormulaError> {
        debug!("Parsing formula: {}", input);
        if input.len() > MAX_FORMULA_LEN {
            return Err(FormulaError::UnsafeFormula(format!(
                "formula exceeds {MAX_FORMULA_LEN} bytes"
            )));
        }

        let formula = FormulaParser::parse(Rule::formula, input)
            .map_err(|e| FormulaError::UnsafeFormula(format!("parse error: {e}")))?
            .next()
            .ok_or_else(|| FormulaError::UnsafeFormula("empty parse result".to_string()))?;

        debug!("Parse result: {:#?}", formula);
        // First pair under `formula` is the expression; the trailing EOI
        // token is what rejects leftover input.
        let expression = formula
            .into_inner()
            .next()
            .ok_or_else(|| FormulaError::UnsafeFormula("empty parse result".to_string()))?;
        Self::build_expression(registry, expression, 0)
    }

    fn build_expression(
        registry: &Registry,
        pair: Pair<Rule>,
        depth: usize,
    ) -> Result<FormulaNode, FormulaError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(FormulaError::UnsafeFormula(format!(
                "nesting exceeds {MAX_NESTING_DEPTH} levels"
            )));
        }

        let mut pairs = pair.into_inner();
        let mut node = Self::build_term(registry, pairs.next().unwrap(), depth)?;

        while let Some(operator_pair) = pairs.next() {
            let operator = match operator_pair.as_rule() {
                Rule::PLUS => Operator::Add,
                Rule::MINUS => Operator::Subtract,
                _ => {
                    return Err(FormulaError::UnsafeFormula(format!(
                        "unexpected operator: {:?}",
                        operator_pair.as_rule()
                    )))
                }
            };

            let right = Self::build_term(registry, pairs.next().unwrap(), depth)?;
            node = FormulaNode::BinaryOperation {
                left: Box::new(node),
                operator,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    fn build_term(
        registry: &Registry,
        pair: Pair<Rule>,
        depth: usize,
    ) -> Result<FormulaNode, FormulaError> {
        let mut pairs = pair.into_inner();
        let mut node = Self::build_factor(registry, pairs.next().unwrap(), depth)?;

        while let Some(operator_pair) = pairs.next() {
            let operator = match operator_pair.as_rule() {
                Rule::STAR => Operator::Multiply,
                Rule::SLASH => Operator::Divide,
                _ => {
                    return Err(FormulaError::UnsafeFormula(format!(
                        "unexpected operator: {:?}",
                        operator_pair.as_rule()
                    )))
                }
            };

            let right = Self::build_factor(registry, pairs.next().unwrap(), depth)?;
            node = FormulaNode::BinaryOperation {
                left: Box::new(node),
                operator,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    fn build_factor(
        registry: &Registry,
        pair: Pair<Rule>,
        depth: usize,
    ) -> Result<FormulaNode, FormulaError> {
        let mut pairs = pair.into_inner();
        let mut negations = 0usize;

        let mut node = loop {
            let inner = pairs.next().unwrap();
            if inner.as_rule() == Rule::MINUS {
                negations += 1;
                continue;
            }
            break Self::build_primary(registry, inner, depth)?;
        };

        for _ in 0..negations {
            node = FormulaNode::UnaryMinus(Box::new(node));
        }

        Ok(node)
    }

    fn build_primary(
        registry: &Registry,
        pair: Pair<Rule>,
        depth: usize,
    ) -> Result<FormulaNode, FormulaError> {
        debug!("Building primary: {:?}", pair);
        match pair.as_rule() {
            Rule::number => {
                let value = pair.as_str().parse::<f64>().map_err(|e| {
                    FormulaError::UnsafeFormula(format!("bad number literal: {e}"))
                })?;
                Ok(FormulaNode::Number(value))
            }
            Rule::identifier => {
                let name = pair.as_str();
                if !registry.is_allowed_variable(name) {
                    return Err(FormulaError::UnsafeFormula(format!(
                        "unknown identifier '{name}'"
                    )));
                }
                Ok(FormulaNode::Variable(name.to_string()))
            }
            Rule::group => {
                let inner = pair.into_inner().next().unwrap();
                Self::build_expression(registry, inner, depth + 1)
            }
            Rule::function_call => Self::build_function_call(registry, pair, depth),
            _ => Err(FormulaError::UnsafeFormula(format!(
                "unexpected rule in primary: {:?}",
                pair.as_rule()
            ))),
        }
    }

    fn build_function_call(
        registry: &Registry,
        pair: Pair<Rule>,
        depth: usize,
    ) -> Result<FormulaNode, FormulaError> {
        let mut inner = pair.into_inner();
        let name = inner.next().unwrap().as_str();
        if !registry.is_allowed_function(name) {
            return Err(FormulaError::UnsafeFormula(format!(
                "unknown function '{name}'"
            )));
        }
        let arg = Self::build_expression(registry, inner.next().unwrap(), depth + 1)?;
        Ok(FormulaNode::FunctionCall {
            name: name.to_string(),
            arg: Box::new(arg),
        })
    }
}
