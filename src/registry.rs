use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub type MathFunction = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// The variable names every formula may reference. Anything else is a parse
/// error, so a formula cannot name host state even by accident.
pub const ALLOWED_VARIABLES: [&str; 6] = [
    "width_m",
    "height_m",
    "area_m2",
    "perimeter_m",
    "quantity",
    "num_hojas",
];

/// Allow-list registry: the permitted variable names and the permitted
/// unary functions. Built once, then read-only; concurrent evaluations
/// share it without locking.
pub struct Registry {
    variables: HashSet<String>,
    functions: HashMap<String, MathFunction>,
}

impl Registry {
    /// Builds the default registry: the six measurement variables and the
    /// four rounding/root functions.
    pub fn new() -> Self {
        let mut registry = Self {
            variables: ALLOWED_VARIABLES.iter().map(|s| s.to_string()).collect(),
            functions: HashMap::new(),
        };
        registry.register_function("ceil", f64::ceil);
        registry.register_function("floor", f64::floor);
        registry.register_function("round", f64::round);
        registry.register_function("sqrt", f64::sqrt);
        registry
    }

    /// Registers a unary function under `name`. Only useful before the
    /// registry is handed to an evaluator; tests use this to build
    /// registries with a different allow-list.
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(function));
    }

    /// Adds a variable name to the allow-list.
    pub fn allow_variable(&mut self, name: &str) {
        self.variables.insert(name.to_string());
    }

    pub fn is_allowed_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn is_allowed_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn function(&self, name: &str) -> Option<&MathFunction> {
        self.functions.get(name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed probe bindings used by `validate_formula`: one plausible value per
/// allowed variable, chosen so a well-formed sizing formula evaluates.
pub fn canonical_bindings() -> HashMap<String, f64> {
    HashMap::from([
        ("width_m".to_string(), 1.0),
        ("height_m".to_string(), 1.0),
        ("area_m2".to_string(), 1.0),
        ("perimeter_m".to_string(), 4.0),
        ("quantity".to_string(), 1.0),
        ("num_hojas".to_string(), 2.0),
    ])
}
