use formulita::Evaluator;
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    let evaluator = Evaluator::new();

    // One formula parsed once, evaluated against a batch of line items.
    let formula = "ceil((width_m + height_m) * 2) * quantity";
    let ast = evaluator.parse_formula(formula).expect("Failed to parse");

    let line_items = vec![
        HashMap::from([
            ("width_m".to_string(), 1.2),
            ("height_m".to_string(), 1.5),
            ("quantity".to_string(), 3.0),
        ]),
        HashMap::from([
            ("width_m".to_string(), 0.8),
            ("height_m".to_string(), 2.1),
            ("quantity".to_string(), 1.0),
        ]),
    ];

    for (i, bindings) in line_items.iter().enumerate() {
        let bound = ast.resolve_variables(bindings).expect("unbound variable");
        match evaluator.evaluate(&bound) {
            Ok(result) => println!("Line {i}: {result}"),
            Err(err) => println!("Line {i} failed: {err}"),
        }
    }
}
