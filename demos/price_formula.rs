use formulita::{evaluate_formula, validate_formula};
use std::collections::HashMap;

fn main() {
    pretty_env_logger::init();

    // Measurements for a two-leaf window, 1.2m x 1.5m.
    let bindings = HashMap::from([
        ("width_m".to_string(), 1.2),
        ("height_m".to_string(), 1.5),
        ("area_m2".to_string(), 1.8),
        ("perimeter_m".to_string(), 5.4),
        ("quantity".to_string(), 3.0),
        ("num_hojas".to_string(), 2.0),
    ]);

    let formulas = [
        "(width_m + height_m) * 2",
        "ceil(area_m2 / 2) * quantity",
        "perimeter_m * quantity",
        "width_m / num_hojas",
        "sqrt(area_m2)",
    ];

    for formula in formulas {
        match evaluate_formula(formula, &bindings) {
            Ok(result) => println!("{formula} = {result}"),
            Err(err) => println!("{formula} failed: {err}"),
        }
    }

    // A config author probing formulas before saving them.
    for formula in ["ceil(perimeter_m) * quantity", "__import__('os')"] {
        println!("validate({formula}) = {}", validate_formula(formula));
    }
}
