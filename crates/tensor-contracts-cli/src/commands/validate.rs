use std::path::Path;

use tensor_contracts::error::Severity;
use tensor_contracts::schema::{parse_signatures, validate_signatures};

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = parse_signatures(path)?;
    let violations = validate_signatures(&file);

    let errors = violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .count();
    let warnings = violations.len() - errors;

    for v in &violations {
        println!("{v}");
    }

    println!("\n{errors} error(s), {warnings} warning(s)");

    if errors == 0 {
        println!("Signatures are valid.");
        Ok(())
    } else {
        Err(format!("Signature file has {errors} validation error(s)").into())
    }
}
