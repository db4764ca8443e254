use std::path::Path;

use tensor_contracts::TensorType;
use tensor_contracts::schema::parse_signatures;

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = parse_signatures(path)?;

    match &file.description {
        Some(description) => println!("Signatures: {description} v{}", file.version),
        None => println!("Signatures: v{}", file.version),
    }
    println!("Functions: {}", file.functions.len());

    for function in &file.functions {
        println!("\n{}", function.name);
        for arg in &function.args {
            match &arg.spec {
                Some(literal) => println!("  {}: {}", arg.name, canonical(literal)?),
                None => println!("  {}: (unchecked)", arg.name),
            }
        }
        if let Some(literal) = &function.returns {
            println!("  -> {}", canonical(literal)?);
        }
    }

    Ok(())
}

fn canonical(literal: &str) -> Result<String, Box<dyn std::error::Error>> {
    let ty = TensorType::parse(literal).map_err(|e| format!("`{literal}`: {e}"))?;
    Ok(ty.to_string())
}
