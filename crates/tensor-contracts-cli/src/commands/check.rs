use std::path::Path;

use tensor_contracts::schema::{parse_calls, parse_signatures, replay_calls};
use tracing::debug;

pub fn run(signatures: &Path, calls: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let signatures = parse_signatures(signatures)?;
    let calls = parse_calls(calls)?;
    debug!(
        functions = signatures.functions.len(),
        calls = calls.calls.len(),
        "replaying recorded calls"
    );
    let outcomes = replay_calls(&signatures, &calls);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(_) => println!("ok   #{} {}", outcome.index, outcome.function),
            Err(e) => {
                failed += 1;
                println!("FAIL #{} {}: {e}", outcome.index, outcome.function);
            }
        }
    }

    println!("\n{} passed, {failed} failed", outcomes.len() - failed);

    if failed == 0 {
        Ok(())
    } else {
        Err(format!("{failed} of {} recorded call(s) failed", outcomes.len()).into())
    }
}
