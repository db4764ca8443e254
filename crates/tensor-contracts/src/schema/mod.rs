mod parser;
mod replay;
mod types;
mod validator;

pub use parser::{parse_calls, parse_calls_str, parse_signatures, parse_signatures_str};
pub use replay::{CallOutcome, replay_call, replay_calls};
pub use types::*;
pub use validator::{symbols, validate_signatures};
