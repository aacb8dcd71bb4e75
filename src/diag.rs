//! Normalization of raw tool console output into typed results.
//!
//! Every parser accepts `(output, exit_code)` and always returns a
//! well-typed result; text that matches nothing is left for the
//! consumer to read in `raw_output`.

pub mod compile;
pub mod sim;
pub mod synth;

pub use compile::{parse_compile, CompileError, CompileResult, ErrorKind};
pub use sim::{parse_simulation, SimFailure, SimResult};
pub use synth::{parse_synthesis, SynthResult};

fn parse_number<T: std::str::FromStr>(m: Option<regex::Match>) -> Option<T> {
    m.and_then(|m| m.as_str().parse().ok())
}
