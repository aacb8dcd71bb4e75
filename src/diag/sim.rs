use super::parse_number;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref RE_FAILURE: Regex = Regex::new(
        r"\[FAIL\]\s*(\w+)=(\S+)\s+expected=(\S+)\s+actual=(\S+)(?:\s+cycle=(\d+))?(?:\s+time=(\d+))?"
    ).unwrap();
    static ref RE_DONE: Regex = Regex::new(
        r"\[DONE\]\s*passed=(\d+)\s+failed=(\d+)"
    ).unwrap();
    static ref RE_FATAL: Regex = Regex::new(r"(?i)\$stop|\$fatal|ERROR").unwrap();
    static ref RE_PASS: Regex = Regex::new(r"(?i)PASS|All tests passed").unwrap();
    static ref RE_ANY_FAIL: Regex = Regex::new(r"(?i)FAIL").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimFailure {
    pub cycle: Option<u64>,
    pub time_ns: Option<u64>,
    pub signal: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimResult {
    pub passed: bool,
    pub failures: Vec<SimFailure>,
    /// Counts reported by the `[DONE]` banner, when present.
    pub passed_count: Option<u64>,
    pub failed_count: Option<u64>,
    pub raw_output: String,
}

/// Parse simulator output.
///
/// Failure conditions are evaluated first: `[FAIL]` records, a
/// `[DONE]` banner with failures, a non-zero exit code, `$stop`,
/// `$fatal` or `ERROR`, and a literal `FAIL:`. A pass banner then
/// overrides the verdict, but only when no `FAIL` appears anywhere in
/// the output. The override can therefore clear a non-zero exit code.
pub fn parse_simulation(output: &str, exit_code: i32) -> SimResult {
    let mut passed = true;
    let mut failures = vec![];

    for caps in RE_FAILURE.captures_iter(output) {
        failures.push(SimFailure {
            cycle: parse_number(caps.get(5)),
            time_ns: parse_number(caps.get(6)),
            signal: caps[1].to_string(),
            expected: caps[3].to_string(),
            actual: caps[4].to_string(),
        });
        passed = false;
    }

    let (passed_count, failed_count) = match RE_DONE.captures(output) {
        Some(caps) => {
            let failed_count: Option<u64> = parse_number(caps.get(2));
            // an unreadable failure count is a failure
            if failed_count != Some(0) {
                passed = false;
            }
            (parse_number(caps.get(1)), failed_count)
        }
        None => (None, None),
    };

    if exit_code != 0 || RE_FATAL.is_match(output) || output.contains("FAIL:") {
        passed = false;
    }

    if RE_PASS.is_match(output) && !RE_ANY_FAIL.is_match(output) {
        passed = true;
    }

    clilog::debug!(D_DIAG_SIM, "{} simulation failures, passed={}", failures.len(), passed);

    SimResult {
        passed,
        failures,
        passed_count,
        failed_count,
        raw_output: output.to_string(),
    }
}
