use super::FsmInfo;

use std::convert::TryFrom;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_CASE: Regex = Regex::new(r"\bcase[zx]?\s*\(\s*(\w+)\s*\)").unwrap();
    static ref RE_LABEL_BEGIN: Regex = Regex::new(r"(\w+)\s*:\s*begin\b").unwrap();
}

/// Look for a `case` dispatch on a declared register and recover the
/// state names driving it.
pub fn detect_fsm(body: &str, localparams: &[(String, String)]) -> Option<FsmInfo> {
    let state_register = RE_CASE.captures(body)?[1].to_string();
    let reg = regex::escape(&state_register);

    let re_decl = Regex::new(&format!(
        r"\b(?:reg|logic)\s*(?:signed\s*)?\[(\d+):(\d+)\]\s*(?:\w+\s*,\s*)*{}\b", reg)).ok()?;
    let decl = re_decl.captures(body)?;
    let msb = decl[1].parse::<i64>().ok()?;
    let lsb = decl[2].parse::<i64>().ok()?;
    let state_width = u32::try_from((msb - lsb).unsigned_abs() + 1).ok()?;

    let mut states: Vec<String> = vec![];
    for (name, _) in localparams {
        let param = regex::escape(name);
        let re_use = Regex::new(&format!(
            r"(?m)\b{reg}\s*<?=\s*{param}\b|^[ \t]*(?:[\w']+[ \t]*,[ \t]*)*{param}[ \t]*(?:,[^:\n]*)?:",
            reg = reg, param = param)).ok()?;

        if re_use.is_match(body) && !states.contains(name) {
            states.push(name.clone());
        }
    }

    if states.is_empty() {
        for caps in RE_LABEL_BEGIN.captures_iter(body) {
            let candidate = &caps[1];
            let screaming = candidate.to_uppercase() == candidate && candidate.contains('_');
            if screaming && !states.iter().any(|s| s == candidate) {
                states.push(candidate.to_string());
            }
        }
    }

    if states.is_empty() {
        clilog::debug!(D_MOD_FSM, "case on '{}' without recognizable states", state_register);
        return None;
    }

    clilog::debug!(D_MOD_FSM, "fsm on '{}' with {} states", state_register, states.len());

    Some(FsmInfo {
        state_register,
        states,
        state_width,
    })
}
