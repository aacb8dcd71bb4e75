use super::*;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleCoverage {
    /// Full signal path to 100.0 (toggled) or 0.0.
    pub toggle_coverage: BTreeMap<String, f64>,
    pub overall_toggle_pct: f64,
    /// Declaration order.
    pub signals_with_no_toggles: Vec<String>,
}

fn toggled(transitions: &[Transition]) -> bool {
    let mut seen = HashSet::new();
    transitions.iter().any(|t| {
        seen.insert(t.value.as_str());
        seen.len() >= 2
    })
}

/// Toggle coverage per signal. A signal counts as toggled once it has
/// taken two distinct values anywhere in the dump.
pub fn toggle_coverage(wf: &Waveform) -> ToggleCoverage {
    let mut toggle_coverage = BTreeMap::new();
    let mut signals_with_no_toggles = vec![];
    let mut num_toggled = 0usize;

    for sig in wf.signals() {
        let path = sig.full_path();
        if toggled(wf.transitions(&sig.identifier)) {
            num_toggled += 1;
            toggle_coverage.insert(path, 100.0);
        } else {
            toggle_coverage.insert(path.clone(), 0.0);
            signals_with_no_toggles.push(path);
        }
    }

    let overall_toggle_pct = match wf.num_signals() {
        0 => 0.0,
        n => num_toggled as f64 * 100.0 / n as f64,
    };

    ToggleCoverage {
        toggle_coverage,
        overall_toggle_pct,
        signals_with_no_toggles,
    }
}
