use super::*;

/// Upper bound on the entries returned by [`Waveform::causal_trace`].
pub const MAX_TRACE_ENTRIES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CausalEntry {
    /// Full hierarchical path of the changing signal.
    pub signal: String,
    pub time_ns: u64,
    pub value: String,
    /// Distance to the failure, never negative.
    pub delta_ns: u64,
    /// Whether this change belongs to the signal the trace was asked for.
    pub is_anchor: bool,
}

impl Waveform {
    /// Changes of every signal within `window_ns` before (and at)
    /// `failure_time_ns`, closest to the failure first.
    ///
    /// The named signal only anchors the trace; it is not a filter.
    /// Ties keep declaration order, then time order.
    pub fn causal_trace(&self, signal: &str, failure_time_ns: u64, window_ns: u64) -> Vec<CausalEntry> {
        let anchor = self.find_signal(signal).map(|s| s.identifier.as_str());
        if anchor.is_none() {
            clilog::debug!(D_WAVE_ANCHOR, "trace anchor {:?} is not a declared signal", signal);
        }

        let start = failure_time_ns.saturating_sub(window_ns);
        let mut entries: Vec<CausalEntry> = vec![];

        for sig in self.signals() {
            let path = sig.full_path();
            for tr in self.transitions_in_range(&sig.identifier, start, failure_time_ns) {
                entries.push(CausalEntry {
                    signal: path.clone(),
                    time_ns: tr.time_ns,
                    value: tr.value.clone(),
                    delta_ns: failure_time_ns - tr.time_ns,
                    is_anchor: anchor == Some(sig.identifier.as_str()),
                });
            }
        }

        entries.sort_by_key(|e| e.delta_ns);
        entries.truncate(MAX_TRACE_ENTRIES);

        clilog::debug!(D_WAVE_TRACE, "causal trace of {} at t={}: {} entries",
                       signal, failure_time_ns, entries.len());
        entries
    }
}
