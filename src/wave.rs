//! Time indexed signal store built from a value change dump.

pub mod coverage;
pub mod parse;
pub mod trace;

pub use parse::parse_waveform;
pub use trace::{CausalEntry, MAX_TRACE_ENTRIES};

use crate::data::SimTime;

use indexmap::IndexMap;
use rug::Integer;
use serde::Serialize;

pub const DEFAULT_TIMESCALE: &str = "1ns";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub name: String,
    pub width: u32,
    /// Identifier code used by the dump for this signal.
    pub identifier: String,
    /// Dot separated scope path, empty at top level.
    pub hierarchy: String,
}

impl Signal {
    pub fn full_path(&self) -> String {
        if self.hierarchy.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.hierarchy, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub time_ns: u64,
    /// Bits as written in the dump, possibly containing `x` or `z`.
    pub value: String,
}

impl Transition {
    /// Numeric value when every bit is known.
    pub fn to_integer(&self) -> Option<Integer> {
        if self.value.is_empty() || !self.value.chars().all(|c| c == '0' || c == '1') {
            return None;
        }
        Integer::from_str_radix(&self.value, 2).ok()
    }
}

/// A parsed dump. Immutable once built; transitions of every signal
/// are ordered by non-decreasing time.
#[derive(Debug, Clone, Default)]
pub struct Waveform {
    signals: IndexMap<String, Signal>,
    transitions: IndexMap<String, Vec<Transition>>,
    timescale: String,
    end_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSummary {
    pub id: String,
    pub name: String,
    pub path: String,
    pub width: u32,
    pub transitions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformSummary {
    pub timescale: String,
    pub end_time: u64,
    pub duration_ns: Option<u64>,
    pub signal_count: usize,
    pub signals: Vec<SignalSummary>,
}

impl Waveform {
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    pub fn signal(&self, identifier: &str) -> Option<&Signal> {
        self.signals.get(identifier)
    }

    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    /// All transitions of a signal, empty for unknown identifiers.
    pub fn transitions(&self, identifier: &str) -> &[Transition] {
        self.transitions
            .get(identifier)
            .map(|t| t.as_slice())
            .unwrap_or(&[])
    }

    pub fn timescale(&self) -> &str {
        &self.timescale
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn time_unit(&self) -> Option<SimTime> {
        SimTime::parse(&self.timescale).ok()
    }

    /// `end_time` converted to whole nanoseconds.
    pub fn duration_ns(&self) -> Option<u64> {
        self.time_unit()
            .map(|unit| (unit * self.end_time) / SimTime::from_ns(1))
    }

    /// Look a signal up by identifier code, name, full path, or full
    /// path suffix, in that order. The first declared match wins.
    pub fn find_signal(&self, query: &str) -> Option<&Signal> {
        if let Some(signal) = self.signals.get(query) {
            return Some(signal);
        }

        let suffix = format!(".{}", query);
        self.signals().find(|s| s.name == query)
            .or_else(|| self.signals().find(|s| s.full_path() == query))
            .or_else(|| self.signals().find(|s| s.full_path().ends_with(&suffix)))
    }

    /// Value of `signal` at time `t`: the last transition at or before
    /// `t`. `None` before the first recorded value or for unknown
    /// signals.
    pub fn value_at(&self, signal: &str, t: u64) -> Option<&str> {
        let signal = self.find_signal(signal)?;
        let transitions = self.transitions(&signal.identifier);
        let idx = transitions.partition_point(|tr| tr.time_ns <= t);

        idx.checked_sub(1)
            .map(|i| transitions[i].value.as_str())
    }

    /// Transitions with `start <= time <= end`.
    pub fn transitions_in_range(&self, identifier: &str, start: u64, end: u64) -> &[Transition] {
        let transitions = self.transitions(identifier);
        if start > end {
            return &[];
        }
        let lo = transitions.partition_point(|tr| tr.time_ns < start);
        let hi = transitions.partition_point(|tr| tr.time_ns <= end);

        &transitions[lo..hi]
    }

    pub fn summary(&self) -> WaveformSummary {
        let signals = self.signals()
            .map(|s| SignalSummary {
                id: s.identifier.clone(),
                name: s.name.clone(),
                path: s.full_path(),
                width: s.width,
                transitions: self.transitions(&s.identifier).len(),
            })
            .collect();

        WaveformSummary {
            timescale: self.timescale.clone(),
            end_time: self.end_time,
            duration_ns: self.duration_ns(),
            signal_count: self.signals.len(),
            signals,
        }
    }
}
