use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

lazy_static! {
    static ref RE_ERROR: Regex = Regex::new(r"ERROR:\s*(.+)").unwrap();
    /// `$_AND_   12` as well as `12   $_AND_`.
    static ref RE_CELL_ROW: Regex = Regex::new(
        r"^\s+(?:(\$?[\w$]+)\s+(\d+)|(\d+)\s+(\$?[\w$]+))\s*$"
    ).unwrap();
    static ref RE_CELL_HEADER: Regex = Regex::new(
        r"Number of cells|^\s+\d+\s+cells\s*$"
    ).unwrap();
}

/// Cell types counted as lookup tables.
const LUT_CELLS: [&str; 11] = [
    "$lut", "$_LUT4_", "$_LUT6_", "LUT1", "LUT2", "LUT3", "LUT4", "LUT5", "LUT6",
    "SB_LUT4", "TRELLIS_SLICE",
];

/// Fine grained boolean gates, used to estimate lookup tables when a
/// design was not mapped to any.
const LOGIC_CELLS: [&str; 10] = [
    "$_AND_", "$_OR_", "$_XOR_", "$_NOT_", "$_NAND_", "$_NOR_", "$_XNOR_",
    "$_ANDNOT_", "$_ORNOT_", "$_MUX_",
];

/// Substrings marking flip-flop cell types.
const FF_MARKERS: [&str; 12] = [
    "$_DFF", "$_SDFF", "$_ALDFF", "$dff", "$adff", "$sdff", "SB_DFF",
    "FDRE", "FDSE", "FDCE", "FDPE", "TRELLIS_FF",
];

/// Gates packed into one estimated lookup table.
const GATES_PER_LUT: u64 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthResult {
    pub success: bool,
    /// Estimated; see [`parse_synthesis`].
    pub lookup_table_count: Option<u64>,
    pub flip_flop_count: Option<u64>,
    pub cell_counts: BTreeMap<String, u64>,
    pub errors: Vec<String>,
    pub raw_output: String,
}

impl SynthResult {
    pub fn total_cells(&self) -> u64 {
        self.cell_counts.values().sum()
    }
}

fn parse_cell_row(line: &str) -> Option<(String, u64)> {
    let caps = RE_CELL_ROW.captures(line)?;
    let (name, count) = match (caps.get(1), caps.get(2)) {
        (Some(name), Some(count)) => (name, count),
        _ => (caps.get(4)?, caps.get(3)?),
    };

    Some((name.as_str().to_string(), count.as_str().parse().ok()?))
}

/// Collect `name count` rows of every cell statistics table. A table
/// ends at the first non-empty line that is not indented.
fn parse_cell_tables(output: &str) -> BTreeMap<String, u64> {
    let mut cells = BTreeMap::new();
    let mut in_stats = false;

    for line in output.lines() {
        if RE_CELL_HEADER.is_match(line) {
            in_stats = true;
            continue;
        }

        if in_stats {
            if let Some((name, count)) = parse_cell_row(line) {
                cells.insert(name, count);
            } else if !line.trim().is_empty() && !line.starts_with(' ') {
                in_stats = false;
            }
        }
    }

    cells
}

fn lookup_tables(cells: &BTreeMap<String, u64>) -> u64 {
    let sum_of = |names: &[&str]| -> u64 {
        names.iter().filter_map(|name| cells.get(*name)).sum()
    };

    match sum_of(&LUT_CELLS) {
        0 => sum_of(&LOGIC_CELLS) / GATES_PER_LUT + 1,
        luts => luts,
    }
}

fn flip_flops(cells: &BTreeMap<String, u64>) -> u64 {
    cells.iter()
        .filter(|(name, _)| FF_MARKERS.iter().any(|marker| name.contains(marker)))
        .map(|(_, count)| count)
        .sum()
}

/// Parse synthesizer output. Lookup-table and flip-flop totals are
/// derived from the cell table, so callers should treat them as
/// estimates.
pub fn parse_synthesis(output: &str, exit_code: i32) -> SynthResult {
    if exit_code != 0 {
        let mut errors: Vec<String> = RE_ERROR.captures_iter(output)
            .map(|caps| caps[1].trim().to_string())
            .collect();

        if errors.is_empty() {
            errors.push(format!("synthesis exited with status {}", exit_code));
        }

        clilog::debug!(D_DIAG_SYNTH, "synthesis failed with {} errors", errors.len());

        return SynthResult {
            success: false,
            lookup_table_count: None,
            flip_flop_count: None,
            cell_counts: BTreeMap::new(),
            errors,
            raw_output: output.to_string(),
        };
    }

    let cell_counts = parse_cell_tables(output);
    let luts = lookup_tables(&cell_counts);
    let ffs = flip_flops(&cell_counts);

    clilog::debug!(D_DIAG_SYNTH, "{} cell types, ~{} luts, {} ffs", cell_counts.len(), luts, ffs);

    SynthResult {
        success: true,
        lookup_table_count: Some(luts),
        flip_flop_count: Some(ffs),
        cell_counts,
        errors: vec![],
        raw_output: output.to_string(),
    }
}
