//! Port declaration strategies.
//!
//! Strategies are tried in order; the first that yields at least one
//! port wins. Later strategies are looser and recover less detail.

use super::{Direction, Port};

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref RE_ANSI: Regex = Regex::new(
        r"\b(input|output|inout)\s+((?:(?:wire|reg|logic|bit|tri|integer|var)\b\s*)*)(?:(signed)\b\s*|unsigned\b\s*)?((?:\[[^\]]*\]\s*)*)(\w+)((?:\s*\[[^\]]*\])*)"
    ).unwrap();
    static ref RE_RANGED: Regex = Regex::new(
        r"\b(input|output|inout)\s+(?:(signed)\s+)?\[(\d+):(\d+)\]\s*(\w+)"
    ).unwrap();
    static ref RE_BARE: Regex = Regex::new(
        r"\b(input|output|inout)\s+(\w+)\s*(?:,|$|\))"
    ).unwrap();
    static ref RE_BODY: Regex = Regex::new(
        r"\b(input|output|inout)\b\s*(?:(wire|reg|logic|bit|tri)\b\s*)?(?:(signed)\b\s*)?(?:\[([^\]:]+):([^\]]+)\]\s*)?([\w\s,]+);"
    ).unwrap();

    static ref RE_CONTINUATION: Regex =
        Regex::new(r"^(\w+)((?:\s*\[[^\]]*\])*)$").unwrap();
    static ref RE_DIMENSION: Regex =
        Regex::new(r"\[([^\]:]+):([^\]]+)\]").unwrap();
    static ref RE_OFFSET: Regex =
        Regex::new(r"^(\w+)\s*([+-])\s*(\d+)$").unwrap();
}

const KEYWORDS: [&str; 12] = [
    "wire", "reg", "logic", "bit", "tri", "var", "signed", "unsigned",
    "integer", "input", "output", "inout",
];

/// Widths above this are treated as unresolvable.
pub const MAX_PORT_WIDTH: u32 = 65536;

/// Parameter values usable while resolving bit ranges.
pub type Symbols = HashMap<String, String>;

/// Everything a port strategy may look at.
pub struct PortContext<'a> {
    pub port_section: &'a str,
    pub body: &'a str,
    pub symbols: &'a Symbols,
}

type PortStrategy = fn(&PortContext) -> Option<Vec<Port>>;

const STRATEGIES: [(&str, PortStrategy); 4] = [
    ("ansi", ansi_ports),
    ("ranged", ranged_ports),
    ("bare", bare_ports),
    ("non-ansi body", body_ports),
];

pub fn extract_ports(ctx: &PortContext) -> Vec<Port> {
    STRATEGIES.iter()
        .find_map(|(label, strategy)| {
            let ports = strategy(ctx).filter(|ports| !ports.is_empty())?;
            clilog::debug!(D_MOD_PORTS, "{} ports found by {} strategy", ports.len(), label);
            Some(ports)
        })
        .unwrap_or_default()
}

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name.to_lowercase().as_str())
}

/// Resolve one bound of a range: a literal, a parameter holding a
/// literal, or `NAME+k` / `NAME-k`.
fn eval_bound(text: &str, symbols: &Symbols, depth: usize) -> Option<i64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    if depth > 4 {
        return None;
    }
    if let Some(value) = symbols.get(text) {
        return eval_bound(value, symbols, depth + 1);
    }

    let caps = RE_OFFSET.captures(text)?;
    let base = eval_bound(&caps[1], symbols, depth + 1)?;
    let offset = caps[3].parse::<i64>().ok()?;
    match &caps[2] {
        "+" => base.checked_add(offset),
        _ => base.checked_sub(offset),
    }
}

fn eval_range(msb: &str, lsb: &str, symbols: &Symbols) -> Option<(i64, i64)> {
    Some((eval_bound(msb, symbols, 0)?, eval_bound(lsb, symbols, 0)?))
}

fn dim_width(msb: &str, lsb: &str, symbols: &Symbols) -> Option<u64> {
    let (msb, lsb) = eval_range(msb, lsb, symbols)?;
    msb.checked_sub(lsb)?.unsigned_abs().checked_add(1)
}

/// Clamp a resolved width to `1..=MAX_PORT_WIDTH`, 1 otherwise.
fn bounded(width: Option<u64>, text: &str) -> u32 {
    match width {
        Some(w) if (1..=MAX_PORT_WIDTH as u64).contains(&w) => w as u32,
        _ => {
            clilog::debug!(D_MOD_RANGE, "unresolved range {}, assuming 1 bit", text);
            1
        }
    }
}

/// Width of a declared range; 1 when absent or unresolvable.
fn range_width(msb: Option<&str>, lsb: Option<&str>, symbols: &Symbols) -> u32 {
    match (msb, lsb) {
        (Some(msb), Some(lsb)) => bounded(
            dim_width(msb, lsb, symbols),
            &format!("[{}:{}]", msb, lsb)),
        _ => 1,
    }
}

/// Product of all packed dimensions, `[3:0][7:0]` is 32 bits wide.
fn packed_width(text: &str, symbols: &Symbols) -> u32 {
    let text = text.trim();
    if text.is_empty() {
        return 1;
    }

    let dims: Vec<_> = text.split(']')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect();
    let resolved: Vec<_> = RE_DIMENSION.captures_iter(text).collect();
    if dims.len() != resolved.len() {
        return bounded(None, text);
    }

    let width = resolved.iter()
        .try_fold(1u64, |acc, caps| acc.checked_mul(dim_width(&caps[1], &caps[2], symbols)?));
    bounded(width, text)
}

fn array_dims(text: &str, symbols: &Symbols) -> Vec<(i64, i64)> {
    RE_DIMENSION.captures_iter(text)
        .filter_map(|caps| eval_range(&caps[1], &caps[2], symbols))
        .collect()
}

fn ansi_ports(ctx: &PortContext) -> Option<Vec<Port>> {
    let section = ctx.port_section;
    let matches: Vec<_> = RE_ANSI.captures_iter(section).collect();
    let mut rv = vec![];

    for (i, caps) in matches.iter().enumerate() {
        if is_keyword(&caps[5]) {
            continue;
        }
        let direction = Direction::from_keyword(&caps[1])?;
        let signed = caps.get(3).is_some();
        let packed = caps.get(4).map_or("", |m| m.as_str());
        let integer = caps[2].split_whitespace().any(|word| word == "integer");
        let width = if integer && packed.trim().is_empty() {
            32
        } else {
            packed_width(packed, ctx.symbols)
        };
        let dims_text = caps.get(6).map_or("", |m| m.as_str());

        rv.push(Port {
            name: caps[5].to_string(),
            direction,
            width,
            signed,
            is_array: !dims_text.trim().is_empty(),
            array_dims: array_dims(dims_text, ctx.symbols),
        });

        // names sharing this declaration: `input [7:0] a, b`
        let gap_start = caps.get(0)?.end();
        let gap_end = matches.get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(section.len(), |m| m.start());

        for piece in section[gap_start..gap_end].split(',').skip(1) {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            match RE_CONTINUATION.captures(piece) {
                Some(more) if !is_keyword(&more[1]) => {
                    let dims_text = more.get(2).map_or("", |m| m.as_str());
                    rv.push(Port {
                        name: more[1].to_string(),
                        direction,
                        width,
                        signed,
                        is_array: !dims_text.trim().is_empty(),
                        array_dims: array_dims(dims_text, ctx.symbols),
                    });
                }
                _ => break,
            }
        }
    }

    Some(rv)
}

fn ranged_ports(ctx: &PortContext) -> Option<Vec<Port>> {
    RE_RANGED.captures_iter(ctx.port_section)
        .map(|caps| {
            Some(Port {
                name: caps[5].to_string(),
                direction: Direction::from_keyword(&caps[1])?,
                width: range_width(Some(&caps[3]), Some(&caps[4]), ctx.symbols),
                signed: caps.get(2).is_some(),
                is_array: false,
                array_dims: vec![],
            })
        })
        .collect()
}

fn bare_ports(ctx: &PortContext) -> Option<Vec<Port>> {
    RE_BARE.captures_iter(ctx.port_section)
        .filter(|caps| !is_keyword(&caps[2]))
        .map(|caps| {
            Some(Port::new(&caps[2], Direction::from_keyword(&caps[1])?))
        })
        .collect()
}

/// Old style declarations in the module body, `input [3:0] a, b;`.
fn body_ports(ctx: &PortContext) -> Option<Vec<Port>> {
    let mut rv = vec![];

    for caps in RE_BODY.captures_iter(ctx.body) {
        let direction = Direction::from_keyword(&caps[1])?;
        let signed = caps.get(3).is_some();
        let width = range_width(
            caps.get(4).map(|m| m.as_str()),
            caps.get(5).map(|m| m.as_str()),
            ctx.symbols,
        );

        let names = caps[6].split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| name.chars().all(|c| c.is_alphanumeric() || c == '_'))
            .filter(|name| !is_keyword(name));

        for name in names {
            rv.push(Port {
                name: name.to_string(),
                direction,
                width,
                signed,
                is_array: false,
                array_dims: vec![],
            });
        }
    }

    Some(rv)
}


#[cfg(test)]
mod test {
    use super::*;

    fn ports_of(port_section: &str, body: &str) -> Vec<Port> {
        let symbols = Symbols::new();
        extract_ports(&PortContext { port_section, body, symbols: &symbols })
    }

    #[test]
    fn test_ansi_full() {
        let ports = ports_of(
            "input wire clk, input signed [7:0] a [0:3][0:1], output reg [15:0] y",
            "");

        assert_eq!(3, ports.len());
        assert_eq!(Port::new("clk", Direction::Input), ports[0]);

        assert_eq!("a", ports[1].name);
        assert_eq!(8, ports[1].width);
        assert!(ports[1].signed);
        assert!(ports[1].is_array);
        assert_eq!(vec![(0, 3), (0, 1)], ports[1].array_dims);

        assert_eq!(Direction::Output, ports[2].direction);
        assert_eq!(16, ports[2].width);
        assert!(!ports[2].is_array);
    }

    #[test]
    fn test_shared_declaration() {
        let ports = ports_of("input [3:0] a, b,\n output c, d", "");
        let names: Vec<_> = ports.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(vec!["a", "b", "c", "d"], names);
        assert_eq!(4, ports[1].width);
        assert_eq!(Direction::Input, ports[1].direction);
        assert_eq!(Direction::Output, ports[3].direction);
        assert_eq!(1, ports[3].width);
    }

    #[test]
    fn test_parameterized_width() {
        let mut symbols = Symbols::new();
        symbols.insert("WIDTH".into(), "12".into());
        symbols.insert("W2".into(), "WIDTH".into());
        let ctx = PortContext {
            port_section: "input [WIDTH-1:0] a, output [W2:1] b, output [N-1:0] c",
            body: "",
            symbols: &symbols,
        };
        let ports = extract_ports(&ctx);

        assert_eq!(12, ports[0].width);
        assert_eq!(12, ports[1].width);
        assert_eq!(1, ports[2].width);
    }

    #[test]
    fn test_typed_and_packed() {
        let ports = ports_of("input logic clk, output logic [3:0][7:0] bus, input integer n, input var logic unsigned [1:0] v", "");
        let got: Vec<_> = ports.iter().map(|p| (p.name.as_str(), p.width)).collect();

        assert_eq!(vec![("clk", 1), ("bus", 32), ("n", 32), ("v", 2)], got);
        assert!(!ports[1].is_array);
    }

    #[test]
    fn test_oversized_ranges() {
        let ports = ports_of(
            "input [9223372036854775807:-1] a, input [100000000000:0] b, \
             input [-9223372036854775808:1] c, input [65535:0] d, input [65536:0] e",
            "");
        let got: Vec<_> = ports.iter().map(|p| (p.name.as_str(), p.width)).collect();

        assert_eq!(vec![("a", 1), ("b", 1), ("c", 1), ("d", 65536), ("e", 1)], got);

        let mut symbols = Symbols::new();
        symbols.insert("BIG".into(), "9223372036854775807".into());
        assert_eq!(1, range_width(Some("BIG+1"), Some("0"), &symbols));
        assert_eq!(1, packed_width("[65535:0][1:0]", &symbols));
    }

    #[test]
    fn test_non_ansi_body() {
        let body = "module m(a, b, y);\n  input clk, rst_n;\n  input [7:0] a, b;\n  output reg [8:0] y;\nendmodule";
        let ports = ports_of("a, b, y", body);
        let names: Vec<_> = ports.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(vec!["clk", "rst_n", "a", "b", "y"], names);
        assert_eq!(8, ports[3].width);
        assert_eq!(9, ports[4].width);
        assert_eq!(Direction::Output, ports[4].direction);
    }

    #[test]
    fn test_strategies_are_independent() {
        let symbols = Symbols::new();
        let ctx = PortContext {
            port_section: "input a, output b",
            body: "",
            symbols: &symbols,
        };

        assert_eq!(2, ranged_ports(&ctx).unwrap().len() + bare_ports(&ctx).unwrap().len());
        assert_eq!(Some(vec![]), body_ports(&ctx));
    }

    #[test]
    fn test_nothing_found() {
        assert!(ports_of("", "").is_empty());
        assert!(ports_of("a, b", "assign a = b;").is_empty());
    }
}
