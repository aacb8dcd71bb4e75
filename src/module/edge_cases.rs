//! Boundary stimulus values for the data inputs of a module.

use super::ModuleInterface;

use rug::Integer;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeCase {
    pub name: String,
    #[serde(serialize_with = "serialize_integer")]
    pub value: Integer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortEdgeCases {
    pub port: String,
    pub width: u32,
    pub cases: Vec<EdgeCase>,
}

pub(crate) fn serialize_integer<S: Serializer>(value: &Integer, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

fn case(name: impl Into<String>, value: Integer) -> EdgeCase {
    EdgeCase { name: name.into(), value }
}

/// Repeat a two bit pattern over `2 * (width / 2)` bits.
fn alternating(width: u32, pattern: u32) -> Integer {
    let mut rv = Integer::new();
    for _ in 0..width / 2 {
        rv <<= 2u32;
        rv += pattern;
    }
    rv
}

/// Clock, reset and array ports are skipped.
pub fn generate_edge_cases(interface: &ModuleInterface) -> Vec<PortEdgeCases> {
    let mut rv = vec![];

    for port in interface.inputs() {
        if port.is_clock() || port.is_reset() || port.is_array {
            continue;
        }

        let w = port.width;
        let max = port.max_value();
        let mut cases = vec![
            case("zero", Integer::new()),
            case("max", max.clone()),
        ];

        if w > 1 {
            cases.push(case("one", Integer::from(1)));
            cases.push(case("max_minus_one", Integer::from(&max - 1u32)));
        }

        for i in 0..w.min(8) {
            let val = Integer::from(1) << i;
            if val <= max {
                cases.push(case(format!("pow2_{}", i), val));
            }
        }

        if w >= 2 {
            cases.push(case("alternating_10", alternating(w, 0b10)));
            cases.push(case("alternating_01", alternating(w, 0b01)));
        }

        rv.push(PortEdgeCases {
            port: port.name.clone(),
            width: w,
            cases,
        });
    }

    rv
}
