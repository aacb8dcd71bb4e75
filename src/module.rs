//! Structural interface extraction from HDL module source.
//!
//! This is best-effort recovery of a module's ports, parameters and
//! state machine shape from text, not a parser. Unrecognized text
//! degrades to fewer or less precise results and never to an error.

pub mod edge_cases;
pub mod fsm;
pub mod header;
pub mod params;
pub mod ports;
pub mod testbench;

use self::edge_cases::serialize_integer;
use self::ports::{PortContext, Symbols};

use rug::Integer;
use serde::Serialize;

const CLOCK_NAMES: [&str; 2] = ["clk", "clock"];
const RESET_NAMES: [&str; 4] = ["rst", "reset", "rst_n", "reset_n"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
}

impl Direction {
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "input" => Some(Self::Input),
            "output" => Some(Self::Output),
            "inout" => Some(Self::Inout),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Inout => "inout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    /// Always at least 1.
    pub width: u32,
    pub signed: bool,
    pub is_array: bool,
    /// Unpacked dimensions as `(msb, lsb)`, outermost first.
    pub array_dims: Vec<(i64, i64)>,
}

impl Port {
    /// A scalar, unsigned port.
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            width: 1,
            signed: false,
            is_array: false,
            array_dims: vec![],
        }
    }

    /// `2^width - 1`, exact for any width.
    pub fn max_value(&self) -> Integer {
        (Integer::from(1) << self.width) - 1u32
    }

    /// Verilog declaration, e.g. `input signed [7:0] a`.
    pub fn declaration(&self) -> String {
        let signed = if self.signed { "signed " } else { "" };
        let range = if self.width > 1 {
            format!("[{}:0] ", self.width - 1)
        } else {
            String::new()
        };
        format!("{} {}{}{}", self.direction.keyword(), signed, range, self.name)
    }

    /// Sized literal prefix suitable for this port, `8'd` or `40'h`.
    pub fn literal_prefix(&self) -> String {
        if self.width <= 32 {
            format!("{}'d", self.width)
        } else {
            format!("{}'h", self.width)
        }
    }

    pub fn is_clock(&self) -> bool {
        CLOCK_NAMES.contains(&self.name.to_lowercase().as_str())
    }

    pub fn is_reset(&self) -> bool {
        RESET_NAMES.contains(&self.name.to_lowercase().as_str())
    }
}

/// Serialized form of a port, adding the derived maximum value.
#[derive(Serialize)]
struct PortView<'a> {
    #[serde(flatten)]
    port: &'a Port,
    #[serde(serialize_with = "serialize_integer")]
    max_value: Integer,
}

fn port_views<'a>(ports: impl Iterator<Item = &'a Port>) -> Vec<PortView<'a>> {
    ports
        .map(|port| PortView { port, max_value: port.max_value() })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Unevaluated text of the default.
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FsmInfo {
    pub state_register: String,
    pub states: Vec<String>,
    pub state_width: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInterface {
    pub name: String,
    pub ports: Vec<Port>,
    pub parameters: Vec<Parameter>,
    pub fsm: Option<FsmInfo>,
}

impl ModuleInterface {
    pub fn inputs(&self) -> impl Iterator<Item = &Port> {
        self.ports_in(Direction::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Port> {
        self.ports_in(Direction::Output)
    }

    pub fn inouts(&self) -> impl Iterator<Item = &Port> {
        self.ports_in(Direction::Inout)
    }

    fn ports_in(&self, direction: Direction) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(move |p| p.direction == direction)
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn clock_name(&self) -> Option<&str> {
        self.inputs().find(|p| p.is_clock()).map(|p| p.name.as_str())
    }

    pub fn reset_name(&self) -> Option<&str> {
        self.inputs().find(|p| p.is_reset()).map(|p| p.name.as_str())
    }

    pub fn has_clock(&self) -> bool {
        self.clock_name().is_some()
    }

    pub fn has_reset(&self) -> bool {
        self.reset_name().is_some()
    }

    pub fn reset_active_low(&self) -> bool {
        self.reset_name()
            .map_or(false, |name| name.to_lowercase().contains("_n"))
    }
}

impl Serialize for ModuleInterface {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut st = s.serialize_struct("ModuleInterface", 11)?;
        st.serialize_field("name", &self.name)?;
        st.serialize_field("ports", &port_views(self.ports.iter()))?;
        st.serialize_field("inputs", &port_views(self.inputs()))?;
        st.serialize_field("outputs", &port_views(self.outputs()))?;
        st.serialize_field("parameters", &self.parameters)?;
        st.serialize_field("fsm", &self.fsm)?;
        st.serialize_field("has_clock", &self.has_clock())?;
        st.serialize_field("clock_name", &self.clock_name())?;
        st.serialize_field("has_reset", &self.has_reset())?;
        st.serialize_field("reset_name", &self.reset_name())?;
        st.serialize_field("reset_active_low", &self.reset_active_low())?;
        st.end()
    }
}

/// Recover the interface of the top-level module in `source`, taken
/// to be the last module declared. `None` when no module header is
/// recognized.
pub fn extract_interface(source: &str) -> Option<ModuleInterface> {
    let source = header::strip_comments(source);
    let header = header::find_module(&source)?;

    let decls = params::extract_declarations(header.body);

    let symbols: Symbols = decls.parameters.iter()
        .filter_map(|p| Some((p.name.clone(), p.default_value.clone()?)))
        .chain(decls.localparams.iter().cloned())
        .collect();

    let ports = ports::extract_ports(&PortContext {
        port_section: header.port_section,
        body: header.body,
        symbols: &symbols,
    });

    if ports.is_empty() {
        clilog::warn!(W_MOD_NO_PORTS, "no ports recovered for module '{}'", header.name);
    }

    let fsm = fsm::detect_fsm(header.body, &decls.localparams);

    Some(ModuleInterface {
        name: header.name.to_string(),
        ports,
        parameters: decls.parameters,
        fsm,
    })
}


#[cfg(test)]
mod test {
    use super::*;

    const MATMUL: &str = "
module matmul_4x4 (
    input wire clk,
    input wire rst,
    input wire start,
    input wire [7:0] a [0:3][0:3],
    input wire [7:0] b [0:3][0:3],
    output reg [15:0] c [0:3][0:3],
    output reg done
);

    reg [2:0] state;

    localparam IDLE = 3'b000;
    localparam COMPUTE = 3'b001;
    localparam DONE_STATE = 3'b010;

    always @(posedge clk) begin
        case (state)
            IDLE: state <= COMPUTE;
            COMPUTE: state <= DONE_STATE;
            DONE_STATE: state <= IDLE;
        endcase
    end
endmodule
";

    #[test]
    fn test_matmul() {
        let iface = extract_interface(MATMUL).unwrap();

        assert_eq!("matmul_4x4", iface.name);
        assert_eq!(7, iface.ports.len());
        assert_eq!(5, iface.inputs().count());
        assert_eq!(2, iface.outputs().count());
        assert_eq!(Some("clk"), iface.clock_name());
        assert_eq!(Some("rst"), iface.reset_name());
        assert!(!iface.reset_active_low());

        let c = iface.port("c").unwrap();
        assert_eq!(16, c.width);
        assert_eq!(vec![(0, 3), (0, 3)], c.array_dims);

        let fsm = iface.fsm.unwrap();
        assert_eq!("state", fsm.state_register);
        assert_eq!(3, fsm.state_width);
        assert_eq!(vec!["IDLE", "COMPUTE", "DONE_STATE"], fsm.states);
    }

    #[test]
    fn test_port_views() {
        let mut p = Port::new("data", Direction::Input);
        p.width = 8;
        p.signed = true;

        assert_eq!("input signed [7:0] data", p.declaration());
        assert_eq!("8'd", p.literal_prefix());
        assert_eq!(Integer::from(255), p.max_value());

        p.width = 40;
        assert_eq!("40'h", p.literal_prefix());

        let q = Port::new("q", Direction::Output);
        assert_eq!("output q", q.declaration());
        assert_eq!(Integer::from(1), q.max_value());
    }

    #[test]
    fn test_reset_polarity_case_insensitive() {
        let iface = extract_interface(
            "module m(input CLOCK, input RST_N, output y);\nendmodule").unwrap();

        assert!(iface.has_clock());
        assert_eq!(Some("RST_N"), iface.reset_name());
        assert!(iface.reset_active_low());
    }

    #[test]
    fn test_commented_ports_ignored() {
        let iface = extract_interface(
            "module m(\n  input a, // input ghost\n  /* output phantom, */\n  output y\n);\nendmodule"
        ).unwrap();
        let names: Vec<_> = iface.ports.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(vec!["a", "y"], names);
    }

    #[test]
    fn test_serialized_shape() {
        let iface = extract_interface(
            "module m #(parameter W = 4) (input [W-1:0] a, output y);\nendmodule").unwrap();
        let json = serde_json::to_value(&iface).unwrap();

        assert_eq!("m", json["name"]);
        assert_eq!("input", json["ports"][0]["direction"]);
        assert_eq!(Some(4), json["ports"][0]["width"].as_u64());
        assert_eq!("15", json["ports"][0]["max_value"]);
        assert_eq!("y", json["outputs"][0]["name"]);
        assert_eq!("4", json["parameters"][0]["default_value"]);
        assert!(json["fsm"].is_null());
        assert_eq!(false, json["has_clock"]);
    }

    #[test]
    fn test_not_found() {
        assert_eq!(None, extract_interface(""));
        assert_eq!(None, extract_interface("this is not verilog at all"));
    }
}
