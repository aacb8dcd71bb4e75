use super::ModuleInterface;

use std::fmt::Write;

fn range(width: u32) -> String {
    if width > 1 {
        format!("[{}:0] ", width - 1)
    } else {
        String::new()
    }
}

/// Render a self-checking testbench shell for `interface`. The result
/// drives every input to zero, applies reset, dumps a waveform and
/// reports through the `[DONE] passed=.. failed=..` banner.
pub fn testbench_skeleton(interface: &ModuleInterface) -> String {
    let mut tb = String::new();
    let name = &interface.name;

    // writing into a String cannot fail
    let _ = render(&mut tb, interface, name);
    tb
}

fn render(tb: &mut String, interface: &ModuleInterface, name: &str) -> std::fmt::Result {
    writeln!(tb, "`timescale 1ns/1ps")?;
    writeln!(tb)?;
    writeln!(tb, "module {}_tb;", name)?;
    writeln!(tb)?;

    // arrays stay unconnected
    for port in interface.inputs().filter(|p| !p.is_array) {
        writeln!(tb, "    reg {}{};", range(port.width), port.name)?;
    }
    for port in interface.outputs().filter(|p| !p.is_array) {
        writeln!(tb, "    wire {}{};", range(port.width), port.name)?;
    }
    writeln!(tb)?;
    writeln!(tb, "    integer passed, failed;")?;
    writeln!(tb)?;

    if let Some(clk) = interface.clock_name() {
        writeln!(tb, "    initial begin")?;
        writeln!(tb, "        {} = 0;", clk)?;
        writeln!(tb, "        forever #5 {} = ~{};", clk, clk)?;
        writeln!(tb, "    end")?;
        writeln!(tb)?;
    }

    let connections: Vec<_> = interface.ports.iter()
        .filter(|p| !p.is_array)
        .map(|p| format!("        .{}({})", p.name, p.name))
        .collect();
    writeln!(tb, "    {} dut (", name)?;
    writeln!(tb, "{}", connections.join(",\n"))?;
    writeln!(tb, "    );")?;
    writeln!(tb)?;

    writeln!(tb, "    initial begin")?;
    writeln!(tb, "        $dumpfile(\"{}_tb.vcd\");", name)?;
    writeln!(tb, "        $dumpvars(0, {}_tb);", name)?;
    writeln!(tb)?;
    writeln!(tb, "        passed = 0;")?;
    writeln!(tb, "        failed = 0;")?;
    writeln!(tb)?;

    if let Some(rst) = interface.reset_name() {
        let (assert, release) = if interface.reset_active_low() { (0, 1) } else { (1, 0) };
        writeln!(tb, "        {} = {};", rst, assert)?;
        writeln!(tb, "        #20 {} = {};", rst, release)?;
        writeln!(tb)?;
    }

    for port in interface.inputs() {
        if port.is_clock() || port.is_reset() || port.is_array {
            continue;
        }
        writeln!(tb, "        {} = 0;", port.name)?;
    }

    writeln!(tb, "        #100;")?;
    writeln!(tb)?;
    writeln!(tb, "        $display(\"[DONE] passed=%0d failed=%0d\", passed, failed);")?;
    writeln!(tb, "        $finish;")?;
    writeln!(tb, "    end")?;
    writeln!(tb)?;
    write!(tb, "endmodule")
}
