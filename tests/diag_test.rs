use hdlprobe::diag::{parse_compile, parse_simulation, parse_synthesis, ErrorKind};


fn demo_log(name: &str) -> String {
    std::fs::read_to_string(format!("demos/{}", name)).unwrap()
}

#[test]
fn compile_log() {
    clilog::init_stdout_simple_trace();

    let res = parse_compile(&demo_log("compile.log"), 1);
    let got: Vec<_> = res.errors.iter()
        .map(|e| (e.line, e.column, e.kind))
        .collect();

    assert!(!res.success);
    assert_eq!(
        vec![
            (12, None, ErrorKind::Binding),
            (20, Some(7), ErrorKind::Warning),
            (31, None, ErrorKind::Error),
        ],
        got
    );
    assert_eq!(1, res.warnings().count());
    assert!(res.raw_output.contains("during elaboration"));
}

#[test]
fn compile_syntax_error_with_clean_exit() {
    let res = parse_compile("design.v:12: error: syntax error near 'endmodule'\n", 0);

    assert!(!res.success);
    assert_eq!(1, res.errors.len());
    assert_eq!(12, res.errors[0].line);
    assert_eq!(ErrorKind::Syntax, res.errors[0].kind);
}

#[test]
fn compile_warnings_only() {
    let res = parse_compile("a.v:1: warning: timescale missing\n", 0);
    assert!(res.success);

    let res = parse_compile("a.v:1: warning: timescale missing\n", 1);
    assert!(!res.success);
}

#[test]
fn simulation_log() {
    let res = parse_simulation(&demo_log("sim.log"), 0);

    assert!(!res.passed);
    assert_eq!(1, res.failures.len());
    assert_eq!("result", res.failures[0].signal);
    assert_eq!("8", res.failures[0].expected);
    assert_eq!("9", res.failures[0].actual);
    assert_eq!(Some(4), res.failures[0].cycle);
    assert_eq!(Some(45), res.failures[0].time_ns);
    assert_eq!(Some(5), res.passed_count);
    assert_eq!(Some(1), res.failed_count);
}

#[test]
fn simulation_pass_banner() {
    let res = parse_simulation("[DONE] passed=4 failed=0\nAll tests passed\n", 0);

    assert!(res.passed);
    assert!(res.failures.is_empty());
}

#[test]
fn synthesis_log() {
    let res = parse_synthesis(&demo_log("synth.log"), 0);

    assert!(res.success);
    assert_eq!(7, res.cell_counts.len());
    assert_eq!(41, res.total_cells());
    // 31 gates, no lookup table primitives
    assert_eq!(Some(8), res.lookup_table_count);
    assert_eq!(Some(10), res.flip_flop_count);
}

#[test]
fn synthesis_gate_fallback() {
    let out = "   Number of cells:   9\n     $_AND_   4\n     $_OR_   5\n";
    let res = parse_synthesis(out, 0);

    assert_eq!(Some(3), res.lookup_table_count);
}

#[test]
fn never_panics_on_garbage() {
    let garbage = "\u{0}\u{7f}::::\n#!?\n[FAIL]\n[DONE]\nNumber of cells\n  x y z\n";

    for code in [0, 1, -1].iter() {
        let _ = parse_compile(garbage, *code);
        let _ = parse_simulation(garbage, *code);
        let synth = parse_synthesis(garbage, *code);
        assert_eq!(*code == 0, synth.success);
    }
}
