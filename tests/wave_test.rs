use hdlprobe::{
    error::Error,
    wave::{coverage::toggle_coverage, parse_waveform, Waveform, MAX_TRACE_ENTRIES},
};
use std::io::Write;
use tempdir::TempDir;


const DEMO_FILE: &str = "demos/counter.vcd";

#[test]
fn load_demo() {
    clilog::init_stdout_simple_trace();

    let wf = parse_waveform(DEMO_FILE).unwrap();

    assert_eq!("1ns", wf.timescale());
    assert_eq!(40, wf.end_time());
    assert_eq!(6, wf.num_signals());
    assert_eq!("tb.dut.count", wf.find_signal("count").unwrap().full_path());
    assert_eq!(9, wf.transitions("!").len());

    assert_eq!(Some("xxxxxxxx"), wf.value_at("data", 19));
    assert_eq!(Some("00001111"), wf.value_at("tb.data", 20));
    assert_eq!(Some("0011"), wf.value_at("dut.count", 1000));
    assert_eq!("0010", wf.transitions_in_range("$", 20, 30)[0].value);
}

#[test]
fn round_trip_single_vector_change() {
    let tmpd = TempDir::new("hdlprobe").unwrap();
    let path = tmpd.path().join("data.vcd");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "$timescale 1ns $end").unwrap();
    writeln!(file, "$scope module tb $end").unwrap();
    writeln!(file, "$var wire 8 d data [7:0] $end").unwrap();
    writeln!(file, "$upscope $end").unwrap();
    writeln!(file, "$enddefinitions $end").unwrap();
    writeln!(file, "#20").unwrap();
    writeln!(file, "b00001111 d").unwrap();
    drop(file);

    let wf = parse_waveform(&path).unwrap();

    assert_eq!(8, wf.find_signal("data").unwrap().width);
    assert_eq!(Some("00001111"), wf.value_at("data", 25));
    assert_eq!(None, wf.value_at("data", 5));
}

#[test]
fn missing_file() {
    match parse_waveform("demos/does_not_exist.vcd") {
        Err(Error::FileNotFound(_)) => {}
        other => panic!("expected FileNotFound, got {:?}", other.map(|wf| wf.num_signals())),
    }
}

#[test]
fn value_never_looks_ahead() {
    let wf = parse_waveform(DEMO_FILE).unwrap();

    for sig in wf.signals() {
        let transitions = wf.transitions(&sig.identifier);
        for t in 0..=wf.end_time() + 5 {
            let expected = transitions.iter()
                .filter(|tr| tr.time_ns <= t)
                .last()
                .map(|tr| tr.value.as_str());
            assert_eq!(expected, wf.value_at(&sig.identifier, t), "{} at {}", sig.name, t);
        }
    }
}

#[test]
fn trace_before_error() {
    let wf = parse_waveform(DEMO_FILE).unwrap();
    let trace = wf.causal_trace("error", 35, 10);

    let got: Vec<_> = trace.iter()
        .map(|e| (e.signal.as_str(), e.time_ns, e.delta_ns, e.is_anchor))
        .collect();
    assert_eq!(
        vec![
            ("tb.clk", 35, 0, false),
            ("tb.dut.count", 35, 0, false),
            ("tb.dut.error", 35, 0, true),
            ("tb.clk", 30, 5, false),
            ("tb.clk", 25, 10, false),
            ("tb.dut.count", 25, 10, false),
        ],
        got
    );
}

#[test]
fn trace_bounds_hold_for_any_window() {
    let wf = parse_waveform(DEMO_FILE).unwrap();

    for failure in (0..=40).step_by(5) {
        for window in [0, 1, 7, 20, 100, u64::MAX].iter() {
            let trace = wf.causal_trace("clk", failure, *window);

            assert!(trace.len() <= MAX_TRACE_ENTRIES);
            assert!(trace.iter().all(|e| e.delta_ns <= *window));
            assert!(trace.iter().all(|e| e.time_ns + e.delta_ns == failure));
            assert!(trace.windows(2).all(|w| w[0].delta_ns <= w[1].delta_ns));
        }
    }
}

#[test]
fn coverage_of_demo() {
    let cov = toggle_coverage(&parse_waveform(DEMO_FILE).unwrap());

    assert_eq!(vec!["tb.valid"], cov.signals_with_no_toggles);
    assert_eq!(Some(&100.0), cov.toggle_coverage.get("tb.dut.error"));
    assert!((cov.overall_toggle_pct - 500.0 / 6.0).abs() < 1e-9);
}

#[test]
fn empty_dump() {
    let wf = Waveform::parse_str("");

    assert_eq!(0, wf.num_signals());
    assert_eq!(0, wf.end_time());
    assert!(wf.causal_trace("anything", 10, 10).is_empty());
}
