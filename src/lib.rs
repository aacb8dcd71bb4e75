pub mod config;
pub mod data;
pub mod diag;
pub mod error;
pub mod module;
pub mod wave;

use config::Config;
use diag::{parse_compile, parse_simulation, parse_synthesis};
use error::*;
use module::edge_cases::{generate_edge_cases, PortEdgeCases};
use module::testbench::testbench_skeleton;
use module::{extract_interface, ModuleInterface};
use wave::coverage::toggle_coverage;
use wave::{parse_waveform, Waveform};

use clap::{Parser, Subcommand};
use clilog::log::LevelFilter;
use serde::Serialize;
use std::io::Read;
use std::path::Path;


/// Turn HDL sources, tool logs and waveform dumps into JSON.
#[derive(Parser, Debug)]
#[clap(name = "hdlprobe", version)]
pub struct Opts {
    /// Log level (off, error, warn, info, debug, trace)
    #[clap(long)]
    log: Option<LevelFilter>,

    #[clap(subcommand)]
    command: Command,
}

impl Opts {
    pub fn log_level(&self) -> Option<LevelFilter> {
        self.log
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the interface of the last module in a source file
    Interface {
        /// HDL source, `-` for stdin
        file: String,

        /// Add boundary stimulus values per data input
        #[clap(long)]
        edge_cases: bool,

        /// Add a testbench skeleton
        #[clap(long)]
        testbench: bool,
    },

    /// Parse compiler output
    Compile {
        /// Captured output, `-` for stdin
        #[clap(value_name = "LOG")]
        output: String,

        #[clap(long, default_value = "0", allow_hyphen_values = true)]
        exit_code: i32,
    },

    /// Parse simulator output
    Simulate {
        /// Captured output, `-` for stdin
        #[clap(value_name = "LOG")]
        output: String,

        #[clap(long, default_value = "0", allow_hyphen_values = true)]
        exit_code: i32,
    },

    /// Parse synthesizer output
    Synth {
        /// Captured output, `-` for stdin
        #[clap(value_name = "LOG")]
        output: String,

        #[clap(long, default_value = "0", allow_hyphen_values = true)]
        exit_code: i32,
    },

    /// List the signals of a waveform dump
    Summary {
        vcd: String,
    },

    /// Value of a signal at a point in time
    Value {
        vcd: String,
        signal: String,
        time: u64,
    },

    /// Changes of all signals shortly before a failure
    Trace {
        vcd: String,
        signal: String,
        time: u64,

        /// Look-back window, defaults to HDLPROBE_TRACE_WINDOW
        #[clap(long)]
        window: Option<u64>,
    },

    /// Toggle coverage of every signal
    Coverage {
        vcd: String,
    },
}

#[derive(Serialize)]
struct InterfaceReport<'a> {
    #[serde(flatten)]
    interface: &'a ModuleInterface,
    #[serde(skip_serializing_if = "Option::is_none")]
    edge_cases: Option<Vec<PortEdgeCases>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    testbench: Option<String>,
}

#[derive(Serialize)]
struct ValueReport<'a> {
    signal: String,
    time: u64,
    value: Option<&'a str>,
}

#[derive(Serialize)]
struct TraceReport {
    signal: String,
    failure_time: u64,
    window: u64,
    entries: Vec<wave::CausalEntry>,
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = Path::new(path);
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn load_waveform(path: &str) -> Result<Waveform> {
    if path == "-" {
        Ok(Waveform::parse_str(&read_input(path)?))
    } else {
        parse_waveform(path)
    }
}

fn anchor_path(wf: &Waveform, signal: &str) -> Result<String> {
    wf.find_signal(signal)
        .map(|s| s.full_path())
        .ok_or_else(|| Error::NotFound(signal.to_string()))
}

/// Execute one subcommand and return its JSON report.
pub fn run(opts: Opts, config: &Config) -> Result<String> {
    let json = match opts.command {
        Command::Interface { file, edge_cases, testbench } => {
            let source = read_input(&file)?;
            let interface = extract_interface(&source)
                .ok_or_else(|| Error::NotFound(format!("module in {}", file)))?;

            let report = InterfaceReport {
                edge_cases: edge_cases.then(|| generate_edge_cases(&interface)),
                testbench: testbench.then(|| testbench_skeleton(&interface)),
                interface: &interface,
            };
            serde_json::to_string_pretty(&report)?
        }

        Command::Compile { output, exit_code } => {
            serde_json::to_string_pretty(&parse_compile(&read_input(&output)?, exit_code))?
        }

        Command::Simulate { output, exit_code } => {
            serde_json::to_string_pretty(&parse_simulation(&read_input(&output)?, exit_code))?
        }

        Command::Synth { output, exit_code } => {
            serde_json::to_string_pretty(&parse_synthesis(&read_input(&output)?, exit_code))?
        }

        Command::Summary { vcd } => {
            serde_json::to_string_pretty(&load_waveform(&vcd)?.summary())?
        }

        Command::Value { vcd, signal, time } => {
            let wf = load_waveform(&vcd)?;
            let report = ValueReport {
                signal: anchor_path(&wf, &signal)?,
                time,
                value: wf.value_at(&signal, time),
            };
            serde_json::to_string_pretty(&report)?
        }

        Command::Trace { vcd, signal, time, window } => {
            let wf = load_waveform(&vcd)?;
            let window = window.unwrap_or_else(|| config.get_trace_window());
            let report = TraceReport {
                signal: anchor_path(&wf, &signal)?,
                failure_time: time,
                window,
                entries: wf.causal_trace(&signal, time, window),
            };
            serde_json::to_string_pretty(&report)?
        }

        Command::Coverage { vcd } => {
            serde_json::to_string_pretty(&toggle_coverage(&load_waveform(&vcd)?))?
        }
    };

    Ok(json)
}
