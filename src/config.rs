use clilog::log::LevelFilter;
use std::env::var;
use std::str::FromStr;

pub const DEFAULT_TRACE_WINDOW: u64 = 100;
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;


#[derive(Debug)]
pub struct Config {
    trace_window: u64,
    log_level: LevelFilter,
}

impl Config {
    pub fn load() -> Self {
        let trace_window = Self::find_trace_window();
        let log_level = Self::find_log_level();

        Self {
            trace_window,
            log_level,
        }
    }

    pub fn test_config() -> Self {
        Self {
            trace_window: DEFAULT_TRACE_WINDOW,
            log_level: LevelFilter::Trace,
        }
    }

    fn find_trace_window() -> u64 {
        match var("HDLPROBE_TRACE_WINDOW") {
            Ok(text) => match text.trim().parse::<u64>() {
                Ok(window) => window,
                Err(_) => {
                    clilog::warn!(W_CFG_WINDOW,
                                  "ignoring HDLPROBE_TRACE_WINDOW={:?}, using {}",
                                  text, DEFAULT_TRACE_WINDOW);
                    DEFAULT_TRACE_WINDOW
                }
            },
            Err(_) => DEFAULT_TRACE_WINDOW,
        }
    }

    fn find_log_level() -> LevelFilter {
        match var("HDLPROBE_LOG") {
            Ok(text) => LevelFilter::from_str(text.trim()).unwrap_or_else(|_| {
                clilog::warn!(W_CFG_LOG, "ignoring HDLPROBE_LOG={:?}", text);
                DEFAULT_LOG_LEVEL
            }),
            Err(_) => DEFAULT_LOG_LEVEL,
        }
    }

    pub fn get_trace_window(&self) -> u64 {
        self.trace_window
    }

    pub fn get_log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: LevelFilter) {
        self.log_level = level;
    }
}
