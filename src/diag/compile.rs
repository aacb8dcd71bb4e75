use super::parse_number;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref RE_DIAGNOSTIC: Regex = Regex::new(
        r"(?m)^([^:\n]+):(\d+):(?:(\d+):)?\s*(error|warning|syntax error):\s*(.+?)\s*$"
    ).unwrap();
    static ref RE_BARE_SYNTAX: Regex = Regex::new(
        r"(?m)^([^:\n]+):(\d+):\s*syntax error"
    ).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Syntax,
    Binding,
    Type,
    Port,
    Range,
    Warning,
    Error,
}

impl ErrorKind {
    /// Refine a generic error by the words in its message.
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| message.contains(w));

        if has(&["syntax"]) {
            Self::Syntax
        } else if has(&["bind", "undeclared", "unknown"]) {
            Self::Binding
        } else if has(&["type", "width"]) {
            Self::Type
        } else if has(&["port"]) {
            Self::Port
        } else if has(&["range", "index"]) {
            Self::Range
        } else {
            Self::Error
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Syntax => Some("Check for missing semicolons, mismatched begin/end, or invalid keywords"),
            Self::Binding => Some("Declare the signal as wire or reg before it is used"),
            Self::Type => Some("Check that bit widths match between assignments and declarations"),
            Self::Port => Some("Check that module port declarations match the instantiation"),
            Self::Range => Some("Check that array and vector indices are within the declared bounds"),
            Self::Warning | Self::Error => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileError {
    pub line: u32,
    pub column: Option<u32>,
    pub kind: ErrorKind,
    pub message: String,
    pub hint: Option<String>,
}

impl CompileError {
    fn new(line: u32, column: Option<u32>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            kind,
            message: message.into(),
            hint: kind.hint().map(String::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileResult {
    /// Clean exit and nothing worse than warnings.
    pub success: bool,
    pub errors: Vec<CompileError>,
    pub raw_output: String,
}

impl CompileResult {
    pub fn warnings(&self) -> impl Iterator<Item = &CompileError> {
        self.errors.iter().filter(|e| e.kind == ErrorKind::Warning)
    }
}

/// Parse compiler output of the `file:line: severity: message` form.
pub fn parse_compile(output: &str, exit_code: i32) -> CompileResult {
    let mut errors: Vec<CompileError> = vec![];

    for caps in RE_DIAGNOSTIC.captures_iter(output) {
        let line = match parse_number(caps.get(2)) {
            Some(line) => line,
            None => continue,
        };
        let column = parse_number(caps.get(3));
        let message = &caps[5];

        let kind = match &caps[4] {
            "syntax error" => ErrorKind::Syntax,
            "warning" => ErrorKind::Warning,
            _ => ErrorKind::classify(message),
        };

        errors.push(CompileError::new(line, column, kind, message));
    }

    for caps in RE_BARE_SYNTAX.captures_iter(output) {
        let line = match parse_number(caps.get(2)) {
            Some(line) => line,
            None => continue,
        };
        if !errors.iter().any(|e| e.line == line) {
            errors.push(CompileError::new(line, None, ErrorKind::Syntax, "Syntax error"));
        }
    }

    if exit_code != 0 && errors.is_empty() {
        errors.push(CompileError::new(
            0, None, ErrorKind::Error,
            format!("compiler exited with status {} without diagnostics", exit_code),
        ));
    }

    let success = exit_code == 0 && errors.iter().all(|e| e.kind == ErrorKind::Warning);

    clilog::debug!(D_DIAG_COMPILE, "{} compiler diagnostics, success={}", errors.len(), success);

    CompileResult {
        success,
        errors,
        raw_output: output.to_string(),
    }
}
