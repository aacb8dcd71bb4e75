use super::*;
use crate::error::*;

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref RE_TIMESCALE: Regex =
        Regex::new(r"\$timescale\s+(\d+)\s*([a-zA-Z]+)\s+\$end").unwrap();
    static ref RE_SCOPE: Regex =
        Regex::new(r"^\$scope\s+\S+\s+(\S+)\s+\$end").unwrap();
    static ref RE_VAR: Regex = Regex::new(
        r"^\$var\s+\S+\s+(\d+)\s+(\S+)\s+(\S+)(?:\s+\[[^\]]*\])?\s+\$end"
    ).unwrap();
}

/// Read and parse the dump at `path`. Only a missing or unreadable
/// file is an error; malformed content is skipped line by line.
pub fn parse_waveform(path: impl AsRef<Path>) -> Result<Waveform> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let wf = Waveform::parse_str(&String::from_utf8_lossy(&bytes));

    clilog::info!(I_WAVE_LOADED, "{:?}: {} signals up to t={} ({})",
                  path, wf.num_signals(), wf.end_time(), wf.timescale());

    Ok(wf)
}

impl Waveform {
    /// Parse dump text held in memory.
    pub fn parse_str(text: &str) -> Self {
        let mut wf = Waveform {
            timescale: parse_timescale(text),
            ..Waveform::default()
        };

        wf.parse_declarations(text);
        wf.parse_changes(text);
        wf
    }

    fn parse_declarations(&mut self, text: &str) {
        let mut hierarchy: Vec<&str> = vec![];

        for line in text.lines().map(str::trim) {
            if line.starts_with("$scope") {
                if let Some(caps) = RE_SCOPE.captures(line) {
                    hierarchy.push(caps.get(1).map_or("", |m| m.as_str()));
                }
            } else if line.starts_with("$upscope") {
                hierarchy.pop();
            } else if line.starts_with("$var") {
                let caps = match RE_VAR.captures(line) {
                    Some(caps) => caps,
                    None => {
                        clilog::warn!(W_WAVE_VAR, "skipping malformed declaration {:?}", line);
                        continue;
                    }
                };
                let width = caps[1].parse::<u32>().unwrap_or(1).max(1);
                let identifier = caps[2].to_string();

                let signal = Signal {
                    name: caps[3].to_string(),
                    width,
                    identifier: identifier.clone(),
                    hierarchy: hierarchy.join("."),
                };

                self.transitions.entry(identifier.clone()).or_insert_with(Vec::new);
                self.signals.insert(identifier, signal);
            }
        }
    }

    fn parse_changes(&mut self, text: &str) {
        let mut current_time = 0u64;
        let mut skipped = 0usize;

        for line in text.lines().map(str::trim) {
            let first = match line.chars().next() {
                Some(c) => c,
                None => continue,
            };

            let (value, identifier) = match first {
                '#' => {
                    match line[1..].trim().parse::<u64>() {
                        Ok(t) if t >= current_time => {
                            current_time = t;
                            self.end_time = self.end_time.max(t);
                        }
                        Ok(t) => {
                            clilog::warn!(W_WAVE_BACKWARDS,
                                          "ignoring time marker #{} after #{}", t, current_time);
                        }
                        Err(_) => skipped += 1,
                    }
                    continue;
                }

                '0' | '1' | 'x' | 'X' | 'z' | 'Z' => (&line[..1], line[1..].trim()),

                'b' | 'B' | 'r' | 'R' => {
                    let mut parts = line.split_whitespace();
                    match (parts.next(), parts.next()) {
                        (Some(value), Some(identifier)) => (&value[1..], identifier),
                        _ => {
                            skipped += 1;
                            continue;
                        }
                    }
                }

                _ => continue,
            };

            match self.transitions.get_mut(identifier) {
                Some(transitions) => transitions.push(Transition {
                    time_ns: current_time,
                    value: value.to_string(),
                }),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            clilog::warn!(W_WAVE_SKIPPED, "skipped {} unrecognized value change lines", skipped);
        }
    }
}

fn parse_timescale(text: &str) -> String {
    RE_TIMESCALE.captures(text)
        .map(|caps| format!("{}{}", &caps[1], &caps[2]))
        .unwrap_or_else(|| DEFAULT_TIMESCALE.to_string())
}


#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn test_missing_file() {
        let tmpd = TempDir::new("hdlprobe").unwrap();
        let path = tmpd.path().join("absent.vcd");

        match parse_waveform(&path) {
            Err(Error::FileNotFound(p)) => assert_eq!(path, p),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_file() {
        let tmpd = TempDir::new("hdlprobe").unwrap();
        let path = tmpd.path().join("dump.vcd");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "$timescale\n  10 ps\n$end\n$var wire 1 ! a $end\n#0\n1!\n#5\n0!\n").unwrap();
        drop(file);

        let wf = parse_waveform(&path).unwrap();

        assert_eq!("10ps", wf.timescale());
        assert_eq!(5, wf.end_time());
        assert_eq!(Some("0"), wf.value_at("a", 7));
        assert_eq!(Some(0), wf.duration_ns());
    }

    #[test]
    fn test_permissive_content() {
        let text = "
$comment produced by hand $end
$var wire 4 % nibble $end
$var broken
#0
b1010 %
b11 ?
1?
garbage line
b
#x
r1.25 %
#3
bz0z1 %
";
        let wf = Waveform::parse_str(text);

        assert_eq!(DEFAULT_TIMESCALE, wf.timescale());
        assert_eq!(1, wf.num_signals());
        let values: Vec<_> = wf.transitions("%").iter()
            .map(|t| (t.time_ns, t.value.as_str()))
            .collect();
        assert_eq!(vec![(0, "1010"), (0, "1.25"), (3, "z0z1")], values);
    }

    #[test]
    fn test_backward_time_ignored() {
        let text = "$var wire 1 ! a $end\n#10\n1!\n#5\n0!\n#20\n1!\n";
        let wf = Waveform::parse_str(text);
        let times: Vec<_> = wf.transitions("!").iter().map(|t| t.time_ns).collect();

        assert_eq!(vec![10, 10, 20], times);
        assert_eq!(20, wf.end_time());
    }

    #[test]
    fn test_top_level_signal() {
        let wf = Waveform::parse_str("$var wire 1 ! top_clk $end\n");
        let sig = wf.signal("!").unwrap();

        assert_eq!("", sig.hierarchy);
        assert_eq!("top_clk", sig.full_path());
        assert!(wf.transitions("!").is_empty());
        assert_eq!(None, wf.value_at("top_clk", 100));
    }
}
