// src/batch/summary.rs
use super::{rate_ms_per_mb, ratio, IndexResult};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

const HEADER: [&str; 7] = ["         Size In", "        Size Out", "    Time", " Ratio %", "   ms/Mb", "Fail?", "Path"];

/// Writes the per-file table and the totals of a batch run.
///
/// Ignored files are left out of the table but counted in the totals line.
pub fn write_summary<W: Write>(
    out: &mut W,
    results: &BTreeMap<PathBuf, IndexResult>,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out, "{}", HEADER.join(" "))?;
    let dashes: Vec<String> = HEADER.iter().map(|h| "-".repeat(h.len())).collect();
    writeln!(out, "{}", dashes.join(" "))?;

    let (mut size_input, mut size_index, mut files_processed) = (0u64, 0u64, 0usize);
    for (path, result) in results {
        if result.size_input == 0 {
            continue;
        }
        writeln!(
            out,
            "{:>16} {:>16} {:8.3} {:>8} {:8.1} {:5} \"{}\"",
            thousands(result.size_input),
            thousands(result.size_index),
            result.time.as_secs_f64(),
            percent(result.ratio()),
            result.ms_per_mb(),
            if result.exception { "True" } else { "False" },
            path.display()
        )?;
        size_input += result.size_input;
        size_index += result.size_index;
        files_processed += 1;
    }

    writeln!(out, "Execution time = {:8.3} (S)", elapsed.as_secs_f64())?;
    writeln!(
        out,
        "Out of  {} processed {} files of total size {} input bytes",
        thousands(results.len() as u64),
        thousands(files_processed as u64),
        thousands(size_input)
    )?;
    writeln!(
        out,
        "Wrote {} output bytes, ratio: {:>8} at {:.1} ms/Mb",
        thousands(size_index),
        percent(ratio(size_index, size_input)),
        rate_ms_per_mb(elapsed, size_input)
    )?;
    writeln!(out, "Bye, bye!")
}

fn percent(ratio: f64) -> String {
    format!("{:.3}%", ratio * 100.0)
}

/// `1234567` as `1,234,567`.
fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_summary() {
        let mut results = BTreeMap::new();
        results.insert(
            PathBuf::from("a.dlis"),
            IndexResult {
                path_input: PathBuf::from("a.dlis"),
                size_input: 2 * 1024 * 1024,
                size_index: 20_971,
                time: Duration::from_millis(500),
                exception: false,
                ignored: false,
            },
        );
        results.insert(
            PathBuf::from("b.txt"),
            IndexResult {
                path_input: PathBuf::from("b.txt"),
                size_input: 0,
                size_index: 0,
                time: Duration::ZERO,
                exception: false,
                ignored: true,
            },
        );
        let mut out = Vec::new();
        write_summary(&mut out, &results, Duration::from_secs(1)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "         Size In         Size Out     Time  Ratio %    ms/Mb Fail? Path");
        assert_eq!(lines[1], "---------------- ---------------- -------- -------- -------- ----- ----");
        assert_eq!(
            lines[2],
            "       2,097,152           20,971    0.500   1.000%    250.0 False \"a.dlis\""
        );
        assert_eq!(lines[3], "Execution time =    1.000 (S)");
        assert_eq!(lines[4], "Out of  2 processed 1 files of total size 2,097,152 input bytes");
        assert_eq!(lines[5], "Wrote 20,971 output bytes, ratio:   1.000% at 500.0 ms/Mb");
        assert_eq!(lines[6], "Bye, bye!");
    }
}
