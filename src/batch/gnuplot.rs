// src/batch/gnuplot.rs
use super::IndexResult;
use crate::error::{IndexError, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Base name of the data, script and SVG files.
pub const PLOT_NAME: &str = "IndexFile";

const PLOT_SCRIPT: &str = r#"set logscale x
set grid
set title "XML Index of RP66V1 Files"
set xlabel "RP66V1 File Size (bytes)"

set logscale y
set ylabel "XML Index Rate (ms/Mb)"

set logscale y2
set y2label "Ratio index size / original size"
set y2tics

set pointsize 1
set datafile separator whitespace
set datafile missing "NaN"

rate(x) = 10**(a + b * log10(x))
fit rate(x) "{name}.dat" using 1:($3*1000/($1/(1024*1024))) via a, b

compression_ratio(x) = 10**(e + f * log10(x))
fit compression_ratio(x) "{name}.dat" using 1:($2/$1) via e, f

set terminal svg size 1000,700
set output "{name}.svg"

# Fields: size_input, size_index, time, exception, ignored, path

plot "{name}.dat" using 1:($3*1000/($1/(1024*1024))) axes x1y1 title "XML Index Rate (ms/Mb)" lt 1 w points,\
    rate(x) title sprintf("Fit: 10**(%+.3g %+.3g * log10(x))", a, b) lt 1 lw 2, \
    "{name}.dat" using 1:($2/$1) axes x1y2 title "XML Index size / Original Size" lt 2 w points, \
    compression_ratio(x) title sprintf("Fit: 10**(%+.3g %+.3g * log10(x))", e, f) axes x1y2 lt 2 lw 2

reset
"#;

fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Writes the data table of successfully indexed files.
pub fn write_plot_data<W: Write>(out: &mut W, results: &BTreeMap<PathBuf, IndexResult>) -> Result<()> {
    writeln!(out, "# size_input size_index time exception ignored Path")?;
    for (path, result) in results {
        if result.size_input == 0 || result.exception {
            continue;
        }
        writeln!(
            out,
            "{} {} {:.6} {} {} \"{}\"",
            result.size_input,
            result.size_index,
            result.time.as_secs_f64(),
            python_bool(result.exception),
            python_bool(result.ignored),
            path.display()
        )?;
    }
    Ok(())
}

/// Writes `IndexFile.dat` and `IndexFile.plt` to `dir` and runs gnuplot
/// there to produce `IndexFile.svg`.
pub fn plot_results(results: &BTreeMap<PathBuf, IndexResult>, dir: &Path) -> Result<()> {
    if results.len() < 2 {
        return Err(IndexError::Plot(format!(
            "can not plot data with only {} points",
            results.len()
        )));
    }
    fs::create_dir_all(dir)?;
    let mut data = BufWriter::new(File::create(dir.join(format!("{}.dat", PLOT_NAME)))?);
    write_plot_data(&mut data, results)?;
    data.flush()?;
    let script = format!("{}.plt", PLOT_NAME);
    fs::write(dir.join(&script), PLOT_SCRIPT.replace("{name}", PLOT_NAME))?;

    let status = Command::new("gnuplot").arg(&script).current_dir(dir).status()?;
    if !status.success() {
        return Err(IndexError::Plot(format!("gnuplot exited with {}", status)));
    }
    info!("Plotted {} results to {}", results.len(), dir.join(format!("{}.svg", PLOT_NAME)).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(path: &str, size_input: u64, exception: bool) -> (PathBuf, IndexResult) {
        (
            PathBuf::from(path),
            IndexResult {
                path_input: PathBuf::from(path),
                size_input,
                size_index: size_input / 10,
                time: Duration::from_millis(20),
                exception,
                ignored: false,
            },
        )
    }

    #[test]
    fn test_plot_data() {
        let results: BTreeMap<_, _> = vec![
            result("a.dlis", 1000, false),
            result("b.dlis", 2000, true),
            result("c.txt", 0, false),
        ]
        .into_iter()
        .collect();
        let mut out = Vec::new();
        write_plot_data(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "# size_input size_index time exception ignored Path\n1000 100 0.020000 False False \"a.dlis\"\n"
        );
    }

    #[test]
    fn test_too_few_points() {
        let dir = tempfile::tempdir().unwrap();
        let results: BTreeMap<_, _> = vec![result("a.dlis", 1000, false)].into_iter().collect();
        assert!(matches!(plot_results(&results, dir.path()), Err(IndexError::Plot(_))));
        assert!(!dir.path().join("IndexFile.dat").exists());
    }

    #[test]
    fn test_script_names() {
        let script = PLOT_SCRIPT.replace("{name}", PLOT_NAME);
        assert!(script.contains("set output \"IndexFile.svg\""));
        assert!(!script.contains("{name}"));
    }
}
