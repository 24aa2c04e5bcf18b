//! Voroscope command line: render tessellation dumps to images.
//!
//! One invocation reads one or more dump files and writes one image per
//! input. When several inputs are given, each file is an independent unit
//! of work: a failure is reported and the remaining files are still
//! attempted.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use voroscope_io::DumpReader;
use voroscope_render::{render_cell_diagram, render_combined, render_triangulation, RenderOptions};

const DELAUNAY_INPUT: &str = "delaunay.txt";
const VORONOI_INPUT: &str = "voronoi.txt";
const COMBINED_OUTPUT: &str = "both.png";

const USAGE: &str = "\
Usage: voroscope <COMMAND> [OPTIONS] [INPUT...]

Commands:
  delaunay    render a triangulation dump (default input delaunay.txt)
  voronoi     render a cell diagram dump (default input voronoi.txt)
  both        overlay a triangulation and its cell diagram
              (default inputs delaunay.txt voronoi.txt)

Options:
  -o, --output <FILE>    output image path (png, bmp or svg)
      --options <FILE>   JSON file with render options
  -h, --help             print this help

Without -o the output name is derived from the input (mesh-03.txt
renders to mesh-03.png; 'both' writes both.png).
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Delaunay,
    Voronoi,
    Both,
}

#[derive(Debug)]
struct Args {
    mode: Mode,
    output: Option<PathBuf>,
    options_path: Option<PathBuf>,
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(argv: &[String]) -> Result<Option<Args>, String> {
    let mut iter = argv.iter();
    let mode = match iter.next().map(String::as_str) {
        None | Some("-h") | Some("--help") => return Ok(None),
        Some("delaunay") => Mode::Delaunay,
        Some("voronoi") => Mode::Voronoi,
        Some("both") => Mode::Both,
        Some(other) => return Err(format!("unknown command {other:?}")),
    };

    let mut output = None;
    let mut options_path = None;
    let mut inputs = Vec::new();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-o" | "--output" => {
                let value = iter.next().ok_or_else(|| format!("{arg} needs a value"))?;
                output = Some(PathBuf::from(value));
            }
            "--options" => {
                let value = iter.next().ok_or_else(|| format!("{arg} needs a value"))?;
                options_path = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option {flag:?}")),
            _ => inputs.push(PathBuf::from(arg)),
        }
    }

    Ok(Some(Args {
        mode,
        output,
        options_path,
        inputs,
    }))
}

fn run(args: &Args) -> Result<(), String> {
    let options = load_options(args.options_path.as_deref())?;
    match args.mode {
        Mode::Both => run_both(args, &options),
        Mode::Delaunay | Mode::Voronoi => run_batch(args, &options),
    }
}

fn load_options(path: Option<&Path>) -> Result<RenderOptions, String> {
    match path {
        None => Ok(RenderOptions::default()),
        Some(path) => {
            let json =
                fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
            RenderOptions::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
        }
    }
}

fn run_both(args: &Args, options: &RenderOptions) -> Result<(), String> {
    let (triangulation_path, diagram_path) = match args.inputs.as_slice() {
        [] => (PathBuf::from(DELAUNAY_INPUT), PathBuf::from(VORONOI_INPUT)),
        [a, b] => (a.clone(), b.clone()),
        other => {
            return Err(format!(
                "'both' expects no inputs or a triangulation and a diagram, got {}",
                other.len()
            ))
        }
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(COMBINED_OUTPUT));

    let triangulation = DumpReader::open(&triangulation_path)
        .and_then(|r| r.read_triangulation())
        .map_err(|e| format!("{}: {e}", triangulation_path.display()))?;
    let diagram = DumpReader::open(&diagram_path)
        .and_then(|r| r.read_cell_diagram())
        .map_err(|e| format!("{}: {e}", diagram_path.display()))?;

    render_combined(&triangulation, &diagram, options, &output)
        .map_err(|e| format!("{}: {e}", output.display()))
}

fn run_batch(args: &Args, options: &RenderOptions) -> Result<(), String> {
    let inputs: Vec<PathBuf> = if args.inputs.is_empty() {
        let default = match args.mode {
            Mode::Delaunay => DELAUNAY_INPUT,
            _ => VORONOI_INPUT,
        };
        vec![PathBuf::from(default)]
    } else {
        args.inputs.clone()
    };
    if args.output.is_some() && inputs.len() > 1 {
        return Err("an explicit output path needs exactly one input".into());
    }

    let mut failures = 0usize;
    for input in &inputs {
        let output = match &args.output {
            Some(path) => path.clone(),
            None => derive_output(input),
        };
        let result = match args.mode {
            Mode::Delaunay => render_delaunay_file(input, &output, options),
            _ => render_voronoi_file(input, &output, options),
        };
        if let Err(message) = result {
            log::error!("{}: {message}", input.display());
            failures += 1;
        }
    }

    if failures > 0 {
        Err(format!("{failures} of {} inputs failed", inputs.len()))
    } else {
        Ok(())
    }
}

fn derive_output(input: &Path) -> PathBuf {
    input.with_extension("png")
}

fn render_delaunay_file(
    input: &Path,
    output: &Path,
    options: &RenderOptions,
) -> Result<(), String> {
    let triangulation = DumpReader::open(input)
        .and_then(|r| r.read_triangulation())
        .map_err(|e| e.to_string())?;
    render_triangulation(&triangulation, options, output).map_err(|e| e.to_string())
}

fn render_voronoi_file(input: &Path, output: &Path, options: &RenderOptions) -> Result<(), String> {
    let diagram = DumpReader::open(input)
        .and_then(|r| r.read_cell_diagram())
        .map_err(|e| e.to_string())?;
    render_cell_diagram(&diagram, options, output).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_modes_and_inputs() {
        let args = parse_args(&argv(&["delaunay", "a.txt", "b.txt"]))
            .unwrap()
            .unwrap();
        assert_eq!(args.mode, Mode::Delaunay);
        assert_eq!(args.inputs, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert!(args.output.is_none());

        let args = parse_args(&argv(&["voronoi", "-o", "out.svg", "cells.txt"]))
            .unwrap()
            .unwrap();
        assert_eq!(args.mode, Mode::Voronoi);
        assert_eq!(args.output, Some(PathBuf::from("out.svg")));

        assert!(parse_args(&argv(&["frobnicate"])).is_err());
        assert!(parse_args(&argv(&["delaunay", "--wat"])).is_err());
        assert!(parse_args(&argv(&["delaunay", "-o"])).is_err());
    }

    #[test]
    fn test_help_requested() {
        assert!(parse_args(&argv(&[])).unwrap().is_none());
        assert!(parse_args(&argv(&["--help"])).unwrap().is_none());
        assert!(parse_args(&argv(&["both", "-h"])).unwrap().is_none());
    }

    #[test]
    fn test_derive_output() {
        assert_eq!(
            derive_output(Path::new("runs/mesh-03.txt")),
            PathBuf::from("runs/mesh-03.png")
        );
        assert_eq!(derive_output(Path::new("voronoi.txt")), PathBuf::from("voronoi.png"));
    }
}
