//! LUCID map CLI
//!
//! Usage:
//!   lucid-map [OPTIONS] [FILE]
//!
//! Reads a YAML map (from stdin when FILE is omitted), lays it out and
//! prints the result as SVG or as a plain list of positions.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::{debug, error, info, LevelFilter};

use lucid_map::{
    build_scene, format_positions, render_svg, Catalog, LayoutConfig, MapError, RenderConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Svg,
    Positions,
}

#[derive(Parser, Debug)]
#[command(name = "lucid-map")]
#[command(about = "Lay out and render LUCID device maps")]
struct Cli {
    /// Input map file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Widget catalog (TOML format)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Macro for the outermost scope, as KEY=VALUE (repeatable)
    #[arg(short = 'm', long = "macro", value_parser = parse_macro)]
    macros: Vec<(String, String)>,

    /// Gap between neighbouring widgets
    #[arg(long, default_value_t = 30.0)]
    spacing: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
    format: OutputFormat,

    /// Exit with an error when widgets overlap
    #[arg(long)]
    strict: bool,

    /// Debug mode: print positions and draw connector placeholders
    #[arg(short, long)]
    debug: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn parse_macro(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", arg))
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            cli.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!("Parsed arguments: {:?}", cli);

    let catalog = match &cli.catalog {
        Some(path) => match Catalog::from_file(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Error loading catalog '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Catalog::default(),
    };

    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                error!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                error!("Error reading from stdin: {}", e);
                process::exit(1);
            }
            (buffer, "<stdin>".to_string())
        }
    };

    let mut config = RenderConfig::new()
        .with_catalog(catalog)
        .with_layout(LayoutConfig::default().with_min_spacing(cli.spacing))
        .with_deny_overlaps(cli.strict)
        .with_debug(cli.debug);
    for (key, value) in &cli.macros {
        config = config.with_macro(key, value);
    }

    let (scene, arranged) = match build_scene(&source, &config) {
        Ok(result) => result,
        Err(MapError::Load(e)) => {
            eprint!("{}", e.format(&source, &filename));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Arranged {} widgets with {} connections",
        arranged.shapes.len(),
        arranged.connections.len()
    );

    match cli.format {
        OutputFormat::Svg => {
            let svg_config = config.svg.clone().with_debug(config.debug);
            println!("{}", render_svg(&scene, &svg_config));
        }
        OutputFormat::Positions => print!("{}", format_positions(&scene)),
    }
}
