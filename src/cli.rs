use crate::config::{Config, load_config};
use crate::engine::SlideRenderer;
use crate::layouts::builtin_registry;
use crate::render::write_output_svg;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slidr", version, about = "Schema-driven slide renderer")]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available layouts
    List,
    /// Print a layout's JSON schema
    Schema {
        /// Layout id
        layout: String,
    },
    /// Validate slide data and print the normalized instance
    Normalize(InputArgs),
    /// Render slide data to SVG or PNG
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (svg/png). Defaults to stdout for SVG if omitted.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
        output_format: OutputFormat,
    },
}

#[derive(ClapArgs, Debug)]
pub struct InputArgs {
    /// Layout id
    #[arg(short = 'l', long = "layout")]
    pub layout: String,

    /// Slide data as JSON or JSON5, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::List => {
            for layout in builtin_registry().iter() {
                println!("{}\t{}", layout.id(), layout.name());
            }
            Ok(())
        }
        Command::Schema { layout } => {
            let layout = builtin_registry().get(&layout)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&layout.schema().to_json_schema())?
            );
            Ok(())
        }
        Command::Normalize(input) => {
            let (renderer, candidate) = prepare(&input)?;
            let instance = renderer.normalize(&input.layout, &candidate)?;
            println!("{}", serde_json::to_string_pretty(&instance.to_json())?);
            Ok(())
        }
        Command::Render {
            input,
            output,
            output_format,
        } => {
            let (renderer, candidate) = prepare(&input)?;
            // Diagram attempts are cooperative tasks on one thread.
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let rendered = runtime.block_on(renderer.render(&input.layout, &candidate))?;
            match output_format {
                OutputFormat::Svg => write_output_svg(&rendered.svg, output.as_deref()),
                OutputFormat::Png => {
                    let output = ensure_output(&output, "png")?;
                    write_png(&rendered.svg, &output, renderer.config())
                }
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn prepare(input: &InputArgs) -> Result<(SlideRenderer, Value)> {
    let config: Config = load_config(input.config.as_deref())
        .with_context(|| "Failed to load config file")?;
    let candidate = parse_candidate(&read_input(input.input.as_deref())?)?;
    Ok((SlideRenderer::new(config), candidate))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Empty input counts as an empty object so every field falls back to its default.
fn parse_candidate(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    json5::from_str(input).with_context(|| "Slide data is not valid JSON or JSON5")
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, config)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires building with the `png` feature"
    ))
}
