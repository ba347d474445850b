use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use stencil_fast_bridge::config::{DEFAULT_BRIDGE_WIDTH, DEFAULT_MIN_ISLAND_AREA};
use stencil_fast_types::InkTone;

use crate::layout::{Orientation, PaperFormat, DEFAULT_DPI};
use crate::stencil::DEFAULT_THRESHOLD;

/// Records which options were given explicitly, so file values only fill
/// the gaps.
#[derive(Debug, Default)]
pub struct CliSources {
    pub threshold_from_cli: bool,
    pub blur_from_cli: bool,
    pub bridge_width_from_cli: bool,
    pub island_min_area_from_cli: bool,
    pub paper_from_cli: bool,
    pub orientation_from_cli: bool,
    pub dpi_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            threshold_from_cli: value_from_cli(matches, "threshold"),
            blur_from_cli: value_from_cli(matches, "blur"),
            bridge_width_from_cli: value_from_cli(matches, "bridge_width"),
            island_min_area_from_cli: value_from_cli(matches, "island_min_area"),
            paper_from_cli: value_from_cli(matches, "paper"),
            orientation_from_cli: value_from_cli(matches, "orientation"),
            dpi_from_cli: value_from_cli(matches, "dpi"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let matches = CliArgs::command().get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

/// Parses an explicit argument list, first element being the binary name.
pub fn parse_cli_from<I, T>(args: I) -> Result<(CliArgs, CliSources), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = CliArgs::command().try_get_matches_from(args)?;
    let args = CliArgs::from_arg_matches(&matches)?;
    let sources = CliSources::from_matches(&matches);
    Ok((args, sources))
}

#[derive(Debug, Parser)]
#[command(
    name = "stencil-fast",
    about = "Turn images into printable stencils with automatic bridges",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Output PNG path (only valid with a single input)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory receiving <name>-stencil.png for every input
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Gray level separating ink from paper (0-255)
    #[arg(long = "threshold", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: u8,

    /// Gaussian blur sigma applied before thresholding
    #[arg(long = "blur", default_value_t = 0.0)]
    pub blur: f32,

    /// Treat light pixels as ink
    #[arg(long = "invert", overrides_with = "no_invert")]
    pub invert: bool,

    /// Treat dark pixels as ink even when the config file inverts
    #[arg(long = "no-invert", overrides_with = "invert")]
    pub no_invert: bool,

    /// Add automatic bridges even when the config file disables them
    #[arg(long = "bridges", overrides_with = "no_bridges")]
    pub bridges: bool,

    /// Do not add automatic bridges
    #[arg(long = "no-bridges", overrides_with = "bridges")]
    pub no_bridges: bool,

    /// Bridge stroke width in pixels
    #[arg(long = "bridge-width", default_value_t = DEFAULT_BRIDGE_WIDTH)]
    pub bridge_width: u32,

    /// Islands smaller than this many pixels are not bridged
    #[arg(long = "island-min-area", default_value_t = DEFAULT_MIN_ISLAND_AREA)]
    pub island_min_area: usize,

    /// Pixel class that receives bridges: white (paper) or black (ink)
    #[arg(long = "bridge-tone", value_name = "TONE")]
    pub bridge_tone: Option<InkTone>,

    /// Paper format
    #[arg(long = "paper", value_enum, default_value_t = PaperFormat::A4)]
    pub paper: PaperFormat,

    /// Sheet orientation
    #[arg(long = "orientation", value_enum, default_value_t = Orientation::Portrait)]
    pub orientation: Orientation,

    /// Output resolution (72-600)
    #[arg(long = "dpi", default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// Also write a downscaled <name>-preview.png
    #[arg(long = "preview", overrides_with = "no_preview")]
    pub preview: bool,

    #[arg(long = "no-preview", overrides_with = "preview")]
    pub no_preview: bool,

    /// Also write a <name>-bridges.json report
    #[arg(long = "report", overrides_with = "no_report")]
    pub report: bool,

    #[arg(long = "no-report", overrides_with = "report")]
    pub no_report: bool,

    /// Verbose logging (RUST_LOG overrides)
    #[arg(long = "debug")]
    pub debug: bool,

    /// Input images
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
}
