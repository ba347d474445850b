use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use stencil_fast_bridge::BridgeSettings;
use stencil_fast_types::InkTone;

use crate::cli::{CliArgs, CliSources};
use crate::layout::{clamp_dpi, Orientation, PaperFormat};
use crate::stencil::ThresholdSettings;

const PROJECT_CONFIG_FILE: &str = "stencil-fast.toml";
const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    threshold: Option<u8>,
    blur: Option<f32>,
    invert: Option<bool>,
    auto_bridges: Option<bool>,
    bridge_width: Option<u32>,
    island_min_area: Option<usize>,
    bridge_tone: Option<String>,
    paper: Option<PaperFileConfig>,
    output: Option<OutputFileConfig>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
struct PaperFileConfig {
    format: Option<String>,
    orientation: Option<String>,
    dpi: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
struct OutputFileConfig {
    dir: Option<String>,
    preview: Option<bool>,
    report: Option<bool>,
    pretty: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub threshold: ThresholdSettings,
    /// `None` when auto bridges are disabled.
    pub bridges: Option<BridgeSettings>,
    pub tone: InkTone,
    pub paper: PaperSettings,
    pub output: OutputSettings,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperSettings {
    pub format: PaperFormat,
    pub orientation: Orientation,
    pub dpi: u32,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    /// Explicit output file; only set for a single input.
    pub file: Option<PathBuf>,
    pub dir: PathBuf,
    pub preview: bool,
    pub report: bool,
    pub pretty: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    NotFound {
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config file {}: {}", path.display(), source)
            }
            ConfigError::InvalidValue { path, field, value } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "invalid value '{}' for '{}' in {}",
                        value,
                        field,
                        path.display()
                    )
                } else {
                    write!(f, "invalid value '{}' for '{}'", value, field)
                }
            }
            ConfigError::NotFound { path } => {
                write!(f, "config file {} does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
            ConfigError::NotFound { .. } => None,
        }
    }
}

pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        let path = path.to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        let config = read_config(&path)?;
        return Ok((config, Some(path)));
    }

    for candidate in [project_config_path(), default_config_path()]
        .into_iter()
        .flatten()
    {
        if candidate.exists() {
            let config = read_config(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }

    Ok((FileConfig::default(), None))
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let config_dir = config_path
        .as_ref()
        .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));

    let FileConfig {
        threshold: file_threshold,
        blur: file_blur,
        invert: file_invert,
        auto_bridges: file_auto_bridges,
        bridge_width: file_bridge_width,
        island_min_area: file_island_min_area,
        bridge_tone: file_bridge_tone,
        paper: file_paper,
        output: file_output,
    } = file;
    let file_paper = file_paper.unwrap_or_default();
    let file_output = file_output.unwrap_or_default();

    let mut threshold = cli.threshold;
    if !sources.threshold_from_cli {
        if let Some(value) = file_threshold {
            threshold = value;
        }
    }

    let mut blur = cli.blur;
    if !sources.blur_from_cli {
        if let Some(value) = file_blur {
            blur = value;
        }
    }
    if !blur.is_finite() || blur < 0.0 {
        return Err(ConfigError::InvalidValue {
            path: if sources.blur_from_cli {
                None
            } else {
                config_path
            },
            field: "blur",
            value: blur.to_string(),
        });
    }

    let invert = flag(cli.invert, cli.no_invert, file_invert, false);

    let mut bridge_width = cli.bridge_width;
    if !sources.bridge_width_from_cli {
        if let Some(value) = file_bridge_width {
            bridge_width = value;
        }
    }

    let mut island_min_area = cli.island_min_area;
    if !sources.island_min_area_from_cli {
        if let Some(value) = file_island_min_area {
            island_min_area = value;
        }
    }

    let auto_bridges = flag(cli.bridges, cli.no_bridges, file_auto_bridges, true);
    let bridges = auto_bridges
        .then(|| BridgeSettings::new(bridge_width, island_min_area).clamped());

    let tone = match cli.bridge_tone {
        Some(tone) => tone,
        None => match normalize_string(file_bridge_tone) {
            Some(value) => parse_tone(&value, config_path.as_ref())?,
            None => InkTone::default(),
        },
    };

    let mut format = cli.paper;
    if !sources.paper_from_cli {
        if let Some(value) = normalize_string(file_paper.format) {
            format = parse_enum(&value, "paper.format", config_path.as_ref())?;
        }
    }

    let mut orientation = cli.orientation;
    if !sources.orientation_from_cli {
        if let Some(value) = normalize_string(file_paper.orientation) {
            orientation = parse_enum(&value, "paper.orientation", config_path.as_ref())?;
        }
    }

    let mut dpi = cli.dpi;
    if !sources.dpi_from_cli {
        if let Some(value) = file_paper.dpi {
            dpi = value;
        }
    }

    if cli.output.is_some() && cli.inputs.len() > 1 {
        return Err(ConfigError::InvalidValue {
            path: None,
            field: "output",
            value: format!("{} inputs given", cli.inputs.len()),
        });
    }

    let dir = match cli.output_dir.clone() {
        Some(dir) => expand_pathbuf(dir),
        None => normalize_string(file_output.dir)
            .and_then(|dir| resolve_path_from_config(dir, config_dir.as_deref()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
    };

    Ok(EffectiveSettings {
        threshold: ThresholdSettings {
            threshold,
            blur,
            invert,
        },
        bridges,
        tone,
        paper: PaperSettings {
            format,
            orientation,
            dpi: clamp_dpi(dpi),
        },
        output: OutputSettings {
            file: cli.output.clone().map(expand_pathbuf),
            dir,
            preview: flag(cli.preview, cli.no_preview, file_output.preview, false),
            report: flag(cli.report, cli.no_report, file_output.report, false),
            pretty: file_output.pretty.unwrap_or(true),
        },
        config_path,
    })
}

/// Resolves an on/off pair of command-line switches against the file value.
/// At most one of `on` and `off` is set.
fn flag(on: bool, off: bool, file: Option<bool>, default: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        file.unwrap_or(default)
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "stencil-fast", "stencil-fast")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir()
        .ok()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
}

fn normalize_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn expand_pathbuf(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_home_path(s),
        None => path,
    }
}

fn resolve_path_from_config(value: String, base: Option<&Path>) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_home_path(trimmed);
    match base {
        Some(base) if !expanded.is_absolute() => Some(base.join(expanded)),
        _ => Some(expanded),
    }
}

fn expand_home_path(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().to_path_buf();
        }
    } else if let Some(stripped) = value.strip_prefix("~/") {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(stripped);
        }
    }
    PathBuf::from(value)
}

fn parse_enum<T: ValueEnum>(
    value: &str,
    field: &'static str,
    path: Option<&PathBuf>,
) -> Result<T, ConfigError> {
    T::from_str(value, true).map_err(|_| ConfigError::InvalidValue {
        path: path.cloned(),
        field,
        value: value.to_string(),
    })
}

fn parse_tone(value: &str, path: Option<&PathBuf>) -> Result<InkTone, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        path: path.cloned(),
        field: "bridge_tone",
        value: value.to_string(),
    })
}
