//! Paper sizes and the geometry used to place an image on a sheet.

use clap::ValueEnum;
use serde::Serialize;

pub const DEFAULT_DPI: u32 = 300;
pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 600;
pub const PREVIEW_MAX_SIDE: u32 = 1200;

const MM_PER_INCH: f64 = 25.4;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    #[default]
    A4,
    Letter,
}

impl PaperFormat {
    /// Portrait width and height in millimetres.
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            PaperFormat::A4 => (210.0, 297.0),
            PaperFormat::Letter => (215.9, 279.4),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaperFormat::A4 => "a4",
            PaperFormat::Letter => "letter",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * f64::from(dpi)).round() as u32
}

/// Zero selects the default, other values are clamped to the supported range.
pub fn clamp_dpi(dpi: u32) -> u32 {
    match dpi {
        0 => DEFAULT_DPI,
        dpi => dpi.clamp(MIN_DPI, MAX_DPI),
    }
}

/// Pixel size of a sheet at a given resolution.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PaperCanvas {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

impl PaperCanvas {
    pub fn new(format: PaperFormat, orientation: Orientation, dpi: u32) -> Self {
        let dpi = clamp_dpi(dpi);
        let (width_mm, height_mm) = format.size_mm();
        let mut width = mm_to_px(width_mm, dpi);
        let mut height = mm_to_px(height_mm, dpi);
        if orientation == Orientation::Landscape {
            std::mem::swap(&mut width, &mut height);
        }
        Self { width, height, dpi }
    }
}

/// Placement of a scaled source image inside a destination rectangle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FitRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Largest centred placement of `src` inside `dst` that keeps the aspect
/// ratio.
pub fn fit_contain(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> FitRect {
    if src_w == 0 || src_h == 0 {
        return FitRect {
            x: i64::from(dst_w / 2),
            y: i64::from(dst_h / 2),
            width: 0,
            height: 0,
        };
    }

    let ratio = (f64::from(dst_w) / f64::from(src_w)).min(f64::from(dst_h) / f64::from(src_h));
    let width = (f64::from(src_w) * ratio).round() as u32;
    let height = (f64::from(src_h) * ratio).round() as u32;
    let x = ((f64::from(dst_w) - f64::from(width)) / 2.0).round() as i64;
    let y = ((f64::from(dst_h) - f64::from(height)) / 2.0).round() as i64;
    FitRect {
        x,
        y,
        width,
        height,
    }
}

pub fn preview_size(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }
    let max_side = f64::from(max_side);
    let scale = (max_side / f64::from(width))
        .min(max_side / f64::from(height))
        .min(1.0);
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}
