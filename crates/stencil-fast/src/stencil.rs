use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use stencil_fast_bridge::{BridgeEngine, BridgeOutcome, BridgeRun, BridgeSettings};
use stencil_fast_types::InkTone;
use tracing::debug;

use crate::error::StencilError;
use crate::layout::{fit_contain, PaperCanvas};

pub const DEFAULT_THRESHOLD: u8 = 128;

const INK_RGBA: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PAPER_RGBA: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThresholdSettings {
    pub threshold: u8,
    /// Gaussian sigma in pixels; zero or less disables the blur.
    pub blur: f32,
    /// Treat light pixels as ink instead of dark ones.
    pub invert: bool,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            blur: 0.0,
            invert: false,
        }
    }
}

impl ThresholdSettings {
    pub fn is_ink(&self, gray: u8) -> bool {
        if self.invert {
            gray >= self.threshold
        } else {
            gray < self.threshold
        }
    }
}

/// Everything needed to turn one input file into a stencil.
#[derive(Clone, Debug)]
pub struct StencilJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub preview: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub canvas: PaperCanvas,
    pub threshold: ThresholdSettings,
    /// `None` disables auto bridges.
    pub bridges: Option<BridgeSettings>,
    pub tone: InkTone,
}

#[derive(Debug)]
pub struct StencilOutput {
    pub image: RgbaImage,
    pub bridge_run: Option<BridgeRun>,
}

impl StencilOutput {
    pub fn outcome(&self) -> Option<BridgeOutcome> {
        self.bridge_run.as_ref().map(|run| run.outcome)
    }

    /// One-line status for the user.
    pub fn hint(&self) -> String {
        let (width, height) = self.image.dimensions();
        let Some(run) = &self.bridge_run else {
            return format!("stencil {width} x {height} px");
        };
        match run.outcome {
            BridgeOutcome::Bridged { count } => format!(
                "stencil {width} x {height} px, bridges added: {count} ({} ray, {} edge)",
                run.report.ray_bridges(),
                run.report.fallback_bridges()
            ),
            BridgeOutcome::Skipped { .. } => {
                "image too large: auto bridges skipped, lower the DPI to enable them".to_string()
            }
        }
    }
}

/// White sheet with the image scaled to fit and alpha-composited on top.
pub fn compose_canvas(image: &DynamicImage, canvas: &PaperCanvas) -> RgbaImage {
    let mut composed = RgbaImage::from_pixel(canvas.width, canvas.height, PAPER_RGBA);
    let fit = fit_contain(image.width(), image.height(), canvas.width, canvas.height);
    if fit.width == 0 || fit.height == 0 {
        return composed;
    }
    let resized = imageops::resize(&image.to_rgba8(), fit.width, fit.height, FilterType::Triangle);
    imageops::overlay(&mut composed, &resized, fit.x, fit.y);
    composed
}

pub fn threshold_to_rgba(gray: &GrayImage, settings: &ThresholdSettings) -> RgbaImage {
    let blurred;
    let source = if settings.blur > 0.0 {
        blurred = imageops::blur(gray, settings.blur);
        &blurred
    } else {
        gray
    };

    let mut output = RgbaImage::new(source.width(), source.height());
    for (dst, src) in output.pixels_mut().zip(source.pixels()) {
        *dst = if settings.is_ink(src.0[0]) {
            INK_RGBA
        } else {
            PAPER_RGBA
        };
    }
    output
}

pub fn render_stencil(image: &DynamicImage, job: &StencilJob) -> Result<StencilOutput, StencilError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(StencilError::EmptyImage {
            path: job.input.clone(),
        });
    }

    let composed = compose_canvas(image, &job.canvas);
    let gray = imageops::grayscale(&composed);
    let mut stencil = threshold_to_rgba(&gray, &job.threshold);
    debug!(
        width = stencil.width(),
        height = stencil.height(),
        threshold = job.threshold.threshold,
        "thresholded canvas"
    );

    let bridge_run = match job.bridges {
        Some(settings) => {
            let width = stencil.width() as usize;
            let height = stencil.height() as usize;
            let mut engine = BridgeEngine::new(settings);
            let run = engine.run_rgba(&mut stencil, width, height, job.tone)?;
            debug!(
                tone = job.tone.as_str(),
                bridged = run.outcome.bridges(),
                "auto bridges applied"
            );
            Some(run)
        }
        None => None,
    };

    Ok(StencilOutput {
        image: stencil,
        bridge_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn job(canvas: PaperCanvas, bridges: Option<BridgeSettings>) -> StencilJob {
        StencilJob {
            input: PathBuf::from("in.png"),
            output: PathBuf::from("out.png"),
            preview: None,
            report: None,
            canvas,
            threshold: ThresholdSettings::default(),
            bridges,
            tone: InkTone::White,
        }
    }

    fn small_canvas() -> PaperCanvas {
        PaperCanvas {
            width: 60,
            height: 60,
            dpi: 72,
        }
    }

    /// Black ring on white with a white hole in the middle.
    fn ring_image() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(60, 60, PAPER_RGBA);
        for y in 10..50 {
            for x in 10..50 {
                let inner = (20..40).contains(&x) && (20..40).contains(&y);
                if !inner {
                    img.put_pixel(x, y, INK_RGBA);
                }
            }
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn threshold_splits_at_the_level() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([[127u8, 128, 200][x as usize]]));
        let out = threshold_to_rgba(&gray, &ThresholdSettings::default());
        assert_eq!(out.get_pixel(0, 0), &INK_RGBA);
        assert_eq!(out.get_pixel(1, 0), &PAPER_RGBA);

        let inverted = ThresholdSettings {
            invert: true,
            ..ThresholdSettings::default()
        };
        let out = threshold_to_rgba(&gray, &inverted);
        assert_eq!(out.get_pixel(0, 0), &PAPER_RGBA);
        assert_eq!(out.get_pixel(1, 0), &INK_RGBA);
        assert_eq!(out.get_pixel(2, 0), &INK_RGBA);
    }

    #[test]
    fn blur_softens_isolated_pixels() {
        let mut gray = GrayImage::from_pixel(9, 9, Luma([255]));
        gray.put_pixel(4, 4, Luma([0]));
        let blurred = ThresholdSettings {
            blur: 2.0,
            ..ThresholdSettings::default()
        };
        let out = threshold_to_rgba(&gray, &blurred);
        assert!(out.pixels().all(|px| *px == PAPER_RGBA));
    }

    #[test]
    fn compose_letterboxes_on_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 5, INK_RGBA));
        let composed = compose_canvas(&img, &small_canvas());
        assert_eq!(composed.dimensions(), (60, 60));
        assert_eq!(composed.get_pixel(30, 2), &PAPER_RGBA);
        assert_eq!(composed.get_pixel(30, 30), &INK_RGBA);
    }

    #[test]
    fn transparent_pixels_become_paper() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let composed = compose_canvas(&img, &small_canvas());
        assert!(composed.pixels().all(|px| *px == PAPER_RGBA));
    }

    #[test]
    fn ring_hole_is_bridged() {
        let output = render_stencil(&ring_image(), &job(small_canvas(), Some(BridgeSettings::new(2, 10))))
            .unwrap();
        let count = output.outcome().map(|outcome| outcome.bridges());
        assert_eq!(count, Some(1));
        assert!(output.hint().ends_with("bridges added: 1 (1 ray, 0 edge)"));
        let report = &output.bridge_run.as_ref().unwrap().report;
        assert_eq!(report.fallback_bridges(), 0);
        assert!(output
            .image
            .pixels()
            .all(|px| *px == INK_RGBA || *px == PAPER_RGBA));
    }

    #[test]
    fn disabled_bridges_leave_the_threshold_untouched() {
        let output = render_stencil(&ring_image(), &job(small_canvas(), None)).unwrap();
        assert!(output.bridge_run.is_none());
        assert_eq!(output.hint(), "stencil 60 x 60 px");
        assert_eq!(output.image.get_pixel(30, 30), &PAPER_RGBA);
        assert_eq!(output.image.get_pixel(15, 30), &INK_RGBA);
    }

    #[test]
    fn oversized_canvas_skips_bridges() {
        let canvas = PaperCanvas {
            width: 4000,
            height: 3600,
            dpi: 600,
        };
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, PAPER_RGBA));
        let output = render_stencil(&img, &job(canvas, Some(BridgeSettings::default()))).unwrap();
        assert_eq!(
            output.outcome(),
            Some(BridgeOutcome::Skipped {
                pixels: 14_400_000
            })
        );
        assert!(output.hint().contains("lower the DPI"));
    }

    #[test]
    fn empty_images_are_rejected() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        let err = render_stencil(&img, &job(small_canvas(), None)).unwrap_err();
        assert!(matches!(err, StencilError::EmptyImage { .. }));
    }
}
