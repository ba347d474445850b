use serde::Serialize;
use stencil_fast_types::{check_rgba_len, pixel_count, BinaryMask, InkTone, MaskError};
use tracing::{debug, warn};

use crate::config::BridgeSettings;
use crate::fallback::route_to_nearest_edge;
use crate::finder::{find_bridge, max_ray_len};
use crate::labeling::{label_components, BridgeWorkspace};
use crate::limits::{MAX_BRIDGES, MAX_PIXELS};
use crate::render::draw_bridge;
use crate::report::{BridgeKind, BridgeRecord, BridgeReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BridgeOutcome {
    Bridged { count: usize },
    /// The raster exceeded [`MAX_PIXELS`] and was left untouched.
    Skipped { pixels: usize },
}

impl BridgeOutcome {
    /// Bridge count, or `-1` for a skipped pass.
    pub fn as_count(&self) -> i64 {
        match self {
            BridgeOutcome::Bridged { count } => *count as i64,
            BridgeOutcome::Skipped { .. } => -1,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BridgeOutcome::Skipped { .. })
    }

    pub fn bridges(&self) -> usize {
        match self {
            BridgeOutcome::Bridged { count } => *count,
            BridgeOutcome::Skipped { .. } => 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BridgeRun {
    pub outcome: BridgeOutcome,
    pub report: BridgeReport,
}

/// Runs bridging passes and keeps their buffers between calls.
#[derive(Debug)]
pub struct BridgeEngine {
    settings: BridgeSettings,
    workspace: BridgeWorkspace,
}

impl BridgeEngine {
    pub fn new(settings: BridgeSettings) -> Self {
        Self {
            settings,
            workspace: BridgeWorkspace::new(),
        }
    }

    /// Labels the mask once, then bridges every floating island of at least
    /// `min_island_area` pixels in id order until the bridge cap is reached.
    pub fn run(&mut self, mask: &mut BinaryMask) -> BridgeRun {
        let width = mask.width();
        let height = mask.height();
        if mask.len() > MAX_PIXELS {
            return skipped(width, height);
        }

        let labeling = label_components(mask, &mut self.workspace);
        let max_len = max_ray_len(width, height);
        let mut report = BridgeReport::for_labeling(width, height, &labeling);
        debug!(
            regions = report.regions,
            floating = report.floating,
            max_len,
            "labelled mask"
        );

        for region in labeling.floating() {
            if region.area < self.settings.min_island_area {
                report.too_small += 1;
                continue;
            }
            if report.bridged >= MAX_BRIDGES {
                report.unconnected += 1;
                continue;
            }

            let (kind, source, target) = match find_bridge(region, labeling.map(), max_len) {
                Some(candidate) => (
                    BridgeKind::Ray {
                        score: candidate.score,
                    },
                    candidate.source,
                    candidate.target,
                ),
                None => {
                    let route = route_to_nearest_edge(region.nearest_border_idx, width, height);
                    debug!(region = region.id, edge = route.edge.as_str(), "no ray target");
                    (BridgeKind::Fallback { edge: route.edge }, route.source, route.target)
                }
            };

            debug!(region = region.id, area = region.area, ?kind, "bridging island");
            draw_bridge(mask, source, target, self.settings.bridge_width);
            report.push(BridgeRecord {
                region: region.id,
                area: region.area,
                kind,
                source,
                target,
            });
        }

        if report.unconnected > 0 {
            warn!(
                cap = MAX_BRIDGES,
                unconnected = report.unconnected,
                "bridge cap reached"
            );
        }

        self.workspace.recycle(labeling);
        BridgeRun {
            outcome: report.outcome,
            report,
        }
    }

    /// Decodes an RGBA8 buffer with `tone`, bridges it and writes the result
    /// back in the same tone. Oversized rasters are not decoded.
    pub fn run_rgba(
        &mut self,
        rgba: &mut [u8],
        width: usize,
        height: usize,
        tone: InkTone,
    ) -> Result<BridgeRun, MaskError> {
        check_rgba_len(rgba, width, height)?;
        if pixel_count(width, height)? > MAX_PIXELS {
            return Ok(skipped(width, height));
        }

        let mut mask = match self.workspace.take_scratch() {
            Some(mut mask) => {
                mask.decode_rgba(rgba, width, height, tone)?;
                mask
            }
            None => BinaryMask::from_rgba(rgba, width, height, tone)?,
        };
        let run = self.run(&mut mask);
        mask.encode_rgba(rgba, tone)?;
        self.workspace.store_scratch(mask);
        Ok(run)
    }
}

fn skipped(width: usize, height: usize) -> BridgeRun {
    let report = BridgeReport::skipped(width, height);
    warn!(
        width,
        height,
        limit = MAX_PIXELS,
        "raster too large, auto bridges skipped"
    );
    BridgeRun {
        outcome: report.outcome,
        report,
    }
}

/// One-shot pass with a fresh engine.
pub fn apply_auto_bridges(mask: &mut BinaryMask, settings: BridgeSettings) -> BridgeOutcome {
    BridgeEngine::new(settings).run(mask).outcome
}
