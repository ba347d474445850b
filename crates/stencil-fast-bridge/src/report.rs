use serde::Serialize;
use stencil_fast_types::PixelPoint;

use crate::engine::BridgeOutcome;
use crate::fallback::CanvasEdge;
use crate::labeling::Labeling;

/// How a bridge found its target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeKind {
    Ray { score: f32 },
    Fallback { edge: CanvasEdge },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BridgeRecord {
    pub region: u32,
    pub area: usize,
    #[serde(flatten)]
    pub kind: BridgeKind,
    pub source: PixelPoint,
    pub target: PixelPoint,
}

/// Summary of one pass, serialisable for the `--report` output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BridgeReport {
    pub width: usize,
    pub height: usize,
    pub regions: usize,
    pub floating: usize,
    pub bridged: usize,
    /// Floating islands below the minimum area.
    pub too_small: usize,
    /// Eligible islands left alone once the bridge cap was reached.
    pub unconnected: usize,
    pub outcome: BridgeOutcome,
    pub bridges: Vec<BridgeRecord>,
}

impl BridgeReport {
    pub(crate) fn skipped(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            regions: 0,
            floating: 0,
            bridged: 0,
            too_small: 0,
            unconnected: 0,
            outcome: BridgeOutcome::Skipped {
                pixels: width * height,
            },
            bridges: Vec::new(),
        }
    }

    pub(crate) fn for_labeling(width: usize, height: usize, labeling: &Labeling) -> Self {
        Self {
            width,
            height,
            regions: labeling.len(),
            floating: labeling.floating().count(),
            bridged: 0,
            too_small: 0,
            unconnected: 0,
            outcome: BridgeOutcome::Bridged { count: 0 },
            bridges: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: BridgeRecord) {
        self.bridges.push(record);
        self.bridged = self.bridges.len();
        self.outcome = BridgeOutcome::Bridged {
            count: self.bridged,
        };
    }

    pub fn ray_bridges(&self) -> usize {
        self.bridges
            .iter()
            .filter(|record| matches!(record.kind, BridgeKind::Ray { .. }))
            .count()
    }

    pub fn fallback_bridges(&self) -> usize {
        self.bridged - self.ray_bridges()
    }
}
