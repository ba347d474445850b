use serde::{Deserialize, Serialize};

pub const DEFAULT_BRIDGE_WIDTH: u32 = 14;
pub const DEFAULT_MIN_ISLAND_AREA: usize = 250;
pub const MIN_BRIDGE_WIDTH: u32 = 2;
pub const MIN_ISLAND_AREA: usize = 10;

/// Tunables of one bridging pass.
///
/// The engine uses the values as given. Callers that accept user input
/// should pass them through [`BridgeSettings::clamped`] first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Stroke width of a bridge in pixels.
    pub bridge_width: u32,
    /// Islands with fewer pixels are left alone.
    pub min_island_area: usize,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            bridge_width: DEFAULT_BRIDGE_WIDTH,
            min_island_area: DEFAULT_MIN_ISLAND_AREA,
        }
    }
}

impl BridgeSettings {
    pub fn new(bridge_width: u32, min_island_area: usize) -> Self {
        Self {
            bridge_width,
            min_island_area,
        }
    }

    /// Zero falls back to the default, anything else is raised to the floor.
    pub fn clamped(self) -> Self {
        let bridge_width = match self.bridge_width {
            0 => DEFAULT_BRIDGE_WIDTH,
            width => width.max(MIN_BRIDGE_WIDTH),
        };
        let min_island_area = match self.min_island_area {
            0 => DEFAULT_MIN_ISLAND_AREA,
            area => area.max(MIN_ISLAND_AREA),
        };
        Self {
            bridge_width,
            min_island_area,
        }
    }
}
