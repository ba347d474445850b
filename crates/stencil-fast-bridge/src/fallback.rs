use serde::Serialize;
use stencil_fast_types::PixelPoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl CanvasEdge {
    pub fn as_str(self) -> &'static str {
        match self {
            CanvasEdge::Left => "left",
            CanvasEdge::Right => "right",
            CanvasEdge::Top => "top",
            CanvasEdge::Bottom => "bottom",
        }
    }
}

/// Straight segment from a pixel to its projection on one canvas edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeRoute {
    pub edge: CanvasEdge,
    pub source: PixelPoint,
    pub target: PixelPoint,
}

/// Routes `idx` to the closest edge. Exact ties resolve left, right, top,
/// bottom in that order.
pub fn route_to_nearest_edge(idx: usize, width: usize, height: usize) -> EdgeRoute {
    let source = PixelPoint::from_index(idx, width);
    let candidates = [
        (CanvasEdge::Left, source.x, PixelPoint::new(0, source.y)),
        (
            CanvasEdge::Right,
            width - 1 - source.x,
            PixelPoint::new(width - 1, source.y),
        ),
        (CanvasEdge::Top, source.y, PixelPoint::new(source.x, 0)),
        (
            CanvasEdge::Bottom,
            height - 1 - source.y,
            PixelPoint::new(source.x, height - 1),
        ),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1 < best.1 {
            best = *candidate;
        }
    }

    let (edge, _, target) = best;
    EdgeRoute {
        edge,
        source,
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_closest_edge() {
        let route = route_to_nearest_edge(5 * 20 + 17, 20, 10);
        assert_eq!(route.edge, CanvasEdge::Right);
        assert_eq!(route.source, PixelPoint::new(17, 5));
        assert_eq!(route.target, PixelPoint::new(19, 5));

        let route = route_to_nearest_edge(8 * 20 + 10, 20, 10);
        assert_eq!(route.edge, CanvasEdge::Bottom);
        assert_eq!(route.target, PixelPoint::new(10, 9));
    }

    #[test]
    fn ties_prefer_left_then_right_then_top() {
        // centre of a square: all four distances equal
        assert_eq!(route_to_nearest_edge(2 * 5 + 2, 5, 5).edge, CanvasEdge::Left);
        // right and top tie
        assert_eq!(route_to_nearest_edge(6 + 4, 6, 6).edge, CanvasEdge::Right);
        // top and bottom tie
        assert_eq!(route_to_nearest_edge(10 + 5, 10, 3).edge, CanvasEdge::Top);
    }
}
