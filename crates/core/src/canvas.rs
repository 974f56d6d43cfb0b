//! Workflow canvas geometry: default node layout, Bézier connectors,
//! zoom and viewport conversions.
//!
//! All coordinates are pixels on the unscaled canvas. Renderers multiply
//! by the current zoom scale and subtract the scroll offset.

use std::collections::BTreeMap;

use crate::types::{round2, Point, Size};
use crate::workflow::WorkflowStep;

// ---------------------------------------------------------------------------
// Canvas constants
// ---------------------------------------------------------------------------

/// Storage key of the persisted node position map.
pub const POSITIONS_STORAGE_KEY: &str = "workflowStepPositions";

/// Position of the first node of a fresh layout.
pub const LAYOUT_ORIGIN: Point = Point::new(50.0, 60.0);

/// Height of every node box.
pub const BOX_HEIGHT: f64 = 44.0;

/// Width assumed for a node that has not been measured yet.
pub const DEFAULT_BOX_WIDTH: f64 = 140.0;

/// Horizontal gap between neighbouring nodes of a fresh layout.
pub const HORIZONTAL_SPACING: f64 = 60.0;

/// Vertical gap between rows of a fresh layout.
pub const VERTICAL_SPACING: f64 = 60.0;

/// Space kept free at the right edge of the container before wrapping.
pub const WRAP_MARGIN: f64 = 20.0;

/// Gap between a node edge and the connector endpoint.
pub const EDGE_PADDING: f64 = 6.0;

/// Curve parameters of the two draggable markers on each connector.
pub const MARKER_PARAMS: [f64; 2] = [0.25, 0.75];

pub const GRAPH_MIN_ZOOM: f64 = 0.5;
pub const GRAPH_MAX_ZOOM: f64 = 2.0;
pub const ER_MIN_ZOOM: f64 = 0.5;
pub const ER_MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Node positions keyed by step. Serialized as a JSON object keyed by the
/// step's wire identifier.
pub type NodePositions = BTreeMap<WorkflowStep, Point>;

/// Measured node widths keyed by step.
pub type NodeWidths = BTreeMap<WorkflowStep, f64>;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Pack `steps` left to right from [`LAYOUT_ORIGIN`], wrapping to a new
/// row when the next box would cross the container's right margin.
///
/// Returns `None` until every step has a measured width, so callers can
/// render once, measure, and lay out on the next pass.
pub fn default_layout(
    steps: &[WorkflowStep],
    widths: &NodeWidths,
    container_width: f64,
) -> Option<NodePositions> {
    let mut positions = NodePositions::new();
    let mut x = LAYOUT_ORIGIN.x;
    let mut y = LAYOUT_ORIGIN.y;

    for step in steps {
        let width = *widths.get(step)?;
        if x > LAYOUT_ORIGIN.x && x + width > container_width - WRAP_MARGIN {
            x = LAYOUT_ORIGIN.x;
            y += BOX_HEIGHT + VERTICAL_SPACING;
        }
        positions.insert(*step, Point::new(x, y));
        x += width + HORIZONTAL_SPACING;
    }

    Some(positions)
}

/// Give every step without a position its slot in the default layout.
///
/// Existing positions (saved or dragged) are never overwritten. Returns
/// `true` when at least one position was added.
pub fn fill_missing_positions(
    positions: &mut NodePositions,
    steps: &[WorkflowStep],
    widths: &NodeWidths,
    container_width: f64,
) -> bool {
    if steps.iter().all(|step| positions.contains_key(step)) {
        return false;
    }
    let Some(layout) = default_layout(steps, widths, container_width) else {
        return false;
    };

    let mut changed = false;
    for (step, point) in layout {
        if !positions.contains_key(&step) {
            positions.insert(step, point);
            changed = true;
        }
    }
    changed
}

// ---------------------------------------------------------------------------
// Connectors
// ---------------------------------------------------------------------------

/// Identifies the connector between two consecutive visible steps.
///
/// Keyed by the step pair rather than by position in the visible list, so
/// reshaped connectors stay attached to the right edge when trailing steps
/// are hidden and restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from: WorkflowStep,
    pub to: WorkflowStep,
}

impl EdgeKey {
    pub fn new(from: WorkflowStep, to: WorkflowStep) -> Self {
        Self { from, to }
    }

    /// Connectors between consecutive steps of `steps`.
    pub fn chain(steps: &[WorkflowStep]) -> Vec<EdgeKey> {
        steps
            .windows(2)
            .map(|pair| EdgeKey::new(pair[0], pair[1]))
            .collect()
    }
}

/// Which of the two markers of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSlot {
    First,
    Second,
}

impl ControlSlot {
    pub const BOTH: [ControlSlot; 2] = [ControlSlot::First, ControlSlot::Second];

    pub fn param(self) -> f64 {
        match self {
            Self::First => MARKER_PARAMS[0],
            Self::Second => MARKER_PARAMS[1],
        }
    }
}

/// User overrides of a connector's control points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlPoints {
    pub c1: Option<Point>,
    pub c2: Option<Point>,
}

impl ControlPoints {
    pub fn set(&mut self, slot: ControlSlot, point: Point) {
        match slot {
            ControlSlot::First => self.c1 = Some(point),
            ControlSlot::Second => self.c2 = Some(point),
        }
    }
}

/// Control-point overrides of every reshaped connector.
pub type ControlPointMap = BTreeMap<EdgeKey, ControlPoints>;

/// A cubic Bézier connector between two node boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl EdgeGeometry {
    /// Connector from the right edge of the `from` box to the left edge of
    /// the `to` box.
    ///
    /// Default control points sit at the axis-aligned midpoints, oriented
    /// along whichever axis spans further. Each override replaces its own
    /// control point.
    pub fn between(
        from: Point,
        from_width: f64,
        to: Point,
        overrides: Option<&ControlPoints>,
    ) -> Self {
        let p0 = Point::new(from.x + from_width + EDGE_PADDING, from.y + BOX_HEIGHT / 2.0);
        let p3 = Point::new(to.x - EDGE_PADDING, to.y + BOX_HEIGHT / 2.0);
        let dx = p3.x - p0.x;
        let dy = p3.y - p0.y;

        let (mut p1, mut p2) = if dx.abs() > dy.abs() {
            (
                Point::new(p0.x + dx / 2.0, p0.y),
                Point::new(p0.x + dx / 2.0, p3.y),
            )
        } else {
            (
                Point::new(p0.x, p0.y + dy / 2.0),
                Point::new(p3.x, p0.y + dy / 2.0),
            )
        };

        if let Some(cp) = overrides {
            p1 = cp.c1.unwrap_or(p1);
            p2 = cp.c2.unwrap_or(p2);
        }

        Self { p0, p1, p2, p3 }
    }

    /// Evaluate the curve at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let uu = u * u;
        let tt = t * t;
        let a = uu * u;
        let b = 3.0 * uu * t;
        let c = 3.0 * u * tt;
        let d = tt * t;
        Point::new(
            a * self.p0.x + b * self.p1.x + c * self.p2.x + d * self.p3.x,
            a * self.p0.y + b * self.p1.y + c * self.p2.y + d * self.p3.y,
        )
    }

    /// Positions of the two draggable markers.
    pub fn markers(&self) -> [(ControlSlot, Point); 2] {
        ControlSlot::BOTH.map(|slot| (slot, self.point_at(slot.param())))
    }

    /// Polyline approximation with `segments` segments.
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f64 / segments as f64))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Zoom and viewport
// ---------------------------------------------------------------------------

/// A uniform scale factor kept inside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevel {
    scale: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl ZoomLevel {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self {
            scale: 1.0_f64.clamp(min, max),
            min,
            max,
            step,
        }
    }

    /// Zoom range of the workflow graph.
    pub fn graph() -> Self {
        Self::new(GRAPH_MIN_ZOOM, GRAPH_MAX_ZOOM, ZOOM_STEP)
    }

    /// Zoom range of the ER-diagram viewer.
    pub fn er_diagram() -> Self {
        Self::new(ER_MIN_ZOOM, ER_MAX_ZOOM, ZOOM_STEP)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set(&mut self, scale: f64) {
        self.scale = round2(scale.clamp(self.min, self.max));
    }

    pub fn zoom_in(&mut self) {
        self.set(self.scale + self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set(self.scale - self.step);
    }

    /// Scroll-wheel zoom: scrolling down zooms out, anything else zooms in.
    pub fn apply_wheel(&mut self, delta_y: f64) {
        if delta_y > 0.0 {
            self.zoom_out();
        } else {
            self.zoom_in();
        }
    }

    pub fn reset(&mut self) {
        self.set(1.0);
    }
}

/// Convert a pointer position relative to the viewport into canvas
/// coordinates, undoing scroll and zoom.
pub fn pointer_to_canvas(pointer: Point, scroll: Point, scale: f64) -> Point {
    Point::new((pointer.x + scroll.x) / scale, (pointer.y + scroll.y) / scale)
}

/// Scroll offset that puts the centre of a node box at the centre of the
/// viewport. Never negative.
pub fn centre_scroll(position: Point, box_width: f64, viewport: Size, scale: f64) -> Point {
    let left = (position.x * scale - viewport.width / 2.0 + box_width * scale / 2.0).round();
    let top = (position.y * scale - viewport.height / 2.0 + BOX_HEIGHT * scale / 2.0).round();
    Point::new(left.max(0.0), top.max(0.0))
}
