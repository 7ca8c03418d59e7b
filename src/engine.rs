use crate::geometry::Point;
use crate::pipeline::{Gear, Pipeline};
use crate::trace::{TraceBuffer, TRACE_CAPACITY};
use tracing::{debug, info};

/// Hue step between consecutive trace ranks, in degrees.
pub const TRACE_HUE_STEP: f64 = 9.0;

/// With multi-path on, every n-th rank also shows its trace.
pub const MULTI_PATH_STRIDE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Clock advance per tick. 0.007 gives roughly 900 ticks per revolution.
    pub time_step: f64,
    /// New points closer than this to the last stored point are dropped.
    pub min_spacing: f64,
    pub trace_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            time_step: 0.007,
            min_spacing: 9.0,
            trace_capacity: TRACE_CAPACITY,
        }
    }
}

/// Owns the drawn path, the derived gear chain and the animation state.
///
/// All mutation is synchronous: point-set edits call [`EpicycleEngine::recompute`]
/// before returning, ticks advance the clock and extend the traces.
pub struct EpicycleEngine {
    settings: EngineSettings,
    points: Vec<Point>,
    padded_len: usize,
    gears: Vec<Gear>,
    traces: Vec<TraceBuffer>,
    centers: Vec<Point>,
    gear_limit: i64,
    multi_path: bool,
    clock: f64,
    drawing: bool,
}

impl EpicycleEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let mut engine = Self {
            settings,
            points: Vec::new(),
            padded_len: 0,
            gears: Vec::new(),
            traces: Vec::new(),
            centers: Vec::new(),
            gear_limit: -1,
            multi_path: false,
            clock: 0.0,
            drawing: false,
        };
        engine.recompute();
        engine
    }

    pub fn with_points(settings: EngineSettings, points: Vec<Point>) -> Self {
        let mut engine = Self::new(settings);
        engine.replace_points(points);
        engine
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // ── Point store ─────────────────────────────────────────────────────────

    /// Appends `p` unless it lies within `min_spacing` of the last point.
    /// Returns whether the point was stored (and the gears rebuilt).
    pub fn add_point(&mut self, p: Point) -> bool {
        if let Some(&last) = self.points.last() {
            if p.distance(last) <= self.settings.min_spacing {
                return false;
            }
        }
        self.points.push(p);
        self.recompute();
        true
    }

    /// Swaps in a whole new path, e.g. one loaded from disk.
    pub fn replace_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.recompute();
    }

    pub fn begin_stroke(&mut self) {
        self.drawing = true;
    }

    /// Pointer motion; only records while a stroke is in progress.
    pub fn continue_stroke(&mut self, p: Point) -> bool {
        self.drawing && self.add_point(p)
    }

    pub fn end_stroke(&mut self, p: Point) -> bool {
        self.drawing = false;
        self.add_point(p)
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Clears the path and every derived buffer.
    pub fn reset(&mut self) {
        self.points.clear();
        self.gears.clear();
        self.traces.clear();
        self.recompute();
        info!("scene cleared");
    }

    // ── Controls ────────────────────────────────────────────────────────────

    pub fn toggle_multi_path(&mut self) {
        self.multi_path = !self.multi_path;
    }

    pub fn increase_gear_limit(&mut self) {
        self.gear_limit += 1;
    }

    pub fn decrease_gear_limit(&mut self) {
        self.gear_limit -= 1;
    }

    // ── Pipeline ────────────────────────────────────────────────────────────

    /// Rebuilds gears from the current points and restarts the animation.
    ///
    /// Traces are reallocated one per gear, the clock returns to zero and the
    /// gear limit is set to the last rank. The multi-path flag is kept.
    pub fn recompute(&mut self) {
        let Pipeline { padded, gears, .. } = Pipeline::run(&self.points);
        self.padded_len = padded.len();
        self.traces = gears
            .iter()
            .map(|_| TraceBuffer::with_capacity(self.settings.trace_capacity))
            .collect();
        self.gears = gears;
        self.centers.clear();
        self.gear_limit = self.gears.len() as i64 - 1;
        self.clock = 0.0;
        debug!(
            points = self.points.len(),
            padded = self.padded_len,
            gears = self.gears.len(),
            "recomputed gear chain"
        );
    }

    // ── Animator ────────────────────────────────────────────────────────────

    /// Advances the clock one step and walks the chain, recording each
    /// gear's new center into its trace.
    pub fn tick(&mut self) {
        self.clock += self.settings.time_step;
        self.centers.clear();
        let mut center = Point::ORIGIN;
        for (gear, trace) in self.gears.iter().zip(self.traces.iter_mut()) {
            let d = gear.offset_at(self.clock);
            center = Point::new(center.x + d.x, center.y + d.y);
            self.centers.push(center);
            trace.push(center);
        }
    }

    // ── Read side ───────────────────────────────────────────────────────────

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn padded_len(&self) -> usize {
        self.padded_len
    }

    pub fn gears(&self) -> &[Gear] {
        &self.gears
    }

    pub fn traces(&self) -> &[TraceBuffer] {
        &self.traces
    }

    pub fn trace(&self, rank: usize) -> Option<&TraceBuffer> {
        self.traces.get(rank)
    }

    /// Center reached after each rank on the latest tick. Empty until the
    /// first tick after a recompute.
    pub fn centers(&self) -> &[Point] {
        &self.centers
    }

    /// Center of the circle drawn for `rank`: the tip of the previous gear.
    pub fn pivot(&self, rank: usize) -> Point {
        match rank {
            0 => Point::ORIGIN,
            r => self.centers.get(r - 1).copied().unwrap_or(Point::ORIGIN),
        }
    }

    pub fn gear_limit(&self) -> i64 {
        self.gear_limit
    }

    pub fn multi_path(&self) -> bool {
        self.multi_path
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Rank whose trace is the primary path: `min(Q, last rank)`, or `None`
    /// when there is nothing to draw.
    pub fn primary_rank(&self) -> Option<usize> {
        let last = self.gears.len() as i64 - 1;
        let r = self.gear_limit.min(last);
        (r >= 0).then_some(r as usize)
    }

    /// Whether the rod from `rank`'s pivot to its new center is stroked.
    pub fn rod_visible(&self, rank: usize) -> bool {
        (rank as i64) <= self.gear_limit
    }

    pub fn trace_visible(&self, rank: usize) -> bool {
        if self.primary_rank() == Some(rank) {
            return true;
        }
        self.multi_path
            && rank > 0
            && (rank as i64) <= self.gear_limit
            && rank % MULTI_PATH_STRIDE == 0
    }

    /// Hue in degrees for `rank`'s trace; may be negative or exceed 360.
    pub fn trace_hue(&self, rank: usize) -> f64 {
        (self.gear_limit - rank as i64) as f64 * TRACE_HUE_STEP
    }
}

impl Default for EpicycleEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
