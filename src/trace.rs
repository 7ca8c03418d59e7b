use crate::geometry::Point;
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Observer as _, Producer as _};

/// Points a single gear records before its history freezes.
pub const TRACE_CAPACITY: usize = 999;

/// Append-until-full history of one gear's centers.
///
/// Once full, further pushes are dropped and the recorded path stays as is.
pub struct TraceBuffer {
    rb: HeapRb<Point>,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self::with_capacity(TRACE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rb: HeapRb::new(capacity.max(1)),
        }
    }

    /// Returns `false` when the point was dropped because the buffer is full.
    pub fn push(&mut self, p: Point) -> bool {
        self.rb.try_push(p).is_ok()
    }

    pub fn len(&self) -> usize {
        self.rb.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rb.is_full()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.rb.iter()
    }

    pub fn first(&self) -> Option<Point> {
        self.rb.iter().next().copied()
    }

    pub fn latest(&self) -> Option<Point> {
        self.rb.iter().last().copied()
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new()
    }
}
