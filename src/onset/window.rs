//! Fixed-capacity sliding window used for per-feature detection history.
//!
//! The window is a ring buffer that is always full: it starts as `capacity`
//! zeros and every [`SlidingWindow::push`] evicts the oldest value. Logical
//! index `0` is the oldest slot and `len() - 1` the newest, independent of
//! where the ring head currently sits. No operation allocates after
//! construction.

/// Ring buffer of `f32` values in time order (oldest first).
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow {
    data: Box<[f32]>,
    // Physical index of the oldest value.
    head: usize,
}

impl SlidingWindow {
    /// Create a zero-filled window with the given capacity.
    ///
    /// A zero capacity is allowed here and yields an inert window; the engine
    /// rejects it during configuration.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity].into_boxed_slice(),
            head: 0,
        }
    }

    /// Number of slots. Constant for the lifetime of the window.
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the window has no slots.
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append `value` as the newest slot, evicting the oldest.
    pub fn push(&mut self, value: f32) {
        if self.data.is_empty() {
            return;
        }
        self.data[self.head] = value;
        self.head = (self.head + 1) % self.data.len();
    }

    /// Value at logical position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.data.len() {
            return None;
        }
        Some(self.data[(self.head + index) % self.data.len()])
    }

    /// The newest value, if any.
    pub fn newest(&self) -> Option<f32> {
        self.data.len().checked_sub(1).and_then(|last| self.get(last))
    }

    /// Iterate values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let (newer, older) = self.data.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// Multiply every stored value by `factor`.
    ///
    /// The factor is clamped to `[0, 1]`, so values can only shrink and never
    /// overflow. NaN factors are treated as `0`.
    pub fn rescale(&mut self, factor: f32) {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        for value in self.data.iter_mut() {
            *value *= factor;
        }
    }

    /// Overwrite every slot with `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Zero every slot and rewind the ring head.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.head = 0;
    }

    /// Copy the values into a `Vec`, oldest first.
    pub fn to_vec(&self) -> Vec<f32> {
        self.iter().collect()
    }
}
