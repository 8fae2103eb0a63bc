/// A fixed-capacity circular store for the most recent N lines
///
/// Slots are addressed by `index % capacity`, where `index` is a
/// monotonic counter of accepted lines. The counter alone decides which
/// slots are valid: after a wrap, slots outside the logical window still
/// hold older lines and are never read back.
#[derive(Debug)]
pub struct RingBuffer {
    /// Slot storage, grows up to `capacity` and then wraps
    slots: Vec<String>,

    /// Index the next accepted line will get
    next_index: u64,

    /// Maximum number of lines kept
    capacity: usize,
}

impl RingBuffer {
    /// Create a ring buffer holding at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1); // Minimum capacity of 1
        Self {
            slots: Vec::with_capacity(capacity.min(1000)), // Start smaller, grow as needed
            next_index: 0,
            capacity,
        }
    }

    /// Store a line at `index % capacity` and advance the index
    pub fn push(&mut self, line: String) {
        let slot = self.slot(self.next_index);
        if slot < self.slots.len() {
            self.slots[slot] = line;
        } else {
            self.slots.push(line);
        }
        self.next_index += 1;
    }

    /// Index the next accepted line will get (equals the number of lines seen)
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Get the buffer's capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Range of indices still readable, never starting before `from`
    ///
    /// `end` is the current index and `begin` is `max(from, end - capacity)`.
    pub fn window_range(&self, from: u64) -> (u64, u64) {
        let end = self.next_index;
        let begin = end.saturating_sub(self.capacity as u64).max(from).min(end);
        (begin, end)
    }

    /// Iterate over the valid window in index order
    pub fn window(&self, from: u64) -> impl Iterator<Item = &str> + '_ {
        let (begin, end) = self.window_range(from);
        (begin..end).map(move |index| self.slots[self.slot(index)].as_str())
    }

    fn slot(&self, index: u64) -> usize {
        (index % self.capacity as u64) as usize
    }
}
