/// Smallest capacity the arena grows from, in floats.
pub const MIN_SCRATCH_CAPACITY: usize = 1024;

/// Reusable float buffer for vertex interleaving.
///
/// Capacity only grows, by doubling, and the arena is owned by one renderer
/// so it is never touched concurrently.
#[derive(Debug, Default)]
pub struct ScratchArena {
    buf: Vec<f32>,
    reallocations: u64,
}

impl ScratchArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity],
            reallocations: 0,
        }
    }

    /// Current capacity in floats.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of times the backing storage was replaced.
    #[inline]
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    /// Returns a writable region of exactly `required` floats, growing first if needed.
    ///
    /// Contents are unspecified; callers overwrite the whole region.
    pub fn region(&mut self, required: usize) -> &mut [f32] {
        if required > self.buf.len() {
            let mut capacity = self.buf.len().max(MIN_SCRATCH_CAPACITY);
            while capacity < required {
                capacity *= 2;
            }
            log::trace!("scratch arena grows {} -> {capacity} floats", self.buf.len());
            self.buf = vec![0.0; capacity];
            self.reallocations += 1;
        }
        &mut self.buf[..required]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn grows_by_doubling_once() {
        let mut arena = ScratchArena::with_capacity(4000);
        assert_eq!(arena.region(10_000).len(), 10_000);
        assert_eq!(arena.capacity(), 16_000);
        assert_eq!(arena.reallocations(), 1);

        assert_eq!(arena.region(6000).len(), 6000);
        assert_eq!(arena.capacity(), 16_000);
        assert_eq!(arena.reallocations(), 1);
    }

    #[rstest]
    #[case(0, 1, 1024)]
    #[case(0, 1024, 1024)]
    #[case(0, 1025, 2048)]
    #[case(10, 3000, 4096)]
    #[case(2048, 2048, 2048)]
    fn growth_starts_at_minimum(#[case] initial: usize, #[case] required: usize, #[case] expected: usize) {
        let mut arena = ScratchArena::with_capacity(initial);
        arena.region(required);
        assert_eq!(arena.capacity(), expected);
    }

    #[test]
    fn empty_request_does_not_allocate() {
        let mut arena = ScratchArena::new();
        assert!(arena.region(0).is_empty());
        assert_eq!(arena.reallocations(), 0);
    }
}
