//! Fixed-size byte tape.

/// Cells on a tape unless configured otherwise.
pub const TAPE_CAPACITY: usize = 30_000;

/// A tape operation that was refused. The tape is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeFault {
    PointerOutOfRange { pointer: usize },
    Overflow { pointer: usize, value: u8 },
}

/// Zero-initialised cells whose count never changes after construction.
///
/// The tape does not own the data pointer; callers pass it in and get the
/// moved pointer back, so a refused move leaves the caller's pointer as it was.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Box<[u8]>,
    overflow_guard: bool,
}

impl Tape {
    pub fn new(overflow_guard: bool) -> Self {
        Self::with_capacity(TAPE_CAPACITY, overflow_guard)
    }

    /// A tape with a custom number of cells (at least one).
    pub fn with_capacity(capacity: usize, overflow_guard: bool) -> Self {
        Self {
            cells: vec![0; capacity.max(1)].into_boxed_slice(),
            overflow_guard,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn read(&self, pointer: usize) -> u8 {
        self.cells[pointer]
    }

    pub fn write(&mut self, pointer: usize, value: u8) {
        self.cells[pointer] = value;
    }

    /// Add one. Wraps 255 to 0, unless the overflow guard is on.
    pub fn increment(&mut self, pointer: usize) -> Result<u8, TapeFault> {
        let value = self.cells[pointer];
        if self.overflow_guard && value == u8::MAX {
            return Err(TapeFault::Overflow { pointer, value });
        }
        let after = value.wrapping_add(1);
        self.cells[pointer] = after;
        Ok(after)
    }

    /// Subtract one, always wrapping 0 to 255. There is no underflow guard.
    pub fn decrement(&mut self, pointer: usize) -> u8 {
        let after = self.cells[pointer].wrapping_sub(1);
        self.cells[pointer] = after;
        after
    }

    pub fn move_left(&self, pointer: usize) -> Result<usize, TapeFault> {
        if pointer == 0 {
            return Err(TapeFault::PointerOutOfRange { pointer });
        }
        Ok(pointer - 1)
    }

    pub fn move_right(&self, pointer: usize) -> Result<usize, TapeFault> {
        if pointer >= self.cells.len() - 1 {
            return Err(TapeFault::PointerOutOfRange { pointer });
        }
        Ok(pointer + 1)
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(false)
    }
}
