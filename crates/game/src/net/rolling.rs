pub const DEFAULT_CLOCK_WINDOW: usize = 100;

#[derive(Debug, Clone)]
pub struct RollingAverage {
    samples: Box<[f32]>,
    populated: usize,
    cursor: usize,
    sum: f32,
}

impl Default for RollingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_WINDOW)
    }
}

impl RollingAverage {
    // Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling average capacity must be positive");
        Self {
            samples: vec![0.0; capacity].into_boxed_slice(),
            populated: 0,
            cursor: 0,
            sum: 0.0,
        }
    }

    pub fn add_value(&mut self, value: f32) {
        self.sum -= self.samples[self.cursor];
        self.sum += value;
        self.samples[self.cursor] = value;

        self.cursor += 1;
        if self.cursor > self.populated {
            self.populated = self.cursor;
        }

        if self.cursor >= self.samples.len() {
            self.cursor = 0;
            // Incremental updates drift; resync once per lap.
            self.sum = self.samples.iter().sum();
        }
    }

    pub fn average_value(&self) -> f32 {
        if self.populated == 0 {
            0.0
        } else {
            self.sum / self.populated as f32
        }
    }

    pub fn len(&self) -> usize {
        self.populated
    }

    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }
}
