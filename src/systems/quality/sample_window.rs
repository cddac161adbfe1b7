/// Fixed-capacity ring of FPS samples with a running sum.
/// Oldest samples are overwritten once the ring is full.
#[derive(Clone, Debug)]
pub struct SampleWindow {
    samples: Vec<f32>,
    head: usize,
    len: usize,
    sum: f64,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        Self { samples: vec![0.0; capacity.max(1)], head: 0, len: 0, sum: 0.0 }
    }

    #[inline]
    pub fn push(&mut self, value: f32) {
        let cap = self.samples.len();
        if self.len == cap {
            self.sum -= self.samples[self.head] as f64;
        } else {
            self.len += 1;
        }
        self.samples[self.head] = value;
        self.sum += value as f64;
        self.head = (self.head + 1) % cap;
    }

    /// None while empty.
    pub fn mean(&self) -> Option<f32> {
        if self.len == 0 {
            None
        } else {
            Some((self.sum / self.len as f64) as f32)
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.sum = 0.0;
    }
}
