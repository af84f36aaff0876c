use crate::model::Record;
use std::mem;

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Accumulates records until a batch is full.
#[derive(Debug)]
pub struct RecordBuffer {
    capacity: usize,
    pending: Vec<Record>,
}

impl RecordBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            pending: Vec::new(),
        }
    }

    /// Queue `records`, handing back the whole buffer once it reaches capacity.
    pub fn push(&mut self, records: Vec<Record>) -> Option<Vec<Record>> {
        self.pending.extend(records);
        if self.pending.len() >= self.capacity {
            Some(self.drain())
        } else {
            None
        }
    }

    pub fn drain(&mut self) -> Vec<Record> {
        mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for RecordBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
