use crate::app::ports::RecordSink;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory sink for tests and dry runs.
///
/// Clones share the same buffer, so a handle kept by the caller sees what the pipeline wrote.
#[derive(Debug)]
pub struct InMemorySink<T> {
    records: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for InMemorySink<T> {
    fn clone(&self) -> Self {
        Self {
            records: Rc::clone(&self.records),
        }
    }
}

impl<T> Default for InMemorySink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemorySink<T> {
    pub fn new() -> Self {
        Self {
            records: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> InMemorySink<T> {
    pub fn records(&self) -> Vec<T> {
        self.records.borrow().clone()
    }
}

impl<T: Serialize + Clone> RecordSink<T> for InMemorySink<T> {
    fn write_record(&mut self, record: &T) -> anyhow::Result<()> {
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }
}
