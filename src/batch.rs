//! Fixed-size batching of documents.
//!
//! [`emit`] yields batches of exactly `max_batch_size` documents except for
//! a final partial batch, never an empty one, and keeps input order.

use std::num::NonZeroUsize;

use crate::models::{Batch, Document};

/// Lazily groups `documents` into batches of `max_batch_size`.
///
/// Only the batch currently being filled is held in memory; the next one
/// is not started until the caller asks for it.
pub fn emit<I>(documents: I, max_batch_size: NonZeroUsize) -> Batches<I::IntoIter>
where
    I: IntoIterator<Item = Document>,
{
    Batches {
        inner: documents.into_iter(),
        size: max_batch_size,
    }
}

/// Iterator returned by [`emit`].
#[derive(Debug)]
pub struct Batches<I> {
    inner: I,
    size: NonZeroUsize,
}

impl<I> Iterator for Batches<I>
where
    I: Iterator<Item = Document>,
{
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let batch: Batch = self.inner.by_ref().take(self.size.get()).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}
