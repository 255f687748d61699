use crate::{
    error::{QueryError, SourceError},
    obs::{DiagEvent, sink},
    traits::SourceIter,
};
use std::{cell::RefCell, rc::Rc};

///
/// ChunkCache
///
/// Shared append-only buffer over one source, fetched in bounded chunks.
/// `items` only ever grows and `exhausted` only ever flips false→true, so
/// independent cursors can read overlapping ranges without duplicate
/// fetches: the first cursor to need an uncached position triggers the
/// fetch, later cursors read the cached result.
///
/// Shared mutable state behind `Rc`; by construction not usable for
/// concurrent fetch-triggering from multiple threads.
///

pub struct ChunkCache<T> {
    state: Rc<RefCell<CacheState<T>>>,
}

struct CacheState<T> {
    source: SourceIter<T>,
    items: Vec<T>,
    chunk_size: usize,
    exhausted: bool,
    // Latched by a propagated source failure; replayed to any cursor that
    // reads past the cached prefix.
    error: Option<SourceError>,
}

impl<T: Clone> ChunkCache<T> {
    /// `chunk_size` is immutable after construction and must be at least 1.
    pub fn new(source: SourceIter<T>, chunk_size: usize) -> Result<Self, QueryError> {
        if chunk_size == 0 {
            return Err(QueryError::InvalidChunkSize);
        }

        Ok(Self {
            state: Rc::new(RefCell::new(CacheState {
                source,
                items: Vec::new(),
                chunk_size,
                exhausted: false,
                error: None,
            })),
        })
    }

    /// Mint an independent cursor at position 0.
    #[must_use]
    pub fn cursor(&self) -> CacheCursor<T> {
        CacheCursor {
            cache: self.clone(),
            pos: 0,
            done: false,
        }
    }

    /// Number of elements cached so far (non-decreasing).
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().items.is_empty()
    }

    /// Whether the underlying source has been drained (one-way transition).
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.state.borrow().exhausted
    }
}

impl<T> Clone for ChunkCache<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone> CacheState<T> {
    // Ensure `index` is cached or the source is exhausted. At most
    // ceil((index + 1) / chunk_size) fetches ever run for a cache, total.
    // A latched error only surfaces for reads past the cached prefix; the
    // elements produced before the failure stay readable.
    fn fill_to(&mut self, index: usize) -> Result<(), SourceError> {
        while self.items.len() <= index && !self.exhausted {
            self.fetch_chunk();
        }

        if self.items.len() <= index
            && let Some(error) = &self.error
        {
            return Err(error.clone());
        }

        Ok(())
    }

    fn fetch_chunk(&mut self) {
        let mut pulled = 0;

        while pulled < self.chunk_size {
            match self.source.next() {
                None => {
                    self.exhausted = true;
                    break;
                }
                Some(Ok(item)) => {
                    self.items.push(item);
                    pulled += 1;
                }
                Some(Err(error)) => {
                    self.exhausted = true;
                    self.error = Some(error);
                    break;
                }
            }
        }

        sink::record(DiagEvent::ChunkFetched { len: pulled });
    }
}

///
/// CacheCursor
///
/// A read position into a shared [`ChunkCache`]. Cursors hold only an index;
/// they never own the buffer, and resetting rewinds without refetching.
///

pub struct CacheCursor<T> {
    cache: ChunkCache<T>,
    pos: usize,
    done: bool,
}

impl<T: Clone> CacheCursor<T> {
    /// Read the element at the current position without advancing, fetching
    /// a chunk only if the position is not yet cached. `Ok(None)` means the
    /// source is exhausted before this position.
    pub fn peek(&mut self) -> Result<Option<T>, SourceError> {
        let mut state = self.cache.state.borrow_mut();
        state.fill_to(self.pos)?;

        Ok(state.items.get(self.pos).cloned())
    }

    /// Move past the current position. Cheap; the next read fetches lazily.
    pub const fn advance(&mut self) {
        self.pos += 1;
    }

    /// Jump to an arbitrary position. Cached positions replay for free.
    pub const fn seek(&mut self, index: usize) {
        self.pos = index;
        self.done = false;
    }

    /// Rewind to position 0 without refetching.
    pub const fn reset(&mut self) {
        self.pos = 0;
        self.done = false;
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }
}

impl<T: Clone> Iterator for CacheCursor<T> {
    type Item = Result<T, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.peek() {
            Ok(Some(item)) => {
                self.pos += 1;
                Some(Ok(item))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
