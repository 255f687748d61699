use crate::query::FederatedQuery;
use pkgfed_core::traits::PackageSource;

///
/// FederatedRepo
///
/// The multi-source repository facade: owns the list of queryable sources
/// and hands out per-call queries. Source-list order is significant — it is
/// both the concatenation order and the merge tie-break order.
///

pub struct FederatedRepo<T> {
    sources: Vec<Box<dyn PackageSource<T>>>,
}

impl<T: Clone + 'static> FederatedRepo<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a source at the end of the list.
    pub fn add_source(&mut self, source: impl PackageSource<T> + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Builder-style `add_source`.
    #[must_use]
    pub fn with_source(mut self, source: impl PackageSource<T> + 'static) -> Self {
        self.add_source(source);
        self
    }

    /// Start a query over all sources. All entities built from it live for
    /// the call and are discarded once the result is consumed or abandoned.
    #[must_use]
    pub fn query(&self) -> FederatedQuery<'_, T> {
        FederatedQuery::new(&self.sources)
    }

    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<T: Clone + 'static> Default for FederatedRepo<T> {
    fn default() -> Self {
        Self::new()
    }
}
