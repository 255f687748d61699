use std::{cmp::Ordering, rc::Rc};

///
/// OrderDirection
/// Traversal direction for one ordering key.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

///
/// OrderKey
/// One link of an ordering chain: a key comparer plus its direction.
///

pub struct OrderKey<T> {
    cmp: Rc<dyn Fn(&T, &T) -> Ordering>,
    direction: OrderDirection,
}

impl<T> OrderKey<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        let ordering = (self.cmp)(a, b);
        match self.direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        }
    }
}

impl<T> Clone for OrderKey<T> {
    fn clone(&self) -> Self {
        Self {
            cmp: Rc::clone(&self.cmp),
            direction: self.direction,
        }
    }
}

///
/// OrderSpec
///
/// Ordered, possibly empty chain of (key, direction) pairs defining a total
/// preorder over records. An empty chain means no merge is possible, only
/// concatenation.
///

pub struct OrderSpec<T> {
    keys: Vec<OrderKey<T>>,
}

impl<T> OrderSpec<T> {
    /// The empty chain: concatenation-only access.
    #[must_use]
    pub const fn unordered() -> Self {
        Self { keys: Vec::new() }
    }

    /// Start a chain with an ascending key extractor.
    #[must_use]
    pub fn by<K, F>(extract: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        Self::unordered().then_by(extract)
    }

    /// Start a chain with a descending key extractor.
    #[must_use]
    pub fn by_desc<K, F>(extract: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        Self::unordered().then_by_desc(extract)
    }

    /// Start a chain from an externally supplied total-order comparer, e.g.
    /// the version-model collaborator's identity+version comparer.
    #[must_use]
    pub fn by_comparer(
        cmp: Rc<dyn Fn(&T, &T) -> Ordering>,
        direction: OrderDirection,
    ) -> Self {
        Self::unordered().then_by_comparer(cmp, direction)
    }

    /// Append an ascending key extractor.
    #[must_use]
    pub fn then_by<K, F>(self, extract: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        self.push(extract, OrderDirection::Asc)
    }

    /// Append a descending key extractor.
    #[must_use]
    pub fn then_by_desc<K, F>(self, extract: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        self.push(extract, OrderDirection::Desc)
    }

    /// Append an externally supplied comparer.
    #[must_use]
    pub fn then_by_comparer(
        mut self,
        cmp: Rc<dyn Fn(&T, &T) -> Ordering>,
        direction: OrderDirection,
    ) -> Self {
        self.keys.push(OrderKey { cmp, direction });
        self
    }

    fn push<K, F>(mut self, extract: F, direction: OrderDirection) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'static,
    {
        self.keys.push(OrderKey {
            cmp: Rc::new(move |a, b| extract(a).cmp(&extract(b))),
            direction,
        });
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    /// Compare two records under the chain, stopping at the first key that
    /// discriminates. An empty chain compares everything equal.
    #[must_use]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for key in &self.keys {
            let ordering = key.compare(a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }
}

impl<T> Clone for OrderSpec<T> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
        }
    }
}

impl<T> Default for OrderSpec<T> {
    fn default() -> Self {
        Self::unordered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Rec {
        id: &'static str,
        rank: u32,
    }

    const fn rec(id: &'static str, rank: u32) -> Rec {
        Rec { id, rank }
    }

    #[test]
    fn empty_chain_compares_everything_equal() {
        let order = OrderSpec::<Rec>::unordered();
        assert!(order.is_empty());
        assert_eq!(order.compare(&rec("a", 1), &rec("b", 2)), Ordering::Equal);
    }

    #[test]
    fn first_discriminating_key_wins() {
        let order = OrderSpec::by(|r: &Rec| r.id).then_by(|r: &Rec| r.rank);

        assert_eq!(order.compare(&rec("a", 9), &rec("b", 1)), Ordering::Less);
        assert_eq!(order.compare(&rec("a", 1), &rec("a", 2)), Ordering::Less);
        assert_eq!(order.compare(&rec("a", 2), &rec("a", 2)), Ordering::Equal);
    }

    #[test]
    fn descending_key_reverses() {
        let order = OrderSpec::by_desc(|r: &Rec| r.rank);
        assert_eq!(order.compare(&rec("a", 1), &rec("b", 2)), Ordering::Greater);
    }

    #[test]
    fn external_comparer_participates_in_chain() {
        let cmp: Rc<dyn Fn(&Rec, &Rec) -> Ordering> = Rc::new(|a, b| a.rank.cmp(&b.rank));
        let order = OrderSpec::by(|r: &Rec| r.id)
            .then_by_comparer(cmp, OrderDirection::Desc);

        assert_eq!(order.len(), 2);
        assert_eq!(order.compare(&rec("a", 1), &rec("a", 2)), Ordering::Greater);
    }
}
