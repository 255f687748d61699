use crate::{
    agg::{DedupAdjacent, FailureMode, FederatedAggregator},
    error::{AggregateError, SourceError},
    query::OrderSpec,
    traits::{IdentityEq, SourceIter, TieBreak},
};
use proptest::prelude::*;
use std::{cell::Cell, rc::Rc};

fn source_of<T: Clone + 'static>(items: Vec<T>) -> SourceIter<T> {
    Box::new(items.into_iter().map(Ok))
}

fn failing_source<T: 'static>(message: &str) -> SourceIter<T> {
    let error = SourceError::other(message);
    Box::new(std::iter::once(Err(error)))
}

fn counted_source(items: Vec<u32>, pulls: Rc<Cell<usize>>) -> SourceIter<u32> {
    Box::new(items.into_iter().map(move |n| {
        pulls.set(pulls.get() + 1);
        Ok(n)
    }))
}

#[test]
fn concat_preserves_source_list_and_element_order() {
    let agg = FederatedAggregator::new(
        vec![source_of(vec![3, 1]), source_of(vec![2]), source_of(vec![])],
        OrderSpec::unordered(),
        FailureMode::Skip,
        8,
    )
    .unwrap();

    let out: Vec<u32> = agg.map(Result::unwrap).collect();
    assert_eq!(out, vec![3, 1, 2]);
}

#[test]
fn concat_propagate_aborts_on_first_failure() {
    let mut agg = FederatedAggregator::new(
        vec![
            source_of(vec![1, 2]),
            failing_source("Bad sequence"),
            source_of(vec![9]),
        ],
        OrderSpec::unordered(),
        FailureMode::Propagate,
        8,
    )
    .unwrap();
    assert!(!agg.is_merge());

    assert_eq!(agg.next().unwrap().unwrap(), 1);
    assert_eq!(agg.next().unwrap().unwrap(), 2);

    let err = agg.next().unwrap().unwrap_err();
    assert_eq!(err.to_string(), "Bad sequence");

    // The trailing source is never consumed.
    assert!(agg.next().is_none());
}

#[test]
fn merge_interleaves_in_order() {
    let agg = FederatedAggregator::new(
        vec![
            source_of(vec![1, 4, 7]),
            source_of(vec![2, 5]),
            source_of(vec![3, 6, 8]),
        ],
        OrderSpec::by(|n: &u32| *n),
        FailureMode::Skip,
        2,
    )
    .unwrap();
    assert!(agg.is_merge());

    let out: Vec<u32> = agg.map(Result::unwrap).collect();
    assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn merge_ties_go_to_earliest_listed_source() {
    type Rec = (u32, &'static str);

    let agg = FederatedAggregator::new(
        vec![
            source_of(vec![(1, "s0"), (2, "s0")]),
            source_of(vec![(1, "s1"), (1, "s1")]),
            source_of(vec![(1, "s2")]),
        ],
        OrderSpec::by(|r: &Rec| r.0),
        FailureMode::Skip,
        4,
    )
    .unwrap();

    let out: Vec<Rec> = agg.map(Result::unwrap).collect();
    assert_eq!(
        out,
        vec![(1, "s0"), (1, "s1"), (1, "s1"), (1, "s2"), (2, "s0")]
    );
}

#[test]
fn merge_collect_errors_raises_terminal_aggregate_error() {
    let faulty: SourceIter<u32> = Box::new(
        vec![Ok(2), Err(SourceError::io("feed dropped")), Ok(6)].into_iter(),
    );

    let mut agg = FederatedAggregator::new(
        vec![source_of(vec![1, 4]), faulty, source_of(vec![3, 5])],
        OrderSpec::by(|n: &u32| *n),
        FailureMode::CollectErrors,
        4,
    )
    .unwrap();

    let mut ok = Vec::new();
    let err = loop {
        match agg.next().unwrap() {
            Ok(n) => ok.push(n),
            Err(err) => break err,
        }
    };

    // Every successful element first, then one error carrying the record.
    assert_eq!(ok, vec![1, 2, 3, 4, 5, 6]);
    let AggregateError::Sources(records) = err else {
        panic!("expected collected aggregate error");
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].index, 1);
    assert_eq!(records[0].error.to_string(), "feed dropped");

    assert!(agg.next().is_none());
}

#[test]
fn merge_skip_completes_without_error() {
    let faulty: SourceIter<u32> = Box::new(
        vec![Err(SourceError::io("gone")), Ok(2)].into_iter(),
    );

    let agg = FederatedAggregator::new(
        vec![source_of(vec![1, 3]), faulty],
        OrderSpec::by(|n: &u32| *n),
        FailureMode::Skip,
        4,
    )
    .unwrap();

    let out: Vec<u32> = agg.map(Result::unwrap).collect();
    assert_eq!(out, vec![1, 2, 3]);
}

#[test]
fn merge_prefix_consumption_stays_chunk_bounded() {
    let pulls = Rc::new(Cell::new(0));
    let sources: Vec<SourceIter<u32>> = (0..3)
        .map(|s| counted_source((0..100).map(|n| n * 3 + s).collect(), pulls.clone()))
        .collect();

    let agg = FederatedAggregator::new(
        sources,
        OrderSpec::by(|n: &u32| *n),
        FailureMode::Skip,
        5,
    )
    .unwrap();

    let prefix: Vec<u32> = agg.take(6).map(Result::unwrap).collect();
    assert_eq!(prefix, vec![0, 1, 2, 3, 4, 5]);

    // Each cursor reads at most position 6, so at most 2 chunks of 5 per
    // source are ever fetched from the 100-element sources.
    assert!(pulls.get() <= 30, "pulled {} elements", pulls.get());
}

#[test]
fn abandoning_the_iterator_consumes_nothing_further() {
    let pulls = Rc::new(Cell::new(0));
    let mut agg = FederatedAggregator::new(
        vec![counted_source((0..50).collect(), pulls.clone())],
        OrderSpec::by(|n: &u32| *n),
        FailureMode::Skip,
        4,
    )
    .unwrap();

    assert_eq!(agg.next().unwrap().unwrap(), 0);
    let after_one = pulls.get();
    drop(agg);

    assert_eq!(pulls.get(), after_one);
}

fn id_eq() -> IdentityEq<u32> {
    Rc::new(|a, b| a == b)
}

fn id_tie() -> TieBreak<u32> {
    Rc::new(|a, b| a.cmp(b))
}

proptest! {
    #[test]
    fn merge_output_is_globally_sorted(
        mut sources in prop::collection::vec(prop::collection::vec(0u32..100, 0..12), 1..5),
        chunk_size in 1usize..6,
    ) {
        for source in &mut sources {
            source.sort_unstable();
        }
        let mut expected: Vec<u32> = sources.iter().flatten().copied().collect();
        expected.sort_unstable();

        let iters = sources.into_iter().map(source_of).collect();
        let agg = FederatedAggregator::new(
            iters,
            OrderSpec::by(|n: &u32| *n),
            FailureMode::Skip,
            chunk_size,
        )
        .unwrap();

        let out: Vec<u32> = agg.map(Result::unwrap).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn concat_equals_source_concatenation(
        sources in prop::collection::vec(prop::collection::vec(any::<u32>(), 0..10), 1..5),
    ) {
        let expected: Vec<u32> = sources.iter().flatten().copied().collect();

        let iters = sources.into_iter().map(source_of).collect();
        let agg = FederatedAggregator::new(
            iters,
            OrderSpec::unordered(),
            FailureMode::Propagate,
            8,
        )
        .unwrap();

        let out: Vec<u32> = agg.map(Result::unwrap).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn skip_mode_never_yields_an_error(
        items in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        // true => element, false => failure at that position.
        let source: SourceIter<u32> = Box::new(items.into_iter().enumerate().map(|(i, ok)| {
            if ok {
                Ok(i as u32)
            } else {
                Err(SourceError::other(format!("element {i} failed")))
            }
        }));

        let agg = FederatedAggregator::new(
            vec![source],
            OrderSpec::by(|n: &u32| *n),
            FailureMode::Skip,
            3,
        )
        .unwrap();

        for item in agg {
            prop_assert!(item.is_ok());
        }
    }

    #[test]
    fn dedup_is_idempotent(items in prop::collection::vec(0u32..8, 0..30)) {
        let once: Vec<u32> = DedupAdjacent::new(
            items.into_iter().map(Ok),
            id_eq(),
            id_tie(),
        )
        .map(Result::unwrap)
        .collect();

        let twice: Vec<u32> = DedupAdjacent::new(
            once.clone().into_iter().map(Ok),
            id_eq(),
            id_tie(),
        )
        .map(Result::unwrap)
        .collect();

        prop_assert_eq!(twice, once);
    }
}
