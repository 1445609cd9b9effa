use crate::axis::{buffered_range, max_scroll, percent_of, pixel_of_percent};
use crate::*;

use alloc::collections::BTreeSet;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell as Counter, RefCell};

use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

const FAIL: u32 = 999;

#[derive(Debug)]
struct TestCell {
    id: usize,
    index: Option<usize>,
    item: Option<u32>,
    binds: usize,
    created: bool,
    cached: bool,
    disposed: Rc<Counter<usize>>,
}

impl Cell<u32> for TestCell {
    fn bind(&mut self, item: &u32) {
        self.item = Some(*item);
        self.binds += 1;
    }

    fn set_index(&mut self, index: usize) {
        self.index = Some(index);
    }

    fn on_created(&mut self, _host: &Host<'_>) {
        self.created = true;
    }

    fn on_cache(&mut self) {
        self.cached = true;
    }

    fn on_decache(&mut self) {
        self.cached = false;
    }

    fn dispose(&mut self) {
        self.disposed.set(self.disposed.get() + 1);
    }
}

struct Harness {
    engine: Reconciler,
    state: ViewportState<u32, TestCell>,
    pool: CellPool<u32, TestCell>,
    context: Context,
    next_id: usize,
    disposed: Rc<Counter<usize>>,
}

impl Harness {
    fn new(pool_capacity: usize) -> Self {
        Self {
            engine: Reconciler::new(),
            state: ViewportState::empty(),
            pool: CellPool::with_capacity(pool_capacity),
            context: Context::new(),
            next_id: 0,
            disposed: Rc::new(Counter::new(0)),
        }
    }

    fn pass(
        &mut self,
        items: &[u32],
        segments: &[IndexRange],
        update_type: UpdateType,
        change: Option<ListChange>,
    ) -> ReconcileReport {
        let next_id = &mut self.next_id;
        let disposed = &self.disposed;
        let mut factory = |item: &u32| -> Result<TestCell, CellError> {
            if *item == FAIL {
                return Err(CellError::new("refusing item"));
            }
            *next_id += 1;
            Ok(TestCell {
                id: *next_id,
                index: None,
                item: None,
                binds: 0,
                created: false,
                cached: false,
                disposed: Rc::clone(disposed),
            })
        };
        let host = Host::new(ContainerKind::List, Orientation::Vertical, &self.context);
        let mut plan = Plan::new(items, segments, update_type);
        if update_type == UpdateType::Change {
            plan = plan.with_change(change);
        }
        self.engine
            .reconcile(&mut self.state, plan, &mut self.pool, &mut factory, &host)
            .unwrap()
    }

    fn ids(&self) -> Vec<(usize, usize)> {
        self.state.iter().map(|(i, _, c)| (i, c.id)).collect()
    }

    fn id_at(&self, index: usize) -> usize {
        self.state.get(index).unwrap().id
    }
}

fn values(n: u32) -> Vec<u32> {
    (0..n).map(|i| i * 10).collect()
}

#[test]
fn index_range_basics() {
    assert_eq!(IndexRange::of(-3, 2), IndexRange::new(0, 2));
    assert_eq!(IndexRange::of(-3, -1), IndexRange::EMPTY);
    assert!(IndexRange::new(5, 2).is_empty());
    assert_eq!(IndexRange::new(5, 2), IndexRange::EMPTY);
    assert_eq!(IndexRange::up_to(0), IndexRange::EMPTY);
    assert_eq!(IndexRange::up_to(4), IndexRange::new(0, 3));

    let r = IndexRange::new(3, 9);
    assert_eq!(r.len(), 7);
    assert_eq!(r.intersect(&IndexRange::new(8, 20)), IndexRange::new(8, 9));
    assert!(r.intersect(&IndexRange::new(10, 20)).is_empty());
    assert!(r.intersect(&IndexRange::EMPTY).is_empty());

    let pieces = r.diff(&IndexRange::new(5, 6));
    assert_eq!(pieces.as_slice(), &[IndexRange::new(3, 4), IndexRange::new(7, 9)]);
    assert_eq!(r.diff(&IndexRange::new(0, 100)).len(), 0);
    assert_eq!(r.diff(&IndexRange::EMPTY).as_slice(), &[r]);
    assert_eq!(IndexRange::EMPTY.diff(&r).len(), 0);

    assert_eq!(r.expand(5, 12), IndexRange::new(0, 11));
    assert_eq!(r.clamp_to(5), IndexRange::new(3, 4));
    assert!(r.clamp_to(3).is_empty());
    assert_eq!(r.hull(&IndexRange::new(20, 21)), IndexRange::new(3, 21));
    assert_eq!(IndexRange::EMPTY.hull(&r), r);
    assert_eq!(r.center(), Some(6));
    assert_eq!(r.center_distance(6), 0);
    assert!(r.center_distance(3) == r.center_distance(9));
    assert_eq!(IndexRange::EMPTY.iter().count(), 0);
    assert_eq!(r.iter().collect::<Vec<_>>(), (3..=9).collect::<Vec<_>>());
}

#[test]
fn excluding_range_skips_points() {
    let mut r = ExcludingRange::of(3, 7);
    r.exclude_all([5, 7]);
    assert_eq!(r.iter().collect::<Vec<_>>(), [3, 4, 6]);
    assert_eq!(r.remaining(), 3);
    assert!(r.is_excluded(5));
    assert!(r.is_excluded(100));
    assert!(!r.is_excluded(6));
}

#[test]
fn excluding_everything_yields_nothing() {
    let mut r = ExcludingRange::of(3, 7);
    r.exclude_range(IndexRange::new(3, 7));
    let mut it = r.iter();
    assert!(!it.has_next());
    assert_eq!(it.next_index(), Err(RangeExhausted));
    assert_eq!(it.next(), None);
    assert_eq!(r.remaining(), 0);
}

#[test]
fn excluding_iter_fails_after_last_index() {
    let mut r = ExcludingRange::of(0, 4);
    r.exclude(0).exclude(4);
    let mut it = r.iter();
    assert_eq!(it.next_index(), Ok(1));
    assert_eq!(it.next_index(), Ok(2));
    assert!(it.has_next());
    assert_eq!(it.next_index(), Ok(3));
    assert!(!it.has_next());
    assert_eq!(it.next_index(), Err(RangeExhausted));
    assert_eq!(it.next_index(), Err(RangeExhausted));

    // A fresh iterator starts over.
    assert_eq!(r.iter().count(), 3);
}

#[test]
fn excluding_range_ignores_outside_exclusions_and_merges_spans() {
    let mut r = ExcludingRange::of(10, 20);
    r.exclude(3).exclude(25).exclude_range(IndexRange::new(0, 11));
    r.exclude_range(IndexRange::new(15, 16)).exclude(14).exclude(17);
    assert_eq!(
        r.excluded().collect::<Vec<_>>(),
        [IndexRange::new(10, 11), IndexRange::new(14, 17)]
    );
    assert_eq!(r.iter().collect::<Vec<_>>(), [12, 13, 18, 19, 20]);
}

proptest! {
    #[test]
    fn excluding_range_is_set_difference(
        start in 0usize..40,
        len in 0usize..40,
        points in proptest::collection::vec(0usize..90, 0..30),
        spans in proptest::collection::vec((0usize..90, 0usize..8), 0..4),
    ) {
        let range = IndexRange::new(start, start + len);
        let mut r = ExcludingRange::new(range);
        r.exclude_all(points.iter().copied());
        let mut excluded: BTreeSet<usize> = points.iter().copied().collect();
        for &(s, l) in &spans {
            r.exclude_range(IndexRange::new(s, s + l));
            excluded.extend(s..=s + l);
        }
        let expected: Vec<usize> = range.iter().filter(|i| !excluded.contains(i)).collect();
        let mut it = r.iter();
        let got: Vec<usize> = it.by_ref().collect();
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(r.remaining(), expected.len());
        prop_assert!(it.next_index().is_err());
    }

    #[test]
    fn fixed_axis_round_trips(count in 1usize..500, extent in 1u32..200, spacing in 0u32..20) {
        let axis = FixedAxis::new(count, extent, spacing).unwrap();
        let mut prev = 0u64;
        for i in 0..count {
            let px = axis.pixel_of(i);
            prop_assert!(px >= prev);
            prev = px;
            prop_assert_eq!(axis.index_of(px), i);
            prop_assert_eq!(axis.index_of(px + extent as u64 - 1), i);
        }
        prop_assert_eq!(axis.index_of(u64::MAX), count - 1);
    }

    #[test]
    fn percent_round_trips(max in 1u64..1_000_000, pixel in 0u64..1_000_000) {
        let pixel = pixel.min(max);
        let p = percent_of(pixel, max);
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert_eq!(pixel_of_percent(p, max), pixel);
    }
}

#[test]
fn bimap_tolerates_duplicate_items() {
    let items = ["A", "B", "A", "B", "C", "B"];
    let mut map = IndexBiMap::new();
    for (i, item) in items.iter().enumerate() {
        map.put(i, *item, i * 100);
    }
    assert!(map.is_valid());
    assert_eq!(map.len(), 6);
    assert_eq!(map.indices_of(&"B").collect::<Vec<_>>(), [1, 3, 5]);
    assert_eq!(map.indices_of(&"A").collect::<Vec<_>>(), [0, 2]);
    assert_eq!(map.get_by_key(&"B").copied().collect::<Vec<_>>(), [100, 300, 500]);
    assert_eq!(map.entry(4), Some((&"C", &400)));

    assert_eq!(map.remove_by_key(&"B"), Some((1, 100)));
    assert_eq!(map.indices_of(&"B").collect::<Vec<_>>(), [3, 5]);
    assert_eq!(map.remove_nearest(&"B", 5), Some((5, 500)));
    assert_eq!(map.remove(42), None);
    assert!(map.is_valid());

    // Overwriting a slot moves its index to the new item.
    assert_eq!(map.put(0, "C", 7), Some(("A", 0)));
    assert_eq!(map.indices_of(&"A").collect::<Vec<_>>(), [2]);
    assert_eq!(map.indices_of(&"C").collect::<Vec<_>>(), [0, 4]);
    assert!(map.is_valid());
}

#[test]
fn bimap_stays_valid_under_random_mutations() {
    let mut rng = Lcg::new(0x5eed);
    let mut map: IndexBiMap<u8, usize> = IndexBiMap::new();
    for step in 0..4_000 {
        match rng.gen_range_usize(0, 6) {
            0 | 1 | 2 => {
                let index = rng.gen_range_usize(0, 64);
                let item = rng.gen_range_usize(0, 5) as u8;
                map.put(index, item, step);
            }
            3 => {
                map.remove(rng.gen_range_usize(0, 64));
            }
            4 => {
                let item = rng.gen_range_usize(0, 5) as u8;
                map.remove_by_key(&item);
            }
            _ => {
                if rng.gen_bool() {
                    map.pop_first();
                } else {
                    map.pop_last();
                }
            }
        }
        assert!(map.is_valid(), "bimap invalid after step {step}");
    }
}

#[test]
fn bimap_shift_moves_tail_entries() {
    let mut map: IndexBiMap<char, u32> = "abcdef"
        .chars()
        .enumerate()
        .map(|(i, c)| (i, c, i as u32))
        .collect();
    map.shift_from(2, 3);
    assert_eq!(map.indices().collect::<Vec<_>>(), [0, 1, 5, 6, 7, 8]);
    assert_eq!(map.entry(5), Some((&'c', &2)));
    assert_eq!(map.indices_of(&'f').collect::<Vec<_>>(), [8]);
    assert!(map.is_valid());

    map.remove(5);
    map.remove(6);
    map.shift_from(7, -5);
    assert_eq!(map.indices().collect::<Vec<_>>(), [0, 1, 2, 3]);
    assert_eq!(map.key(2), Some(&'e'));
    assert!(map.is_valid());

    let drained: Vec<_> = map.drain().map(|(i, k, _)| (i, k)).collect();
    assert_eq!(drained, [(0, 'a'), (1, 'b'), (2, 'e'), (3, 'f')]);
    assert!(map.is_empty());
    assert!(map.is_valid());
}

#[test]
#[should_panic(expected = "collides")]
fn bimap_shift_collision_is_fatal() {
    let mut map: IndexBiMap<u8, ()> = IndexBiMap::new();
    map.put(0, 1, ());
    map.put(3, 2, ());
    map.shift_from(3, -3);
}

#[test]
fn initial_pass_creates_required_cells() {
    let mut h = Harness::new(10);
    let items = values(100);
    let report = h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    assert_eq!(report.created, 10);
    assert!(report.cells_changed());
    assert_eq!(h.state.len(), 10);
    assert_eq!(h.state.range(), IndexRange::new(0, 9));
    assert_eq!(h.state.count(), 100);
    assert_eq!(h.state.generation(), 1);
    assert_eq!(h.state.update_type(), UpdateType::Init);
    assert!(h.state.is_valid());
    for (i, item, cell) in h.state.iter() {
        assert!(cell.created);
        assert_eq!(cell.index, Some(i));
        assert_eq!(cell.item, Some(*item));
        assert_eq!(*item, items[i]);
        assert_eq!(cell.binds, 1);
    }
}

#[test]
fn reconcile_is_idempotent() {
    let mut h = Harness::new(10);
    let items = values(100);
    let segs = [IndexRange::new(20, 31)];
    h.pass(&items, &segs, UpdateType::Init, None);
    let before = h.ids();
    let report = h.pass(&items, &segs, UpdateType::Scroll, None);
    assert_eq!(h.ids(), before);
    assert_eq!(report.reused, 12);
    assert!(!report.cells_changed());
    assert_eq!(report.created + report.rebound + report.moved, 0);
    assert!(h.state.iter().all(|(_, _, c)| c.binds == 1));
    assert_eq!(h.state.generation(), 2);
}

#[test]
fn scrolling_rebinds_cells_that_left_the_range() {
    let mut h = Harness::new(10);
    let items = values(100);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    let kept: Vec<usize> = (5..10).map(|i| h.id_at(i)).collect();

    let report = h.pass(&items, &[IndexRange::new(5, 14)], UpdateType::Scroll, None);
    assert_eq!(report.reused, 5);
    assert_eq!(report.rebound, 5);
    assert_eq!(report.created, 0);
    assert!(!report.cells_changed());
    assert!(!h.state.cells_changed());
    assert_eq!((5..10).map(|i| h.id_at(i)).collect::<Vec<_>>(), kept);
    for i in 10..15 {
        let cell = h.state.get(i).unwrap();
        assert_eq!(cell.item, Some(items[i]));
        assert_eq!(cell.index, Some(i));
    }
    assert!(h.state.is_valid());
}

#[test]
fn insertion_shifts_cells_at_and_after_the_insert_point() {
    let mut h = Harness::new(10);
    let mut items = values(50);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    let before: Vec<usize> = (0..10).map(|i| h.id_at(i)).collect();

    items.splice(4..4, [1000, 1001, 1002]);
    let report = h.pass(
        &items,
        &[IndexRange::new(0, 9)],
        UpdateType::Change,
        Some(ListChange::insert(4, 3)),
    );

    for i in 0..4 {
        assert_eq!(h.id_at(i), before[i], "cell below the insert point changed");
    }
    for i in 7..10 {
        assert_eq!(h.id_at(i), before[i - 3], "cell was not shifted by +3");
        assert_eq!(h.state.get(i).unwrap().binds, 1, "shifted cell was rebound");
        assert_eq!(h.state.get(i).unwrap().index, Some(i));
    }
    for i in 4..7 {
        assert_eq!(h.state.get(i).unwrap().item, Some(items[i]));
    }
    assert_eq!(report.reused, 4);
    assert_eq!(report.moved, 3);
    assert_eq!(report.rebound, 3);
    assert_eq!(report.created, 0);
    assert_eq!(h.state.update_type(), UpdateType::Change);
    assert!(h.state.is_valid());
}

#[test]
fn removal_shifts_following_cells_back() {
    let mut h = Harness::new(10);
    let mut items = values(50);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    let before: Vec<usize> = (0..10).map(|i| h.id_at(i)).collect();

    items.drain(3..5);
    let report = h.pass(
        &items,
        &[IndexRange::new(0, 9)],
        UpdateType::Change,
        Some(ListChange::remove(3, 2)),
    );
    for i in 0..3 {
        assert_eq!(h.id_at(i), before[i]);
    }
    for i in 3..8 {
        assert_eq!(h.id_at(i), before[i + 2]);
    }
    assert_eq!(report.moved, 5);
    assert_eq!(report.rebound, 2);
    assert_eq!(h.state.get(9).unwrap().item, Some(items[9]));
    assert!(h.state.is_valid());
}

#[test]
fn replaced_items_are_rebound_in_their_own_cells() {
    let mut h = Harness::new(10);
    let mut items = values(20);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    let before: Vec<usize> = (0..10).map(|i| h.id_at(i)).collect();

    items[2] = 1000;
    items[5] = 1001;
    items[8] = 1002;
    let report = h.pass(
        &items,
        &[IndexRange::new(0, 9)],
        UpdateType::Change,
        Some(ListChange::replace(2, 8)),
    );
    assert_eq!(h.ids(), before.into_iter().enumerate().collect::<Vec<_>>());
    for i in [2, 5, 8] {
        let cell = h.state.get(i).unwrap();
        assert_eq!(cell.item, Some(items[i]));
        assert_eq!(cell.binds, 2);
    }
    assert_eq!(report.reused, 7);
    assert_eq!(report.rebound, 3);
    assert!(!report.cells_changed());
}

#[test]
fn permuted_items_keep_their_cells() {
    let mut h = Harness::new(10);
    let mut items = values(10);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    let before: Vec<usize> = (0..10).map(|i| h.id_at(i)).collect();

    items.reverse();
    let report = h.pass(
        &items,
        &[IndexRange::new(0, 9)],
        UpdateType::Change,
        Some(ListChange::permute(0, 9)),
    );
    assert_eq!(report.moved, 10);
    assert!(!report.cells_changed());
    for i in 0..10 {
        assert_eq!(h.id_at(i), before[9 - i]);
        let cell = h.state.get(i).unwrap();
        assert_eq!(cell.binds, 1);
        assert_eq!(cell.index, Some(i));
    }
}

#[test]
fn duplicate_items_are_matched_by_occurrence() {
    let mut h = Harness::new(10);
    let items = [7, 7, 8, 7];
    h.pass(&items, &[IndexRange::new(0, 3)], UpdateType::Init, None);
    let before = h.ids();

    // Same values, no positional metadata: every cell stays where it is.
    let report = h.pass(&items, &[IndexRange::new(0, 3)], UpdateType::Change, None);
    assert_eq!(h.ids(), before);
    assert_eq!(report.reused, 4);
    assert_eq!(h.state.indices_of(&7).collect::<Vec<_>>(), [0, 1, 3]);
}

#[test]
fn factory_failure_leaves_an_empty_slot() {
    let mut h = Harness::new(10);
    let items = [1, 2, FAIL, 4];
    let report = h.pass(&items, &[IndexRange::new(0, 3)], UpdateType::Init, None);
    assert_eq!(report.created, 3);
    assert_eq!(report.failures, 1);
    assert_eq!(h.state.len(), 3);
    assert!(h.state.get(2).is_none());
    assert_eq!(h.state.failures().len(), 1);
    assert_eq!(h.state.failures()[0].index, 2);
    assert_eq!(h.state.failures()[0].error.message(), "refusing item");
    assert!(h.state.is_valid());

    // The item is fixed: the slot gets a cell and the failure is gone.
    let fixed = [1, 2, 3, 4];
    h.pass(
        &fixed,
        &[IndexRange::new(0, 3)],
        UpdateType::Change,
        Some(ListChange::replace(2, 2)),
    );
    assert_eq!(h.state.len(), 4);
    assert!(h.state.failures().is_empty());
}

#[test]
fn shrinking_the_range_pools_nearest_cells_and_disposes_the_rest() {
    let mut h = Harness::new(3);
    let items = values(20);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    let before: Vec<usize> = (0..10).map(|i| h.id_at(i)).collect();

    let report = h.pass(&items, &[IndexRange::new(0, 1)], UpdateType::Scroll, None);
    assert_eq!(report.released, 3);
    assert_eq!(report.disposed, 5);
    assert_eq!(h.disposed.get(), 5);
    assert_eq!(h.pool.len(), 3);

    // LIFO: the last pooled (index 4) comes back first.
    let c = h.pool.acquire().unwrap();
    assert_eq!(c.id, before[4]);
    assert!(!c.cached);
    let c = h.pool.acquire().unwrap();
    assert_eq!(c.id, before[3]);
}

#[test]
fn pooled_cells_are_reused_before_creating() {
    let mut h = Harness::new(10);
    let items = values(40);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    h.pass(&[], &[], UpdateType::Change, Some(ListChange::set_all(0)));
    assert!(h.state.is_empty());
    assert_eq!(h.pool.len(), 10);

    let report = h.pass(
        &items,
        &[IndexRange::new(30, 39)],
        UpdateType::Change,
        Some(ListChange::set_all(40)),
    );
    assert_eq!(report.pooled_reuse, 10);
    assert_eq!(report.created, 0);
    assert!(h.state.iter().all(|(_, _, c)| !c.cached && c.binds == 2));
}

#[test]
fn grid_segments_reconcile_per_row() {
    let mut h = Harness::new(10);
    let items = values(10);
    let geo = GridGeometry::new(4, Rect::new(10, 10)).unwrap();
    let segs = geo.segments(IndexRange::new(0, 2), IndexRange::new(1, 2), items.len());
    assert_eq!(segs, [IndexRange::new(1, 2), IndexRange::new(5, 6), IndexRange::new(9, 9)]);

    h.pass(&items, &segs, UpdateType::Init, None);
    assert_eq!(h.state.segments(), segs.as_slice());
    assert_eq!(h.state.cells().indices().collect::<Vec<_>>(), [1, 2, 5, 6, 9]);
    assert_eq!(h.state.range(), IndexRange::new(1, 9));
    assert!(!h.state.contains(3));
    assert!(h.state.is_valid());
}

#[test]
fn segments_past_the_item_count_are_ignored() {
    let mut h = Harness::new(10);
    let items = values(5);
    h.pass(&items, &[IndexRange::new(3, 20)], UpdateType::Init, None);
    assert_eq!(h.state.range(), IndexRange::new(3, 4));
    assert_eq!(h.state.len(), 2);
}

struct ReentrantCell {
    engine: Rc<Reconciler>,
    outcome: Rc<RefCell<Option<Result<ReconcileReport, ReconcileError>>>>,
}

impl Cell<u32> for ReentrantCell {
    fn bind(&mut self, _item: &u32) {
        let context = Context::new();
        let host = Host::new(ContainerKind::List, Orientation::Vertical, &context);
        let mut state = ViewportState::<u32, ReentrantCell>::empty();
        let mut pool = CellPool::with_capacity(0);
        let mut factory =
            |_: &u32| -> Result<ReentrantCell, CellError> { Err(CellError::new("unused")) };
        let items = [1u32];
        let segments = [IndexRange::new(0, 0)];
        let plan = Plan::new(&items, &segments, UpdateType::Init);
        let result = self
            .engine
            .reconcile(&mut state, plan, &mut pool, &mut factory, &host);
        *self.outcome.borrow_mut() = Some(result);
    }
}

#[test]
fn reentrant_pass_is_rejected() {
    let engine = Rc::new(Reconciler::new());
    let outcome = Rc::new(RefCell::new(None));
    let context = Context::new();
    let host = Host::new(ContainerKind::List, Orientation::Vertical, &context);
    let mut state = ViewportState::<u32, ReentrantCell>::empty();
    let mut pool = CellPool::with_capacity(4);
    let guard = engine.guard();
    let mut factory = |_: &u32| -> Result<ReentrantCell, CellError> {
        Ok(ReentrantCell {
            engine: Rc::clone(&engine),
            outcome: Rc::clone(&outcome),
        })
    };
    let items = [5u32, 6];
    let segments = [IndexRange::new(0, 1)];
    let plan = Plan::new(&items, &segments, UpdateType::Init);
    let report = engine
        .reconcile(&mut state, plan, &mut pool, &mut factory, &host)
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(*outcome.borrow(), Some(Err(ReconcileError::Reentrant)));
    assert!(state.is_valid());
    assert_eq!(state.len(), 2);
    assert!(!guard.is_active());
}

#[test]
fn teardown_disposes_live_and_pooled_cells() {
    let mut h = Harness::new(10);
    let items = values(20);
    h.pass(&items, &[IndexRange::new(0, 9)], UpdateType::Init, None);
    h.pass(&items, &[IndexRange::new(0, 5)], UpdateType::Scroll, None);
    assert_eq!(h.pool.len(), 4);
    let disposed = h.engine.teardown(&mut h.state, &mut h.pool).unwrap();
    assert_eq!(disposed, 10);
    assert_eq!(h.disposed.get(), 10);
    assert!(h.state.is_empty());
    assert!(h.pool.is_empty());
    assert_eq!(h.state.generation(), 3);
}

fn pool_cell(id: usize, disposed: &Rc<Counter<usize>>) -> TestCell {
    TestCell {
        id,
        index: None,
        item: None,
        binds: 0,
        created: false,
        cached: false,
        disposed: Rc::clone(disposed),
    }
}

#[test]
fn pool_is_lifo_and_bounded() {
    let disposed = Rc::new(Counter::new(0));
    let mut pool: CellPool<u32, TestCell> = CellPool::with_capacity(2);
    assert_eq!(pool.release(pool_cell(1, &disposed)), Released::Pooled);
    assert_eq!(pool.release(pool_cell(2, &disposed)), Released::Pooled);
    assert_eq!(pool.release(pool_cell(3, &disposed)), Released::Disposed);
    assert_eq!(disposed.get(), 1);
    assert_eq!(pool.len(), 2);

    let c = pool.acquire().unwrap();
    assert_eq!(c.id, 2);
    assert!(!c.cached);
    assert_eq!(pool.acquire().unwrap().id, 1);
    assert!(pool.acquire().is_none());
}

#[test]
fn pool_capacity_changes() {
    let disposed = Rc::new(Counter::new(0));
    let mut pool: CellPool<u32, TestCell> = CellPool::with_capacity(5);
    let mut next = 0;
    assert_eq!(
        pool.prefill(8, || {
            next += 1;
            pool_cell(next, &disposed)
        }),
        5
    );
    pool.set_capacity(2);
    assert_eq!(disposed.get(), 3);
    // The oldest cells went first.
    assert_eq!(pool.acquire().unwrap().id, 5);
    assert_eq!(pool.acquire().unwrap().id, 4);

    let mut off: CellPool<u32, TestCell> = CellPool::with_capacity(0);
    assert_eq!(off.release(pool_cell(9, &disposed)), Released::Disposed);
    assert!(off.is_empty());

    pool.release(pool_cell(10, &disposed));
    pool.clear();
    assert_eq!(disposed.get(), 5);
}

#[test]
fn fixed_axis_metrics() {
    let axis = FixedAxis::new(10, 20, 5).unwrap();
    assert_eq!(axis.stride(), 25);
    assert_eq!(axis.total_extent(), 245);
    assert_eq!(axis.pixel_of(3), 75);
    assert_eq!(axis.index_of(74), 2);
    assert_eq!(axis.index_of(10_000), 9);
    assert_eq!(axis.visible(0, 100), (0, 4));
    assert_eq!(axis.visible(30, 101), (1, 5));
    assert_eq!(FixedAxis::new(3, 0, 0), Err(ConfigError::ZeroCellExtent));
    assert_eq!(FixedAxis::new(0, 10, 2).unwrap().total_extent(), 0);
    assert_eq!(max_scroll(245, 100), 145);
    assert_eq!(max_scroll(50, 100), 0);
}

#[test]
fn variable_axis_matches_naive_prefix_sums() {
    let mut rng = Lcg::new(42);
    let mut sizes: Vec<u32> = (0..200).map(|_| rng.gen_range_usize(1, 60) as u32).collect();
    let spacing = 3;
    let mut axis = VariableAxis::from_fn(sizes.len(), spacing, |i| sizes[i]).unwrap();

    let check = |axis: &VariableAxis, sizes: &[u32]| {
        let mut off = 0u64;
        for (i, &s) in sizes.iter().enumerate() {
            assert_eq!(axis.pixel_of(i), off);
            assert_eq!(axis.index_of(off), i);
            assert_eq!(axis.index_of(off + s as u64 - 1), i);
            assert_eq!(axis.extent_of(i), s);
            off += s as u64 + spacing as u64;
        }
        assert_eq!(axis.total_extent(), off - spacing as u64);
    };
    check(&axis, &sizes);

    for _ in 0..50 {
        let i = rng.gen_range_usize(0, sizes.len());
        let s = rng.gen_range_usize(1, 60) as u32;
        sizes[i] = s;
        axis.set_extent(i, s).unwrap();
    }
    check(&axis, &sizes);

    for _ in 0..13 {
        let s = rng.gen_range_usize(1, 60) as u32;
        sizes.push(s);
        axis.push(s).unwrap();
    }
    check(&axis, &sizes);

    sizes.truncate(77);
    axis.truncate(77);
    check(&axis, &sizes);

    assert_eq!(axis.set_extent(0, 0), Err(ConfigError::ZeroItemExtent(0)));
    assert_eq!(
        VariableAxis::from_fn(3, 0, |i| if i == 1 { 0 } else { 5 }).unwrap_err(),
        ConfigError::ZeroItemExtent(1)
    );
}

#[test]
fn variable_axis_grows_from_empty() {
    let mut axis = VariableAxis::new(2);
    assert_eq!(axis.total_extent(), 0);
    assert_eq!(axis.index_of(100), 0);
    for s in [5, 7, 9, 11, 13] {
        axis.push(s).unwrap();
    }
    assert_eq!(axis.count(), 5);
    assert_eq!(axis.pixel_of(3), 5 + 7 + 9 + 3 * 2);
    assert_eq!(axis.total_extent(), 45 + 4 * 2);
    assert_eq!(axis.index_of(16), 2);
    assert_eq!(axis.push(0), Err(ConfigError::ZeroItemExtent(5)));
}

#[test]
fn variable_axis_visible_window() {
    let axis = VariableAxis::from_fn(5, 0, |i| [10, 20, 30, 40, 50][i]).unwrap();
    // [0,10) [10,30) [30,60) [60,100) [100,150)
    assert_eq!(axis.visible(15, 50), (1, 3));
    assert_eq!(axis.visible(0, 10), (0, 1));
    assert_eq!(axis.visible(0, 11), (0, 2));
    assert_eq!(axis.visible(0, 0), (0, 0));
}

#[test]
fn buffered_range_follows_visible_window() {
    assert_eq!(buffered_range(0, 5, 100, 2), IndexRange::new(0, 8));
    assert_eq!(buffered_range(50, 5, 100, 2), IndexRange::new(48, 56));
    assert_eq!(buffered_range(98, 5, 100, 2), IndexRange::new(91, 99));
    assert_eq!(buffered_range(3, 5, 4, 2), IndexRange::new(0, 3));
    assert_eq!(buffered_range(0, 5, 0, 2), IndexRange::EMPTY);
    assert_eq!(buffered_range(0, 0, 10, 0), IndexRange::EMPTY);
    assert_eq!(
        axis::required_range(&FixedAxis::new(100, 10, 0).unwrap(), 500, 100, 1),
        IndexRange::new(49, 60)
    );
    assert_eq!(
        axis::required_range(&FixedAxis::new(100, 10, 0).unwrap(), 0, 0, 1),
        IndexRange::EMPTY
    );
}

#[test]
fn percent_conversions_clamp() {
    assert_eq!(percent_of(50, 200), 0.25);
    assert_eq!(percent_of(500, 200), 1.0);
    assert_eq!(percent_of(10, 0), 0.0);
    assert_eq!(pixel_of_percent(0.5, 200), 100);
    assert_eq!(pixel_of_percent(2.0, 200), 200);
    assert_eq!(pixel_of_percent(-1.0, 200), 0);
    assert_eq!(pixel_of_percent(f64::NAN, 200), 0);
}

#[test]
fn grid_geometry_maps_coordinates() {
    let geo = GridGeometry::new(4, Rect::new(30, 20)).unwrap().with_spacing(2, 5);
    assert_eq!(geo.rows(10), 3);
    assert_eq!(geo.index_of(2, 1), 9);
    assert_eq!(geo.coordinates(9), (2, 1));
    assert_eq!(geo.index_of(usize::MAX, 0), usize::MAX);
    assert_eq!(geo.index_of(usize::MAX / 2, 1), usize::MAX);
    assert_eq!(geo.content_size(10), (4 * 32 - 2, 3 * 25 - 5));
    assert_eq!(geo.content_size(2), (2 * 32 - 2, 20));
    assert_eq!(
        geo.bounds_of(6),
        CellBounds {
            x: 64,
            y: 25,
            width: 30,
            height: 20
        }
    );
    assert_eq!(GridGeometry::new(0, Rect::new(1, 1)), Err(ConfigError::ZeroColumns));
    assert_eq!(GridGeometry::new(2, Rect::new(0, 1)), Err(ConfigError::ZeroCellExtent));

    let segs = geo.required_segments(ScrollPosition::new(0, 0), Rect::new(40, 30), 10, 0);
    // Two visible columns, two visible rows.
    assert_eq!(segs, [IndexRange::new(0, 1), IndexRange::new(4, 5)]);
}

#[test]
fn paginator_moves_by_whole_pages() {
    let mut p = Paginator::new(10).unwrap();
    p.set_count(95);
    assert_eq!(p.max_page(), 10);
    let axis = FixedAxis::new(95, 64, 0).unwrap();
    for page in 1..=10 {
        assert_eq!(p.go_to_page(page), page);
        assert_eq!(p.offset_of_page(page, &axis), ((page - 1) * 10 * 64) as u64);
    }
    assert_eq!(p.go_to_page(0), 1);
    assert_eq!(p.go_to_page(99), 10);
    assert_eq!(p.previous(), 9);
    assert_eq!(p.next(), 10);
    assert_eq!(p.next(), 10);
    assert_eq!(p.move_by(-4), 6);
    assert_eq!(p.move_by(-40), 1);
    assert_eq!(p.page_of_index(37), 4);
    assert_eq!(p.page_of_index(10_000), 10);
    assert_eq!(p.page_range(10), IndexRange::new(90, 94));
    assert_eq!(p.scroll_by(5), Err(ScrollError::Unsupported));

    p.go_to_page(4);
    p.set_items_per_page(7).unwrap();
    // Item 30 was first on page 4; with 7 per page it sits on page 5.
    assert_eq!(p.page(), 5);
    assert_eq!(p.set_items_per_page(0), Err(ConfigError::ZeroItemsPerPage));
    assert_eq!(p.items_per_page(), 7);

    p.set_count(0);
    assert_eq!(p.max_page(), 1);
    assert_eq!(p.page(), 1);
    assert!(p.page_range(1).is_empty());
    assert_eq!(Paginator::new(0), Err(ConfigError::ZeroItemsPerPage));
}

#[test]
fn paginator_required_range_includes_buffer() {
    let mut p = Paginator::new(10).unwrap();
    p.set_count(100);
    p.go_to_page(3);
    assert_eq!(p.required_range(2), IndexRange::new(18, 31));
    p.go_to_page(10);
    assert_eq!(p.required_range(2), IndexRange::new(86, 99));
    assert_eq!(
        p.state(),
        PageState {
            page: 10,
            max_page: 10,
            items_per_page: 10
        }
    );
}

#[derive(Debug, PartialEq)]
struct Clock(u32);

#[derive(Debug, PartialEq)]
struct Token(&'static str);

#[test]
fn context_registry_lock_semantics() {
    let mut ctx = Context::new();
    assert!(ctx.is_empty());
    assert_eq!(ctx.add(Clock(1)), Ok(None));
    assert_eq!(ctx.add(Clock(2)), Ok(Some(Clock(1))));
    assert_eq!(ctx.get::<Clock>(), Some(&Clock(2)));

    assert_eq!(ctx.add_locked(Token("a")), Ok(None));
    assert!(ctx.is_locked::<Token>());
    assert!(!ctx.is_locked::<Clock>());
    assert!(matches!(ctx.add(Token("b")), Err(ContextError::Locked(_))));
    assert!(matches!(ctx.add_locked(Token("b")), Err(ContextError::Locked(_))));
    assert_eq!(ctx.require::<Token>(), Ok(&Token("a")));
    assert_eq!(ctx.len(), 2);

    assert_eq!(ctx.take::<Token>(), Some(Token("a")));
    assert!(!ctx.is_locked::<Token>());
    assert!(matches!(ctx.require::<Token>(), Err(ContextError::Missing(_))));
    assert_eq!(ctx.add(Token("c")), Ok(None));

    if let Some(clock) = ctx.get_mut::<Clock>() {
        clock.0 = 9;
    }
    assert!(ctx.has::<Clock>());
    assert!(ctx.remove::<Clock>());
    assert!(!ctx.remove::<Clock>());
    assert_eq!(ctx.len(), 1);
}

#[test]
fn buffer_size_conversions() {
    assert_eq!(BufferSize::default(), BufferSize::Medium);
    assert_eq!(BufferSize::try_from(1), Ok(BufferSize::Small));
    assert_eq!(BufferSize::try_from(3), Ok(BufferSize::Big));
    assert_eq!(BufferSize::try_from(4), Err(ConfigError::InvalidBufferSize(4)));
    assert_eq!(u8::from(BufferSize::Big), 3);
    assert_eq!(BufferSize::Small.cells(), 1);
}

#[test]
fn orientation_selects_axis() {
    let rect = Rect::new(300, 200);
    assert_eq!(Orientation::Vertical.main(rect), 200);
    assert_eq!(Orientation::Horizontal.main(rect), 300);
    assert_eq!(Orientation::Horizontal.cross(rect), 200);
    let pos = ScrollPosition::new(5, 7);
    assert_eq!(Orientation::Vertical.main_offset(pos), 7);
    assert_eq!(
        Orientation::Horizontal.with_main_offset(pos, 40),
        ScrollPosition::new(40, 7)
    );
    assert_eq!(Orientation::Horizontal.point(3, 4), ScrollPosition::new(3, 4));
}

#[test]
fn list_change_constructors() {
    let c = ListChange::insert(4, 3);
    assert_eq!((c.from, c.to, c.count), (4, 6, 3));
    assert_eq!(c.shift(), Some(3));
    assert_eq!(ListChange::remove(2, 2).shift(), Some(-2));
    assert_eq!(ListChange::permute(0, 9).count, 10);
    assert_eq!(ListChange::replace(5, 5).shift(), None);
    assert_eq!(ListChange::set_all(0).count, 0);
}

#[test]
fn column_layouts() {
    let fixed = ColumnLayout::fixed(6, 30).unwrap();
    assert_eq!(fixed.mode(), ColumnsLayoutMode::Fixed);
    assert_eq!(fixed.total_width(), 180);
    assert_eq!(fixed.x_of(4), 120);
    assert_eq!(fixed.required_columns(90, 60, 1), IndexRange::new(2, 5));
    assert_eq!(fixed.required_columns(0, 0, 1), IndexRange::EMPTY);
    assert_eq!(ColumnLayout::fixed(3, 0).unwrap_err(), ConfigError::ZeroCellExtent);

    let variable = ColumnLayout::variable(&[30, 50, 20]).unwrap();
    assert_eq!(variable.mode(), ColumnsLayoutMode::Variable);
    assert_eq!(variable.count(), 3);
    assert_eq!(variable.total_width(), 100);
    assert_eq!(variable.x_of(2), 80);
    assert_eq!(variable.width_of(1), 50);
    // No horizontal virtualization: every column whatever the viewport.
    assert_eq!(variable.required_columns(90, 10, 0), IndexRange::new(0, 2));
    assert_eq!(
        ColumnLayout::variable(&[30, 0]).unwrap_err(),
        ConfigError::ZeroItemExtent(1)
    );
    let empty = ColumnLayout::variable(&[]).unwrap();
    assert_eq!(empty.required_columns(0, 10, 0), IndexRange::EMPTY);
}

#[test]
fn reports_add_up() {
    let mut total = ReconcileReport {
        created: 2,
        released: 1,
        ..ReconcileReport::default()
    };
    total += ReconcileReport {
        created: 3,
        rebound: 4,
        ..ReconcileReport::default()
    };
    assert_eq!(total.created, 5);
    assert_eq!(total.rebound, 4);
    assert_eq!(total.released, 1);
    assert!(total.cells_changed());
}
