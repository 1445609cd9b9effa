use alloc::boxed::Box;
use alloc::vec::Vec;

use cellview::{
    Cell, CellFactory, CellPool, ContainerKind, Context, Host, IndexRange, ItemKey, ListChange,
    Orientation, Plan, ReconcileReport, Reconciler, UpdateType, ViewportState,
};

use crate::options::{OnFailure, OnStateChange};

/// A pending reconciliation request. Requests made inside a batch are merged into one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Request {
    pub(crate) update: UpdateType,
    change: Option<ListChange>,
    changes: usize,
}

impl Request {
    pub(crate) fn new(update: UpdateType, change: Option<ListChange>) -> Self {
        let changes = usize::from(update == UpdateType::Change);
        Self {
            update,
            change,
            changes,
        }
    }

    /// The engine input for this request.
    pub(crate) fn plan<'a, T>(
        &self,
        items: &'a [T],
        segments: &'a [IndexRange],
        total_extent: u64,
    ) -> Plan<'a, T> {
        let plan = Plan::new(items, segments, self.update).with_total_extent(total_extent);
        if self.update == UpdateType::Change {
            plan.with_change(self.change)
        } else {
            plan
        }
    }

    /// Merges a later request into this one.
    ///
    /// Resets win. Several item changes lose their positional metadata, so the pass falls back
    /// to matching cells by item.
    fn merge(self, later: Self) -> Self {
        if self.update == UpdateType::Init || later.update == UpdateType::Init {
            return Self::new(UpdateType::Init, None);
        }
        let changes = self.changes + later.changes;
        if changes == 0 {
            return Self::new(UpdateType::Scroll, None);
        }
        let change = match changes {
            1 => self.change.or(later.change),
            _ => None,
        };
        Self {
            update: UpdateType::Change,
            change,
            changes,
        }
    }
}

/// Nesting depth of `batch_update` calls and the request merged so far.
#[derive(Debug, Default)]
pub(crate) struct Batch {
    depth: usize,
    pending: Option<Request>,
}

impl Batch {
    /// Returns the request to run now, or `None` when it was deferred to the end of a batch.
    pub(crate) fn request(
        &mut self,
        update: UpdateType,
        change: Option<ListChange>,
    ) -> Option<Request> {
        let req = Request::new(update, change);
        if self.depth > 0 {
            self.pending = Some(match self.pending {
                Some(prev) => prev.merge(req),
                None => req,
            });
            return None;
        }
        Some(req)
    }

    pub(crate) fn begin(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Closes a batch level; returns the merged request once the outermost batch ends.
    pub(crate) fn end(&mut self) -> Option<Request> {
        debug_assert!(self.depth > 0, "batch depth underflow");
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.pending.take()
        } else {
            None
        }
    }
}

/// State shared by every container: items, the live viewport state, the pool, the engine and
/// the callbacks.
pub(crate) struct Driver<T, C> {
    pub(crate) items: Vec<T>,
    pub(crate) state: ViewportState<T, C>,
    pub(crate) pool: CellPool<T, C>,
    pub(crate) context: Context,
    pub(crate) on_change: Option<OnStateChange<T, C>>,
    pub(crate) on_failure: Option<OnFailure>,
    engine: Reconciler,
    factory: Option<Box<dyn CellFactory<T, C>>>,
    kind: ContainerKind,
    last_report: ReconcileReport,
    batch: Batch,
}

impl<T: ItemKey + Clone, C: Cell<T>> Driver<T, C> {
    pub(crate) fn new(kind: ContainerKind, pool_capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            state: ViewportState::empty(),
            pool: CellPool::with_capacity(pool_capacity),
            context: Context::new(),
            on_change: None,
            on_failure: None,
            engine: Reconciler::new(),
            factory: None,
            kind,
            last_report: ReconcileReport::default(),
            batch: Batch::default(),
        }
    }

    pub(crate) fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    pub(crate) fn last_report(&self) -> ReconcileReport {
        self.last_report
    }

    /// Swaps the factory. Cells built by the previous one, live or pooled, are disposed.
    pub(crate) fn set_factory(&mut self, factory: Box<dyn CellFactory<T, C>>) {
        self.dispose_cells();
        self.factory = Some(factory);
    }

    pub(crate) fn dispose_cells(&mut self) {
        match self.engine.teardown(&mut self.state, &mut self.pool) {
            Ok(disposed) => {
                vdebug!(disposed, "cells disposed");
            }
            Err(_err) => {
                vwarn!(error = %_err, "cannot dispose cells during a pass");
            }
        }
    }

    pub(crate) fn request(
        &mut self,
        update: UpdateType,
        change: Option<ListChange>,
    ) -> Option<Request> {
        self.batch.request(update, change)
    }

    pub(crate) fn begin_batch(&mut self) {
        self.batch.begin();
    }

    pub(crate) fn end_batch(&mut self) -> Option<Request> {
        self.batch.end()
    }

    /// Whether a scroll-only request can be skipped because nothing it would change differs.
    pub(crate) fn is_current(&self, segments: &[IndexRange], total_extent: u64) -> bool {
        self.state.generation() > 0
            && self.state.segments() == segments
            && self.state.total_extent() == total_extent
            && self.state.count() == self.items.len()
            && self.state.failures().is_empty()
    }

    /// Runs one pass, then lets `placed` see every live cell before callbacks fire.
    pub(crate) fn run(
        &mut self,
        req: Request,
        segments: &[IndexRange],
        total_extent: u64,
        orientation: Orientation,
        mut placed: impl FnMut(usize, &mut C),
    ) {
        let Some(factory) = self.factory.as_deref_mut() else {
            vtrace!("no cell factory, pass skipped");
            return;
        };
        let host = Host::new(self.kind, orientation, &self.context);
        let plan = req.plan(&self.items, segments, total_extent);
        match self
            .engine
            .reconcile(&mut self.state, plan, &mut self.pool, factory, &host)
        {
            Ok(report) => self.last_report = report,
            Err(_err) => {
                vwarn!(error = %_err, "reconciliation rejected");
                return;
            }
        }
        for (index, _, cell) in self.state.iter_mut() {
            placed(index, cell);
        }
        if let Some(on_failure) = &self.on_failure {
            for failure in self.state.failures() {
                on_failure(failure);
            }
        }
        if let Some(on_change) = &self.on_change {
            on_change(&self.state);
        }
    }
}
