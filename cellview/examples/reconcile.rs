// Example: drive the engine by hand, the way a container does on every scroll step.
use cellview::{
    AxisMetrics, Cell, CellError, CellPool, ContainerKind, Context, FixedAxis, Host, Orientation,
    Plan, Reconciler, UpdateType, ViewportState, axis,
};

struct Label {
    text: String,
}

impl Cell<u32> for Label {
    fn bind(&mut self, item: &u32) {
        self.text = format!("row #{item}");
    }
}

fn main() {
    let items: Vec<u32> = (0..10_000).collect();
    let rows = FixedAxis::new(items.len(), 24, 0).expect("non-zero extent");
    let engine = Reconciler::new();
    let context = Context::new();
    let host = Host::new(ContainerKind::List, Orientation::Vertical, &context);
    let mut state = ViewportState::empty();
    let mut pool = CellPool::with_capacity(8);
    let mut created = 0usize;
    let mut factory = |_: &u32| -> Result<Label, CellError> {
        created += 1;
        Ok(Label {
            text: String::new(),
        })
    };

    for (step, offset) in [0u64, 240, 4_800, 4_810, 239_000].into_iter().enumerate() {
        let range = axis::required_range(&rows, offset, 480, 2);
        let segments = [range];
        let update = if step == 0 {
            UpdateType::Init
        } else {
            UpdateType::Scroll
        };
        let plan = Plan::new(&items, &segments, update).with_total_extent(rows.total_extent());
        let report = engine
            .reconcile(&mut state, plan, &mut pool, &mut factory, &host)
            .expect("no pass is running");
        println!(
            "offset={offset} range={range} live={} rebound={} created={}",
            state.len(),
            report.rebound,
            report.created
        );
    }

    let (first, _, label) = state.iter().next().expect("viewport is not empty");
    println!("first live cell: index={first} text={:?}", label.text);
    println!("cells ever created: {created}");
}
