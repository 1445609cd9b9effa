// Example: a vertical list with per-item heights, scrolled and laid out.
use cellview::{Cell, CellError, Rect};
use cellview_container::{ListContainer, ListOptions};

struct Row {
    text: String,
}

impl Cell<String> for Row {
    fn bind(&mut self, item: &String) {
        self.text.clone_from(item);
    }
}

fn main() {
    let options = ListOptions::<String>::with_sizes(|i, _| if i % 10 == 0 { 48 } else { 24 })
        .with_spacing(2)
        .with_viewport(Rect::new(320, 240));
    let mut list = ListContainer::new(options).expect("valid options");
    list.set_cell_factory(|_: &String| -> Result<Row, CellError> {
        Ok(Row {
            text: String::new(),
        })
    });
    list.set_items((0..1_000).map(|i| format!("message {i}")).collect());
    println!(
        "total_extent={} live={}",
        list.total_extent(),
        list.current_state().len()
    );

    list.scroll_to_index(500);
    println!(
        "offset={} range={} created={}",
        list.scroll_offset(),
        list.current_state().range(),
        list.last_report().created
    );

    list.batch_update(|l| {
        l.insert_items(0, ["pinned".to_string()]);
        l.remove_items(999, 2);
    });
    println!(
        "after batch: len={} update={:?}",
        list.len(),
        list.current_state().update_type()
    );

    list.layout(|index, bounds, row| {
        if index % 5 == 0 {
            println!("#{index} at y={} h={} {:?}", bounds.y, bounds.height, row.text);
        }
    });
}
