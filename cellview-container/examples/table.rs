// Example: a user table with one cell type per column.
use cellview::{Cell, CellError, ColumnRef, ColumnsLayoutMode, Rect, ScrollPosition, TableCell};
use cellview_container::{TableContainer, TableOptions};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct User {
    id: u32,
    name: String,
}

struct Field {
    text: String,
    at: Option<(usize, ColumnRef)>,
    render: fn(&User) -> String,
}

impl Cell<User> for Field {
    fn bind(&mut self, item: &User) {
        self.text = (self.render)(item);
    }
}

impl TableCell<User> for Field {
    fn set_position(&mut self, row: usize, column: ColumnRef) {
        self.at = Some((row, column));
    }
}

fn column(render: fn(&User) -> String) -> impl FnMut(&User) -> Result<Field, CellError> {
    move |_| {
        Ok(Field {
            text: String::new(),
            at: None,
            render,
        })
    }
}

fn main() {
    let options = TableOptions::new(24, 120)
        .with_layout_mode(ColumnsLayoutMode::Variable)
        .with_viewport(Rect::new(300, 200));
    let mut table = TableContainer::new(options).expect("valid options");
    let id = table.add_column(column(|u| u.id.to_string()));
    let name = table.add_column(column(|u| u.name.clone()));
    table.set_column_width(id, 60).expect("known column");
    table.set_column_width(name, 240).expect("known column");
    table.set_items(
        (0..10_000)
            .map(|id| User {
                id,
                name: format!("user {id}"),
            })
            .collect(),
    );

    table.scroll_to(ScrollPosition::new(0, 48_000));
    let state = table.current_state();
    println!("rows={} columns={} live={}", state.rows(), state.columns(), state.len());
    table.layout(|row, column, bounds, field| {
        if row % 5 == 0 {
            let (x, y) = (bounds.x, bounds.y);
            println!("{row}/{} at ({x}, {y}): {} {:?}", column.index, field.text, field.at);
        }
    });
}
