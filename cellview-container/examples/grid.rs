// Example: a photo grid scrolling on both axes.
use cellview::{Cell, CellError, GridCell, Rect, ScrollPosition};
use cellview_container::{GridContainer, GridOptions};

#[derive(Default)]
struct Thumb {
    item: u32,
    at: (usize, usize),
}

impl Cell<u32> for Thumb {
    fn bind(&mut self, item: &u32) {
        self.item = *item;
    }
}

impl GridCell<u32> for Thumb {
    fn set_coordinates(&mut self, row: usize, column: usize) {
        self.at = (row, column);
    }
}

fn main() {
    let options = GridOptions::new(12, Rect::new(96, 96))
        .with_spacing(4, 4)
        .with_viewport(Rect::new(500, 300));
    let mut grid = GridContainer::new(options).expect("valid options");
    grid.set_cell_factory(|_: &u32| -> Result<Thumb, CellError> { Ok(Thumb::default()) });
    grid.set_items((0..600).collect());

    let (w, h) = grid.content_size();
    println!("content={w}x{h} rows={} live={}", grid.rows(), grid.current_state().len());

    let pos = grid.scroll_to(ScrollPosition::new(400, 2_000));
    println!("scrolled to {pos:?}, segments={:?}", grid.current_state().segments());
    for (index, item, thumb) in grid.current_state().iter().take(3) {
        println!("#{index} item={item} at={:?} bound={}", thumb.at, thumb.item);
    }
}
