// Example: page through a list; pixel scrolling is rejected.
use cellview::{Cell, CellError, Rect};
use cellview_container::{ListOptions, PaginatedList};

struct Card(u32);

impl Cell<u32> for Card {
    fn bind(&mut self, item: &u32) {
        self.0 = *item;
    }
}

fn main() {
    let options = ListOptions::new(64).with_viewport(Rect::new(400, 640));
    let mut pages = PaginatedList::new(options, 10).expect("valid options");
    pages.set_cell_factory(|_: &u32| -> Result<Card, CellError> { Ok(Card(0)) });
    pages.set_items((0..95).collect());

    for page in [2, 3, 99] {
        let now = pages.go_to_page(page);
        println!(
            "go_to_page({page}) -> page {now}/{} offset={} range={}",
            pages.max_page(),
            pages.scroll_offset(),
            pages.current_state().range()
        );
    }
    println!("scroll_by(10) -> {:?}", pages.scroll_by(10));
    println!("scroll_to_index(42) -> page {}", pages.scroll_to_index(42));
}
