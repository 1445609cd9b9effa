// Example: iterate the indexes of a range that still need work.
use cellview::{ExcludingRange, IndexRange};

fn main() {
    let mut todo = ExcludingRange::new(IndexRange::new(3, 7));
    todo.exclude(5).exclude(7);
    let left: Vec<usize> = todo.iter().collect();
    println!("remaining={} indexes={left:?}", todo.remaining());

    let mut it = todo.iter();
    while let Ok(i) = it.next_index() {
        println!("visit {i}");
    }
    println!("exhausted: {:?}", it.next_index());
}
