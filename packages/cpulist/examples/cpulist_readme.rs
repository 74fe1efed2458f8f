//! Example that demonstrates parsing and emitting processor lists.

fn main() {
    let selected_processors = cpulist::parse("0-9,32-35,40");
    assert_eq!(
        selected_processors,
        vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 32, 33, 34, 35, 40]
    );

    println!("Selected processors: {selected_processors:?}");
    println!("As cpulist: {}", cpulist::emit(selected_processors));

    // Damaged items are skipped rather than failing the whole list.
    let partial = cpulist::parse("1,foo,3-4");
    println!("Recovered from damaged list: {partial:?}");
}
