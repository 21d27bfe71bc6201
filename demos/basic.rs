use std::sync::Arc;

use event_algebra::{BinaryOp, ComparisonOperation, Event, NumericOperation, OperatorTree};

fn main() {
    let mut tree = OperatorTree::new();

    // Leaves: a warm reading and a humid reading
    let warm = tree
        .insert(ComparisonOperation::greater_than("celsius", 25_i64))
        .expect("failed to insert comparison");
    let humid = tree
        .insert(ComparisonOperation::greater_than("humidity", 70_i64))
        .expect("failed to insert comparison");
    let alert = tree
        .insert(BinaryOp::and(vec![warm, humid]))
        .expect("failed to insert combinator");

    // Convert the last warm reading to Fahrenheit
    let scaled = tree
        .insert(NumericOperation::multiply("celsius", warm, 1.8))
        .expect("failed to insert resolver");
    let fahrenheit = tree
        .insert(NumericOperation::add("celsius", scaled, 32_i64))
        .expect("failed to insert resolver");

    println!("{}", tree.render(alert));

    for (celsius, humidity) in [(22_i64, 80_i64), (30, 75), (31, 40)] {
        let event = Arc::new(
            Event::new()
                .set("celsius", celsius)
                .set("humidity", humidity),
        );
        match tree.apply(alert, &event) {
            Ok(true) => println!("{event}: alert"),
            Ok(false) => println!("{event}: no alert"),
            Err(err) => println!("{event}: {err}"),
        }
    }

    tree.apply_event(scaled, Event::new())
        .and_then(|_| tree.apply_event(fahrenheit, Event::new()))
        .expect("warm reading was matched above");
    if let Some(event) = tree.matching_event(fahrenheit) {
        println!("last warm reading in fahrenheit: {event}");
    }
}
