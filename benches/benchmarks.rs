use robosnake::config::Config;
use robosnake::gameplay::Food;
use robosnake::gameplay::Snake;
use robosnake::gameplay::State;
use robosnake::grid::Direction;
use robosnake::grid::Point;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        advancing_a_busy_arena,
        serializing_a_snapshot,
}

/// a full 50x50 arena: eight long snakes, food, and pending spawns
fn busy() -> (Config, State, BTreeMap<String, Direction>, BTreeSet<String>) {
    let config = Config::default();
    let mut state = State::new(&config, 7, 1000);
    for i in 0..8 {
        let y = i as i32 * 6 + 1;
        let body = (0..12).map(|x| Point::new(x, y)).rev().collect::<Vec<_>>();
        state.snakes.push(Snake {
            id: format!("p{}", i),
            color: "#FF0000".to_string(),
            body,
            direction: Direction::Right,
            score: 0,
            effects: Vec::new(),
        });
    }
    for x in 0..3 {
        state.food.push(Food {
            position: Point::new(20 + x, 40),
            value: 1,
        });
    }
    let connected = (0..8).map(|i| format!("p{}", i)).collect::<BTreeSet<_>>();
    let inputs = (0..8)
        .map(|i| (format!("p{}", i), Direction::Right))
        .collect::<BTreeMap<_, _>>();
    (config, state, inputs, connected)
}

fn advancing_a_busy_arena(c: &mut criterion::Criterion) {
    let (config, state, inputs, connected) = busy();
    c.bench_function("advance a busy 50x50 arena one tick", |b| {
        b.iter(|| state.advance(&config, &inputs, 1100, &connected))
    });
}

fn serializing_a_snapshot(c: &mut criterion::Criterion) {
    let (config, state, inputs, connected) = busy();
    let state = state.advance(&config, &inputs, 1100, &connected);
    c.bench_function("serialize a state-sync snapshot", |b| {
        b.iter(|| serde_json::to_string(&robosnake::dto::ServerMessage::StateSync(&state)))
    });
}
