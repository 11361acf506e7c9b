// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod store;

pub use store::{MockStore, RecordedRequest, StoreChart};

use serde_json::{Map, Value};

pub const DEMO_CHART: &str = "chores";
pub const DEMO_DAYS: usize = 30;

const DEMO_COLUMNS: [&str; 5] = ["Dishes", "Trash", "Laundry", "Homework", "Reading"];
const EXTRA_CHARTS: [&str; 3] = ["garden", "workouts", "practice"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Produces sticker charts: one row per day, each column a chore whose cell
/// holds `true` (sticker), `false` (missed) or `null` (not yet marked).
#[derive(Debug, Clone)]
pub struct StickerFaker {
    rng: DeterministicRng,
}

impl StickerFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
        }
    }

    pub fn mark(&mut self) -> Value {
        match self.rng.int_n(3) {
            0 => Value::Bool(true),
            1 => Value::Bool(false),
            _ => Value::Null,
        }
    }

    pub fn chart(&mut self, name: &str, columns: &[&str], days: usize) -> StoreChart {
        let rows = (0..days)
            .map(|_| {
                columns
                    .iter()
                    .map(|column| ((*column).to_owned(), self.mark()))
                    .collect::<Map<String, Value>>()
            })
            .collect();
        StoreChart {
            name: name.to_owned(),
            columns: columns.iter().map(|column| (*column).to_owned()).collect(),
            rows,
        }
    }

    pub fn demo_charts(&mut self) -> Vec<StoreChart> {
        let mut charts = vec![self.chart(DEMO_CHART, &DEMO_COLUMNS, DEMO_DAYS)];
        for name in EXTRA_CHARTS {
            let take = 2 + self.rng.int_n(DEMO_COLUMNS.len() - 1);
            let columns = DEMO_COLUMNS.iter().take(take).copied().collect::<Vec<_>>();
            charts.push(self.chart(name, &columns, DEMO_DAYS));
        }
        charts
    }
}

/// JSON text for a `load_chart` body built from literal rows.
pub fn rows_payload(rows: &[&[(&str, Value)]]) -> String {
    let array = rows
        .iter()
        .map(|row| {
            Value::Object(
                row.iter()
                    .map(|(key, value)| ((*key).to_owned(), value.clone()))
                    .collect(),
            )
        })
        .collect::<Vec<_>>();
    Value::Array(array).to_string()
}
