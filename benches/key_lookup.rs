//! Benchmarks for key binding lookup
//!
//! Run with: cargo bench key_lookup

use brlkeys::alarm::AlarmQueue;
use brlkeys::config::Preferences;
use brlkeys::effects::Effects;
use brlkeys::host::RecordingLauncher;
use brlkeys::keytable::{find_binding, load_default_key_table, KeyEnv, KeyTable, KeyValue};
use brlkeys::queue::CommandQueue;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn table() -> KeyTable {
    load_default_key_table().unwrap()
}

// ============================================================================
// Subset search
// ============================================================================

#[divan::bench(args = [1, 2, 4, 6])]
fn find_binding_held_dots(bencher: divan::Bencher, held: u8) {
    let table = table();
    let context = table.context(0).unwrap();
    let mut modifiers: Vec<KeyValue> = (1..=held).map(|dot| KeyValue::new(0, dot)).collect();
    modifiers.push(KeyValue::new(0, 9));
    modifiers.sort_unstable();

    bencher.bench_local(|| divan::black_box(find_binding(context, &modifiers, None)));
}

#[divan::bench]
fn find_binding_wildcard_immediate(bencher: divan::Bencher) {
    let table = table();
    let context = table.context(0).unwrap();
    let modifiers = [KeyValue::new(0, 9)];

    bencher.bench_local(|| {
        divan::black_box(find_binding(context, &modifiers, Some(KeyValue::new(1, 17))))
    });
}

// ============================================================================
// Full key events
// ============================================================================

#[divan::bench]
fn chord_press_release(bencher: divan::Bencher) {
    let prefs = Preferences::default();
    let mut table = table();
    let mut alarms = AlarmQueue::new();
    let mut queue = CommandQueue::new();
    let mut effects = Effects::new();
    let mut host = RecordingLauncher::default();

    bencher.bench_local(|| {
        let mut env = KeyEnv {
            prefs: &prefs,
            alarms: &mut alarms,
            queue: &mut queue,
            effects: &mut effects,
            host: &mut host,
        };
        for (number, press) in [(9, true), (4, true), (4, false), (9, false)] {
            table.process_key_event(&mut env, 0, 0, number, press);
        }
        while queue.pop().is_some() {}
    });
}
