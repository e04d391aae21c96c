// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn system_clock_epoch_is_plausible() {
    let clock = SystemClock;
    // After 2020, before 2100
    assert!(clock.epoch_ms() > 1_577_000_000_000);
    assert!(clock.epoch_ms() < 4_100_000_000_000);
}

#[test]
fn manual_clock_stands_still() {
    let clock = ManualClock::new();
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(2));
    assert_eq!(clock.now(), t1);
}

#[test]
fn manual_clock_advance_moves_both_views() {
    let clock = ManualClock::starting_at(5_000);
    let t1 = clock.now();
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.now().duration_since(t1), Duration::from_secs(60));
    assert_eq!(clock.epoch_ms(), 65_000);
}

#[test]
fn manual_clock_is_cloneable_and_shared() {
    let clock1 = ManualClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    let t2 = clock1.now();
    assert_eq!(t2.duration_since(t1), Duration::from_secs(30));
}
