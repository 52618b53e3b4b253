// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing logging output
//!
//! The aim of this module is to provide commonly-used functions that enable the
//! testing of the output that should appear from logging macros.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use crate::tracker::{EntityManager, TextTracker};
use crate::{Id, Track, Tracker};

/// A tracker that keeps track events in memory.
pub struct TestTracker {
    events: RefCell<Vec<String>>,
    unique_id: Cell<u64>,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            unique_id: Cell::new(initial_id),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        self.events.borrow_mut().push(event);
    }

    /// Return a copy of all events seen since creation or the last clear.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let id = self.unique_id.get();
        self.unique_id.set(id + 1);
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {}

    fn create(&self, created_by: Id, id: Id, name: &str) {
        self.add_event(format!("{created_by}: created {id}, {name}"));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.add_event(format!("{destroyed_by}: destroyed {id}"));
    }

    fn value(&self, id: Id, value: f64) {
        self.add_event(format!("{id}: value {value}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: fmt::Arguments) {
        self.add_event(format!("{id}:{level}: {msg}"));
    }

    fn shutdown(&self) {}
}

/// Create a [`TestTracker`] and the same object as a [`Tracker`].
///
/// # Examples
///
/// ```
/// use minsim_track::test_helpers;
///
/// let (test_tracker, tracker) = minsim_track::test_init!(10);
/// let _top = minsim_track::entity::toplevel(&tracker, "top");
/// test_helpers::check_and_clear(&test_tracker, &["0: created 10, top"]);
/// ```
#[macro_export]
macro_rules! test_init {
    ($start_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($start_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Check and clear the _trace_ and _log_ output
///
/// Asserts that the events seen since the start or the last call match the
/// `expected` regular expressions, one per event, and then clears them.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut events = tracker.events.borrow_mut();

    println!("Checking {:?} matches {:?}", expected, *events);
    assert_eq!(expected.len(), events.len());

    for (log_expect, actual) in expected.iter().zip(events.iter()) {
        let re = Regex::new(log_expect).unwrap();
        assert!(re.is_match(actual), "{actual:?} does not match {log_expect:?}");
    }

    events.clear();
}

/// Create a tracker for a test.
///
/// Logging is written to stdout (which the test harness captures) at the
/// level given by the `MINSIM_TEST_LEVEL` environment variable, which defaults
/// to `Warn`. The `full_filepath` is the name of the calling test file and is
/// used as a default entity filter when `MINSIM_TEST_FILTER` is set to `file`.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    let level = std::env::var("MINSIM_TEST_LEVEL")
        .ok()
        .and_then(|lvl| crate::str_to_level(&lvl))
        .unwrap_or(log::Level::Warn);

    let mut entity_manager = EntityManager::new(level);
    if let Ok(filter) = std::env::var("MINSIM_TEST_FILTER") {
        let filter = if filter == "file" {
            file_stem(full_filepath).to_string()
        } else {
            filter
        };
        // An invalid filter only affects the verbosity of the test output
        let _ = entity_manager.add_entity_level_filter(&filter, log::Level::Trace);
    }
    let writer = Box::new(std::io::stdout());
    Rc::new(TextTracker::new(entity_manager, writer))
}

fn file_stem(full_filepath: &str) -> &str {
    let name = full_filepath.rsplit('/').next().unwrap_or(full_filepath);
    name.strip_suffix(".rs").unwrap_or(name)
}

#[test]
fn file_stem_strips_path_and_extension() {
    assert_eq!(file_stem("minsim-network/tests/routing.rs"), "routing");
    assert_eq!(file_stem("routing"), "routing");
}
