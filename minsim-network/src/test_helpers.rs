// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use minsim_track::entity::{Entity, toplevel};
use minsim_track::test_helpers::create_tracker;

#[must_use]
pub fn start_test(full_filepath: &str) -> Rc<Entity> {
    toplevel(&create_tracker(full_filepath), "top")
}
