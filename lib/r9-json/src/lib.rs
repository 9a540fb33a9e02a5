/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

mod map;
mod value;

pub use map::{get_optional_bool, get_optional_str, get_required, get_required_str};
pub use value::{as_bool, as_str};
