/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

pub mod attributes;
pub mod name;
pub mod net;
pub mod status;
