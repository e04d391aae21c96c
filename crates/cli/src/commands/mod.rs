// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Volley Authors

//! CLI command implementations

pub mod batch;
pub mod each;
pub mod run;
