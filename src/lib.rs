// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod api;
pub mod budget;
pub mod categories;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod period;
pub mod recategorize;
pub mod utils;

pub use error::{Error, Result};
