// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

//! Facade over the cuebox sub-crates.
//!
//! The core domain model is re-exported at the crate root. Backend and
//! frontend components are selected via the corresponding feature
//! flags.

pub use cuebox_core::*;

#[cfg(feature = "repo")]
pub use cuebox_repo as repo;

#[cfg(feature = "sqlite")]
pub use cuebox_repo_sqlite as repo_sqlite;

#[cfg(feature = "sqlite")]
pub use cuebox_usecases_sqlite as usecases_sqlite;

#[cfg(feature = "client")]
pub use cuebox_client as client;
