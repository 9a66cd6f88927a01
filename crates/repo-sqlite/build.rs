// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

fn main() {
    // Update embedded migrations after the SQL files included by `embed_migrations!()` changed.
    println!("cargo:rerun-if-changed=migrations");
}
