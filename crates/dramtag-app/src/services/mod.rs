// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: config, data directory and the shared resolver and renderer
// used by every command.

pub mod context;
pub mod data_dir;
