// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// dramtag-render — Label profiles, layout geometry, QR codes, PNG rendering
// and batch archives.

pub mod archive;
pub mod font;
pub mod layout;
pub mod profile;
pub mod qr;
pub mod renderer;

pub use archive::{ItemStatus, LabelArchive, Manifest, ManifestEntry};
pub use font::LabelFont;
pub use layout::{LayoutEngine, RenderGeometry, RenderPlan, SizeRequest, TextLine};
pub use profile::{EcLevel, ProfileConfig, ProfileRegistry};
pub use renderer::LabelRenderer;
