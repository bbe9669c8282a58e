// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label profiles.
//
// A profile bundles everything the layout engine needs besides the record:
// preset sizes, DPI, font and spacing ratios, QR settings and colours. The
// table is built once per process and only read afterwards.

use std::sync::LazyLock;

use dramtag_core::error::{DramtagError, Result};
use dramtag_core::types::LabelSize;
use serde::Serialize;
use tracing::warn;

/// Name of the profile used when a requested one does not exist.
pub const DEFAULT_PROFILE: &str = "custom";

/// Name of the preset every profile carries.
pub const CUSTOM_PRESET: &str = "custom";

/// Size used when neither a preset nor explicit dimensions are available.
pub const DEFAULT_LABEL_SIZE: LabelSize = LabelSize::new(35.0, 37.0);

static REGISTRY: LazyLock<ProfileRegistry> = LazyLock::new(ProfileRegistry::builtin);

/// QR error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    pub fn to_qr(self) -> qrcode::EcLevel {
        match self {
            Self::L => qrcode::EcLevel::L,
            Self::M => qrcode::EcLevel::M,
            Self::Q => qrcode::EcLevel::Q,
            Self::H => qrcode::EcLevel::H,
        }
    }

    /// Parse `L`, `M`, `Q` or `H`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Self = Self([0xFF, 0xFF, 0xFF]);
    pub const BLACK: Self = Self([0x00, 0x00, 0x00]);
    pub const LIGHT_GREY: Self = Self([0xCC, 0xCC, 0xCC]);

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    pub fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb(self.0)
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Palette {
    pub background: Rgb,
    pub border: Rgb,
    pub text: Rgb,
}

/// Base font size is `min(w, h) / base_divisor`; the three roles scale it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontRatios {
    pub base_divisor: u32,
    pub large: f64,
    pub medium: f64,
    pub small: f64,
}

/// Where the top edge of the QR code sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeAnchor {
    /// `border + (h - 2*border) / ratio`.
    MarginRatio(u32),
    /// `border * n`.
    BorderMultiple(u32),
}

/// Spacing rules for the label body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spacing {
    pub min_border: u32,
    pub border_divisor: u32,
    pub code_size_ratio: f64,
    pub code_anchor: CodeAnchor,
    /// Gap between code and first text line is `h / text_gap_divisor`.
    pub text_gap_divisor: u32,
    pub line_height_pad: u32,
    pub line_height_divisor: u32,
    /// Character budget is `width / (font / truncation_constant)`.
    pub truncation_constant: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub size: LabelSize,
}

/// One named label profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub dpi: u32,
    pub presets: Vec<Preset>,
    pub fonts: FontRatios,
    pub spacing: Spacing,
    pub code_error_correction: EcLevel,
    /// Quiet-zone width around the QR code, in modules.
    pub code_quiet_zone: u32,
    pub colors: Palette,
    /// Whether the free-text note line is printed.
    pub show_note: bool,
}

impl ProfileConfig {
    /// Size of `name`, or of the `custom` preset for unknown names.
    pub fn preset_or_custom(&self, name: &str) -> LabelSize {
        self.preset(name)
            .or_else(|| {
                warn!(profile = self.name, preset = name, "unknown preset, using custom");
                self.preset(CUSTOM_PRESET)
            })
            .unwrap_or(DEFAULT_LABEL_SIZE)
    }

    pub fn preset(&self, name: &str) -> Option<LabelSize> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .map(|p| p.size)
    }

    /// The `custom` preset size.
    pub fn default_size(&self) -> LabelSize {
        self.preset(CUSTOM_PRESET).unwrap_or(DEFAULT_LABEL_SIZE)
    }
}

/// Process-wide table of built-in profiles.
#[derive(Debug)]
pub struct ProfileRegistry {
    profiles: [ProfileConfig; 3],
}

impl ProfileRegistry {
    fn builtin() -> Self {
        let generic_fonts = FontRatios {
            base_divisor: 16,
            large: 1.5,
            medium: 1.2,
            small: 0.9,
        };
        let generic_spacing = Spacing {
            min_border: 1,
            border_divisor: 200,
            code_size_ratio: 0.4,
            code_anchor: CodeAnchor::MarginRatio(20),
            text_gap_divisor: 40,
            line_height_pad: 1,
            line_height_divisor: 15,
            truncation_constant: 2,
        };
        let generic_colors = Palette {
            background: Rgb::WHITE,
            border: Rgb::LIGHT_GREY,
            text: Rgb::BLACK,
        };
        let generic_presets = vec![Preset {
            name: CUSTOM_PRESET,
            size: DEFAULT_LABEL_SIZE,
        }];

        let custom = ProfileConfig {
            name: DEFAULT_PROFILE,
            description: "Screen preview at 72 dpi",
            dpi: 72,
            presets: generic_presets.clone(),
            fonts: generic_fonts,
            spacing: generic_spacing,
            code_error_correction: EcLevel::L,
            code_quiet_zone: 4,
            colors: generic_colors,
            show_note: true,
        };

        let print = ProfileConfig {
            name: "print",
            description: "Same layout as custom, rendered at 300 dpi for printing",
            dpi: 300,
            presets: generic_presets,
            ..custom.clone()
        };

        let ql820nwb = ProfileConfig {
            name: "ql820nwb",
            description: "Brother QL-820NWB thermal printer, 300 dpi, black on white",
            dpi: 300,
            presets: vec![
                Preset {
                    name: "small",
                    size: LabelSize::new(29.0, 37.0),
                },
                Preset {
                    name: "medium",
                    size: LabelSize::new(38.0, 50.0),
                },
                Preset {
                    name: "large",
                    size: LabelSize::new(62.0, 75.0),
                },
                Preset {
                    name: CUSTOM_PRESET,
                    size: DEFAULT_LABEL_SIZE,
                },
            ],
            fonts: FontRatios {
                base_divisor: 20,
                large: 1.5,
                medium: 1.2,
                small: 0.8,
            },
            spacing: Spacing {
                min_border: 2,
                border_divisor: 150,
                code_size_ratio: 0.4,
                code_anchor: CodeAnchor::BorderMultiple(2),
                text_gap_divisor: 25,
                line_height_pad: 2,
                line_height_divisor: 12,
                truncation_constant: 3,
            },
            code_error_correction: EcLevel::M,
            code_quiet_zone: 2,
            colors: Palette {
                background: Rgb::WHITE,
                border: Rgb::BLACK,
                text: Rgb::BLACK,
            },
            show_note: false,
        };

        Self {
            profiles: [custom, print, ql820nwb],
        }
    }

    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// Every built-in profile, `custom` first.
    pub fn list() -> &'static [ProfileConfig] {
        &Self::global().profiles
    }

    /// Exact lookup by name (case-insensitive).
    pub fn get(name: &str) -> Result<&'static ProfileConfig> {
        Self::list()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| DramtagError::ProfileNotFound(name.to_owned()))
    }

    /// Lookup that falls back to the `custom` profile with a warning.
    pub fn resolve(name: &str) -> &'static ProfileConfig {
        match Self::get(name) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, fallback = DEFAULT_PROFILE, "using default profile");
                Self::default_profile()
            }
        }
    }

    pub fn default_profile() -> &'static ProfileConfig {
        &Self::global().profiles[0]
    }
}
