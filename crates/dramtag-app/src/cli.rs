// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dramtag_core::error::{DramtagError, Result};
use dramtag_core::types::{LabelSize, ManualFields};
use dramtag_render::SizeRequest;
use dramtag_render::profile::{DEFAULT_PROFILE, EcLevel};
use dramtag_render::qr::MAX_CODE_PX;

#[derive(Parser, Debug)]
#[command(name = "dramtag", version, about = "Whisky label generator")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,

    #[arg(long, global = true, env = "DRAMTAG_CONFIG", help = "Path to a config.json")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Skip upstream sources, use the fallback catalogue")]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve bottle metadata for an id.
    Resolve { id: i64 },

    /// Resolve an id and render its label.
    Label {
        id: i64,
        #[command(flatten)]
        render: RenderArgs,
        #[arg(short, long, help = "Output PNG path (default label_<id>.png)")]
        output: Option<PathBuf>,
    },

    /// Render a label from details typed in by hand.
    Manual {
        #[command(flatten)]
        fields: ManualArgs,
        #[command(flatten)]
        render: RenderArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve and render many ids into one tar archive.
    Batch {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
        #[arg(long, help = "Concurrent items (default from config)")]
        workers: Option<usize>,
        #[command(flatten)]
        render: RenderArgs,
        #[arg(short, long, default_value = "dramtag_labels.tar")]
        output: PathBuf,
    },

    /// List the built-in label profiles.
    Profiles,

    /// Show the effective configuration.
    Config {
        #[arg(long, help = "Write it to config.json in the data directory")]
        save: bool,
    },

    /// Render only the QR code for an id's detail page.
    Qr {
        id: i64,
        #[arg(
            long,
            default_value_t = 300,
            value_parser = clap::value_parser!(u32).range(1..=MAX_CODE_PX as i64)
        )]
        size: u32,
        #[arg(long, value_enum, default_value_t = QrLevel::L)]
        ec: QrLevel,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Profile, size and resolution of a rendered label.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    #[arg(long, conflicts_with_all = ["width_mm", "height_mm"], help = "Named size preset")]
    pub preset: Option<String>,

    #[arg(long, requires = "height_mm")]
    pub width_mm: Option<f64>,

    #[arg(long, requires = "width_mm")]
    pub height_mm: Option<f64>,

    #[arg(long, help = "Override the profile's DPI")]
    pub dpi: Option<u32>,
}

impl RenderArgs {
    pub fn size_request(&self) -> Result<Option<SizeRequest>> {
        match (&self.preset, self.width_mm, self.height_mm) {
            (Some(name), _, _) => Ok(Some(SizeRequest::Preset(name.clone()))),
            (None, Some(w), Some(h)) => {
                let size = LabelSize::new(w, h);
                size.validate()?;
                Ok(Some(SizeRequest::Custom(size)))
            }
            (None, None, None) => Ok(None),
            _ => Err(DramtagError::Validation(
                "--width-mm and --height-mm must be given together".into(),
            )),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ManualArgs {
    #[arg(long)]
    pub id: Option<i64>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, help = "Distillery or brand")]
    pub category: Option<String>,
    #[arg(long, help = "ABV, e.g. 46%")]
    pub strength: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
}

impl From<ManualArgs> for ManualFields {
    fn from(args: ManualArgs) -> Self {
        Self {
            id: args.id,
            name: args.name,
            category: args.category,
            strength: args.strength,
            age: args.age,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QrLevel {
    L,
    M,
    Q,
    H,
}

impl From<QrLevel> for EcLevel {
    fn from(level: QrLevel) -> Self {
        match level {
            QrLevel::L => EcLevel::L,
            QrLevel::M => EcLevel::M,
            QrLevel::Q => EcLevel::Q,
            QrLevel::H => EcLevel::H,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_with_preset_parses() {
        let cli = Cli::try_parse_from([
            "dramtag", "label", "12345", "--profile", "ql820nwb", "--preset", "large", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Label { id, render, output } = cli.command else {
            panic!("expected label");
        };
        assert_eq!(id, 12345);
        assert!(output.is_none());
        assert_eq!(render.profile, "ql820nwb");
        assert_eq!(render.size_request().unwrap(), Some(SizeRequest::Preset("large".into())));
    }

    #[test]
    fn explicit_size_needs_both_dimensions() {
        assert!(Cli::try_parse_from(["dramtag", "label", "1", "--width-mm", "35"]).is_err());
        assert!(
            Cli::try_parse_from(["dramtag", "label", "1", "--preset", "small", "--width-mm", "3"])
                .is_err()
        );

        let cli = Cli::try_parse_from([
            "dramtag", "label", "1", "--width-mm", "35", "--height-mm", "37",
        ])
        .unwrap();
        let Commands::Label { render, .. } = cli.command else {
            panic!("expected label");
        };
        assert_eq!(
            render.size_request().unwrap(),
            Some(SizeRequest::Custom(LabelSize::new(35.0, 37.0)))
        );
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let args = RenderArgs {
            profile: "custom".into(),
            preset: None,
            width_mm: Some(-1.0),
            height_mm: Some(37.0),
            dpi: None,
        };
        assert!(matches!(args.size_request(), Err(DramtagError::Validation(_))));
    }

    #[test]
    fn batch_requires_ids() {
        assert!(Cli::try_parse_from(["dramtag", "batch"]).is_err());
        let args = ["dramtag", "batch", "1", "2", "3", "--workers", "2"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Commands::Batch { ids, workers, output, .. } = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(workers, Some(2));
        assert_eq!(output, PathBuf::from("dramtag_labels.tar"));
    }

    #[test]
    fn manual_fields_convert() {
        let cli = Cli::try_parse_from([
            "dramtag", "manual", "--name", "Talisker 10", "--category", "Talisker", "--strength",
            "45.8%",
        ])
        .unwrap();
        let Commands::Manual { fields, .. } = cli.command else {
            panic!("expected manual");
        };
        let fields = ManualFields::from(fields);
        assert!(fields.is_complete());
        assert_eq!(fields.id, None);
    }

    #[test]
    fn qr_defaults() {
        let cli = Cli::try_parse_from(["dramtag", "qr", "7"]).unwrap();
        let Commands::Qr { size, ec, .. } = cli.command else {
            panic!("expected qr");
        };
        assert_eq!(size, 300);
        assert_eq!(EcLevel::from(ec), EcLevel::L);
    }

    #[test]
    fn qr_size_is_bounded() {
        assert!(Cli::try_parse_from(["dramtag", "qr", "7", "--size", "0"]).is_err());
        assert!(Cli::try_parse_from(["dramtag", "qr", "7", "--size", "10001"]).is_err());
        assert!(Cli::try_parse_from(["dramtag", "qr", "7", "--size", "4000000000"]).is_err());
        let cli = Cli::try_parse_from(["dramtag", "qr", "7", "--size", "10000"]).unwrap();
        let Commands::Qr { size, .. } = cli.command else {
            panic!("expected qr");
        };
        assert_eq!(size, MAX_CODE_PX);
    }
}
