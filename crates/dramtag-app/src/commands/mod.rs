// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers. Each returns a serializable report; `dispatch` prints it
// as JSON or as a short human summary.

pub mod batch;
pub mod label;
pub mod lookup;

use dramtag_core::error::Result;
use dramtag_core::types::ManualFields;
use serde::Serialize;
use tracing::info;

use crate::cli::Commands;
use crate::services::context::AppContext;

pub async fn dispatch(ctx: &AppContext, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Resolve { id } => {
            let record = lookup::resolve(ctx, id).await;
            if json {
                print_json(&record)?;
            } else {
                println!("{} ({})", record.name, record.category);
                if let Some(strength) = &record.strength {
                    println!("  ABV: {strength}");
                }
                if let Some(age) = &record.age {
                    println!("  Age: {age}");
                }
                println!("  Source: {} [{}]", record.source_url, record.provenance.as_str());
            }
        }

        Commands::Label { id, render, output } => {
            let report = label::label(ctx, id, &render, output).await?;
            emit_label(&report, json)?;
        }

        Commands::Manual { fields, render, output } => {
            let report = label::manual(ctx, &ManualFields::from(fields), &render, output).await?;
            emit_label(&report, json)?;
        }

        Commands::Batch { ids, workers, render, output } => {
            let report = batch::batch(ctx, &ids, workers, &render, &output).await?;
            if json {
                print_json(&report)?;
            } else {
                println!(
                    "{} of {} labels written to {}",
                    report.manifest.succeeded(),
                    report.manifest.items.len(),
                    report.path.display()
                );
                for item in report.manifest.items.iter().filter(|i| i.error.is_some()) {
                    println!("  {} failed: {}", item.id, item.error.as_deref().unwrap_or_default());
                }
            }
        }

        Commands::Profiles => {
            let profiles = lookup::profiles();
            if json {
                print_json(&profiles)?;
            } else {
                for profile in profiles {
                    let presets: Vec<&str> = profile.presets.iter().map(|p| p.name).collect();
                    println!(
                        "{:<10} {:>4} dpi  presets: {:<28} {}",
                        profile.name,
                        profile.dpi,
                        presets.join(", "),
                        profile.description
                    );
                }
            }
        }

        Commands::Config { save } => {
            if save {
                ctx.config.persist(&ctx.data_dir)?;
                info!(path = %ctx.data_dir.display(), "configuration saved");
            }
            print_json(&ctx.config)?;
        }

        Commands::Qr { id, size, ec, output } => {
            let report = lookup::qr(ctx, id, size, ec.into(), output)?;
            if json {
                print_json(&report)?;
            } else {
                println!("{} -> {}", report.payload, report.path.display());
            }
        }
    }
    Ok(())
}

fn emit_label(report: &label::LabelReport, json: bool) -> Result<()> {
    if json {
        print_json(report)
    } else {
        println!(
            "{} [{}] -> {} ({}x{} px)",
            report.record.name,
            report.record.provenance.as_str(),
            report.path.display(),
            report.geometry.width_px,
            report.geometry.height_px
        );
        Ok(())
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
