//! Palette command handlers.

use serde::Serialize;
use tabled::Tabled;

use huecolors_core::{HueSession, PaletteOutcome, Rgb, Swatch, assign_swatches};

use crate::cli::{GlobalOpts, PaletteArgs, PaletteCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SwatchRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Population")]
    population: u32,
    #[tabled(rename = "Share")]
    share: String,
}

/// One light and the color it gets.
#[derive(Debug, Serialize)]
struct Assignment {
    light: String,
    id: String,
    color: Rgb,
}

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "Light")]
    light: String,
    #[tabled(rename = "Color")]
    color: String,
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn share(population: u32, total: u64) -> String {
    if total == 0 {
        return "-".into();
    }
    format!("{:.1}%", f64::from(population) * 100.0 / total as f64)
}

fn outcome_detail(o: &PaletteOutcome) -> String {
    let mut line = format!("Applied {} swatches to {} light(s)", o.swatches, o.applied);
    if o.failed > 0 {
        line.push_str(&format!(", {} failed", o.failed));
    }
    line
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &HueSession,
    args: PaletteArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let colored = global.colored();

    match args.command {
        PaletteCommand::Extract { image, colors } => {
            let swatches = session.palette_from_file(&image, colors)?;
            let total: u64 = swatches.iter().map(|s| u64::from(s.population)).sum();
            let ranked: Vec<(usize, Swatch)> = swatches.into_iter().enumerate().collect();

            let out = output::render_list(
                global.output_format(),
                &ranked,
                |(i, s)| SwatchRow {
                    rank: i + 1,
                    color: output::swatch(s.color, colored),
                    population: s.population,
                    share: share(s.population, total),
                },
                |(_, s)| s.color.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PaletteCommand::Apply {
            image,
            colors,
            dry_run,
        } => {
            let swatches = session.palette_from_file(&image, colors)?;
            if swatches.is_empty() {
                return Err(CliError::Validation {
                    field: "image".into(),
                    reason: format!("no colors found in {}", image.display()),
                });
            }

            let lights = session.cache().hue_lights()?;
            let plan: Vec<Assignment> = assign_swatches(&lights, &swatches)
                .into_iter()
                .map(|(light, color)| Assignment {
                    light: light.label.clone(),
                    id: light.id.clone(),
                    color,
                })
                .collect();

            if dry_run {
                let out = output::render_list(
                    global.output_format(),
                    &plan,
                    |a| AssignmentRow {
                        light: a.light.clone(),
                        color: output::swatch(a.color, colored),
                    },
                    |a| format!("{} {}", a.id, a.color),
                )?;
                output::print_output(&out, global.quiet);
                return Ok(());
            }

            let outcome = session.apply_palette(&swatches).await?;
            let out = output::render_single(
                global.output_format(),
                &outcome,
                outcome_detail,
                |o| o.applied.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_of_total() {
        assert_eq!(share(1, 4), "25.0%");
        assert_eq!(share(3, 0), "-");
    }

    #[test]
    fn outcome_mentions_failures_only_when_present() {
        let ok = PaletteOutcome {
            swatches: 3,
            applied: 4,
            failed: 0,
        };
        assert_eq!(outcome_detail(&ok), "Applied 3 swatches to 4 light(s)");

        let partial = PaletteOutcome { failed: 1, ..ok };
        assert!(outcome_detail(&partial).ends_with("1 failed"));
    }
}
