//! Light command handlers.

use tabled::Tabled;

use huecolors_core::{HueSession, LightInfo};

use crate::cli::{GlobalOpts, LightsArgs, LightsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Legacy ID")]
    v1_id: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl LightRow {
    fn new(l: &LightInfo, colored: bool) -> Self {
        Self {
            label: l.label.clone(),
            power: output::power(l.power, colored),
            brightness: format!("{:.0}%", l.brightness),
            color: match (l.is_hue, l.color) {
                (false, _) => "white only".into(),
                (true, Some(color)) => output::swatch(color, colored),
                (true, None) => "-".into(),
            },
            v1_id: l.v1_id.clone(),
            id: l.id.clone(),
        }
    }
}

fn detail(l: &LightInfo, colored: bool) -> String {
    [
        format!("Label:      {}", l.label),
        format!("ID:         {}", l.id),
        format!("Legacy ID:  {}", l.v1_id),
        format!("Power:      {}", output::power(l.power, colored)),
        format!("Brightness: {:.0}%", l.brightness),
        format!(
            "Color:      {}",
            l.color
                .map_or_else(|| "-".into(), |c| output::swatch(c, colored))
        ),
    ]
    .join("\n")
}

fn print_light(light: &LightInfo, global: &GlobalOpts) -> Result<(), CliError> {
    let colored = global.colored();
    let out = output::render_single(
        global.output_format(),
        light,
        |l| detail(l, colored),
        |l| l.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &HueSession,
    args: LightsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LightsCommand::List { cached } => {
            let lights = if cached {
                session.cache().lights()?
            } else {
                session.load_lights().await?
            };
            if lights.is_empty() && !global.quiet {
                eprintln!(
                    "No lights cached. Run `huecolors lights list` with an authorized bridge."
                );
            }
            let colored = global.colored();
            let out = output::render_list(
                global.output_format(),
                &lights,
                |l| LightRow::new(l, colored),
                |l| l.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LightsCommand::On { light } => toggle(session, &light, true, global).await,

        LightsCommand::Off { light } => toggle(session, &light, false, global).await,

        LightsCommand::Brightness { light, percent } => {
            let target = util::resolve_light(session, &light)?;
            let updated = session
                .set_brightness(&target.id, f32::from(percent))
                .await?;
            if !updated.power && !global.quiet {
                eprintln!("{} is off; brightness saved locally only", updated.label);
            }
            print_light(&updated, global)
        }

        LightsCommand::Identify { light } => {
            // Unknown keys fall through as device legacy ids.
            let key = util::find_light(session, &light)?.map_or(light, |l| l.id);
            session.identify_light(&key).await?;
            if !global.quiet {
                eprintln!("Identify sent");
            }
            Ok(())
        }

        LightsCommand::Clear => {
            if !util::confirm("Forget all cached lights?", global.yes)? {
                return Ok(());
            }
            let removed = session.clear_lights()?;
            if !global.quiet {
                eprintln!("Removed {removed} cached light(s)");
            }
            Ok(())
        }
    }
}

async fn toggle(
    session: &HueSession,
    identifier: &str,
    power: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = util::resolve_light(session, identifier)?;
    let refreshed = session.toggle_light(&target.id, power).await?;
    let updated = refreshed.unwrap_or(LightInfo { power, ..target });
    print_light(&updated, global)
}
