//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

fn to_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("✓ Wrote {}", written.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = match global.output_format() {
                OutputFormat::Table | OutputFormat::Plain => {
                    let mut text = to_toml(&cfg);
                    text.push_str(&format!(
                        "\n# database = \"{}\"\n# photos = \"{}\"",
                        cfg.database_path().display(),
                        cfg.photos_dir().display()
                    ));
                    text
                }
                format => output::render_single(format, &cfg, to_toml, to_toml)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            cfg.set(&key, &value)?;
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} = {value:?}");
            }
            Ok(())
        }
    }
}
