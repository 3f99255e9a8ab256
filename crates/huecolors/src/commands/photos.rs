//! Photo library command handlers.

use std::path::PathBuf;

use tabled::Tabled;

use huecolors_core::HueSession;

use crate::cli::{GlobalOpts, PhotosArgs, PhotosCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PhotoRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&PathBuf> for PhotoRow {
    fn from(p: &PathBuf) -> Self {
        Self {
            name: p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: p.display().to_string(),
        }
    }
}

pub fn handle(session: &HueSession, args: PhotosArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PhotosCommand::List => {
            let photos = session.load_images()?;
            if photos.is_empty() && !global.quiet {
                eprintln!(
                    "No photos in {}. Add one with `huecolors photos import <file>`.",
                    session.library().dir().display()
                );
            }
            let out = output::render_list(
                global.output_format(),
                &photos,
                |p| PhotoRow::from(p),
                |p| p.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PhotosCommand::Import { path } => {
            let saved = session.import_photo(&path)?;
            output::print_output(&saved.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
