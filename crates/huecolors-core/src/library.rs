// ── Photo library ──
//
// Photos used for palettes are kept as JPEGs in a single directory.
// Files are named `IMG_{unix_millis}.jpg`, so lexical order is capture
// order for everything the library wrote itself.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info};

use crate::error::CoreError;

const JPEG_QUALITY: u8 = 90;
const EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Clone)]
pub struct PhotoLibrary {
    dir: PathBuf,
}

impl PhotoLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encode `image` as JPEG and write it into the library.
    pub fn save(&self, image: &DynamicImage) -> Result<PathBuf, CoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.next_path();

        let file = BufWriter::new(File::create(&path)?);
        let encoder = JpegEncoder::new_with_quality(file, JPEG_QUALITY);
        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;

        info!(path = %path.display(), "photo saved");
        Ok(path)
    }

    /// Decode the image at `source` and save a copy into the library.
    pub fn import(&self, source: &Path) -> Result<PathBuf, CoreError> {
        debug!(source = %source.display(), "importing photo");
        let image = open_image(source)?;
        self.save(&image)
    }

    /// Saved photos, newest first. A missing directory is an empty library.
    pub fn list(&self) -> Result<Vec<PathBuf>, CoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut photos = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_image(&path) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            photos.push((modified, path));
        }

        // Newest first; equal timestamps fall back to name, which embeds
        // the capture time.
        photos.sort_by(|(ta, pa), (tb, pb)| tb.cmp(ta).then_with(|| pb.cmp(pa)));
        Ok(photos.into_iter().map(|(_, path)| path).collect())
    }

    fn next_path(&self) -> PathBuf {
        let mut millis = chrono::Utc::now().timestamp_millis();
        loop {
            let path = self.dir.join(format!("IMG_{millis}.jpg"));
            if !path.exists() {
                return path;
            }
            millis += 1;
        }
    }
}

/// Decode any supported image file.
pub fn open_image(path: &Path) -> Result<DynamicImage, CoreError> {
    Ok(image::open(path)?)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 40, 40])))
    }

    #[test]
    fn save_writes_named_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let library = PhotoLibrary::new(dir.path().join("palette"));

        let path = library.save(&sample()).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("IMG_") && name.ends_with(".jpg"), "{name}");
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn saves_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let library = PhotoLibrary::new(dir.path());

        let first = library.save(&sample()).unwrap();
        let second = library.save(&sample()).unwrap();

        assert_ne!(first, second);
        assert_eq!(library.list().unwrap().len(), 2);
    }

    #[test]
    fn import_reencodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.png");
        sample().save(&source).unwrap();

        let library = PhotoLibrary::new(dir.path().join("palette"));
        let saved = library.import(&source).unwrap();

        assert_eq!(saved.extension().unwrap(), "jpg");
        assert_eq!(library.list().unwrap(), vec![saved]);
    }

    #[test]
    fn list_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        let library = PhotoLibrary::new(dir.path());
        library.save(&sample()).unwrap();

        let photos = library.list().unwrap();
        assert_eq!(photos.len(), 1);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = PhotoLibrary::new(dir.path().join("nope"));
        assert!(library.list().unwrap().is_empty());
    }

    #[test]
    fn import_of_non_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.jpg");
        fs::write(&bogus, "not an image").unwrap();

        let library = PhotoLibrary::new(dir.path().join("palette"));
        assert!(matches!(library.import(&bogus), Err(CoreError::Image(_))));
    }
}
