//! Writing rasters to disk and handing them to viewers
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{ImageFormat, Rgb, RgbImage};

use crate::error::{MdlError, MdlResult};
use crate::raster::Rasterizer;

/// Viewer launched by [`FileSink::display`] unless configured otherwise.
pub const DEFAULT_VIEWER: &str = "display";

/// Where finished pixel grids go.
///
/// The driver calls `save` and `display` when a script asks for them and
/// `frame_complete` once at the end of every frame.
pub trait ImageSink {
    /// Returns the file written, or `None` when the sink kept nothing on disk.
    fn save(&mut self, raster: &Rasterizer, path: &Path) -> MdlResult<Option<PathBuf>>;

    fn display(&mut self, raster: &Rasterizer) -> MdlResult<()>;

    fn frame_complete(&mut self, _frame: usize, _raster: &Rasterizer) -> MdlResult<()> {
        Ok(())
    }
}

/// Plain-text PPM (`P3`), topmost row first.
pub fn write_ppm<W: Write>(raster: &Rasterizer, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", raster.width(), raster.height())?;
    writeln!(out, "255")?;
    if raster.width() == 0 {
        return Ok(());
    }
    for row in raster.pixels().chunks(raster.width()) {
        let mut first = true;
        for color in row {
            if !first {
                write!(out, " ")?;
            }
            write!(out, "{color}")?;
            first = false;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Copy the pixel grid into an `image` buffer.
pub fn to_rgb_image(raster: &Rasterizer) -> RgbImage {
    let width = raster.width();
    let pixels = raster.pixels();
    RgbImage::from_fn(width as u32, raster.height() as u32, |x, y| {
        let color = pixels[y as usize * width + x as usize];
        Rgb([color.r, color.g, color.b])
    })
}

fn ensure_parent_dir(path: &Path) -> MdlResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// The file `save_image` writes for `path`: unchanged, or with `.png`
/// appended when there is no extension.
pub fn resolve_image_path(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.to_path_buf(),
        None => path.with_extension("png"),
    }
}

/// Save by extension: `.ppm` natively, a missing extension as `.png`,
/// everything else through the `image` encoders.
///
/// Returns the path actually written.
pub fn save_image(raster: &Rasterizer, path: &Path) -> MdlResult<PathBuf> {
    let path = resolve_image_path(path);
    ensure_parent_dir(&path)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if extension == "ppm" {
        let mut out = BufWriter::new(File::create(&path)?);
        write_ppm(raster, &mut out)?;
        out.flush()?;
    } else {
        let format = ImageFormat::from_extension(&extension)
            .ok_or_else(|| MdlError::UnsupportedFormat(extension.clone()))?;
        to_rgb_image(raster).save_with_format(&path, format)?;
    }
    Ok(path)
}

/// Writes files and shows `display` requests in an external viewer.
#[derive(Debug, Clone)]
pub struct FileSink {
    viewer: String,
    displays: usize,
}

impl FileSink {
    pub fn new() -> Self {
        Self::with_viewer(DEFAULT_VIEWER)
    }

    pub fn with_viewer(viewer: impl Into<String>) -> Self {
        Self {
            viewer: viewer.into(),
            displays: 0,
        }
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    fn temp_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!(
            "mdlr-{}-{}.ppm",
            std::process::id(),
            self.displays
        ))
    }

    fn run_viewer(&self, path: &Path) -> MdlResult<()> {
        let status = Command::new(&self.viewer)
            .arg(path)
            .stdin(Stdio::null())
            .status()
            .map_err(|err| {
                std::io::Error::new(
                    err.kind(),
                    format!("failed to launch viewer `{}`: {err}", self.viewer),
                )
            })?;
        if !status.success() {
            tracing::warn!(viewer = %self.viewer, %status, "viewer exited with failure");
        }
        Ok(())
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSink for FileSink {
    fn save(&mut self, raster: &Rasterizer, path: &Path) -> MdlResult<Option<PathBuf>> {
        let written = save_image(raster, path)?;
        tracing::info!(path = %written.display(), "saved image");
        Ok(Some(written))
    }

    /// Blocks until the viewer exits.
    fn display(&mut self, raster: &Rasterizer) -> MdlResult<()> {
        let path = self.temp_path();
        self.displays += 1;
        {
            let mut out = BufWriter::new(File::create(&path)?);
            write_ppm(raster, &mut out)?;
            out.flush()?;
        }
        let result = self.run_viewer(&path);
        if let Err(err) = std::fs::remove_file(&path) {
            tracing::debug!(path = %path.display(), %err, "could not remove temporary image");
        }
        result
    }
}
