/// Draws rendered frames into terminal cells
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use image::{Rgb, RgbImage};
use mdlr_core::Color;
use std::io::Write;

/// Character luminosity ramp for ASCII output (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '▀';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Two pixels per cell in true color
    Color,
    /// One pixel per cell from the luminosity ramp
    Ascii,
}

/// Scales an image down to a grid of terminal cells.
pub struct TerminalRenderer {
    width: usize,
    height: usize,
    mode: RenderMode,
}

impl TerminalRenderer {
    pub fn new(width: usize, height: usize, mode: RenderMode) -> Self {
        Self {
            width,
            height,
            mode,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Pixel rows covered by the cell grid.
    fn pixel_rows(&self) -> usize {
        match self.mode {
            RenderMode::Color => self.height * 2,
            RenderMode::Ascii => self.height,
        }
    }

    /// Nearest-neighbour samples, `width` per row.
    pub fn sample(&self, image: &RgbImage) -> Vec<Rgb<u8>> {
        sample_grid(image, self.width, self.pixel_rows())
    }

    pub fn draw<W: Write>(&self, image: &RgbImage, writer: &mut W) -> std::io::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let samples = self.sample(image);
        match self.mode {
            RenderMode::Color => {
                for pair in samples.chunks(self.width * 2) {
                    let (upper, lower) = pair.split_at(self.width);
                    for (top, bottom) in upper.iter().zip(lower) {
                        writer.queue(SetForegroundColor(term_color(*top)))?;
                        writer.queue(SetBackgroundColor(term_color(*bottom)))?;
                        writer.queue(Print(HALF_BLOCK))?;
                    }
                    writer.queue(ResetColor)?;
                    writer.queue(Print("\r\n"))?;
                }
            }
            RenderMode::Ascii => {
                for row in samples.chunks(self.width) {
                    for pixel in row {
                        let c = ramp_char(Color::from(pixel.0));

                        // Color based on character intensity
                        let color = match c {
                            ' ' | '.' | ':' => TermColor::DarkGrey,
                            '-' | '=' => TermColor::Grey,
                            '+' | '*' => TermColor::White,
                            '#' | '%' | '@' => TermColor::Cyan,
                            _ => TermColor::White,
                        };

                        writer.queue(SetForegroundColor(color))?;
                        writer.queue(Print(c))?;
                    }
                    writer.queue(Print("\r\n"))?;
                }
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn term_color(pixel: Rgb<u8>) -> TermColor {
    let [r, g, b] = pixel.0;
    TermColor::Rgb { r, g, b }
}

/// Ramp character for a color's brightness.
pub fn ramp_char(color: Color) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (color.luminance() * last as f64).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

/// Sample `columns x rows` pixels evenly across the image.
pub fn sample_grid(image: &RgbImage, columns: usize, rows: usize) -> Vec<Rgb<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return vec![Rgb([0, 0, 0]); columns * rows];
    }
    let mut samples = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        let y = (row * height as usize / rows.max(1)) as u32;
        for column in 0..columns {
            let x = (column * width as usize / columns.max(1)) as u32;
            samples.push(*image.get_pixel(x.min(width - 1), y.min(height - 1)));
        }
    }
    samples
}
