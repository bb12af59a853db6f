/// Terminal front end: frame previews and an interactive player
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use image::RgbImage;
use mdlr_core::{to_rgb_image, FileSink, ImageSink, MdlResult, Rasterizer};
use std::io::{self, stdout, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::{RenderMode, TerminalRenderer};

/// Cell grid used when stdout is not a terminal.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

fn terminal_size() -> (usize, usize) {
    let (width, height) = terminal::size().unwrap_or(FALLBACK_SIZE);
    (width as usize, height as usize)
}

/// Image sink for the command line.
///
/// `display` prints a half-block preview to stdout, or hands the image to an
/// external viewer when one is configured. In player mode nothing is written
/// to disk and every finished frame is kept for [`TerminalApp`].
pub struct TerminalSink {
    files: Option<FileSink>,
    frames: Vec<RgbImage>,
    capture: bool,
    external_viewer: bool,
}

impl TerminalSink {
    /// Write files and preview `display` requests.
    pub fn new() -> Self {
        Self {
            files: Some(FileSink::new()),
            frames: Vec::new(),
            capture: false,
            external_viewer: false,
        }
    }

    /// Write files and show `display` requests in `viewer`.
    pub fn with_viewer(viewer: impl Into<String>) -> Self {
        Self {
            files: Some(FileSink::with_viewer(viewer)),
            frames: Vec::new(),
            capture: false,
            external_viewer: true,
        }
    }

    /// Keep frames in memory instead of writing files.
    pub fn player() -> Self {
        Self {
            files: None,
            frames: Vec::new(),
            capture: true,
            external_viewer: false,
        }
    }

    pub fn frames(&self) -> &[RgbImage] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<RgbImage> {
        self.frames
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSink for TerminalSink {
    fn save(&mut self, raster: &Rasterizer, path: &Path) -> MdlResult<Option<PathBuf>> {
        match self.files.as_mut() {
            Some(files) => files.save(raster, path),
            None => {
                tracing::debug!(path = %path.display(), "player mode, not writing");
                Ok(None)
            }
        }
    }

    fn display(&mut self, raster: &Rasterizer) -> MdlResult<()> {
        if self.capture {
            return Ok(());
        }
        if self.external_viewer {
            if let Some(files) = self.files.as_mut() {
                return files.display(raster);
            }
        }
        let (columns, rows) = terminal_size();
        let renderer = TerminalRenderer::new(columns, rows.saturating_sub(1), RenderMode::Color);
        let mut stdout = stdout();
        renderer.draw(&to_rgb_image(raster), &mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    fn frame_complete(&mut self, _frame: usize, raster: &Rasterizer) -> MdlResult<()> {
        if self.capture {
            self.frames.push(to_rgb_image(raster));
        }
        Ok(())
    }
}

/// Plays rendered frames in the alternate screen
pub struct TerminalApp {
    frames: Vec<RgbImage>,
    renderer: TerminalRenderer,
    current: usize,
    paused: bool,
    running: bool,
    frame_time: Duration,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(frames: Vec<RgbImage>, fps: u32, mode: RenderMode) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            frames,
            renderer: TerminalRenderer::new(
                width as usize,
                (height as usize).saturating_sub(1),
                mode,
            ),
            current: 0,
            paused: false,
            running: true,
            frame_time: Duration::from_millis(1000 / fps.max(1) as u64),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running && !self.frames.is_empty() {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.render()?;
            if !self.paused {
                self.step(1);
            }

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn step(&mut self, forward: isize) {
        let total = self.frames.len() as isize;
        if total > 0 {
            self.current = (self.current as isize + forward).rem_euclid(total) as usize;
        }
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                }
                KeyCode::Left => {
                    self.paused = true;
                    self.step(-1);
                }
                KeyCode::Right => {
                    self.paused = true;
                    self.step(1);
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.renderer
                    .resize(width as usize, (height as usize).saturating_sub(1));
                execute!(stdout(), terminal::Clear(terminal::ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;

        self.renderer.draw(&self.frames[self.current], &mut stdout)?;

        // Status line
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "mdlr | frame {}/{}{} | FPS: {:.1} | Space=Pause Left/Right=Step Q=Quit",
                self.current + 1,
                self.frames.len(),
                if self.paused { " (paused)" } else { "" },
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdlr_core::{AnimationDriver, RenderConfig};

    #[test]
    fn test_player_sink_captures_every_frame() {
        let config = RenderConfig::default().with_size(40, 30);
        let driver = AnimationDriver::from_source(
            "frames 4\nbasename spin\nvary k 0 3 0 1\nrotate z 90 k\nbox 5 5 0 10 10 10",
            config,
        )
        .unwrap();
        let mut sink = TerminalSink::player();
        let summary = driver.run(&mut sink).unwrap();
        assert_eq!(summary.frames, 4);
        assert!(summary.saved.is_empty());
        let frames = sink.into_frames();
        assert_eq!(frames.len(), 4);
        assert!(frames.iter().all(|f| f.dimensions() == (40, 30)));
        // nothing was written in player mode
        assert!(!Path::new("spin").exists());
    }

    #[test]
    fn test_viewer_sink_hands_display_to_viewer() {
        let mut raster = Rasterizer::new(2, 2, mdlr_core::Color::BLACK);
        raster.plot(0, 0, 0.0, mdlr_core::Color::WHITE);
        let mut sink = TerminalSink::with_viewer("mdlr-no-such-viewer");
        // the launch failure proves the viewer was used instead of stdout
        assert!(sink.display(&raster).is_err());

        let mut player = TerminalSink::player();
        assert!(player.display(&raster).is_ok());
    }
}
