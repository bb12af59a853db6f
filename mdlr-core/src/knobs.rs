//! Animation knobs resolved per frame
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{MdlError, MdlResult};

/// One `vary` statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarySpan {
    pub start_frame: usize,
    pub end_frame: usize,
    pub start_value: f64,
    pub end_value: f64,
}

impl VarySpan {
    /// Linear interpolation inside the span; a single-frame span takes the
    /// end value.
    pub fn value_at(&self, frame: usize) -> f64 {
        if self.end_frame == self.start_frame {
            return self.end_value;
        }
        let progress =
            (frame as f64 - self.start_frame as f64) / (self.end_frame - self.start_frame) as f64;
        self.start_value + (self.end_value - self.start_value) * progress
    }
}

#[derive(Debug, Clone, Default)]
struct Knob {
    values: Vec<Option<f64>>,
    fallback: Option<f64>,
}

/// Per-frame values for every knob in a script.
#[derive(Debug, Clone, Default)]
pub struct KnobTable {
    frames: usize,
    knobs: BTreeMap<String, Knob>,
}

impl KnobTable {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            knobs: BTreeMap::new(),
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.knobs.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.knobs.contains_key(name)
    }

    /// Fill a span into the knob's frame table; later spans overwrite the
    /// frames they share with earlier ones.
    pub fn add_vary(&mut self, name: &str, span: VarySpan) -> MdlResult<()> {
        if span.end_frame < span.start_frame {
            return Err(MdlError::config(format!(
                "vary `{name}` ends at frame {} before it starts at frame {}",
                span.end_frame, span.start_frame
            )));
        }
        if span.end_frame >= self.frames {
            tracing::warn!(
                knob = name,
                end_frame = span.end_frame,
                frames = self.frames,
                "vary extends past the last frame, clipping"
            );
        }

        let frames = self.frames;
        let knob = self.knobs.entry(name.to_string()).or_default();
        knob.values.resize(frames, None);
        let last = span.end_frame.min(frames.saturating_sub(1));
        for frame in span.start_frame..=last {
            if frame < frames {
                knob.values[frame] = Some(span.value_at(frame));
            }
        }
        Ok(())
    }

    /// Constant used on frames no span covers.
    pub fn set(&mut self, name: &str, value: f64) {
        let frames = self.frames;
        let knob = self.knobs.entry(name.to_string()).or_default();
        knob.values.resize(frames, None);
        knob.fallback = Some(value);
    }

    /// `set` for every name in `names`.
    pub fn set_all<'a>(&mut self, names: impl IntoIterator<Item = &'a str>, value: f64) {
        for name in names {
            self.set(name, value);
        }
    }

    pub fn value(&self, name: &str, frame: usize) -> Option<f64> {
        let knob = self.knobs.get(name)?;
        knob.values
            .get(frame)
            .copied()
            .flatten()
            .or(knob.fallback)
    }

    pub fn require(&self, name: &str, frame: usize) -> MdlResult<f64> {
        self.value(name, frame)
            .ok_or_else(|| MdlError::UndefinedKnob {
                knob: name.to_string(),
                frame,
            })
    }

    /// Every referenced knob must have been declared.
    pub fn check_defined(&self, referenced: &BTreeSet<&str>) -> MdlResult<()> {
        let missing: Vec<&str> = referenced
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MdlError::config(format!(
                "knobs used but never defined: {}",
                missing.join(", ")
            )))
        }
    }
}
