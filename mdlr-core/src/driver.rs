//! Replays an opcode stream once per animation frame
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::config::{LineConvention, RenderConfig};
use crate::error::{MatrixError, MdlError, MdlResult};
use crate::export::ImageSink;
use crate::geometry::{GeometryBuilder, Point3};
use crate::knobs::{KnobTable, VarySpan};
use crate::matrix::PointMatrix;
use crate::raster::{PolygonStyle, Rasterizer};
use crate::script::{parse_script, Opcode};
use crate::shading::{Light, Lighting, Material, ShadingMode};
use crate::stack::TransformStack;
use crate::stl::load_stl;
use crate::transform::TransformKind;

/// Everything the scan pass derives from a script before any frame runs.
#[derive(Debug, Clone)]
pub struct AnimationPlan {
    pub frames: usize,
    /// Set for animated runs only
    pub basename: Option<String>,
    pub knobs: KnobTable,
    pub lighting: Lighting,
    pub materials: HashMap<String, Material>,
}

impl AnimationPlan {
    pub fn is_animated(&self) -> bool {
        self.basename.is_some()
    }

    /// `basename/basename-<frame>.<extension>`, the frame number padded to
    /// the digit count of the frame total.
    pub fn frame_path(&self, frame: usize, extension: &str) -> Option<PathBuf> {
        let basename = self.basename.as_deref()?;
        let width = self.frames.to_string().len();
        Some(
            Path::new(basename).join(format!("{basename}-{frame:0width$}.{extension}")),
        )
    }
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    pub frames: usize,
    /// Files the sink wrote, in order
    pub saved: Vec<PathBuf>,
    pub failed_saves: usize,
    /// Primitives dropped after a dimension error
    pub skipped_primitives: usize,
    /// Triangles that survived culling, across all frames
    pub triangles: usize,
}

/// Per-frame mutable state, reset between frames.
struct FrameState {
    stack: TransformStack,
    raster: Rasterizer,
    scratch: GeometryBuilder,
    coordinate_systems: HashMap<String, PointMatrix>,
    mode: ShadingMode,
}

impl FrameState {
    fn new(config: &RenderConfig) -> Self {
        Self {
            stack: TransformStack::new(),
            raster: Rasterizer::new(config.width, config.height, config.background),
            scratch: GeometryBuilder::with_resolution(config.resolution),
            coordinate_systems: HashMap::new(),
            mode: config.shading,
        }
    }

    fn reset(&mut self, config: &RenderConfig) {
        self.stack.reset();
        self.raster.clear();
        self.scratch.clear();
        self.coordinate_systems.clear();
        self.mode = config.shading;
    }

    /// The named coordinate system, or the stack top.
    fn system(&self, cs: Option<&str>) -> MdlResult<&PointMatrix> {
        match cs {
            Some(name) => self
                .coordinate_systems
                .get(name)
                .ok_or_else(|| MdlError::UnknownCoordinateSystem(name.to_string())),
            None => Ok(self.stack.top()),
        }
    }
}

pub struct AnimationDriver {
    script: Vec<Opcode>,
    config: RenderConfig,
}

impl AnimationDriver {
    pub fn new(script: Vec<Opcode>, config: RenderConfig) -> Self {
        Self { script, config }
    }

    /// Parse `source` and wrap it in a driver.
    pub fn from_source(source: &str, config: RenderConfig) -> MdlResult<Self> {
        Ok(Self::new(parse_script(source)?, config))
    }

    pub fn script(&self) -> &[Opcode] {
        &self.script
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Collect animation settings, knobs, lights and materials.
    pub fn scan(&self) -> MdlResult<AnimationPlan> {
        let mut frames = None;
        let mut basename = None;
        let mut has_vary = false;
        let mut referenced = BTreeSet::new();
        let mut ambient = None;
        let mut lights = Vec::new();
        let mut materials = HashMap::new();

        for op in &self.script {
            match op {
                Opcode::Frames(count) => {
                    if frames.is_some() {
                        tracing::warn!(frames = count, "frame count set more than once");
                    }
                    frames = Some(*count);
                }
                Opcode::Basename(name) => {
                    if basename.is_some() {
                        tracing::warn!(basename = %name, "basename set more than once");
                    }
                    basename = Some(name.clone());
                }
                Opcode::Vary { knob, .. } => {
                    has_vary = true;
                    referenced.insert(knob.as_str());
                }
                Opcode::Ambient(color) => ambient = Some(*color),
                Opcode::Light {
                    name,
                    color,
                    location,
                } => {
                    tracing::debug!(light = %name, "light");
                    lights.push(Light::new(*color, *location));
                }
                Opcode::Constants { name, material } => {
                    materials.insert(name.clone(), *material);
                }
                other => {
                    if let Some(knob) = other.knob() {
                        referenced.insert(knob);
                    }
                }
            }
        }

        let animated = frames.is_some() || basename.is_some() || has_vary;
        let (frame_count, basename) = if animated {
            let count = match frames {
                Some(count) if count > 0 => count,
                Some(_) => return Err(MdlError::config("animation needs at least one frame")),
                None => {
                    return Err(MdlError::config(
                        "animation needs `frames` to set the number of frames",
                    ))
                }
            };
            let Some(basename) = basename else {
                return Err(MdlError::config(
                    "animation needs `basename` to name its frames",
                ));
            };
            (count, Some(basename))
        } else {
            (1, None)
        };

        let mut knobs = KnobTable::new(frame_count);
        for op in &self.script {
            match op {
                Opcode::Vary {
                    knob,
                    start_frame,
                    end_frame,
                    start_value,
                    end_value,
                } => knobs.add_vary(
                    knob,
                    VarySpan {
                        start_frame: *start_frame,
                        end_frame: *end_frame,
                        start_value: *start_value,
                        end_value: *end_value,
                    },
                )?,
                Opcode::Set { knob, value } => knobs.set(knob, *value),
                Opcode::SetKnobs(value) => knobs.set_all(referenced.iter().copied(), *value),
                _ => {}
            }
        }
        knobs.check_defined(&referenced)?;

        let mut lighting = Lighting::default();
        if let Some(ambient) = ambient {
            lighting.ambient = ambient;
        }
        if !lights.is_empty() {
            lighting.lights = lights;
        }

        tracing::debug!(
            frames = frame_count,
            animated,
            knobs = referenced.len(),
            "scanned script"
        );
        Ok(AnimationPlan {
            frames: frame_count,
            basename,
            knobs,
            lighting,
            materials,
        })
    }

    /// Render every frame into `sink`.
    #[tracing::instrument(skip_all, fields(statements = self.script.len()))]
    pub fn run(&self, sink: &mut dyn ImageSink) -> MdlResult<RenderSummary> {
        let plan = self.scan()?;
        let mut state = FrameState::new(&self.config);
        let mut meshes = HashMap::new();
        let mut summary = RenderSummary::default();

        for frame in 0..plan.frames {
            for op in &self.script {
                tracing::debug!(frame, op = op.name(), "execute");
                self.execute(op, frame, &plan, &mut state, &mut meshes, sink, &mut summary)?;
            }

            if let Err(err) = sink.frame_complete(frame, &state.raster) {
                tracing::warn!(frame, %err, "sink rejected frame");
            }
            if let Some(path) = plan.frame_path(frame, &self.config.frame_extension) {
                save(sink, &state.raster, &path, &mut summary);
            }
            state.reset(&self.config);
            summary.frames += 1;
        }

        tracing::info!(
            frames = summary.frames,
            saved = summary.saved.len(),
            failed = summary.failed_saves,
            "render finished"
        );
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        op: &Opcode,
        frame: usize,
        plan: &AnimationPlan,
        state: &mut FrameState,
        meshes: &mut HashMap<String, GeometryBuilder>,
        sink: &mut dyn ImageSink,
        summary: &mut RenderSummary,
    ) -> MdlResult<()> {
        let knob = op
            .knob()
            .map(|name| plan.knobs.require(name, frame))
            .transpose()?;

        match op {
            Opcode::Push => state.stack.push(),
            Opcode::Pop => {
                state.stack.pop()?;
            }
            Opcode::Move { offset, .. } => {
                state.stack.apply(TransformKind::Translate(*offset), knob)?
            }
            Opcode::Scale { factors, .. } => {
                state.stack.apply(TransformKind::Scale(*factors), knob)?
            }
            Opcode::Rotate { axis, degrees, .. } => state
                .stack
                .apply(TransformKind::Rotate(*axis, *degrees), knob)?,

            Opcode::Box {
                constants,
                corner,
                size,
                cs,
            } => {
                state.scratch.add_prism(*corner, size[0], size[1], size[2]);
                self.draw_scratch_polygons(state, plan, constants.as_deref(), cs.as_deref(), summary)?;
            }
            Opcode::Sphere {
                constants,
                center,
                radius,
                cs,
            } => {
                state.scratch.add_sphere(*center, *radius);
                self.draw_scratch_polygons(state, plan, constants.as_deref(), cs.as_deref(), summary)?;
            }
            Opcode::Torus {
                constants,
                center,
                circle_radius,
                torus_radius,
                cs,
            } => {
                state.scratch.add_torus(*center, *circle_radius, *torus_radius);
                self.draw_scratch_polygons(state, plan, constants.as_deref(), cs.as_deref(), summary)?;
            }
            Opcode::Mesh {
                constants,
                path,
                cs,
            } => {
                if !meshes.contains_key(path) {
                    meshes.insert(path.clone(), load_stl(Path::new(path))?);
                }
                if let Some(mesh) = meshes.get(path) {
                    let transform = state.system(cs.as_deref())?.transpose();
                    let polygons = mesh.points().multiply(&transform);
                    self.draw_polygons(state, plan, constants.as_deref(), polygons, summary);
                }
            }

            Opcode::Line {
                start,
                start_cs,
                end,
                end_cs,
                ..
            } => {
                let edges = if start_cs == end_cs {
                    state.scratch.add_edge(*start, *end);
                    let transform = self.line_transform(state.system(start_cs.as_deref())?);
                    state.scratch.points().multiply(&transform)
                } else {
                    let start_m = self.line_transform(state.system(start_cs.as_deref())?);
                    let end_m = self.line_transform(state.system(end_cs.as_deref())?);
                    split_edge(*start, &start_m, *end, &end_m)
                };
                self.draw_edges(state, edges, summary);
            }
            Opcode::Circle { center, radius } => {
                state.scratch.add_circle(*center, *radius, None);
                let transform = self.line_transform(state.stack.top());
                let edges = state.scratch.points().multiply(&transform);
                self.draw_edges(state, edges, summary);
            }
            Opcode::Curve { kind, points } => {
                let edges = match state.scratch.add_curve(*points, *kind) {
                    Ok(()) => {
                        let transform = self.line_transform(state.stack.top());
                        state.scratch.points().multiply(&transform)
                    }
                    Err(err) => Err(err),
                };
                self.draw_edges(state, edges, summary);
            }

            Opcode::SaveCs(name) => {
                let top = state.stack.top().copy();
                state.coordinate_systems.insert(name.clone(), top);
            }
            Opcode::Shading(mode) => state.mode = *mode,
            Opcode::Save(name) => save(sink, &state.raster, Path::new(name), summary),
            Opcode::Display => {
                if let Err(err) = sink.display(&state.raster) {
                    tracing::warn!(frame, %err, "display failed");
                }
            }
            Opcode::Unsupported(name) => {
                if frame == 0 {
                    tracing::warn!(statement = %name, "statement is not supported, skipping");
                }
            }
            Opcode::Frames(_)
            | Opcode::Basename(_)
            | Opcode::Vary { .. }
            | Opcode::Set { .. }
            | Opcode::SetKnobs(_)
            | Opcode::Light { .. }
            | Opcode::Ambient(_)
            | Opcode::Constants { .. } => {}
        }
        Ok(())
    }

    fn line_transform(&self, system: &PointMatrix) -> PointMatrix {
        match self.config.line_convention {
            LineConvention::Direct => system.copy(),
            LineConvention::Transposed => system.transpose(),
        }
    }

    fn draw_scratch_polygons(
        &self,
        state: &mut FrameState,
        plan: &AnimationPlan,
        constants: Option<&str>,
        cs: Option<&str>,
        summary: &mut RenderSummary,
    ) -> MdlResult<()> {
        let transform = match state.system(cs) {
            Ok(system) => system.transpose(),
            Err(err) => {
                state.scratch.clear();
                return Err(err);
            }
        };
        let polygons = state.scratch.points().multiply(&transform);
        state.scratch.clear();
        self.draw_polygons(state, plan, constants, polygons, summary);
        Ok(())
    }

    fn draw_polygons(
        &self,
        state: &mut FrameState,
        plan: &AnimationPlan,
        constants: Option<&str>,
        polygons: Result<PointMatrix, MatrixError>,
        summary: &mut RenderSummary,
    ) {
        let polygons = match polygons {
            Ok(polygons) => polygons,
            Err(err) => {
                tracing::warn!(%err, "skipping primitive");
                summary.skipped_primitives += 1;
                return;
            }
        };

        let material = match constants {
            Some(name) => plan.materials.get(name).copied().unwrap_or_else(|| {
                tracing::warn!(constants = name, "unknown constants, using defaults");
                Material::default()
            }),
            None => Material::default(),
        };
        let style = match state.mode {
            ShadingMode::Wireframe => PolygonStyle::Wireframe(self.config.line_color),
            ShadingMode::Flat => PolygonStyle::Flat {
                lighting: &plan.lighting,
                material: &material,
            },
        };
        summary.triangles += state.raster.draw_polygons(&polygons, &style);
    }

    fn draw_edges(
        &self,
        state: &mut FrameState,
        edges: Result<PointMatrix, MatrixError>,
        summary: &mut RenderSummary,
    ) {
        state.scratch.clear();
        match edges {
            Ok(edges) => state.raster.draw_lines(&edges, self.config.line_color),
            Err(err) => {
                tracing::warn!(%err, "skipping primitive");
                summary.skipped_primitives += 1;
            }
        }
    }
}

/// An edge whose endpoints are transformed by different systems.
fn split_edge(
    start: Point3,
    start_m: &PointMatrix,
    end: Point3,
    end_m: &PointMatrix,
) -> Result<PointMatrix, MatrixError> {
    let mut edge = PointMatrix::with_cols(4);
    for (point, transform) in [(start, start_m), (end, end_m)] {
        let mut single = GeometryBuilder::new();
        single.add_point(point[0], point[1], point[2]);
        let moved = single.points().multiply(transform)?;
        edge.add_row(moved.row(0))?;
    }
    Ok(edge)
}

fn save(sink: &mut dyn ImageSink, raster: &Rasterizer, path: &Path, summary: &mut RenderSummary) {
    match sink.save(raster, path) {
        Ok(Some(written)) => summary.saved.push(written),
        Ok(None) => tracing::debug!(path = %path.display(), "sink kept image in memory"),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "could not save image");
            summary.failed_saves += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::export::resolve_image_path;

    #[derive(Default)]
    struct Recorder {
        saves: Vec<PathBuf>,
        displays: usize,
        completed: Vec<usize>,
        lit: Vec<usize>,
        /// Pixels of the last completed frame
        last: Vec<Color>,
    }

    impl Recorder {
        /// Whether `(x, y)` of the last 100x100 frame differs from black.
        fn lit_at(&self, x: usize, y: usize) -> bool {
            self.last[(99 - y) * 100 + x] != Color::BLACK
        }
    }

    impl ImageSink for Recorder {
        fn save(&mut self, _raster: &Rasterizer, path: &Path) -> MdlResult<Option<PathBuf>> {
            self.saves.push(path.to_path_buf());
            Ok(Some(resolve_image_path(path)))
        }

        fn display(&mut self, _raster: &Rasterizer) -> MdlResult<()> {
            self.displays += 1;
            Ok(())
        }

        fn frame_complete(&mut self, frame: usize, raster: &Rasterizer) -> MdlResult<()> {
            self.completed.push(frame);
            let background = raster.background();
            self.lit
                .push(raster.pixels().iter().filter(|c| **c != background).count());
            self.last = raster.pixels().to_vec();
            Ok(())
        }
    }

    fn driver(source: &str) -> AnimationDriver {
        driver_with(source, LineConvention::Direct)
    }

    fn driver_with(source: &str, convention: LineConvention) -> AnimationDriver {
        let config = RenderConfig::default()
            .with_size(100, 100)
            .with_line_convention(convention);
        AnimationDriver::from_source(source, config).unwrap()
    }

    #[test]
    fn test_static_script_is_one_frame() {
        let plan = driver("box 10 90 0 20 20 20").scan().unwrap();
        assert_eq!(plan.frames, 1);
        assert!(!plan.is_animated());
        assert_eq!(plan.frame_path(0, "png"), None);
    }

    #[test]
    fn test_animation_requires_basename_and_frames() {
        let err = driver("frames 10\nvary k 0 9 0 1").scan().unwrap_err();
        assert!(matches!(err, MdlError::Config(message) if message.contains("basename")));

        let err = driver("basename spin\nvary k 0 9 0 1").scan().unwrap_err();
        assert!(matches!(err, MdlError::Config(message) if message.contains("frames")));

        let err = driver("frames 0\nbasename spin").scan().unwrap_err();
        assert!(matches!(err, MdlError::Config(_)));
    }

    #[test]
    fn test_duplicate_settings_last_wins() {
        let plan = driver("frames 3\nbasename a\nframes 12\nbasename b")
            .scan()
            .unwrap();
        assert_eq!(plan.frames, 12);
        assert_eq!(plan.basename.as_deref(), Some("b"));
    }

    #[test]
    fn test_frame_paths_are_padded() {
        let plan = driver("frames 120\nbasename orbit").scan().unwrap();
        assert_eq!(
            plan.frame_path(7, "png"),
            Some(PathBuf::from("orbit/orbit-007.png"))
        );
        let plan = driver("frames 9\nbasename orbit").scan().unwrap();
        assert_eq!(
            plan.frame_path(7, "ppm"),
            Some(PathBuf::from("orbit/orbit-7.ppm"))
        );
    }

    #[test]
    fn test_undefined_knob_is_config_error() {
        let err = driver("move 1 0 0 nowhere").scan().unwrap_err();
        assert!(matches!(err, MdlError::Config(message) if message.contains("nowhere")));
        assert!(driver("move 1 0 0 k\nset k 2").scan().is_ok());
        assert!(driver("move 1 0 0 k\nrotate x 5 j\nsetknobs 1").scan().is_ok());
    }

    #[test]
    fn test_lighting_and_materials_collected() {
        let plan = driver("ambient 1 2 3\nlight l 9 9 9 0 0 1\nconstants c 1 1 1 0 0 0 0 0 0")
            .scan()
            .unwrap();
        assert_eq!(plan.lighting.ambient, [1.0, 2.0, 3.0]);
        assert_eq!(plan.lighting.lights.len(), 1);
        assert_eq!(plan.lighting.lights[0].color, [9.0; 3]);
        assert_eq!(plan.materials["c"].ambient, [1.0; 3]);
    }

    #[test]
    fn test_pop_underflow_is_fatal() {
        let mut sink = Recorder::default();
        let err = driver("push\npop\npop").run(&mut sink).unwrap_err();
        assert!(matches!(err, MdlError::Stack(_)));
    }

    #[test]
    fn test_unknown_coordinate_system() {
        let mut sink = Recorder::default();
        let err = driver("sphere 50 50 0 10 nowhere")
            .run(&mut sink)
            .unwrap_err();
        assert!(matches!(err, MdlError::UnknownCoordinateSystem(name) if name == "nowhere"));
    }

    #[test]
    fn test_static_run_saves_and_displays() {
        let mut sink = Recorder::default();
        let summary = driver("sphere 50 50 0 30\ndisplay\nsave ball")
            .run(&mut sink)
            .unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.saved, vec![PathBuf::from("ball.png")]);
        assert_eq!(sink.saves, vec![PathBuf::from("ball")]);
        assert_eq!(sink.displays, 1);
        assert_eq!(sink.completed, vec![0]);
        assert!(sink.lit[0] > 0);
        assert!(summary.triangles > 0);
    }

    #[test]
    fn test_animated_run_resets_between_frames() {
        let mut sink = Recorder::default();
        let script = "frames 3\nbasename grow\nvary k 0 2 0 1\n\
                      push\nmove 50 50 0\nscale 1 1 1 k\nsphere 0 0 0 30\npop";
        let summary = driver(script).run(&mut sink).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(
            sink.saves,
            vec![
                PathBuf::from("grow/grow-0.png"),
                PathBuf::from("grow/grow-1.png"),
                PathBuf::from("grow/grow-2.png"),
            ]
        );
        assert_eq!(sink.completed, vec![0, 1, 2]);
        // frame 0 scales to nothing; each later frame starts from a clear raster
        assert!(sink.lit[0] < sink.lit[1]);
        assert!(sink.lit[1] < sink.lit[2]);
    }

    #[test]
    fn test_saved_coordinate_system_is_used() {
        let mut sink = Recorder::default();
        driver("move 80 80 0\nsavecs corner\nmove -1000 0 0\nsphere 0 0 0 10 corner")
            .run(&mut sink)
            .unwrap();
        assert!(sink.lit[0] > 0);

        let mut sink = Recorder::default();
        driver("move 80 80 0\nsavecs corner\nmove -1000 0 0\nsphere 0 0 0 10")
            .run(&mut sink)
            .unwrap();
        assert_eq!(sink.lit[0], 0);
    }

    #[test]
    fn test_wireframe_mode_outlines_only() {
        let mut flat = Recorder::default();
        driver("box 20 20 0 60 60 60").run(&mut flat).unwrap();
        let mut wire = Recorder::default();
        driver("shading wireframe\nbox 20 20 0 60 60 60")
            .run(&mut wire)
            .unwrap();
        assert!(wire.lit[0] > 0);
        assert!(wire.lit[0] < flat.lit[0]);
    }

    #[test]
    fn test_direct_lines_ignore_translation() {
        let mut sink = Recorder::default();
        driver("move 10 10 0\nline 0 50 0 99 50 0\nbox 0 20 0 10 10 10")
            .run(&mut sink)
            .unwrap();
        // the line keeps its literal position
        assert!(sink.lit_at(0, 50));
        assert!(sink.lit_at(50, 50));
        assert!(!sink.lit_at(50, 60));
        // the box is moved
        assert!(sink.lit_at(15, 35));
        assert!(!sink.lit_at(5, 25));
    }

    #[test]
    fn test_transposed_lines_follow_polygons() {
        let mut sink = Recorder::default();
        driver_with(
            "move 10 10 0\nline 0 50 0 99 50 0\nbox 0 20 0 10 10 10",
            LineConvention::Transposed,
        )
        .run(&mut sink)
        .unwrap();
        assert!(sink.lit_at(50, 60));
        assert!(!sink.lit_at(50, 50));
        assert!(!sink.lit_at(0, 60));
        assert!(sink.lit_at(15, 35));
        assert!(!sink.lit_at(5, 25));
    }

    #[test]
    fn test_line_endpoints_use_their_own_systems() {
        let mut sink = Recorder::default();
        driver("push\nscale 1 5 1\nsavecs tall\npop\nline 10 10 0 90 10 0 tall")
            .run(&mut sink)
            .unwrap();
        assert!(sink.lit_at(10, 10));
        assert!(sink.lit_at(90, 50));
        assert!(sink.lit_at(50, 30));
        assert!(!sink.lit_at(90, 10));

        // translations only reach the end point under the transposed convention
        let script = "push\nmove 0 40 0\nsavecs up\npop\nline 10 10 0 90 10 0 up";
        let mut direct = Recorder::default();
        driver(script).run(&mut direct).unwrap();
        assert!(direct.lit_at(90, 10));
        assert!(!direct.lit_at(90, 50));

        let mut transposed = Recorder::default();
        driver_with(script, LineConvention::Transposed)
            .run(&mut transposed)
            .unwrap();
        assert!(transposed.lit_at(10, 10));
        assert!(transposed.lit_at(90, 50));
        assert!(!transposed.lit_at(90, 10));
    }

    #[test]
    fn test_huge_sphere_is_clipped_to_the_screen() {
        let mut sink = Recorder::default();
        let summary = driver("move 50 50 0\nscale 1e8 1e8 1e8\nsphere 0 0 0 30")
            .run(&mut sink)
            .unwrap();
        assert!(summary.triangles > 0);
        // the viewer sits inside the silhouette, so most of the frame is covered
        assert!(sink.lit[0] > 5000);
        assert!(sink.lit_at(50, 50));
    }

    #[test]
    fn test_sink_without_files_records_no_saves() {
        struct Memory;
        impl ImageSink for Memory {
            fn save(&mut self, _raster: &Rasterizer, _path: &Path) -> MdlResult<Option<PathBuf>> {
                Ok(None)
            }

            fn display(&mut self, _raster: &Rasterizer) -> MdlResult<()> {
                Ok(())
            }
        }

        let summary = driver("frames 2\nbasename spin\nbox 10 10 0 5 5 5\nsave still")
            .run(&mut Memory)
            .unwrap();
        assert_eq!(summary.frames, 2);
        assert!(summary.saved.is_empty());
        assert_eq!(summary.failed_saves, 0);
    }
}
