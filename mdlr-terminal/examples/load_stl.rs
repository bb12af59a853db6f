/// Example: spin an STL file in the terminal
///
/// Usage: cargo run --example load_stl -- path/to/file.stl

use std::env;
use std::path::Path;

use anyhow::Context as _;
use mdlr_core::stl::load_stl;
use mdlr_core::{AnimationDriver, Axis, Opcode, RenderConfig};
use mdlr_terminal::{RenderMode, TerminalApp, TerminalSink};

const SIZE: usize = 200;
const FRAMES: usize = 36;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let model = match args.get(1) {
        Some(path) => {
            println!("Loading STL file: {}", path);
            let mesh = load_stl(Path::new(path)).context("load mesh")?;
            println!("Loaded {} triangles", mesh.len() / 3);

            // fit the mesh's bounding box into the middle of the frame
            let points = mesh.points();
            let mut min = [f64::INFINITY; 3];
            let mut max = [f64::NEG_INFINITY; 3];
            for row in points.iter_rows() {
                for axis in 0..3 {
                    min[axis] = min[axis].min(row[axis]);
                    max[axis] = max[axis].max(row[axis]);
                }
            }
            let extent = (0..3).map(|a| max[a] - min[a]).fold(0.0, f64::max);
            let scale = if extent > 0.0 { 0.6 * SIZE as f64 / extent } else { 1.0 };
            let center: Vec<f64> = (0..3).map(|a| -(min[a] + max[a]) / 2.0).collect();

            vec![
                Opcode::Scale {
                    factors: [scale; 3],
                    knob: None,
                },
                Opcode::Move {
                    offset: [center[0], center[1], center[2]],
                    knob: None,
                },
                Opcode::Mesh {
                    constants: None,
                    path: path.clone(),
                    cs: None,
                },
            ]
        }
        None => {
            eprintln!("Usage: {} <stl-file>", args[0]);
            eprintln!("\nNo STL file provided, using a torus...");
            vec![Opcode::Torus {
                constants: None,
                center: [0.0; 3],
                circle_radius: 15.0,
                torus_radius: 50.0,
                cs: None,
            }]
        }
    };

    let half = SIZE as f64 / 2.0;
    let mut script = vec![
        Opcode::Frames(FRAMES),
        Opcode::Basename("load_stl".to_string()),
        Opcode::Vary {
            knob: "turn".to_string(),
            start_frame: 0,
            end_frame: FRAMES - 1,
            start_value: 0.0,
            end_value: 1.0,
        },
        Opcode::Move {
            offset: [half, half, 0.0],
            knob: None,
        },
        Opcode::Rotate {
            axis: Axis::X,
            degrees: 30.0,
            knob: None,
        },
        Opcode::Rotate {
            axis: Axis::Y,
            degrees: 360.0,
            knob: Some("turn".to_string()),
        },
    ];
    script.extend(model);

    let driver = AnimationDriver::new(script, RenderConfig::default().with_size(SIZE, SIZE));
    let mut sink = TerminalSink::player();
    driver.run(&mut sink).context("render frames")?;

    println!("Starting terminal player (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(sink.into_frames(), 18, RenderMode::Color)?;
    app.run()?;

    Ok(())
}
