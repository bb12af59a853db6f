//! MDL scripts: the opcode stream and its text front end
//!
//! Scripts are line oriented. `//` starts a comment, blank lines are
//! skipped, and every remaining line holds exactly one statement.
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1, take_while},
    character::complete::{satisfy, space0, space1},
    combinator::{all_consuming, map, map_res, recognize},
    multi::separated_list0,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::{MdlError, MdlResult};
use crate::geometry::{CurveKind, Point3};
use crate::shading::{Material, ShadingMode};
use crate::transform::Axis;

/// One statement of a script, replayed unchanged on every frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    Push,
    Pop,
    Move {
        offset: [f64; 3],
        knob: Option<String>,
    },
    Scale {
        factors: [f64; 3],
        knob: Option<String>,
    },
    Rotate {
        axis: Axis,
        degrees: f64,
        knob: Option<String>,
    },
    Box {
        constants: Option<String>,
        corner: Point3,
        size: [f64; 3],
        cs: Option<String>,
    },
    Sphere {
        constants: Option<String>,
        center: Point3,
        radius: f64,
        cs: Option<String>,
    },
    Torus {
        constants: Option<String>,
        center: Point3,
        circle_radius: f64,
        torus_radius: f64,
        cs: Option<String>,
    },
    /// Endpoints may live in different coordinate systems.
    Line {
        constants: Option<String>,
        start: Point3,
        start_cs: Option<String>,
        end: Point3,
        end_cs: Option<String>,
    },
    Circle {
        center: Point3,
        radius: f64,
    },
    /// Planar cubic through four control points.
    Curve {
        kind: CurveKind,
        points: [Point3; 4],
    },
    Mesh {
        constants: Option<String>,
        path: String,
        cs: Option<String>,
    },
    Save(String),
    SaveCs(String),
    Display,
    Frames(usize),
    Basename(String),
    Vary {
        knob: String,
        start_frame: usize,
        end_frame: usize,
        start_value: f64,
        end_value: f64,
    },
    Set {
        knob: String,
        value: f64,
    },
    SetKnobs(f64),
    Light {
        name: String,
        color: [f64; 3],
        location: [f64; 3],
    },
    Ambient([f64; 3]),
    Constants {
        name: String,
        material: Material,
    },
    Shading(ShadingMode),
    /// Recognized but not rendered (`camera`, `focal`, `tween`, ...).
    Unsupported(String),
}

impl Opcode {
    /// Knob scaling this statement, if any.
    pub fn knob(&self) -> Option<&str> {
        match self {
            Opcode::Move { knob, .. } | Opcode::Scale { knob, .. } | Opcode::Rotate { knob, .. } => {
                knob.as_deref()
            }
            _ => None,
        }
    }

    /// Statement keyword, for logging.
    pub fn name(&self) -> &str {
        match self {
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Move { .. } => "move",
            Opcode::Scale { .. } => "scale",
            Opcode::Rotate { .. } => "rotate",
            Opcode::Box { .. } => "box",
            Opcode::Sphere { .. } => "sphere",
            Opcode::Torus { .. } => "torus",
            Opcode::Line { .. } => "line",
            Opcode::Circle { .. } => "circle",
            Opcode::Curve {
                kind: CurveKind::Hermite,
                ..
            } => "hermite",
            Opcode::Curve {
                kind: CurveKind::Bezier,
                ..
            } => "bezier",
            Opcode::Mesh { .. } => "mesh",
            Opcode::Save(_) => "save",
            Opcode::SaveCs(_) => "savecs",
            Opcode::Display => "display",
            Opcode::Frames(_) => "frames",
            Opcode::Basename(_) => "basename",
            Opcode::Vary { .. } => "vary",
            Opcode::Set { .. } => "set",
            Opcode::SetKnobs(_) => "setknobs",
            Opcode::Light { .. } => "light",
            Opcode::Ambient(_) => "ambient",
            Opcode::Constants { .. } => "constants",
            Opcode::Shading(_) => "shading",
            Opcode::Unsupported(name) => name.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Num(f64),
    Word(&'a str),
    /// `:path`
    File(&'a str),
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Num(n) => format!("number {n}"),
            Token::Word(w) => format!("`{w}`"),
            Token::File(f) => format!("file `:{f}`"),
        }
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}

fn word(input: &str) -> IResult<&str, Token<'_>> {
    map(
        recognize(pair(satisfy(is_word_start), take_while(is_word_char))),
        Token::Word,
    )(input)
}

fn file(input: &str) -> IResult<&str, Token<'_>> {
    map(
        preceded(tag(":"), take_till1(|c: char| c.is_whitespace())),
        Token::File,
    )(input)
}

fn number(input: &str) -> IResult<&str, Token<'_>> {
    map_res(recognize_float, |text: &str| {
        text.parse::<f64>().map(Token::Num)
    })(input)
}

fn tokens(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    all_consuming(delimited(
        space0,
        separated_list0(space1, alt((file, word, number))),
        space0,
    ))(input)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(at) => &line[..at],
        None => line,
    }
}

/// Walks the tokens of one statement.
struct Cursor<'t, 'a> {
    line: usize,
    command: &'a str,
    tokens: &'t [Token<'a>],
}

impl<'t, 'a> Cursor<'t, 'a> {
    fn error(&self, message: impl std::fmt::Display) -> MdlError {
        MdlError::parse(self.line, format!("{}: {message}", self.command))
    }

    fn next(&mut self, expected: &str) -> MdlResult<Token<'a>> {
        match self.tokens.split_first() {
            Some((token, rest)) => {
                self.tokens = rest;
                Ok(*token)
            }
            None => Err(self.error(format!("missing {expected}"))),
        }
    }

    fn number(&mut self, expected: &str) -> MdlResult<f64> {
        match self.next(expected)? {
            Token::Num(n) => Ok(n),
            other => Err(self.error(format!("expected {expected}, found {}", other.describe()))),
        }
    }

    fn triple(&mut self, expected: &str) -> MdlResult<[f64; 3]> {
        Ok([
            self.number(expected)?,
            self.number(expected)?,
            self.number(expected)?,
        ])
    }

    fn frame(&mut self, expected: &str) -> MdlResult<usize> {
        let n = self.number(expected)?;
        if n < 0.0 || n.fract() != 0.0 {
            return Err(self.error(format!("{expected} must be a whole number, found {n}")));
        }
        Ok(n as usize)
    }

    fn word(&mut self, expected: &str) -> MdlResult<&'a str> {
        match self.next(expected)? {
            Token::Word(w) => Ok(w),
            other => Err(self.error(format!("expected {expected}, found {}", other.describe()))),
        }
    }

    /// A name, written either bare or as `:path`.
    fn name(&mut self, expected: &str) -> MdlResult<String> {
        match self.next(expected)? {
            Token::Word(w) | Token::File(w) => Ok(w.to_string()),
            other => Err(self.error(format!("expected {expected}, found {}", other.describe()))),
        }
    }

    fn file(&mut self) -> MdlResult<String> {
        match self.next("file name")? {
            Token::File(f) => Ok(f.to_string()),
            other => Err(self.error(format!("expected `:file`, found {}", other.describe()))),
        }
    }

    fn opt_word(&mut self) -> Option<String> {
        match self.tokens.first() {
            Some(Token::Word(w)) => {
                self.tokens = &self.tokens[1..];
                Some(w.to_string())
            }
            _ => None,
        }
    }

    /// Skip `count` numbers if all of them are present.
    fn skip_numbers(&mut self, count: usize) {
        if self.tokens.len() >= count
            && self.tokens[..count]
                .iter()
                .all(|t| matches!(t, Token::Num(_)))
        {
            self.tokens = &self.tokens[count..];
        }
    }

    fn finish(self, statement: Opcode) -> MdlResult<Opcode> {
        match self.tokens.first() {
            None => Ok(statement),
            Some(extra) => Err(self.error(format!("unexpected {}", extra.describe()))),
        }
    }
}

fn with_z(x: f64, y: f64) -> Point3 {
    [x, y, 0.0]
}

fn statement(line: usize, tokens: &[Token<'_>]) -> MdlResult<Opcode> {
    let Some((first, rest)) = tokens.split_first() else {
        return Err(MdlError::parse(line, "empty statement"));
    };
    let Token::Word(command) = *first else {
        return Err(MdlError::parse(
            line,
            format!("expected a command, found {}", first.describe()),
        ));
    };
    let mut c = Cursor {
        line,
        command,
        tokens: rest,
    };

    let op = match command {
        "push" => Opcode::Push,
        "pop" => Opcode::Pop,
        "display" => Opcode::Display,
        "move" => Opcode::Move {
            offset: c.triple("offset")?,
            knob: c.opt_word(),
        },
        "scale" => Opcode::Scale {
            factors: c.triple("scale factor")?,
            knob: c.opt_word(),
        },
        "rotate" => {
            let axis_name = c.word("axis")?;
            let axis = Axis::from_name(axis_name)
                .ok_or_else(|| c.error(format!("unknown axis `{axis_name}`")))?;
            Opcode::Rotate {
                axis,
                degrees: c.number("angle")?,
                knob: c.opt_word(),
            }
        }
        "box" => {
            let constants = c.opt_word();
            let corner = c.triple("corner")?;
            let corner_cs = c.opt_word();
            let size = c.triple("dimension")?;
            let cs = c.opt_word().or(corner_cs);
            Opcode::Box {
                constants,
                corner,
                size,
                cs,
            }
        }
        "sphere" => Opcode::Sphere {
            constants: c.opt_word(),
            center: c.triple("center")?,
            radius: c.number("radius")?,
            cs: c.opt_word(),
        },
        "torus" => Opcode::Torus {
            constants: c.opt_word(),
            center: c.triple("center")?,
            circle_radius: c.number("circle radius")?,
            torus_radius: c.number("torus radius")?,
            cs: c.opt_word(),
        },
        "line" => Opcode::Line {
            constants: c.opt_word(),
            start: c.triple("start point")?,
            start_cs: c.opt_word(),
            end: c.triple("end point")?,
            end_cs: c.opt_word(),
        },
        "circle" => Opcode::Circle {
            center: c.triple("center")?,
            radius: c.number("radius")?,
        },
        "hermite" | "bezier" => {
            let kind = if command == "hermite" {
                CurveKind::Hermite
            } else {
                CurveKind::Bezier
            };
            let mut points = [[0.0; 3]; 4];
            for point in &mut points {
                *point = with_z(c.number("control point")?, c.number("control point")?);
            }
            Opcode::Curve { kind, points }
        }
        "mesh" => Opcode::Mesh {
            constants: c.opt_word(),
            path: c.file()?,
            cs: c.opt_word(),
        },
        "save" => Opcode::Save(c.name("file name")?),
        "savecs" => Opcode::SaveCs(c.word("coordinate system name")?.to_string()),
        "frames" => Opcode::Frames(c.frame("frame count")?),
        "basename" => Opcode::Basename(c.name("basename")?),
        "vary" => Opcode::Vary {
            knob: c.word("knob")?.to_string(),
            start_frame: c.frame("start frame")?,
            end_frame: c.frame("end frame")?,
            start_value: c.number("start value")?,
            end_value: c.number("end value")?,
        },
        "set" => Opcode::Set {
            knob: c.word("knob")?.to_string(),
            value: c.number("value")?,
        },
        "setknobs" => Opcode::SetKnobs(c.number("value")?),
        "light" => Opcode::Light {
            name: c.word("light name")?.to_string(),
            color: c.triple("color")?,
            location: c.triple("location")?,
        },
        "ambient" => Opcode::Ambient(c.triple("color")?),
        "constants" => {
            let name = c.word("constants name")?.to_string();
            let material = Material {
                ambient: c.triple("ambient reflection")?,
                diffuse: c.triple("diffuse reflection")?,
                specular: c.triple("specular reflection")?,
            };
            // optional intensities are accepted and ignored
            c.skip_numbers(3);
            Opcode::Constants { name, material }
        }
        "shading" => {
            let mode = c.word("shading mode")?;
            let mode = ShadingMode::from_name(mode)
                .ok_or_else(|| c.error(format!("unknown shading mode `{mode}`")))?;
            Opcode::Shading(mode)
        }
        "camera" => {
            c.triple("eye")?;
            c.triple("aim")?;
            Opcode::Unsupported(command.to_string())
        }
        "focal" => {
            c.number("focal length")?;
            Opcode::Unsupported(command.to_string())
        }
        "tween" => {
            c.frame("start frame")?;
            c.frame("end frame")?;
            c.word("knob list")?;
            c.word("knob list")?;
            Opcode::Unsupported(command.to_string())
        }
        "saveknobs" => {
            c.word("knob list name")?;
            Opcode::Unsupported(command.to_string())
        }
        "generate_rayfiles" => Opcode::Unsupported(command.to_string()),
        other => return Err(MdlError::parse(line, format!("unknown command `{other}`"))),
    };
    c.finish(op)
}

/// Parse a whole script into opcodes.
pub fn parse_script(source: &str) -> MdlResult<Vec<Opcode>> {
    let mut opcodes = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = strip_comment(raw);
        if text.trim().is_empty() {
            continue;
        }
        let (_, tokens) = tokens(text)
            .map_err(|_| MdlError::parse(line, format!("unrecognized input `{}`", text.trim())))?;
        let op = statement(line, &tokens)?;
        tracing::trace!(line, op = op.name(), "parsed statement");
        opcodes.push(op);
    }
    tracing::debug!(statements = opcodes.len(), "parsed script");
    Ok(opcodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(source: &str) -> Opcode {
        let mut ops = parse_script(source).unwrap();
        assert_eq!(ops.len(), 1, "{source}");
        ops.remove(0)
    }

    fn parse_line(err: MdlError) -> usize {
        match err {
            MdlError::Parse { line, .. } => line,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let ops = parse_script("// header\n\npush   // keep\n  pop\n").unwrap();
        assert_eq!(ops, vec![Opcode::Push, Opcode::Pop]);
    }

    #[test]
    fn test_transforms() {
        assert_eq!(
            one("move 1 -2.5 3e1 slide"),
            Opcode::Move {
                offset: [1.0, -2.5, 30.0],
                knob: Some("slide".into())
            }
        );
        assert_eq!(
            one("scale .5 .5 .5"),
            Opcode::Scale {
                factors: [0.5; 3],
                knob: None
            }
        );
        assert_eq!(
            one("rotate y 45 spin"),
            Opcode::Rotate {
                axis: Axis::Y,
                degrees: 45.0,
                knob: Some("spin".into())
            }
        );
    }

    #[test]
    fn test_box_forms() {
        assert_eq!(
            one("box 0 0 0 10 20 30"),
            Opcode::Box {
                constants: None,
                corner: [0.0; 3],
                size: [10.0, 20.0, 30.0],
                cs: None
            }
        );
        assert_eq!(
            one("box shiny 1 2 3 4 5 6 world"),
            Opcode::Box {
                constants: Some("shiny".into()),
                corner: [1.0, 2.0, 3.0],
                size: [4.0, 5.0, 6.0],
                cs: Some("world".into())
            }
        );
        assert!(matches!(
            one("box 1 2 3 corner 4 5 6"),
            Opcode::Box { cs: Some(cs), .. } if cs == "corner"
        ));
    }

    #[test]
    fn test_round_primitives() {
        assert_eq!(
            one("sphere 0 0 0 50"),
            Opcode::Sphere {
                constants: None,
                center: [0.0; 3],
                radius: 50.0,
                cs: None
            }
        );
        assert_eq!(
            one("torus dull 1 2 3 5 40 here"),
            Opcode::Torus {
                constants: Some("dull".into()),
                center: [1.0, 2.0, 3.0],
                circle_radius: 5.0,
                torus_radius: 40.0,
                cs: Some("here".into())
            }
        );
        assert_eq!(
            one("circle 250 250 0 100"),
            Opcode::Circle {
                center: [250.0, 250.0, 0.0],
                radius: 100.0
            }
        );
    }

    #[test]
    fn test_line_with_two_systems() {
        assert_eq!(
            one("line 0 0 0 a 1 1 1 b"),
            Opcode::Line {
                constants: None,
                start: [0.0; 3],
                start_cs: Some("a".into()),
                end: [1.0; 3],
                end_cs: Some("b".into())
            }
        );
        assert!(matches!(
            one("line 0 0 0 1 1 1"),
            Opcode::Line {
                start_cs: None,
                end_cs: None,
                ..
            }
        ));
    }

    #[test]
    fn test_curves_are_planar() {
        assert_eq!(
            one("bezier 0 0 10 20 30 20 40 0"),
            Opcode::Curve {
                kind: CurveKind::Bezier,
                points: [
                    [0.0, 0.0, 0.0],
                    [10.0, 20.0, 0.0],
                    [30.0, 20.0, 0.0],
                    [40.0, 0.0, 0.0]
                ]
            }
        );
        assert!(matches!(
            one("hermite 0 0 1 1 2 2 3 3"),
            Opcode::Curve {
                kind: CurveKind::Hermite,
                ..
            }
        ));
    }

    #[test]
    fn test_mesh_and_files() {
        assert_eq!(
            one("mesh :models/teapot.stl"),
            Opcode::Mesh {
                constants: None,
                path: "models/teapot.stl".into(),
                cs: None
            }
        );
        assert_eq!(one("save out/frame.png"), Opcode::Save("out/frame.png".into()));
        assert_eq!(one("save :pic.ppm"), Opcode::Save("pic.ppm".into()));
        assert_eq!(one("savecs arm"), Opcode::SaveCs("arm".into()));
    }

    #[test]
    fn test_animation_statements() {
        let ops = parse_script("frames 30\nbasename spin\nvary k 0 29 0 1\nset k 2\nsetknobs 0.5")
            .unwrap();
        assert_eq!(
            ops,
            vec![
                Opcode::Frames(30),
                Opcode::Basename("spin".into()),
                Opcode::Vary {
                    knob: "k".into(),
                    start_frame: 0,
                    end_frame: 29,
                    start_value: 0.0,
                    end_value: 1.0
                },
                Opcode::Set {
                    knob: "k".into(),
                    value: 2.0
                },
                Opcode::SetKnobs(0.5),
            ]
        );
        assert!(parse_script("frames 2.5").is_err());
        assert!(parse_script("vary k -1 3 0 1").is_err());
    }

    #[test]
    fn test_lighting_statements() {
        assert_eq!(
            one("light sun 255 200 100 1 1 1"),
            Opcode::Light {
                name: "sun".into(),
                color: [255.0, 200.0, 100.0],
                location: [1.0; 3]
            }
        );
        assert_eq!(one("ambient 10 20 30"), Opcode::Ambient([10.0, 20.0, 30.0]));
        let material = Material {
            ambient: [0.1, 0.2, 0.3],
            diffuse: [0.4, 0.5, 0.6],
            specular: [0.7, 0.8, 0.9],
        };
        let expected = Opcode::Constants {
            name: "shiny".into(),
            material,
        };
        assert_eq!(
            one("constants shiny 0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 0.9"),
            expected
        );
        assert_eq!(
            one("constants shiny 0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 0.9 255 255 255"),
            expected
        );
        assert_eq!(
            one("shading wireframe"),
            Opcode::Shading(ShadingMode::Wireframe)
        );
    }

    #[test]
    fn test_unsupported_statements() {
        let ops =
            parse_script("camera 0 0 1 0 0 0\nfocal 2\ntween 0 9 a b\nsaveknobs a\ngenerate_rayfiles")
                .unwrap();
        let names: Vec<&str> = ops.iter().map(Opcode::name).collect();
        assert_eq!(
            names,
            ["camera", "focal", "tween", "saveknobs", "generate_rayfiles"]
        );
        assert!(ops.iter().all(|op| matches!(op, Opcode::Unsupported(_))));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(parse_line(parse_script("push\nfly 1 2 3").unwrap_err()), 2);
        assert_eq!(parse_line(parse_script("push\n\nmove 1 2").unwrap_err()), 3);
        assert_eq!(parse_line(parse_script("sphere 0 0 0 1 a b").unwrap_err()), 1);
        assert_eq!(parse_line(parse_script("rotate w 10").unwrap_err()), 1);
        assert_eq!(parse_line(parse_script("pop\nbox 1 2 $").unwrap_err()), 2);
        assert_eq!(parse_line(parse_script("12 push").unwrap_err()), 1);
    }

    #[test]
    fn test_knob_accessor() {
        assert_eq!(one("move 1 1 1 k").knob(), Some("k"));
        assert_eq!(one("box 0 0 0 1 1 1").knob(), None);
    }
}
