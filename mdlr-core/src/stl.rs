//! STL mesh loading, binary and ASCII
//!
//! Facet normals stored in the file are skipped; triangles keep their vertex
//! order, which the rasterizer uses to recompute the normal.
use std::path::Path;

use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::{map, opt},
    multi::{count, many0},
    number::complete::{double, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{MdlError, MdlResult};
use crate::geometry::{GeometryBuilder, Point3};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Read and parse an STL file into a polygon list.
pub fn load_stl(path: &Path) -> MdlResult<GeometryBuilder> {
    let data = std::fs::read(path)?;
    let mesh = parse_stl(&data).map_err(|err| match err {
        MdlError::Mesh(message) => MdlError::mesh(format!("{}: {message}", path.display())),
        other => other,
    })?;
    tracing::debug!(path = %path.display(), triangles = mesh.len() / 3, "loaded mesh");
    Ok(mesh)
}

/// Parse STL bytes, trying ASCII first when the data starts with `solid`.
///
/// Some exporters write binary files whose header starts with `solid`, so a
/// failed ASCII parse falls back to the binary layout.
pub fn parse_stl(data: &[u8]) -> MdlResult<GeometryBuilder> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }
    parse_binary_stl(data)
}

pub fn parse_binary_stl(data: &[u8]) -> MdlResult<GeometryBuilder> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MdlError::mesh("file too small to be a binary STL"));
    }
    let (body, triangle_count) =
        preceded(take(HEADER_LEN), le_u32::<_, nom::error::Error<&[u8]>>)(data)
            .map_err(|_| MdlError::mesh("missing triangle count"))?;

    let triangle_count = triangle_count as usize;
    if body.len() < triangle_count * FACET_LEN {
        return Err(MdlError::mesh(format!(
            "expected {triangle_count} facets, file ends after {}",
            body.len() / FACET_LEN
        )));
    }

    let mut mesh = GeometryBuilder::new();
    let mut rest = body;
    for _ in 0..triangle_count {
        let (next, [p0, p1, p2]) =
            binary_facet(rest).map_err(|_| MdlError::mesh("truncated facet"))?;
        mesh.add_polygon(p0, p1, p2);
        rest = next;
    }
    Ok(mesh)
}

fn binary_point(input: &[u8]) -> IResult<&[u8], Point3> {
    map(tuple((le_f32, le_f32, le_f32)), |(x, y, z)| {
        [x as f64, y as f64, z as f64]
    })(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], [Point3; 3]> {
    // normal, three vertices, attribute byte count
    let (input, _normal) = take(12usize)(input)?;
    let (input, p0) = binary_point(input)?;
    let (input, p1) = binary_point(input)?;
    let (input, p2) = binary_point(input)?;
    let (input, _attributes) = take(2usize)(input)?;
    Ok((input, [p0, p1, p2]))
}

pub fn parse_ascii_stl(input: &str) -> MdlResult<GeometryBuilder> {
    let (_, facets) =
        ascii_solid(input).map_err(|err| MdlError::mesh(format!("invalid ASCII STL: {err}")))?;

    let mut mesh = GeometryBuilder::new();
    for [p0, p1, p2] in facets {
        mesh.add_polygon(p0, p1, p2);
    }
    Ok(mesh)
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<[Point3; 3]>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // the rest of the line is the solid's name
    let (input, _) = not_line_ending(input)?;
    let (input, facets) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;
    Ok((input, facets))
}

fn ascii_facet(input: &str) -> IResult<&str, [Point3; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = ascii_triple(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, vertices) = count(ascii_vertex, 3)(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;
    Ok((input, [vertices[0], vertices[1], vertices[2]]))
}

fn ascii_vertex(input: &str) -> IResult<&str, Point3> {
    preceded(preceded(multispace0, tag("vertex")), ascii_triple)(input)
}

fn ascii_triple(input: &str) -> IResult<&str, Point3> {
    let (input, x) = preceded(multispace1, double)(input)?;
    let (input, y) = preceded(multispace1, double)(input)?;
    let (input, z) = preceded(multispace1, double)(input)?;
    Ok((input, [x, y, z]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRA: &str = "solid tetra piece
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 -1 0
    outer loop
      vertex 0 0 0
      vertex 0 0 -1
      vertex 1.5e0 0 0
    endloop
  endfacet
endsolid tetra piece
";

    fn binary(facets: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            data.extend_from_slice(&[0u8; 12]);
            for vertex in facet {
                for v in vertex {
                    data.extend_from_slice(&v.to_le_bytes());
                }
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    #[test]
    fn test_parse_ascii() {
        let mesh = parse_stl(TETRA.as_bytes()).unwrap();
        assert_eq!(mesh.len(), 6);
        assert_eq!(mesh.points().row(1), &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.points().row(5), &[1.5, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_parse_binary() {
        let data = binary(&[[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.5]]]);
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.len(), 3);
        assert_eq!(mesh.points().row(2), &[0.0, 2.0, 0.5, 1.0]);
    }

    #[test]
    fn test_empty_binary() {
        let mesh = parse_binary_stl(&binary(&[])).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_binary_with_solid_header_falls_back() {
        let mut data = binary(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        data[..5].copy_from_slice(b"solid");
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.len(), 3);
    }

    #[test]
    fn test_truncated_binary_is_rejected() {
        let mut data = binary(&[[[0.0; 3]; 3]]);
        data.truncate(data.len() - 10);
        assert!(matches!(parse_stl(&data), Err(MdlError::Mesh(_))));
        assert!(matches!(parse_stl(b"tiny"), Err(MdlError::Mesh(_))));
    }
}
