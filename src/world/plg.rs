//! PLG mesh loader
//!
//! Text format, one record per line:
//!
//! ```text
//! # comment
//! name num_vertices num_triangles
//! x y z                      (num_vertices lines)
//! tag 3 i0 i1 i2             (num_triangles lines)
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. The tag is a
//! surface descriptor in hex (`0xd0f0`) or decimal and is kept as the
//! triangle attribute.

use std::fs;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use crate::error::LoadError;
use crate::rasterizer::Vec3;
use super::model::{MeshTriangle, Model};

/// Non-empty, non-comment lines with their 1-based line numbers
fn records(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
}

fn plg_error(line: usize, message: impl Into<String>) -> LoadError {
    LoadError::Plg { line, message: message.into() }
}

fn field<T: FromStr>(parts: &mut SplitWhitespace, line: usize, what: &str) -> Result<T, LoadError> {
    let token = parts
        .next()
        .ok_or_else(|| plg_error(line, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| plg_error(line, format!("invalid {} '{}'", what, token)))
}

fn parse_tag(token: &str, line: usize) -> Result<u32, LoadError> {
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse(),
    };
    parsed.map_err(|_| plg_error(line, format!("invalid descriptor '{}'", token)))
}

/// Parse PLG text into a model
pub fn parse_plg(text: &str) -> Result<Model, LoadError> {
    let mut lines = records(text);

    let (line, header) = lines.next().ok_or_else(|| plg_error(0, "missing model header"))?;
    let mut parts = header.split_whitespace();
    let name: String = field(&mut parts, line, "model name")?;
    let num_vertices: usize = field(&mut parts, line, "vertex count")?;
    let num_triangles: usize = field(&mut parts, line, "triangle count")?;

    // header counts are untrusted, so grow as records arrive
    let mut vertices = Vec::new();
    for _ in 0..num_vertices {
        let (line, record) = lines.next().ok_or_else(|| LoadError::Missing {
            name: name.clone(),
            what: "vertices",
            expected: num_vertices,
            found: vertices.len(),
        })?;
        let mut parts = record.split_whitespace();
        let x = field(&mut parts, line, "x")?;
        let y = field(&mut parts, line, "y")?;
        let z = field(&mut parts, line, "z")?;
        vertices.push(Vec3::new(x, y, z));
    }

    let mut triangles = Vec::new();
    for _ in 0..num_triangles {
        let (line, record) = lines.next().ok_or_else(|| LoadError::Missing {
            name: name.clone(),
            what: "triangles",
            expected: num_triangles,
            found: triangles.len(),
        })?;
        let mut parts = record.split_whitespace();
        let tag: String = field(&mut parts, line, "descriptor")?;
        let attr = parse_tag(&tag, line)?;
        let count: usize = field(&mut parts, line, "vertex count")?;
        if count != 3 {
            return Err(plg_error(line, format!("polygon has {} vertices, only triangles are supported", count)));
        }
        let i0 = field(&mut parts, line, "index")?;
        let i1 = field(&mut parts, line, "index")?;
        let i2 = field(&mut parts, line, "index")?;
        triangles.push(MeshTriangle::with_attr(i0, i1, i2, attr));
    }

    if let Some((line, _)) = lines.next() {
        log::warn!("PLG '{}': ignoring trailing data from line {}", name, line);
    }

    Model::new(name, vertices, triangles)
}

/// Load a PLG file
pub fn load_plg<P: AsRef<Path>>(path: P) -> Result<Model, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let model = parse_plg(&text)?;
    log::info!(
        "loaded model '{}' from {} ({} vertices, {} triangles, radius {:.3})",
        model.name(),
        path.display(),
        model.num_vertices(),
        model.num_triangles(),
        model.radius()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRI_PLG: &str = "
# a single triangle
tri 3 1

  # vertices
 0 0 0
 1.5 0 0
 0 2 0

0xd0f0 3 0 1 2
";

    #[test]
    fn test_parse_plg() {
        let m = parse_plg(TRI_PLG).unwrap();
        assert_eq!(m.name(), "tri");
        assert_eq!(m.num_vertices(), 3);
        assert_eq!(m.vertices()[1], Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(m.triangles()[0], MeshTriangle::with_attr(0, 1, 2, 0xd0f0));
        assert!((m.radius() - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_decimal_descriptor() {
        let m = parse_plg("t 3 1\n0 0 0\n1 0 0\n0 1 0\n17 3 2 1 0\n").unwrap();
        assert_eq!(m.triangles()[0].attr, 17);
        assert_eq!(m.triangles()[0].indices, [2, 1, 0]);
    }

    #[test]
    fn test_missing_records() {
        let err = parse_plg("t 3 1\n0 0 0\n1 0 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Missing { what: "vertices", expected: 3, found: 2, .. }));
        let err = parse_plg("t 3 2\n0 0 0\n1 0 0\n0 1 0\n0x1 3 0 1 2\n").unwrap_err();
        assert!(matches!(err, LoadError::Missing { what: "triangles", .. }));
    }

    #[test]
    fn test_bad_numbers_report_line() {
        let err = parse_plg("t 3 1\n0 0 0\n1 zero 0\n0 1 0\n0x1 3 0 1 2\n").unwrap_err();
        assert!(matches!(err, LoadError::Plg { line: 3, .. }));
        let err = parse_plg("t 3 1\n0 0 0\n1 0 0\n0 1 0\n0x1 4 0 1 2\n").unwrap_err();
        assert!(matches!(err, LoadError::Plg { line: 5, .. }));
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_plg("t 3 1\n0 0 0\n1 0 0\n0 1 0\n0x1 3 0 1 9\n").unwrap_err();
        assert!(matches!(err, LoadError::IndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn test_huge_header_count_is_missing_records() {
        let err = parse_plg("m 4000000000000000000 0\n0 0 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Missing { what: "vertices", found: 1, .. }));
        let err = parse_plg("m 3 4000000000000000000\n0 0 0\n1 0 0\n0 1 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Missing { what: "triangles", found: 0, .. }));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_plg("# nothing\n\n"), Err(LoadError::Plg { .. })));
    }
}
