//! Parsing of line-oriented polygon annotations.
//!
//! Each non-blank line describes one instance:
//!
//! ```text
//! <class_id> <x1> <y1> <x2> <y2> ... <xn> <yn> <conf>
//! ```
//!
//! Coordinates are normalized to `[0, 1]` and are converted to pixel space
//! using the dimensions of the decoded source image.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use geo_types::Coord;
use tracing::warn;

use crate::{
    error::{LabelParseError, Result},
    types::LabelItem,
};

/// Smallest number of tokens that can hold a class id, a coordinate and a
/// confidence.
const MIN_TOKENS: usize = 4;
const MIN_POLYGON_POINTS: usize = 3;

/// Parses annotation lines against a fixed image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelFileParser {
    width: u32,
    height: u32,
}

impl LabelFileParser {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a single annotation line into a [`LabelItem`].
    pub fn parse(&self, line: &str) -> std::result::Result<LabelItem, LabelParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < MIN_TOKENS {
            return Err(LabelParseError::TooShort(tokens.len()));
        }

        let class_id = parse_class_id(tokens[0])?;

        let conf_token = tokens[tokens.len() - 1];
        let confidence: f64 = conf_token
            .parse()
            .map_err(|_| LabelParseError::InvalidConfidence(conf_token.to_string()))?;

        // chunks_exact drops an unpaired trailing coordinate
        let polygon: Vec<Coord<i32>> = tokens[1..tokens.len() - 1]
            .chunks_exact(2)
            .filter_map(|pair| self.denormalize(pair[0], pair[1]))
            .collect();

        if polygon.len() < MIN_POLYGON_POINTS {
            return Err(LabelParseError::TooFewPoints(polygon.len()));
        }

        Ok(LabelItem {
            class_id,
            confidence,
            polygon,
        })
    }

    /// Read every line from `reader`, keeping the lines that parse.
    ///
    /// Blank lines are skipped silently. A line that fails to parse is logged
    /// and dropped; it never affects its siblings.
    pub fn read<R: BufRead>(&self, reader: R) -> io::Result<Vec<LabelItem>> {
        let mut items = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.parse(line) {
                Ok(item) => items.push(item),
                Err(err) => warn!(line = line_no, "Skipping label line: {err}"),
            }
        }
        Ok(items)
    }

    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<LabelItem>> {
        let file = File::open(path)?;
        Ok(self.read(BufReader::new(file))?)
    }

    fn denormalize(&self, x: &str, y: &str) -> Option<Coord<i32>> {
        let x: f64 = x.parse().ok()?;
        let y: f64 = y.parse().ok()?;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Coord {
            x: (x * f64::from(self.width)).round_ties_even() as i32,
            y: (y * f64::from(self.height)).round_ties_even() as i32,
        })
    }
}

/// Class ids may be written as floats (`"2.0"`); the value is truncated.
fn parse_class_id(token: &str) -> std::result::Result<u32, LabelParseError> {
    let invalid = || LabelParseError::InvalidClassId(token.to_string());
    let value: f64 = token.parse().map_err(|_| invalid())?;
    let value = value.trunc();
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(invalid());
    }
    Ok(value as u32)
}
