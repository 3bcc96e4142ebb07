//! PLY format support
//!
//! A small, fast codec for the subset of PLY used by point set pipelines: one
//! `vertex` element with float positions, then optional normals, 8-bit colors,
//! a view count and a classification label, in that order.
//!
//! The reader recognizes optional properties by name suffix, so `nx`,
//! `normal_x` and `normalx` all declare normals and `diffuse_red` declares a
//! red channel. Color channels may appear in any order as long as they occupy
//! three consecutive property slots; they are always stored as RGB in memory.
//! Ascii and binary little-endian payloads are read, and binary little-endian
//! is always written.

use crate::registry::{PointSetReader, PointSetWriter};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use pointclass_core::{Color, Error, Point3f, PointSet, Result, Vector3f};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Maximum number of property lines scanned after `x`, `y` and `z`
pub const MAX_OPTIONAL_PROPERTIES: usize = 100;

/// Comment written into every generated header
pub const GENERATOR_COMMENT: &str = "Generated by pointclass";

const ASCII_FORMAT_LINE: &str = "format ascii 1.0";
const BINARY_LE_FORMAT_LINE: &str = "format binary_little_endian 1.0";

// Cap on the up-front allocation driven by the declared vertex count
const MAX_PREALLOCATED_POINTS: usize = 1 << 20;

/// PLY payload encodings understood by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// On-disk position of each color channel, relative to the first one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOrder {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl ColorOrder {
    /// Channels stored as red, green, blue
    pub const RGB: ColorOrder = ColorOrder {
        red: 0,
        green: 1,
        blue: 2,
    };

    /// Build an order from absolute property slots
    ///
    /// The slots are made relative to the smallest one and must then form a
    /// permutation of `0, 1, 2`.
    pub fn from_slots(red: usize, green: usize, blue: usize) -> Result<Self> {
        let min = red.min(green).min(blue);
        let order = ColorOrder {
            red: red - min,
            green: green - min,
            blue: blue - min,
        };

        let mut sorted = [order.red, order.green, order.blue];
        sorted.sort_unstable();
        if sorted != [0, 1, 2] {
            return Err(Error::Format(
                "red/green/blue properties need to be contiguous".to_string(),
            ));
        }

        Ok(order)
    }

    /// Reorder channels read from disk into RGB
    pub fn to_rgb(&self, raw: [u8; 3]) -> Color {
        [raw[self.red], raw[self.green], raw[self.blue]]
    }
}

/// Optional attributes declared by a header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlyLayout {
    pub has_normals: bool,
    pub color_order: Option<ColorOrder>,
    pub has_views: bool,
    /// Name of the property holding classification labels
    pub label_property: Option<String>,
}

impl PlyLayout {
    pub fn has_colors(&self) -> bool {
        self.color_order.is_some()
    }

    pub fn has_labels(&self) -> bool {
        self.label_property.is_some()
    }
}

/// Parsed PLY header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub vertex_count: usize,
    pub layout: PlyLayout,
}

/// Options for writing PLY files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyWriteOptions {
    pub comments: Vec<String>,
}

impl Default for PlyWriteOptions {
    fn default() -> Self {
        Self {
            comments: vec![GENERATOR_COMMENT.to_string()],
        }
    }
}

impl PlyWriteOptions {
    /// Append a header comment
    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comments.push(comment.into());
        self
    }
}

pub struct PlyReader;

impl PlyReader {
    /// Read a point set from a PLY file
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<PointSet> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Read a point set from a PLY stream
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<PointSet> {
        let header = Self::read_header(reader)?;
        info!("Reading {} points", header.vertex_count);
        debug!(
            format = ?header.format,
            normals = header.layout.has_normals,
            colors = header.layout.has_colors(),
            views = header.layout.has_views,
            labels = ?header.layout.label_property,
            "PLY layout"
        );

        match header.format {
            PlyFormat::Ascii => Self::read_ascii_payload(reader, &header),
            PlyFormat::BinaryLittleEndian => Self::read_binary_payload(reader, &header),
        }
    }

    /// Parse the header, leaving `reader` at the first payload byte
    pub fn read_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader> {
        let signature = require_line(reader)?;
        if signature != "ply" {
            return Err(Error::Format("header does not start with ply".to_string()));
        }

        let format_line = require_line(reader)?;
        let format = if format_line == ASCII_FORMAT_LINE {
            PlyFormat::Ascii
        } else {
            if format_line != BINARY_LE_FORMAT_LINE {
                warn!("Unrecognized '{}', reading as binary little endian", format_line);
            }
            PlyFormat::BinaryLittleEndian
        };

        let vertex_line = read_vertex_line(reader)?;
        let vertex_count = parse_vertex_count(&vertex_line)?;

        for axis in ["x", "y", "z"] {
            let line = require_line(reader)?;
            if !is_property(&line, axis) {
                return Err(Error::Format(format!(
                    "expected 'property * {}', but found '{}'",
                    axis, line
                )));
            }
        }

        let layout = read_optional_properties(reader)?;

        Ok(PlyHeader {
            format,
            vertex_count,
            layout,
        })
    }

    fn read_binary_payload<R: Read>(reader: &mut R, header: &PlyHeader) -> Result<PointSet> {
        let count = header.vertex_count;
        let layout = &header.layout;
        let mut set = allocate(header);

        for i in 0..count {
            let truncated = |e: io::Error| payload_error(e, i, count);

            let x = reader.read_f32::<LittleEndian>().map_err(truncated)?;
            let y = reader.read_f32::<LittleEndian>().map_err(truncated)?;
            let z = reader.read_f32::<LittleEndian>().map_err(truncated)?;
            set.points.push(Point3f::new(x, y, z));

            if layout.has_normals {
                let nx = reader.read_f32::<LittleEndian>().map_err(truncated)?;
                let ny = reader.read_f32::<LittleEndian>().map_err(truncated)?;
                let nz = reader.read_f32::<LittleEndian>().map_err(truncated)?;
                set.normals.push(Vector3f::new(nx, ny, nz));
            }

            if let Some(order) = layout.color_order {
                let mut raw = [0u8; 3];
                reader.read_exact(&mut raw).map_err(truncated)?;
                set.colors.push(order.to_rgb(raw));
            }

            if layout.has_views {
                set.views.push(reader.read_u8().map_err(truncated)?);
            }

            if layout.has_labels() {
                set.labels.push(reader.read_u8().map_err(truncated)?);
            }
        }

        Ok(set)
    }

    fn read_ascii_payload<R: Read>(reader: &mut R, header: &PlyHeader) -> Result<PointSet> {
        let mut body = String::new();
        reader.read_to_string(&mut body).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                Error::Format("ascii payload is not valid text".to_string())
            } else {
                Error::Io(e)
            }
        })?;

        let count = header.vertex_count;
        let layout = &header.layout;
        let mut tokens = AsciiTokens::new(&body, count);
        let mut set = allocate(header);

        for _ in 0..count {
            let x = tokens.next_f32()?;
            let y = tokens.next_f32()?;
            let z = tokens.next_f32()?;
            set.points.push(Point3f::new(x, y, z));

            if layout.has_normals {
                let nx = tokens.next_f32()?;
                let ny = tokens.next_f32()?;
                let nz = tokens.next_f32()?;
                set.normals.push(Vector3f::new(nx, ny, nz));
            }

            if let Some(order) = layout.color_order {
                let raw = [tokens.next_u8()?, tokens.next_u8()?, tokens.next_u8()?];
                set.colors.push(order.to_rgb(raw));
            }

            if layout.has_views {
                set.views.push(tokens.next_u8()?);
            }

            if layout.has_labels() {
                set.labels.push(tokens.next_u8()?);
            }

            tokens.finish_point();
        }

        Ok(set)
    }
}

pub struct PlyWriter;

impl PlyWriter {
    /// Write a point set to a binary little-endian PLY file
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn write_file<P: AsRef<Path>>(
        set: &PointSet,
        path: P,
        options: &PlyWriteOptions,
    ) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        Self::write_to(set, &mut writer, options)?;
        writer.flush()?;

        info!("Wrote {} points", set.count());
        Ok(())
    }

    /// Write a point set as binary little-endian PLY
    pub fn write_to<W: Write>(set: &PointSet, writer: &mut W, options: &PlyWriteOptions) -> Result<()> {
        set.validate()?;

        let has_normals = set.has_normals();
        let has_colors = set.has_colors();
        let has_views = set.has_views();
        let has_labels = set.has_labels();

        writeln!(writer, "ply")?;
        writeln!(writer, "{}", BINARY_LE_FORMAT_LINE)?;
        for comment in &options.comments {
            writeln!(writer, "comment {}", comment)?;
        }
        writeln!(writer, "element vertex {}", set.count())?;
        writeln!(writer, "property float x")?;
        writeln!(writer, "property float y")?;
        writeln!(writer, "property float z")?;

        if has_normals {
            writeln!(writer, "property float nx")?;
            writeln!(writer, "property float ny")?;
            writeln!(writer, "property float nz")?;
        }
        if has_colors {
            writeln!(writer, "property uchar red")?;
            writeln!(writer, "property uchar green")?;
            writeln!(writer, "property uchar blue")?;
        }
        if has_views {
            writeln!(writer, "property uchar views")?;
        }
        if has_labels {
            writeln!(writer, "property uchar classification")?;
        }
        writeln!(writer, "end_header")?;

        for i in 0..set.count() {
            let p = &set.points[i];
            writer.write_f32::<LittleEndian>(p.x)?;
            writer.write_f32::<LittleEndian>(p.y)?;
            writer.write_f32::<LittleEndian>(p.z)?;

            if has_normals {
                let n = &set.normals[i];
                writer.write_f32::<LittleEndian>(n.x)?;
                writer.write_f32::<LittleEndian>(n.y)?;
                writer.write_f32::<LittleEndian>(n.z)?;
            }
            if has_colors {
                writer.write_all(&set.colors[i])?;
            }
            if has_views {
                writer.write_u8(set.views[i])?;
            }
            if has_labels {
                writer.write_u8(set.labels[i])?;
            }
        }

        Ok(())
    }
}

impl PointSetReader for PlyReader {
    fn read_point_set(&self, path: &Path) -> Result<PointSet> {
        PlyReader::read_file(path)
    }

    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("ply"))
            .unwrap_or(false)
    }

    fn format_name(&self) -> &'static str {
        "ply"
    }
}

impl PointSetWriter for PlyWriter {
    fn write_point_set(&self, set: &PointSet, path: &Path) -> Result<()> {
        PlyWriter::write_file(set, path, &PlyWriteOptions::default())
    }

    fn format_name(&self) -> &'static str {
        "ply"
    }
}

/// Read one header line without its terminator; `None` at end of stream
fn next_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    let mut line = String::from_utf8_lossy(&buf).into_owned();
    line.retain(|c| c != '\r' && c != '\n');
    Ok(Some(line))
}

fn require_line<R: BufRead>(reader: &mut R) -> Result<String> {
    next_line(reader)?.ok_or_else(|| Error::Format("unexpected end of header".to_string()))
}

/// Skip comments up to the first element declaration
fn read_vertex_line<R: BufRead>(reader: &mut R) -> Result<String> {
    loop {
        let line = require_line(reader)?;
        if line.starts_with("element") {
            return Ok(line);
        } else if line.starts_with("comment") {
            continue;
        } else {
            return Err(Error::Format(format!(
                "expected an element declaration, but found '{}'",
                line
            )));
        }
    }
}

fn parse_vertex_count(line: &str) -> Result<usize> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 || tokens[0] != "element" || tokens[1] != "vertex" {
        return Err(Error::Format(format!(
            "expected 'element vertex <count>', but found '{}'",
            line
        )));
    }

    tokens[2]
        .parse::<usize>()
        .map_err(|_| Error::Format(format!("invalid vertex count '{}'", tokens[2])))
}

fn is_property(line: &str, name: &str) -> bool {
    line.starts_with("property") && line.ends_with(name)
}

/// Scan the property lines following `x`, `y`, `z` up to `end_header`
fn read_optional_properties<R: BufRead>(reader: &mut R) -> Result<PlyLayout> {
    let mut layout = PlyLayout::default();
    let (mut red, mut green, mut blue) = (None, None, None);
    let mut slot = 0;

    loop {
        let line = require_line(reader)?;
        if line == "end_header" {
            break;
        }
        if slot >= MAX_OPTIONAL_PROPERTIES {
            return Err(Error::Format(format!(
                "no end_header within {} properties",
                MAX_OPTIONAL_PROPERTIES
            )));
        }

        if is_property(&line, "nx") || is_property(&line, "normal_x") || is_property(&line, "normalx") {
            layout.has_normals = true;
        }
        if is_property(&line, "red") {
            red = Some(slot);
        }
        if is_property(&line, "green") {
            green = Some(slot);
        }
        if is_property(&line, "blue") {
            blue = Some(slot);
        }
        if is_property(&line, "views") {
            layout.has_views = true;
        }
        for name in ["label", "classification", "class"] {
            if is_property(&line, name) {
                layout.label_property = Some(name.to_string());
            }
        }

        slot += 1;
    }

    match (red, green, blue) {
        (None, None, None) => {}
        (Some(red), Some(green), Some(blue)) => {
            layout.color_order = Some(ColorOrder::from_slots(red, green, blue)?);
        }
        // A partial triplet has no defined slot for the missing channels
        _ => {
            return Err(Error::Format(
                "red, green and blue properties must be declared together".to_string(),
            ));
        }
    }

    Ok(layout)
}

fn allocate(header: &PlyHeader) -> PointSet {
    let capacity = header.vertex_count.min(MAX_PREALLOCATED_POINTS);
    let layout = &header.layout;

    let mut set = PointSet::with_capacity(capacity);
    if layout.has_normals {
        set.normals.reserve(capacity);
    }
    if layout.has_colors() {
        set.colors.reserve(capacity);
    }
    if layout.has_views {
        set.views.reserve(capacity);
    }
    if layout.has_labels() {
        set.labels.reserve(capacity);
    }
    set
}

fn payload_error(e: io::Error, point: usize, count: usize) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Format(format!(
            "payload ends at point {} of {} declared",
            point, count
        ))
    } else {
        Error::Io(e)
    }
}

/// Whitespace separated tokens of an ascii payload
struct AsciiTokens<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    point: usize,
    count: usize,
}

impl<'a> AsciiTokens<'a> {
    fn new(body: &'a str, count: usize) -> Self {
        Self {
            tokens: body.split_whitespace(),
            point: 0,
            count,
        }
    }

    fn next_token(&mut self) -> Result<&'a str> {
        self.tokens.next().ok_or_else(|| {
            Error::Format(format!(
                "payload ends at point {} of {} declared",
                self.point, self.count
            ))
        })
    }

    fn next_f32(&mut self) -> Result<f32> {
        let token = self.next_token()?;
        token
            .parse::<f32>()
            .map_err(|_| Error::Format(format!("invalid number '{}' at point {}", token, self.point)))
    }

    /// Integer fields are read as 16-bit values and truncated to 8 bits
    fn next_u8(&mut self) -> Result<u8> {
        let token = self.next_token()?;
        token
            .parse::<u16>()
            .map(|value| value as u8)
            .map_err(|_| Error::Format(format!("invalid integer '{}' at point {}", token, self.point)))
    }

    fn finish_point(&mut self) {
        self.point += 1;
    }
}
