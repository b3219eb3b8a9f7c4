//! The PCD header: its typed model and the line based parser building it.
//!
//! A header is ten keyword lines, in this order, possibly interleaved with
//! `#` comments and blank lines:
//!
//! ```text
//! VERSION .7
//! FIELDS x y z rgb
//! SIZE 4 4 4 4
//! TYPE F F F U
//! COUNT 1 1 1 1
//! WIDTH 213
//! HEIGHT 1
//! VIEWPOINT 0 0 0 1 0 0 0
//! POINTS 213
//! DATA binary
//! ```
//!
//! The payload starts on the byte right after the `DATA` line terminator.

use std::fmt::Display;
use std::io::BufRead;
use std::str::FromStr;

use log::{debug, warn};

use crate::pcd::line_ending::LineEnding;
use crate::PcdError;

/// Name of the field holding the packed color
pub const RGB_FIELD: &str = "rgb";

/// The `TYPE` of a field, as written in the header
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldType {
    Signed,
    Unsigned,
    Float,
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(Self::Signed),
            "U" => Ok(Self::Unsigned),
            "F" => Ok(Self::Float),
            _ => Err(format!("Unknown field type {}", s)),
        }
    }
}

/// A valid combination of element size and [FieldType]
///
/// A field named `rgb` that is 4 bytes wide in total is always
/// a [FieldKind::PackedColor], whatever its declared type.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    PackedColor,
}

impl FieldKind {
    fn from_declaration(name: &str, size: u32, field_type: FieldType, count: u32) -> Result<Self, String> {
        use FieldType::*;

        if name == RGB_FIELD && size.checked_mul(count) == Some(4) {
            return Ok(Self::PackedColor);
        }
        match (size, field_type) {
            (1, Signed) => Ok(Self::I8),
            (1, Unsigned) => Ok(Self::U8),
            (2, Signed) => Ok(Self::I16),
            (2, Unsigned) => Ok(Self::U16),
            (4, Signed) => Ok(Self::I32),
            (4, Unsigned) => Ok(Self::U32),
            (4, Float) => Ok(Self::F32),
            (8, Float) => Ok(Self::F64),
            _ => Err(format!(
                "Field {:?} combination of size: {} and type: {:?} not supported.",
                name, size, field_type
            )),
        }
    }
}

/// The declaration of one field (one column of FIELDS / SIZE / TYPE / COUNT)
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldSpec {
    name: String,
    size: u32,
    count: u32,
    kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: String, size: u32, field_type: FieldType, count: u32) -> Result<Self, String> {
        if count == 0 {
            return Err(format!("Field {:?} has a count of 0", name));
        }
        let kind = FieldKind::from_declaration(&name, size, field_type, count)?;
        Ok(Self {
            name,
            size,
            count,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes of one element
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of elements
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of bytes the field takes in one row
    pub fn width(&self) -> u32 {
        self.size * self.count
    }
}

/// How the payload following the header is encoded
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EncodingMode {
    /// `DATA ascii`, recognized but not decodable
    Ascii,
    /// `DATA binary`, one row after the other
    RowInterleaved,
    /// `DATA binary_compressed`, LZF compressed field planes
    ColumnPlanarCompressed,
}

impl FromStr for EncodingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(Self::Ascii),
            "binary" => Ok(Self::RowInterleaved),
            "binary_compressed" => Ok(Self::ColumnPlanarCompressed),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }
}

/// Acquisition viewpoint, a translation and a (w, x, y, z) quaternion
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewpoint {
    pub translation: (f64, f64, f64),
    pub quaternion: (f64, f64, f64, f64),
}

impl Viewpoint {
    fn from_tokens(v: &[f64; 7]) -> Self {
        Self {
            translation: (v[0], v[1], v[2]),
            quaternion: (v[3], v[4], v[5], v[6]),
        }
    }
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            translation: (0.0, 0.0, 0.0),
            quaternion: (1.0, 0.0, 0.0, 0.0),
        }
    }
}

/// Header information for the PCD file
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    version: String,
    fields: Vec<FieldSpec>,
    width: u32,
    height: u32,
    viewpoint: Viewpoint,
    point_count: u32,
    encoding: EncodingMode,
    line_ending: LineEnding,
    payload_offset: u64,
}

impl Header {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewpoint(&self) -> Viewpoint {
        self.viewpoint
    }

    pub fn viewpoint_translation(&self) -> (f64, f64, f64) {
        self.viewpoint.translation
    }

    pub fn viewpoint_quaternion(&self) -> (f64, f64, f64, f64) {
        self.viewpoint.quaternion
    }

    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    pub fn encoding(&self) -> EncodingMode {
        self.encoding
    }

    /// Terminator used by the header lines
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Absolute offset, from the start of the source, of the first payload byte
    pub fn payload_offset(&self) -> u64 {
        self.payload_offset
    }

    /// Number of bytes of one row
    pub fn row_stride(&self) -> u32 {
        self.fields.iter().map(FieldSpec::width).sum()
    }

    /// Calculates the number of bytes that the uncompressed
    /// payload of the point cloud should have.
    pub fn payload_size(&self) -> u64 {
        u64::from(self.row_stride()) * u64::from(self.point_count)
    }
}

/// Parses a [Header] from `reader`, consuming everything up to and
/// including the `DATA` line.
///
/// The terminator of the first line sets the convention of the whole header,
/// every later line that ends with the other convention is rejected.
pub fn parse_header<R: BufRead>(reader: R) -> crate::Result<Header> {
    HeaderParser::new(reader).parse()
}

pub(crate) struct HeaderParser<R: BufRead> {
    reader: R,
    line_ending: Option<LineEnding>,
    line: String,
    consumed: u64,
}

impl<R: BufRead> HeaderParser<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            line_ending: None,
            line: String::new(),
            consumed: 0,
        }
    }

    pub(crate) fn parse(mut self) -> crate::Result<Header> {
        let version = self.parse_version()?;
        let fields = self.parse_fields()?;
        let width = self.parse_single::<u32>("WIDTH")?;
        let height = self.parse_single::<u32>("HEIGHT")?;
        let viewpoint = self.parse_viewpoint()?;
        let point_count = self.parse_single::<u32>("POINTS")?;
        let encoding = self.parse_single::<EncodingMode>("DATA")?;

        if u64::from(width) * u64::from(height) != u64::from(point_count) {
            warn!(
                "WIDTH * HEIGHT ({} * {}) does not match POINTS ({})",
                width, height, point_count
            );
        }

        let header = Header {
            version,
            fields,
            width,
            height,
            viewpoint,
            point_count,
            encoding,
            line_ending: self.line_ending.unwrap_or_default(),
            payload_offset: self.consumed,
        };
        debug!(
            "Parsed header: {} fields, {} points, {:?}, payload at byte {}",
            header.fields.len(),
            header.point_count,
            header.encoding,
            header.payload_offset
        );
        Ok(header)
    }

    fn parse_version(&mut self) -> crate::Result<String> {
        self.next_line("VERSION")?;
        let tokens = self.tokens("VERSION")?;
        if tokens.len() != 1 {
            return Err(self.header_err(
                "VERSION",
                format!("Expected a single version token, got {}", tokens.len()),
            ));
        }
        Ok(tokens[0].to_string())
    }

    fn parse_fields(&mut self) -> crate::Result<Vec<FieldSpec>> {
        let names = self.parse_vec::<String>("FIELDS")?;
        if names.is_empty() {
            return Err(self.header_err("FIELDS", "Expected at least one field".to_string()));
        }

        let sizes = self.parse_vec::<u32>("SIZE")?;
        self.check_arity("SIZE", names.len(), sizes.len())?;

        let types = self.parse_vec::<FieldType>("TYPE")?;
        self.check_arity("TYPE", names.len(), types.len())?;

        let counts = self.parse_vec::<u32>("COUNT")?;
        self.check_arity("COUNT", names.len(), counts.len())?;

        let mut fields = Vec::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            let field = FieldSpec::new(name, sizes[i], types[i], counts[i])
                .map_err(|s| self.header_err("FIELDS", s))?;
            fields.push(field);
        }
        Ok(fields)
    }

    fn parse_viewpoint(&mut self) -> crate::Result<Viewpoint> {
        let values = self.parse_vec::<f64>("VIEWPOINT")?;
        if values.len() != 7 {
            return Err(self.header_err(
                "VIEWPOINT",
                format!("Expected length 7, got {}", values.len()),
            ));
        }
        let mut v = [0f64; 7];
        v.copy_from_slice(&values);
        Ok(Viewpoint::from_tokens(&v))
    }

    fn parse_single<T>(&mut self, prefix: &str) -> crate::Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        let mut values = self.parse_vec::<T>(prefix)?;
        if values.len() != 1 {
            return Err(self.header_err(
                prefix,
                format!("Expected a single value, got {}", values.len()),
            ));
        }
        Ok(values.remove(0))
    }

    fn parse_vec<T>(&mut self, prefix: &str) -> crate::Result<Vec<T>>
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        self.next_line(prefix)?;
        self.tokens(prefix)?
            .into_iter()
            .map(|s| s.parse::<T>())
            .collect::<Result<Vec<T>, T::Err>>()
            .map_err(|e| self.header_err(prefix, e.to_string()))
    }

    fn check_arity(&self, prefix: &str, expected: usize, got: usize) -> crate::Result<()> {
        if expected != got {
            Err(self.header_err(prefix, format!("Expected length {}, got {}", expected, got)))
        } else {
            Ok(())
        }
    }

    /// Returns the tokens following the keyword of the current line
    fn tokens(&self, prefix: &str) -> crate::Result<Vec<&str>> {
        let mut tokens = self.line.split_whitespace();
        match tokens.next() {
            Some(keyword) if keyword == prefix => Ok(tokens.collect()),
            _ => Err(self.header_err(prefix, format!("Expected line to start with {}", prefix))),
        }
    }

    /// Reads the next line that is neither blank nor a comment.
    fn next_line(&mut self, section: &str) -> crate::Result<()> {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let n = self.reader.read_until(b'\n', &mut raw)?;
            if n == 0 {
                self.line.clear();
                return Err(self.header_err(section, "Unexpected end of header".to_string()));
            }
            self.consumed += n as u64;

            let expected = *self
                .line_ending
                .get_or_insert_with(|| LineEnding::detect(&raw));
            if let Some(ending) = LineEnding::of_line(&raw) {
                if ending != expected {
                    self.line = String::from_utf8_lossy(&raw).into_owned();
                    return Err(self.header_err(
                        section,
                        format!(
                            "Line ends with {:?} but the header uses {:?}",
                            ending, expected
                        ),
                    ));
                }
                raw.truncate(raw.len() - ending.width());
            }

            let start = raw
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .unwrap_or(raw.len());
            if start == raw.len() || raw[start] == b'#' {
                continue;
            }

            self.line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    self.line = String::from_utf8_lossy(e.as_bytes()).into_owned();
                    return Err(self.header_err(section, "Line is not valid UTF-8".to_string()));
                }
            };
            return Ok(());
        }
    }

    fn header_err(&self, section: &str, message: String) -> PcdError {
        PcdError::header(section, message, &self.line)
    }
}
