//! Reading of PCD documents from files, byte buffers or any seekable source.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::pcd::document::PcdDocument;
use crate::pcd::header::{EncodingMode, Header, HeaderParser};
use crate::pcd::interleaved::{decode_interleaved, DEFAULT_CHUNK_ROWS};
use crate::pcd::layout::FieldLayout;
use crate::pcd::planar::decode_compressed;
use crate::PcdError;

/// Tuning of a [PcdReader]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReaderOptions {
    chunk_rows: usize,
}

impl ReaderOptions {
    /// Maximum number of rows buffered at once when decoding `DATA binary`
    pub fn chunk_rows(&self) -> usize {
        self.chunk_rows
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        PcdReaderBuilder::new().build()
    }
}

/// Builder for [ReaderOptions]
///
/// ```
/// let options = pcdz::PcdReaderBuilder::new()
///     .with_chunk_rows(1024)
///     .build();
/// assert_eq!(options.chunk_rows(), 1024);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct PcdReaderBuilder {
    chunk_rows: usize,
}

impl PcdReaderBuilder {
    pub fn new() -> Self {
        Self {
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }

    /// Sets how many rows are buffered at once, values below 1 are raised to 1.
    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows.max(1);
        self
    }

    pub fn build(self) -> ReaderOptions {
        ReaderOptions {
            chunk_rows: self.chunk_rows,
        }
    }
}

impl Default for PcdReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader of a PCD document.
///
/// The header is parsed on creation, the payload only when
/// [PcdReader::decode] is called.
pub struct PcdReader<R: Read + Seek> {
    source: BufReader<R>,
    header: Header,
    options: ReaderOptions,
    source_size: u64,
}

impl<R: Read + Seek> PcdReader<R> {
    pub fn new(source: R) -> crate::Result<Self> {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(mut source: R, options: ReaderOptions) -> crate::Result<Self> {
        let source_size = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let mut source = BufReader::new(source);
        let header = HeaderParser::new(&mut source).parse()?;
        debug!(
            "{:?} line endings, source of {} bytes",
            header.line_ending(),
            source_size
        );

        Ok(Self {
            source,
            header,
            options,
            source_size,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Decodes the payload
    pub fn decode(mut self) -> crate::Result<PcdDocument> {
        let encoding = self.header.encoding();
        if encoding == EncodingMode::Ascii {
            return Err(PcdError::UnsupportedEncoding(
                "ascii data is not supported".to_string(),
            ));
        }

        let layout = FieldLayout::resolve(&self.header)?;
        let available = self.source_size.saturating_sub(self.header.payload_offset());
        if encoding == EncodingMode::RowInterleaved && available < self.header.payload_size() {
            return Err(PcdError::TruncatedPayload {
                expected: self.header.payload_size(),
                available,
            });
        }
        self.source
            .seek(SeekFrom::Start(self.header.payload_offset()))?;

        let point_count = self.header.point_count();
        let points = match encoding {
            EncodingMode::RowInterleaved => decode_interleaved(
                &mut self.source,
                &layout,
                point_count,
                self.options.chunk_rows,
            )?,
            EncodingMode::ColumnPlanarCompressed => {
                decode_compressed(&mut self.source, &layout, point_count)?
            }
            EncodingMode::Ascii => unreachable!("ascii is rejected above"),
        };
        Ok(PcdDocument::new(self.header, points, self.source_size))
    }
}

/// Reads a [PcdDocument] from a seekable source
pub fn read_pcd<R: Read + Seek>(source: R) -> crate::Result<PcdDocument> {
    PcdReader::new(source)?.decode()
}

/// Reads a [PcdDocument] directly from a file given the path
pub fn read_pcd_file<P: AsRef<Path>>(path: P) -> crate::Result<PcdDocument> {
    read_pcd(File::open(path)?)
}

/// Reads a [PcdDocument] from the bytes of a whole PCD file
///
/// ```
/// let mut bytes = b"VERSION .7\n\
///     FIELDS x y z\n\
///     SIZE 4 4 4\n\
///     TYPE F F F\n\
///     COUNT 1 1 1\n\
///     WIDTH 1\n\
///     HEIGHT 1\n\
///     VIEWPOINT 0 0 0 1 0 0 0\n\
///     POINTS 1\n\
///     DATA binary\n".to_vec();
/// for v in &[1.0f32, 2.0, 3.0] {
///     bytes.extend_from_slice(&v.to_le_bytes());
/// }
/// let document = pcdz::read_pcd_bytes(&bytes)?;
/// assert_eq!(document.points()[0].xyz(), [1.0, 2.0, 3.0]);
/// # Ok::<(), pcdz::PcdError>(())
/// ```
pub fn read_pcd_bytes(bytes: &[u8]) -> crate::Result<PcdDocument> {
    read_pcd(Cursor::new(bytes))
}

/// Reads only the [Header] of a seekable source
pub fn read_pcd_header<R: Read + Seek>(source: R) -> crate::Result<Header> {
    Ok(PcdReader::new(source)?.header)
}

/// Reads only the [Header] of a file given the path
pub fn read_pcd_file_header<P: AsRef<Path>>(path: P) -> crate::Result<Header> {
    read_pcd_header(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcd::LineEnding;
    use crate::test::{header_text, lzf_literals, planes, xyz_rgb_rows};

    fn binary_file(points: &[(f32, f32, f32, u32)]) -> Vec<u8> {
        let mut bytes = header_text("x y z rgb", "4 4 4 4", "F F F U", "1 1 1 1", points.len() as u32, "binary")
            .into_bytes();
        bytes.extend_from_slice(&xyz_rgb_rows(points));
        bytes
    }

    #[test]
    fn test_read_binary() {
        let bytes = binary_file(&[(1.0, 2.0, 3.0, 0x00FF_00FF); 2]);
        let document = read_pcd_bytes(&bytes).unwrap();
        assert_eq!(document.len(), 2);
        assert_eq!(document.source_size(), bytes.len() as u64);
        assert_eq!(document.header().point_count(), 2);
        for p in document.points() {
            assert_eq!(p.xyz(), [1.0, 2.0, 3.0]);
            assert_eq!(p.color_packed, Some(0x00FF_00FF));
        }
    }

    #[test]
    fn test_read_binary_crlf() {
        let text = header_text("x y z rgb", "4 4 4 4", "F F F U", "1 1 1 1", 1, "binary")
            .replace('\n', "\r\n");
        let mut bytes = text.into_bytes();
        // a payload starting with '\n' must not be mistaken for a terminator
        bytes.extend_from_slice(&xyz_rgb_rows(&[(f32::from_bits(0x0A), 0.0, 0.0, 1)]));
        let document = read_pcd_bytes(&bytes).unwrap();
        assert_eq!(document.points()[0].x.to_bits(), 0x0A);
        assert_eq!(document.points()[0].color_packed, Some(1));
    }

    #[test]
    fn test_read_compressed() {
        let mut bytes =
            header_text("x y z", "4 4 4", "F F F", "1 1 1", 2, "binary_compressed").into_bytes();
        let decompressed = planes(&[(1.0, 2.0, 3.0), (4.0, 5.0, 6.0)], None);
        let stream = lzf_literals(&decompressed);
        bytes.extend_from_slice(&(stream.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(decompressed.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&stream);

        let document = read_pcd_bytes(&bytes).unwrap();
        assert_eq!(document.points()[1].xyz(), [4.0, 5.0, 6.0]);
        assert_eq!(document.points()[1].color_packed, None);
    }

    #[test]
    fn test_ascii_is_unsupported() {
        let mut bytes = header_text("x y z", "4 4 4", "F F F", "1 1 1", 1, "ascii").into_bytes();
        bytes.extend_from_slice(b"1 2 3\n");
        match read_pcd_bytes(&bytes) {
            Err(PcdError::UnsupportedEncoding(_)) => {}
            other => panic!("Expected UnsupportedEncoding, got {:?}", other),
        }
        // the header alone is still readable
        let header = read_pcd_header(Cursor::new(&bytes)).unwrap();
        assert_eq!(header.encoding(), EncodingMode::Ascii);
    }

    #[test]
    fn test_reader_options() {
        let bytes = binary_file(&[(1.0, 2.0, 3.0, 4); 5]);
        let options = PcdReaderBuilder::new().with_chunk_rows(0).build();
        assert_eq!(options.chunk_rows(), 1);
        let reader = PcdReader::with_options(Cursor::new(&bytes), options).unwrap();
        assert_eq!(reader.options().chunk_rows(), 1);
        assert_eq!(reader.decode().unwrap().len(), 5);
        assert_eq!(ReaderOptions::default().chunk_rows(), DEFAULT_CHUNK_ROWS);
    }

    #[test]
    fn test_huge_point_count_with_tiny_payload() {
        let mut bytes = header_text("x y z rgb", "4 4 4 4", "F F F U", "1 1 1 1", 4_000_000_000, "binary")
            .into_bytes();
        bytes.extend_from_slice(&xyz_rgb_rows(&[(1.0, 2.0, 3.0, 4)]));
        match read_pcd_bytes(&bytes) {
            Err(PcdError::TruncatedPayload {
                expected,
                available,
            }) => {
                assert_eq!(expected, 16 * 4_000_000_000);
                assert_eq!(available, 16);
            }
            other => panic!("Expected TruncatedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_crlf_with_first_line_longer_than_the_read_buffer() {
        let mut text = format!("# {}\n", "long comment ".repeat(1_000));
        text.push_str(&header_text("x y z", "4 4 4", "F F F", "1 1 1", 1, "binary"));
        let mut bytes = text.replace('\n', "\r\n").into_bytes();
        for v in &[1.0f32, 2.0, 3.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let reader = PcdReader::new(Cursor::new(&bytes)).unwrap();
        assert_eq!(reader.header().line_ending(), LineEnding::CrLf);
        assert_eq!(reader.decode().unwrap().points()[0].xyz(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_truncated_file() {
        let mut bytes = binary_file(&[(1.0, 2.0, 3.0, 4); 3]);
        bytes.truncate(bytes.len() - 1);
        match read_pcd_bytes(&bytes) {
            Err(PcdError::TruncatedPayload { .. }) => {}
            other => panic!("Expected TruncatedPayload, got {:?}", other),
        }
    }
}
