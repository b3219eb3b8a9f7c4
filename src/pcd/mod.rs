//! Reading of PCD (Point Cloud Data) files.
//!
//! A PCD file is a line-oriented text header followed by a payload.
//! Two payload encodings are decoded:
//!
//! - `DATA binary`: rows of little-endian values, one row per point
//! - `DATA binary_compressed`: LZF compressed planes, one plane per field
//!
//! `DATA ascii` headers are parsed, decoding their payload fails with
//! [`PcdError::UnsupportedEncoding`](crate::PcdError::UnsupportedEncoding).
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> pcdz::Result<()> {
//! let document = pcdz::read_pcd_file("cloud.pcd")?;
//! for point in document.points() {
//!     println!("{:?} {:?}", point.xyz(), point.rgb());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The header can be inspected before deciding to decode the payload:
//!
//! ```no_run
//! use std::fs::File;
//! use pcdz::{PcdReader, PcdReaderBuilder};
//!
//! # fn main() -> pcdz::Result<()> {
//! let options = PcdReaderBuilder::new().with_chunk_rows(4096).build();
//! let reader = PcdReader::with_options(File::open("cloud.pcd")?, options)?;
//! println!("{} points, {:?}", reader.header().point_count(), reader.header().encoding());
//! let document = reader.decode()?;
//! # Ok(())
//! # }
//! ```

pub use self::document::PcdDocument;
pub use self::file::{
    read_pcd, read_pcd_bytes, read_pcd_file, read_pcd_file_header, read_pcd_header, PcdReader,
    PcdReaderBuilder, ReaderOptions,
};
pub use self::header::{
    parse_header, EncodingMode, FieldKind, FieldSpec, FieldType, Header, Viewpoint, RGB_FIELD,
};
pub use self::interleaved::{decode_interleaved, decode_row, DEFAULT_CHUNK_ROWS};
pub use self::layout::{ExtraField, FieldLayout};
pub use self::line_ending::LineEnding;
#[cfg(feature = "parallel")]
pub use self::parallel::{par_read_pcd_buffers, par_read_pcd_files};
pub use self::planar::{decode_compressed, decode_planes, PlaneAssembler, PlaneState};
pub use self::point::{ExtraValue, Point};

pub mod document;
pub mod file;
pub mod header;
pub mod interleaved;
pub mod layout;
pub mod line_ending;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod planar;
pub mod point;
