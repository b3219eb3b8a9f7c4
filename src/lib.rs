//! Decoder for PCD (Point Cloud Data) files.
//!
//! [`read_pcd_file`] and [`read_pcd_bytes`] are the simplest way
//! to get the points of a file, [`PcdReader`] gives access to the header
//! before the payload is decoded.
//!
//! # Examples
//!
//! ```
//! use pcdz::{PcdError, read_pcd_bytes};
//!
//! # fn main() -> Result<(), PcdError> {
//! let mut bytes = b"# .PCD v0.7 - Point Cloud Data file format\n\
//!     VERSION 0.7\n\
//!     FIELDS x y z rgb\n\
//!     SIZE 4 4 4 4\n\
//!     TYPE F F F U\n\
//!     COUNT 1 1 1 1\n\
//!     WIDTH 2\n\
//!     HEIGHT 1\n\
//!     VIEWPOINT 0 0 0 1 0 0 0\n\
//!     POINTS 2\n\
//!     DATA binary\n".to_vec();
//! for _ in 0..2 {
//!     for v in &[1.0f32, 2.0, 3.0] {
//!         bytes.extend_from_slice(&v.to_le_bytes());
//!     }
//!     bytes.extend_from_slice(&0x00FF00FFu32.to_le_bytes());
//! }
//!
//! let document = read_pcd_bytes(&bytes)?;
//! assert_eq!(document.len(), 2);
//! for point in document.points() {
//!     assert_eq!(point.xyz(), [1.0, 2.0, 3.0]);
//!     assert_eq!(point.rgb(), Some((0xFF, 0x00, 0xFF)));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Reading only the header:
//!
//! ```
//! use std::io::Cursor;
//! use pcdz::{EncodingMode, PcdError, PcdReader};
//!
//! # fn main() -> Result<(), PcdError> {
//! let text = "VERSION .7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\n\
//!             WIDTH 0\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS 0\nDATA binary_compressed\n";
//! let reader = PcdReader::new(Cursor::new(text))?;
//! assert_eq!(reader.header().encoding(), EncodingMode::ColumnPlanarCompressed);
//! assert_eq!(reader.header().payload_offset(), text.len() as u64);
//! # Ok(())
//! # }
//! ```
//!
//! # Parallelism
//!
//! This crates has an optional feature 'parallel'.
//! When using this feature, additional `par_` functions are exposed.
//!
//! - [`par_read_pcd_files`]
//! - [`par_read_pcd_buffers`]
//!
//! [`par_read_pcd_files`]: pcd/parallel/fn.par_read_pcd_files.html
//! [`par_read_pcd_buffers`]: pcd/parallel/fn.par_read_pcd_buffers.html

pub(crate) mod byteslice;

pub mod errors;
pub mod lzf;
pub mod packers;
pub mod pcd;


pub use errors::PcdError;
#[cfg(feature = "parallel")]
pub use pcd::{par_read_pcd_buffers, par_read_pcd_files};
pub use pcd::{
    read_pcd, read_pcd_bytes, read_pcd_file, read_pcd_file_header, read_pcd_header, EncodingMode,
    FieldSpec, Header, PcdDocument, PcdReader, PcdReaderBuilder, Point, ReaderOptions,
};

pub type Result<T> = std::result::Result<T, PcdError>;
