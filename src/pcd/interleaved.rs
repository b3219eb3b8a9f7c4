//! Decoding of `DATA binary` payloads, where each row holds all the
//! fields of one point.

use std::io::{ErrorKind, Read};

use log::{debug, trace};

use crate::packers::{unpack_nth, Packable};
use crate::pcd::layout::FieldLayout;
use crate::pcd::point::{ExtraValue, Point};
use crate::PcdError;

/// Maximum number of rows held in memory at once by default
pub const DEFAULT_CHUNK_ROWS: usize = 65_536;

/// Decodes one row laid out as described by `layout`.
///
/// `row` must be at least `layout.row_stride()` bytes.
pub fn decode_row(layout: &FieldLayout, row: &[u8]) -> Point {
    let g = layout.geometry_offset();
    let xyz = &row[g..g + 3 * f32::SIZE];
    Point {
        x: unpack_nth::<f32>(xyz, 0),
        y: unpack_nth::<f32>(xyz, 1),
        z: unpack_nth::<f32>(xyz, 2),
        color_packed: layout
            .color_offset()
            .map(|offset| u32::unpack_from(&row[offset..offset + u32::SIZE])),
        extra: layout.extra().map(|extra| ExtraValue {
            name: extra.name.clone(),
            value: u8::unpack_from(&row[extra.offset..]),
        }),
    }
}

/// Reads and decodes `point_count` rows from `src`.
///
/// At most `chunk_rows` rows are buffered at a time. Bytes after the last
/// row are left unread.
pub fn decode_interleaved<R: Read>(
    mut src: R,
    layout: &FieldLayout,
    point_count: u32,
    chunk_rows: usize,
) -> crate::Result<Vec<Point>> {
    let stride = layout.row_stride();
    let total = point_count as usize;
    let rows_per_chunk = chunk_rows.max(1).min(total.max(1));

    // grows chunk by chunk, `point_count` is not trusted until the rows are read
    let mut points = Vec::with_capacity(rows_per_chunk);
    let mut chunk = vec![0u8; rows_per_chunk * stride];

    while points.len() < total {
        let rows = (total - points.len()).min(rows_per_chunk);
        let buffer = &mut chunk[..rows * stride];
        let read = read_fully(&mut src, buffer)?;
        if read < buffer.len() {
            return Err(PcdError::TruncatedPayload {
                expected: total as u64 * stride as u64,
                available: (points.len() * stride + read) as u64,
            });
        }
        points.extend(buffer.chunks_exact(stride).map(|row| decode_row(layout, row)));
        trace!("Decoded chunk of {} rows, {}/{}", rows, points.len(), total);
    }

    debug!("Decoded {} interleaved rows of {} bytes", points.len(), stride);
    Ok(points)
}

/// Like `read_exact`, but returns how many bytes were read
/// instead of failing when the source ends early.
pub(crate) fn read_fully<R: Read>(src: &mut R, mut buf: &mut [u8]) -> std::io::Result<usize> {
    let len = buf.len();
    while !buf.is_empty() {
        match src.read(buf) {
            Ok(0) => break,
            Ok(n) => buf = &mut buf[n..],
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(len - buf.len())
}
