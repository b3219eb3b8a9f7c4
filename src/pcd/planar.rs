//! Decoding of `DATA binary_compressed` payloads.
//!
//! The payload is laid out as follows:
//!
//! 1) u32 size of the compressed data
//! 2) u32 size of the decompressed data
//! 3) the LZF compressed data
//!
//! Once decompressed, the data is not organized in rows but in planes:
//! all the `x`, then all the `y`, then all the `z` and, if the points have
//! a color, all the `rgb`.

use std::io::Read;

use log::{debug, trace};

use crate::byteslice::ChunksIrregular;
use crate::lzf;
use crate::packers::{unpack_nth, Packable};
use crate::pcd::interleaved::read_fully;
use crate::pcd::layout::FieldLayout;
use crate::pcd::point::Point;
use crate::PcdError;

const PLANE_ELEMENT_SIZE: usize = <f32 as Packable>::SIZE;
const SIZE_PREFIX_LEN: usize = 2 * <u32 as Packable>::SIZE;

/// Which plane the next element belongs to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlaneState {
    AwaitingX,
    AwaitingY,
    AwaitingZ,
    AwaitingColor,
    Done,
}

/// Rebuilds points from a stream of plane elements.
///
/// The state moves to the next plane once exactly `point_count`
/// elements of the current one have been pushed.
#[derive(Debug)]
pub struct PlaneAssembler {
    state: PlaneState,
    point_count: usize,
    has_color: bool,
    in_plane: usize,
    xs: Vec<f32>,
    ys: Vec<f32>,
    zs: Vec<f32>,
    colors: Vec<u32>,
}

impl PlaneAssembler {
    pub fn new(point_count: usize, has_color: bool) -> Self {
        let mut assembler = Self {
            state: PlaneState::AwaitingX,
            point_count,
            has_color,
            in_plane: 0,
            xs: Vec::with_capacity(point_count),
            ys: Vec::with_capacity(point_count),
            zs: Vec::with_capacity(point_count),
            colors: Vec::with_capacity(if has_color { point_count } else { 0 }),
        };
        assembler.advance();
        assembler
    }

    pub fn state(&self) -> PlaneState {
        self.state
    }

    /// Consumes one 4 bytes element of the current plane.
    ///
    /// Elements pushed once the state is [PlaneState::Done] are ignored.
    pub fn push(&mut self, element: &[u8]) {
        match self.state {
            PlaneState::AwaitingX => self.xs.push(f32::unpack_from(element)),
            PlaneState::AwaitingY => self.ys.push(f32::unpack_from(element)),
            PlaneState::AwaitingZ => self.zs.push(f32::unpack_from(element)),
            PlaneState::AwaitingColor => self.colors.push(u32::unpack_from(element)),
            PlaneState::Done => return,
        }
        self.in_plane += 1;
        self.advance();
    }

    fn advance(&mut self) {
        while self.state != PlaneState::Done && self.in_plane == self.point_count {
            self.state = match self.state {
                PlaneState::AwaitingX => PlaneState::AwaitingY,
                PlaneState::AwaitingY => PlaneState::AwaitingZ,
                PlaneState::AwaitingZ if self.has_color => PlaneState::AwaitingColor,
                PlaneState::AwaitingZ | PlaneState::AwaitingColor | PlaneState::Done => {
                    PlaneState::Done
                }
            };
            self.in_plane = 0;
            trace!("Plane assembler moved to {:?}", self.state);
        }
    }

    /// Returns the points, if every plane has been filled
    pub fn finish(self) -> Option<Vec<Point>> {
        if self.state != PlaneState::Done {
            return None;
        }
        let mut colors = self.colors.into_iter();
        let has_color = self.has_color;
        Some(
            self.xs
                .into_iter()
                .zip(self.ys)
                .zip(self.zs)
                .map(|((x, y), z)| Point {
                    x,
                    y,
                    z,
                    color_packed: if has_color { colors.next() } else { None },
                    extra: None,
                })
                .collect(),
        )
    }
}

/// Decodes points from a decompressed, column-planar, buffer.
///
/// Only `x y z` and `x y z rgb` layouts can be decoded this way,
/// bytes after the last plane are ignored.
pub fn decode_planes(
    decompressed: &[u8],
    layout: &FieldLayout,
    point_count: u32,
) -> crate::Result<Vec<Point>> {
    check_planar_layout(layout)?;
    let has_color = layout.color_offset().is_some();
    let n = point_count as usize;
    let plane_count = if has_color { 4 } else { 3 };
    let needed = u64::from(point_count) * (PLANE_ELEMENT_SIZE * plane_count) as u64;
    if (decompressed.len() as u64) < needed {
        return Err(PcdError::TruncatedPayload {
            expected: needed,
            available: decompressed.len() as u64,
        });
    }

    let plane_sizes = vec![n * PLANE_ELEMENT_SIZE; plane_count];
    let mut assembler = PlaneAssembler::new(n, has_color);
    for plane in ChunksIrregular::new(decompressed, &plane_sizes) {
        for element in plane.chunks_exact(PLANE_ELEMENT_SIZE) {
            assembler.push(element);
        }
    }
    assembler.finish().ok_or_else(|| PcdError::TruncatedPayload {
        expected: needed,
        available: decompressed.len() as u64,
    })
}

/// Reads the compressed payload from `src`, decompresses it and decodes the points.
pub fn decode_compressed<R: Read>(
    mut src: R,
    layout: &FieldLayout,
    point_count: u32,
) -> crate::Result<Vec<Point>> {
    check_planar_layout(layout)?;

    let mut prefix = [0u8; SIZE_PREFIX_LEN];
    let read = read_fully(&mut src, &mut prefix)?;
    if read < SIZE_PREFIX_LEN {
        return Err(PcdError::TruncatedPayload {
            expected: SIZE_PREFIX_LEN as u64,
            available: read as u64,
        });
    }
    let compressed_len = unpack_nth::<u32>(&prefix, 0);
    let decompressed_len = unpack_nth::<u32>(&prefix, 1);
    debug!(
        "Compressed payload: {} bytes, {} once decompressed",
        compressed_len, decompressed_len
    );

    // sized by what is actually read, not by the declared length
    let mut compressed = Vec::new();
    src.take(u64::from(compressed_len))
        .read_to_end(&mut compressed)?;
    if compressed.len() < compressed_len as usize {
        return Err(PcdError::TruncatedPayload {
            expected: u64::from(compressed_len) + SIZE_PREFIX_LEN as u64,
            available: (compressed.len() + SIZE_PREFIX_LEN) as u64,
        });
    }

    let decompressed = lzf::decompress(&compressed, decompressed_len as usize)?;
    decode_planes(&decompressed, layout, point_count)
}

fn check_planar_layout(layout: &FieldLayout) -> crate::Result<()> {
    if layout.has_only_geometry_and_color() {
        Ok(())
    } else {
        Err(PcdError::UnsupportedEncoding(format!(
            "binary_compressed data is only supported for x y z or x y z rgb fields \
             (row stride {}, extra field: {:?})",
            layout.row_stride(),
            layout.extra().map(|e| e.name.to_string())
        )))
    }
}
