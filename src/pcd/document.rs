use crate::pcd::header::Header;
use crate::pcd::point::Point;

/// A fully decoded PCD file
///
/// Built once by [`PcdReader::decode`](crate::PcdReader::decode),
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PcdDocument {
    header: Header,
    points: Vec<Point>,
    source_size: u64,
}

impl PcdDocument {
    pub(crate) fn new(header: Header, points: Vec<Point>, source_size: u64) -> Self {
        debug_assert_eq!(points.len(), header.point_count() as usize);
        Self {
            header,
            points,
            source_size,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Size in bytes of the source the document was decoded from
    pub fn source_size(&self) -> u64 {
        self.source_size
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}
