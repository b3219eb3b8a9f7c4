//! Decoding of many PCD documents at once, using rayon.
use std::path::Path;

use rayon::prelude::*;

use crate::pcd::document::PcdDocument;
use crate::pcd::file::{read_pcd_bytes, read_pcd_file};

/// Reads each file on the rayon thread pool.
///
/// Results are in the same order as `paths`, a failing file does not
/// prevent the others from being read.
pub fn par_read_pcd_files<P>(paths: &[P]) -> Vec<crate::Result<PcdDocument>>
where
    P: AsRef<Path> + Sync,
{
    paths.par_iter().map(read_pcd_file).collect()
}

/// Same as [par_read_pcd_files], for files already in memory.
pub fn par_read_pcd_buffers<B>(buffers: &[B]) -> Vec<crate::Result<PcdDocument>>
where
    B: AsRef<[u8]> + Sync,
{
    buffers
        .par_iter()
        .map(|bytes| read_pcd_bytes(bytes.as_ref()))
        .collect()
}
