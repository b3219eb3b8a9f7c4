use std::iter::FusedIterator;

/// Splits a slice into consecutive sub-slices of the given sizes.
///
/// Iteration stops at the first size that does not fit in what remains,
/// so the caller must check the total beforehand if it needs every chunk.
pub struct ChunksIrregular<'a> {
    remainder: &'a [u8],
    sizes: std::slice::Iter<'a, usize>,
}

impl<'a> ChunksIrregular<'a> {
    pub fn new(slc: &'a [u8], sizes: &'a [usize]) -> Self {
        Self {
            remainder: slc,
            sizes: sizes.iter(),
        }
    }
}

impl<'a> Iterator for ChunksIrregular<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let size = *self.sizes.next()?;
        if size > self.remainder.len() {
            self.sizes = <&[usize]>::default().iter();
            return None;
        }
        let (head, tail) = self.remainder.split_at(size);
        self.remainder = tail;
        Some(head)
    }
}

impl<'a> FusedIterator for ChunksIrregular<'a> {}
