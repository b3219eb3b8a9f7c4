/// Line terminator convention of a PCD header.
///
/// The payload offset is computed from raw byte counts, so the terminator
/// width matters. A header mixing `\n` and `\r\n` is rejected by the parser.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Looks at the first line terminator found in `bytes`.
    ///
    /// Defaults to [`LineEnding::Lf`] when `bytes` holds no `\n` at all.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.iter().position(|&b| b == b'\n') {
            Some(pos) if pos > 0 && bytes[pos - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    /// Number of bytes the terminator occupies.
    pub fn width(self) -> usize {
        match self {
            LineEnding::Lf => 1,
            LineEnding::CrLf => 2,
        }
    }

    /// Returns the terminator that ends `raw_line`, if it has one.
    pub(crate) fn of_line(raw_line: &[u8]) -> Option<Self> {
        if raw_line.ends_with(b"\r\n") {
            Some(LineEnding::CrLf)
        } else if raw_line.ends_with(b"\n") {
            Some(LineEnding::Lf)
        } else {
            None
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        LineEnding::Lf
    }
}
