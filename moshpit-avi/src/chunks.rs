//! FourCC identifiers and the byte markers this crate scans for.

use std::fmt;

/// FourCC (Four Character Code) identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create from bytes.
    pub const fn new(bytes: [u8; 4]) -> Self {
        FourCC(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{}\")", self)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        FourCC(bytes)
    }
}

/// Markers this crate searches for.
///
/// The two section markers bound the container segments; the two stream-chunk
/// tags identify compressed video and uncompressed audio chunks inside the
/// frame-data segment. These are scan targets, not parsed grammar.
pub mod markers {
    use super::FourCC;

    /// Start of the frame-data section.
    pub const MOVI: FourCC = FourCC(*b"movi");
    /// Start of the legacy index section.
    pub const IDX1: FourCC = FourCC(*b"idx1");
    /// Compressed video chunk for stream 0.
    pub const VIDEO_FRAME: FourCC = FourCC(*b"00dc");
    /// Uncompressed audio chunk for stream 1.
    pub const AUDIO_FRAME: FourCC = FourCC(*b"01wb");
}

/// Fixed scan window for marker and tag searches.
pub(crate) const SCAN_WINDOW: usize = 1024;

/// Bytes carried from one window into the next so a marker straddling a
/// window boundary is still matched. One byte short of a full marker, so a
/// carried match can never have been seen by the previous window.
pub(crate) const SCAN_CARRY: usize = 3;

/// First occurrence of `tag` in `haystack`.
pub(crate) fn find_fourcc(haystack: &[u8], tag: FourCC) -> Option<usize> {
    haystack.windows(4).position(|w| w == &tag.0[..])
}

/// All occurrences of `tag` in `haystack`, in position order.
pub(crate) fn fourcc_positions(haystack: &[u8], tag: FourCC) -> impl Iterator<Item = usize> + '_ {
    haystack
        .windows(4)
        .enumerate()
        .filter(move |(_, w)| *w == &tag.0[..])
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_display() {
        assert_eq!(markers::MOVI.to_string(), "movi");
        assert_eq!(markers::VIDEO_FRAME.to_string(), "00dc");
    }

    #[test]
    fn test_find_fourcc() {
        let data = b"xxmovixxmovi";
        assert_eq!(find_fourcc(data, markers::MOVI), Some(2));
        assert_eq!(find_fourcc(b"no marker here", markers::MOVI), None);
    }

    #[test]
    fn test_find_fourcc_at_start() {
        assert_eq!(find_fourcc(b"movi...", markers::MOVI), Some(0));
    }

    #[test]
    fn test_fourcc_positions() {
        let data = b"00dc____00dc__00dc";
        let hits: Vec<usize> = fourcc_positions(data, markers::VIDEO_FRAME).collect();
        assert_eq!(hits, vec![0, 8, 14]);
    }
}
