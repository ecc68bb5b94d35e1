//! Output reassembly.

use crate::chunks::markers;
use crate::error::{AviError, Result};
use crate::types::FrameEntry;
use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Byte counts from one reassembly, by output section.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteCounts {
    /// Header segment bytes copied verbatim.
    pub header_bytes: u64,
    /// Frame bytes copied from the frame-data segment (tag included, since
    /// an entry's range starts at its tag).
    pub frame_bytes: u64,
    /// Index segment bytes copied verbatim.
    pub index_bytes: u64,
    /// Entries whose byte ranges were written.
    pub frames_written: usize,
    /// Sentinel or zero-sized entries skipped.
    pub frames_skipped: usize,
}

/// Write the glitched file: header segment verbatim, a literal `movi` tag,
/// each selected frame's exact byte range from the frame-data segment, then
/// the index segment verbatim.
///
/// Entries with a zero offset or size are sentinels and are skipped. The
/// index bytes are the original file's: they no longer match the rewritten
/// frame stream, which lenient players tolerate by scanning chunk tags.
pub fn assemble(
    output: &Path,
    header_seg: &Path,
    frame_seg: &Path,
    index_seg: &Path,
    sequence: &[FrameEntry],
) -> Result<WriteCounts> {
    let mut out = BufWriter::new(File::create(output)?);
    let mut counts = WriteCounts::default();

    counts.header_bytes = io::copy(&mut File::open(header_seg)?, &mut out)?;
    out.write_all(markers::MOVI.as_bytes())?;

    let mut frames = File::open(frame_seg)?;
    for entry in sequence {
        if entry.offset == 0 || entry.size == 0 {
            counts.frames_skipped += 1;
            continue;
        }
        frames.seek(SeekFrom::Start(entry.offset))?;
        let copied = io::copy(&mut (&mut frames).take(entry.size), &mut out)?;
        if copied != entry.size {
            return Err(AviError::ShortRead {
                offset: entry.offset,
                expected: entry.size,
                got: copied,
            });
        }
        counts.frame_bytes += copied;
        counts.frames_written += 1;
    }

    counts.index_bytes = io::copy(&mut File::open(index_seg)?, &mut out)?;
    out.flush()?;

    debug!(
        "assembled {} frames ({} bytes), {} skipped",
        counts.frames_written, counts.frame_bytes, counts.frames_skipped
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameKind;
    use std::fs;

    fn entry(offset: u64, size: u64) -> FrameEntry {
        FrameEntry::new(offset, size, FrameKind::Video)
    }

    struct Segments {
        _dir: tempfile::TempDir,
        header: std::path::PathBuf,
        frames: std::path::PathBuf,
        index: std::path::PathBuf,
        output: std::path::PathBuf,
    }

    fn segments(header: &[u8], frames: &[u8], index: &[u8]) -> Segments {
        let dir = tempfile::tempdir().unwrap();
        let paths = Segments {
            header: dir.path().join("hdrl.bin"),
            frames: dir.path().join("movi.bin"),
            index: dir.path().join("idx1.bin"),
            output: dir.path().join("out.avi"),
            _dir: dir,
        };
        fs::write(&paths.header, header).unwrap();
        fs::write(&paths.frames, frames).unwrap();
        fs::write(&paths.index, index).unwrap();
        paths
    }

    #[test]
    fn test_sections_in_order() {
        let segs = segments(b"HDR", b"movi0123456789", b"idx1INDEX");
        let seq = [entry(4, 5), entry(9, 5)];

        let counts = assemble(&segs.output, &segs.header, &segs.frames, &segs.index, &seq).unwrap();
        assert_eq!(fs::read(&segs.output).unwrap(), b"HDRmovi0123456789idx1INDEX");
        assert_eq!(counts.header_bytes, 3);
        assert_eq!(counts.frame_bytes, 10);
        assert_eq!(counts.index_bytes, 9);
        assert_eq!(counts.frames_written, 2);
    }

    #[test]
    fn test_sentinels_skipped() {
        let segs = segments(b"H", b"moviABCDEF", b"I");
        let seq = [FrameEntry::SENTINEL, entry(4, 3), FrameEntry::SENTINEL];

        let counts = assemble(&segs.output, &segs.header, &segs.frames, &segs.index, &seq).unwrap();
        assert_eq!(fs::read(&segs.output).unwrap(), b"HmoviABCI");
        assert_eq!(counts.frames_written, 1);
        assert_eq!(counts.frames_skipped, 2);
    }

    #[test]
    fn test_duplicated_and_reordered_entries() {
        let segs = segments(b"", b"moviABCDEF", b"");
        let seq = [entry(7, 3), entry(4, 3), entry(7, 3)];

        assemble(&segs.output, &segs.header, &segs.frames, &segs.index, &seq).unwrap();
        assert_eq!(fs::read(&segs.output).unwrap(), b"moviDEFABCDEF");
    }

    #[test]
    fn test_range_past_segment_end() {
        let segs = segments(b"", b"moviAB", b"");
        let seq = [entry(4, 64)];

        let err = assemble(&segs.output, &segs.header, &segs.frames, &segs.index, &seq)
            .unwrap_err();
        assert!(matches!(
            err,
            AviError::ShortRead {
                offset: 4,
                expected: 64,
                got: 2
            }
        ));
    }

    #[test]
    fn test_existing_output_replaced() {
        let segs = segments(b"NEW", b"movi", b"");
        fs::write(&segs.output, b"a much longer stale output file").unwrap();

        assemble(&segs.output, &segs.header, &segs.frames, &segs.index, &[]).unwrap();
        assert_eq!(fs::read(&segs.output).unwrap(), b"NEWmovi");
    }
}
