//! Frame discovery over the frame-data segment.
//!
//! Chunk tags are matched raw, without parsing the surrounding RIFF grammar,
//! so an indexed "frame" is simply the byte range from one tag to the next.

use crate::chunks::{fourcc_positions, markers, SCAN_CARRY, SCAN_WINDOW};
use crate::error::Result;
use crate::types::{FrameEntry, FrameKind};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Scan the frame-data segment and produce the frame table.
///
/// Matches are accumulated unsorted across all windows and sorted by offset
/// once at the end. A `Void` sentinel heads the table, then each entry's size
/// is the gap to the next entry's offset; the final entry reaches the segment
/// end. Audio tags are only indexed when `include_audio` is set.
pub fn build_frame_table(segment: &Path, include_audio: bool) -> Result<Vec<FrameEntry>> {
    let mut src = File::open(segment)?;
    let segment_len = src.metadata()?.len();

    let mut found: Vec<FrameEntry> = Vec::new();
    let mut carry: Vec<u8> = Vec::new();
    let mut consumed: u64 = 0;
    let mut window = [0u8; SCAN_WINDOW];

    loop {
        let n = src.read(&mut window)?;
        if n == 0 {
            break;
        }
        let mut buf = carry.clone();
        buf.extend_from_slice(&window[..n]);
        // carry is shorter than a tag, so every match here is new.
        let base = consumed - carry.len() as u64;

        for at in fourcc_positions(&buf, markers::VIDEO_FRAME) {
            found.push(FrameEntry::new(base + at as u64, 0, FrameKind::Video));
        }
        if include_audio {
            for at in fourcc_positions(&buf, markers::AUDIO_FRAME) {
                found.push(FrameEntry::new(base + at as u64, 0, FrameKind::Audio));
            }
        }

        consumed += n as u64;
        let keep = buf.len().min(SCAN_CARRY);
        carry = buf[buf.len() - keep..].to_vec();
    }

    found.sort_by_key(|e| e.offset);
    debug!(
        "indexed {} frames in {} segment bytes",
        found.len(),
        segment_len
    );

    let mut table = Vec::with_capacity(found.len() + 1);
    table.push(FrameEntry::SENTINEL);
    table.extend(found);

    // Sizes are tag-to-tag gaps; the sentinel stays zero-sized.
    let n = table.len();
    for i in 1..n {
        let next = if i + 1 < n {
            table[i + 1].offset
        } else {
            segment_len
        };
        table[i].size = next - table[i].offset;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(tag);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn write_segment(dir: &tempfile::TempDir, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("movi.bin");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_video_frames_indexed() {
        let dir = tempfile::tempdir().unwrap();
        let mut seg = b"movi".to_vec();
        seg.extend(chunk(b"00dc", &[0xAA; 16]));
        seg.extend(chunk(b"00dc", &[0xBB; 32]));
        let path = write_segment(&dir, &seg);

        let table = build_frame_table(&path, false).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table[0].is_sentinel());

        // First frame spans tag + size field + payload, up to the next tag.
        assert_eq!(table[1].offset, 4);
        assert_eq!(table[1].size, 24);
        assert_eq!(table[1].kind, FrameKind::Video);

        // Last frame reaches the segment end.
        assert_eq!(table[2].offset, 28);
        assert_eq!(table[2].size, seg.len() as u64 - 28);
    }

    #[test]
    fn test_audio_skipped_unless_requested() {
        let dir = tempfile::tempdir().unwrap();
        let mut seg = b"movi".to_vec();
        seg.extend(chunk(b"00dc", &[1; 8]));
        seg.extend(chunk(b"01wb", &[2; 8]));
        seg.extend(chunk(b"00dc", &[3; 8]));
        let path = write_segment(&dir, &seg);

        let without = build_frame_table(&path, false).unwrap();
        assert_eq!(without.len(), 3);
        assert!(without.iter().all(|e| e.kind != FrameKind::Audio));

        let with = build_frame_table(&path, true).unwrap();
        assert_eq!(with.len(), 4);
        assert_eq!(with[2].kind, FrameKind::Audio);
    }

    #[test]
    fn test_table_sorted_by_offset() {
        let dir = tempfile::tempdir().unwrap();
        let mut seg = b"movi".to_vec();
        for i in 0..20 {
            seg.extend(chunk(b"00dc", &vec![i as u8; 50]));
            seg.extend(chunk(b"01wb", &[i as u8; 10]));
        }
        let path = write_segment(&dir, &seg);

        let table = build_frame_table(&path, true).unwrap();
        assert!(table.windows(2).all(|w| w[0].offset <= w[1].offset));
        // Sizes tile the segment from the first tag to the end.
        let total: u64 = table.iter().map(|e| e.size).sum();
        assert_eq!(total, seg.len() as u64 - table[1].offset);
    }

    #[test]
    fn test_tag_straddling_window_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let mut seg = vec![b'x'; SCAN_WINDOW - 2];
        seg.extend(chunk(b"00dc", &[7; 64]));
        let path = write_segment(&dir, &seg);

        let table = build_frame_table(&path, false).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].offset, (SCAN_WINDOW - 2) as u64);
        assert_eq!(table[1].size, 72);
    }

    #[test]
    fn test_empty_segment_yields_sentinel_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_segment(&dir, b"");

        let table = build_frame_table(&path, true).unwrap();
        assert_eq!(table, vec![FrameEntry::SENTINEL]);
    }
}
