//! Marker-based segment splitting.
//!
//! The source file is read in fixed [`SCAN_WINDOW`]-byte windows. A suffix of
//! each window is carried into the next match step, so a marker straddling a
//! window boundary is still found and the reported offset stays exact.

use crate::chunks::{find_fourcc, FourCC, SCAN_CARRY, SCAN_WINDOW};
use crate::error::{AviError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Copy bytes from `start` up to (but excluding) the first occurrence of
/// `marker` into `dest` (append mode), and return the absolute byte offset at
/// which the marker begins.
///
/// Reaching end of file without a match is a structural-parse failure.
pub fn copy_until_marker(source: &Path, dest: &Path, marker: FourCC, start: u64) -> Result<u64> {
    let mut src = File::open(source)?;
    src.seek(SeekFrom::Start(start))?;
    let mut out = open_append(dest)?;

    // Unflushed bytes; pending[0] sits at absolute offset `pending_pos`. The
    // last SCAN_CARRY bytes of each window stay pending until the next window
    // has been matched against.
    let mut pending: Vec<u8> = Vec::with_capacity(SCAN_WINDOW + SCAN_CARRY);
    let mut pending_pos = start;
    let mut window = [0u8; SCAN_WINDOW];

    loop {
        let n = src.read(&mut window)?;
        if n == 0 {
            return Err(AviError::MarkerNotFound { marker, start });
        }
        pending.extend_from_slice(&window[..n]);

        if let Some(at) = find_fourcc(&pending, marker) {
            out.write_all(&pending[..at])?;
            out.flush()?;
            let pos = pending_pos + at as u64;
            debug!("marker '{}' at byte {}", marker, pos);
            return Ok(pos);
        }

        let flush = pending.len().saturating_sub(SCAN_CARRY);
        out.write_all(&pending[..flush])?;
        pending.drain(..flush);
        pending_pos += flush as u64;
    }
}

/// Copy everything from `start` to end of file into `dest` (append mode),
/// returning the number of bytes copied.
pub fn copy_remainder(source: &Path, dest: &Path, start: u64) -> Result<u64> {
    let mut src = File::open(source)?;
    src.seek(SeekFrom::Start(start))?;
    let mut out = open_append(dest)?;
    let copied = io::copy(&mut src, &mut out)?;
    out.flush()?;
    Ok(copied)
}

/// Lenient look at the RIFF header.
///
/// Databending inputs are frequently already glitched, so a missing or bogus
/// signature only warns; splitting proceeds on the markers alone.
pub fn probe_riff(source: &Path) -> Result<()> {
    let mut src = File::open(source)?;
    let mut hdr = [0u8; 12];
    if let Err(e) = src.read_exact(&mut hdr) {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            warn!("input is shorter than a RIFF header");
            return Ok(());
        }
        return Err(e.into());
    }
    if &hdr[0..4] != b"RIFF" || (&hdr[8..12] != b"AVI " && &hdr[8..12] != b"AVIX") {
        warn!("input does not look like a RIFF/AVI file, continuing anyway");
        return Ok(());
    }
    let declared = Cursor::new(&hdr[4..8]).read_u32::<LittleEndian>()?;
    debug!("RIFF header declares {} payload bytes", declared);
    Ok(())
}

fn open_append(dest: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(dest)?)
}
