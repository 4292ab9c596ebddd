//! Binary encode/decode for the replay format.
//!
//! All integers are little-endian. Strings and byte arrays are
//! length-prefixed with a `u32` length. No compression, no alignment
//! padding, no self-describing schema.

use std::io::{Read, Write};

use crate::error::ReplayError;
use crate::types::{BuildMetadata, Frame, InitDescriptor};
use crate::{FORMAT_VERSION, MAGIC};

/// Upper bound on any length prefix, so corrupt input cannot request a
/// huge allocation.
pub const MAX_LENGTH_PREFIX: usize = 1 << 24;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), ReplayError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), ReplayError> {
    write_length_prefixed_bytes(w, s.as_bytes())
}

/// Write a length-prefixed byte array (u32 length + bytes).
pub fn write_length_prefixed_bytes(w: &mut dyn Write, b: &[u8]) -> Result<(), ReplayError> {
    let len = u32::try_from(b.len()).map_err(|_| ReplayError::MalformedFrame {
        detail: format!("byte array of {} bytes exceeds u32 length prefix", b.len()),
    })?;
    write_u32_le(w, len)?;
    w.write_all(b)?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, ReplayError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, ReplayError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a length-prefixed byte array.
pub fn read_length_prefixed_bytes(r: &mut dyn Read) -> Result<Vec<u8>, ReplayError> {
    let len = read_u32_le(r)? as usize;
    if len > MAX_LENGTH_PREFIX {
        return Err(ReplayError::MalformedFrame {
            detail: format!("length prefix {len} exceeds {MAX_LENGTH_PREFIX}"),
        });
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, ReplayError> {
    let buf = read_length_prefixed_bytes(r)?;
    String::from_utf8(buf).map_err(|e| ReplayError::MalformedFrame {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the replay header (magic, version, build metadata, init descriptor).
pub fn encode_header(
    w: &mut dyn Write,
    meta: &BuildMetadata,
    init: &InitDescriptor,
) -> Result<(), ReplayError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;

    write_length_prefixed_str(w, &meta.toolchain)?;
    write_length_prefixed_str(w, &meta.target_triple)?;
    write_length_prefixed_str(w, &meta.commons_version)?;
    write_length_prefixed_str(w, &meta.compile_flags)?;

    write_u64_le(w, init.config_hash)?;
    write_u64_le(w, init.reset_key)?;
    write_u32_le(w, init.num_agents)?;
    write_length_prefixed_bytes(w, &init.config)?;
    Ok(())
}

/// Decode and validate the replay header.
pub fn decode_header(r: &mut dyn Read) -> Result<(BuildMetadata, InitDescriptor), ReplayError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ReplayError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion { found: version });
    }

    let meta = BuildMetadata {
        toolchain: read_length_prefixed_str(r)?,
        target_triple: read_length_prefixed_str(r)?,
        commons_version: read_length_prefixed_str(r)?,
        compile_flags: read_length_prefixed_str(r)?,
    };

    let init = InitDescriptor {
        config_hash: read_u64_le(r)?,
        reset_key: read_u64_le(r)?,
        num_agents: read_u32_le(r)?,
        config: read_length_prefixed_bytes(r)?,
    };
    Ok((meta, init))
}

// ── Frame encode/decode ─────────────────────────────────────────

/// Encode a single frame.
pub fn encode_frame(w: &mut dyn Write, frame: &Frame) -> Result<(), ReplayError> {
    write_u64_le(w, frame.step)?;
    write_u64_le(w, frame.key)?;
    write_length_prefixed_bytes(w, &frame.actions)?;
    write_u64_le(w, frame.state_hash)?;
    Ok(())
}

/// Decode a single frame.
///
/// Returns `Ok(None)` on clean EOF (no bytes available), `Ok(Some(frame))`
/// on success, or an error on truncated/corrupt data.
pub fn decode_frame(r: &mut dyn Read) -> Result<Option<Frame>, ReplayError> {
    // Read the step header byte-by-byte to tell clean EOF (zero bytes)
    // from truncation (1-7 bytes).
    let mut step_buf = [0u8; 8];
    let mut filled = 0;
    while filled < 8 {
        match r.read(&mut step_buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(ReplayError::MalformedFrame {
                    detail: format!("truncated frame header: got {filled} of 8 bytes for step"),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ReplayError::Io(e)),
        }
    }

    Ok(Some(Frame {
        step: u64::from_le_bytes(step_buf),
        key: read_u64_le(r)?,
        actions: read_length_prefixed_bytes(r)?,
        state_hash: read_u64_le(r)?,
    }))
}
