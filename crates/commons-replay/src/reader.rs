//! Replay playback reader.
//!
//! [`ReplayReader`] reads frames from any `Read` source. The header is
//! validated on construction.

use std::io::Read;

use commons_engine::HarvestEnv;

use crate::codec::{decode_frame, decode_header};
use crate::error::ReplayError;
use crate::types::{BuildMetadata, Frame, InitDescriptor};

/// Reads replay data from a byte stream.
pub struct ReplayReader<R: Read> {
    reader: R,
    metadata: BuildMetadata,
    init: InitDescriptor,
    frames_read: u64,
}

impl<R: Read> ReplayReader<R> {
    /// Open a replay stream, reading and validating the header.
    pub fn open(mut reader: R) -> Result<Self, ReplayError> {
        let (metadata, init) = decode_header(&mut reader)?;
        Ok(Self {
            reader,
            metadata,
            init,
            frames_read: 0,
        })
    }

    /// Build metadata from the header.
    pub fn metadata(&self) -> &BuildMetadata {
        &self.metadata
    }

    /// Initialization descriptor from the header.
    pub fn init_descriptor(&self) -> &InitDescriptor {
        &self.init
    }

    /// Rebuild the recorded environment from the embedded configuration.
    pub fn environment(&self) -> Result<HarvestEnv, ReplayError> {
        Ok(HarvestEnv::new(self.init.env_config()?)?)
    }

    /// Read the next frame, or `None` if the stream is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, ReplayError> {
        let frame = decode_frame(&mut self.reader)?;
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Convert into a frame iterator.
    pub fn frames(self) -> FrameIter<R> {
        FrameIter {
            reader: self.reader,
            done: false,
        }
    }
}

/// Iterator adapter over replay frames.
pub struct FrameIter<R: Read> {
    reader: R,
    done: bool,
}

impl<R: Read> Iterator for FrameIter<R> {
    type Item = Result<Frame, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_frame(&mut self.reader) {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ReplayWriter;
    use commons_core::EnvKey;
    use commons_engine::EnvConfig;

    fn raw(step: u64) -> Frame {
        Frame {
            step,
            key: step * 10,
            actions: vec![6, 6],
            state_hash: step,
        }
    }

    fn recording(frames: u64) -> Vec<u8> {
        let env = HarvestEnv::new(EnvConfig::default()).unwrap();
        let mut buf = Vec::new();
        let mut w = ReplayWriter::for_env(&mut buf, &env, EnvKey(3)).unwrap();
        for s in 1..=frames {
            w.write_raw_frame(&raw(s)).unwrap();
        }
        assert_eq!(w.frames_written(), frames);
        drop(w);
        buf
    }

    #[test]
    fn roundtrip_frames() {
        let buf = recording(4);
        let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
        assert_eq!(reader.init_descriptor().reset_key, 3);
        assert_eq!(reader.init_descriptor().num_agents, 7);
        for s in 1..=4 {
            assert_eq!(reader.next_frame().unwrap(), Some(raw(s)));
        }
        assert!(reader.next_frame().unwrap().is_none());
        assert_eq!(reader.frames_read(), 4);
    }

    #[test]
    fn embedded_config_rebuilds_environment() {
        let buf = recording(0);
        let reader = ReplayReader::open(buf.as_slice()).unwrap();
        let env = reader.environment().unwrap();
        assert_eq!(env.config(), &EnvConfig::default());
    }

    #[test]
    fn frame_iterator_stops_at_eof() {
        let buf = recording(3);
        let reader = ReplayReader::open(buf.as_slice()).unwrap();
        let frames: Vec<_> = reader.frames().collect::<Result<_, _>>().unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].step, 3);
    }

    #[test]
    fn truncated_stream_errors() {
        let mut buf = recording(1);
        buf.truncate(buf.len() - 4);
        let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
        assert!(reader.next_frame().is_err());
    }

    #[test]
    fn bad_magic_on_open() {
        let data = b"XMNS\x01rest";
        assert!(matches!(
            ReplayReader::open(data.as_slice()),
            Err(ReplayError::InvalidMagic)
        ));
    }
}
