//! Append-only operation journal: binary protobuf log.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][protobuf bytes][4-byte LE length][protobuf bytes]...
//!
//! Rules:
//!   - strict append only, no mutation or deletion
//!   - fsync after every write
//!   - sequence strictly increasing by one, checked on append and on load
//!   - a zero or oversized length, a truncated frame or an undecodable
//!     frame marks the journal as corrupted

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;
use tracing::{debug, warn};

use lineup_engine::OperationEnvelope;

use crate::error::{Result, RuntimeError};
use crate::proto_bridge::{envelope_to_proto, proto_to_envelope};
use crate::proto_types::ProtoOperationEnvelope;

const MAX_FRAME: usize = 1024 * 1024;

#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    last_sequence: u64,
}

impl Journal {
    /// Open or create a journal. Existing entries are read and validated
    /// to find the last sequence number.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let last_sequence = if path.exists() {
            let entries = Self::read_all_from_file(path)?;
            entries.last().map(|e| e.sequence).unwrap_or(0)
        } else {
            0
        };
        debug!(path = %path.display(), last_sequence, "journal opened");
        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Append one entry. Its sequence must follow the last one exactly.
    pub fn append(&mut self, envelope: &OperationEnvelope) -> Result<()> {
        let expected = self.last_sequence + 1;
        if envelope.sequence != expected {
            return Err(RuntimeError::Journal(format!(
                "sequence violation: expected {}, got {}",
                expected, envelope.sequence
            )));
        }

        let buf = envelope_to_proto(envelope).encode_to_vec();
        let len = u32::try_from(buf.len())
            .map_err(|_| RuntimeError::Journal(format!("frame of {} bytes is too large", buf.len())))?;

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        {
            let mut writer = BufWriter::new(&mut file);
            writer.write_all(&len.to_le_bytes())?;
            writer.write_all(&buf)?;
            writer.flush()?;
        }
        file.sync_all()?;

        self.last_sequence = envelope.sequence;
        Ok(())
    }

    /// Every entry in sequence order.
    pub fn load_all(&self) -> Result<Vec<OperationEnvelope>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Self::read_all_from_file(&self.path)
    }

    fn read_all_from_file(path: &Path) -> Result<Vec<OperationEnvelope>> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut entries: Vec<OperationEnvelope> = Vec::new();
        let mut len_buf = [0u8; 4];
        let mut offset = 0u64;

        loop {
            match reader.read_exact(&mut len_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len == 0 || len > MAX_FRAME {
                return Err(corrupted(path, offset, format!("invalid frame length {}", len)));
            }

            let mut frame = vec![0u8; len];
            reader
                .read_exact(&mut frame)
                .map_err(|e| corrupted(path, offset, format!("truncated frame: {}", e)))?;

            let proto = ProtoOperationEnvelope::decode(frame.as_slice())
                .map_err(|e| corrupted(path, offset, format!("undecodable frame: {}", e)))?;
            let entry = proto_to_envelope(&proto)?;

            let expected = entries.last().map(|e| e.sequence).unwrap_or(0) + 1;
            if entry.sequence != expected {
                return Err(corrupted(
                    path,
                    offset,
                    format!("expected sequence {}, found {}", expected, entry.sequence),
                ));
            }

            entries.push(entry);
            offset += 4 + len as u64;
        }

        Ok(entries)
    }
}

fn corrupted(path: &Path, offset: u64, why: String) -> RuntimeError {
    warn!(path = %path.display(), offset, %why, "journal corrupted");
    RuntimeError::Journal(format!("corrupted at byte {}: {}", offset, why))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_engine::{Operation, PlayerId};

    fn entry(sequence: u64) -> OperationEnvelope {
        OperationEnvelope {
            sequence,
            op: Operation::PinchHit {
                order: 4,
                substitute: PlayerId(10),
            },
        }
    }

    #[test]
    fn append_then_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("game").join("operations.log");
        {
            let mut journal = Journal::open(&path).unwrap();
            journal.append(&entry(1)).unwrap();
            journal.append(&entry(2)).unwrap();
        }
        let journal = Journal::open(&path).unwrap();
        assert_eq!(journal.last_sequence(), 2);
        assert_eq!(journal.load_all().unwrap(), vec![entry(1), entry(2)]);
    }

    #[test]
    fn out_of_order_append_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut journal = Journal::open(&tmp.path().join("operations.log")).unwrap();
        assert!(journal.append(&entry(2)).is_err());
        journal.append(&entry(1)).unwrap();
        assert!(journal.append(&entry(1)).is_err());
        assert_eq!(journal.last_sequence(), 1);
    }

    #[test]
    fn zero_length_frame_is_corruption() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("operations.log");
        std::fs::write(&path, [0u8, 0, 0, 0]).unwrap();
        let err = Journal::open(&path).unwrap_err();
        assert!(err.to_string().contains("invalid frame length 0"), "{}", err);
    }
}
