//! Action journal adapters.
//!
//! - [`ActionJournal`] appends postcard-encoded [`ActionRecord`]s to a
//!   file, one length-prefixed frame per record.
//! - [`QueuedActionLog`] is what the control loop holds: it hands records
//!   to the I/O thread through a bounded channel and never blocks.
//! - [`read_journal`] loads a journal back.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use log::warn;

use crate::app::ports::{ActionLog, ActionLogError};
use crate::fleet::ActionRecord;
use crate::net::channels::JournalChannel;
use crate::protocol::framing::{Frames, encode_frame};

// ───────────────────────────────────────────────────────────────
// File journal
// ───────────────────────────────────────────────────────────────

pub struct ActionJournal {
    file: File,
    scratch: Vec<u8>,
}

impl ActionJournal {
    /// Open `path` for appending, creating it if needed.
    ///
    /// A torn frame left by an interrupted append is cut off first, so new
    /// records start on a frame boundary.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let mut existing = Vec::new();
        file.read_to_end(&mut existing)?;
        let mut frames = Frames::new(&existing);
        while frames.next().is_some() {}
        let torn = frames.remainder();
        if torn > 0 {
            warn!("Journal: truncating {} torn bytes", torn);
            file.set_len((existing.len() - torn) as u64)?;
        }

        Ok(Self {
            file,
            scratch: Vec::with_capacity(32),
        })
    }
}

impl ActionLog for ActionJournal {
    fn append(&mut self, record: ActionRecord) -> Result<(), ActionLogError> {
        let payload = postcard::to_allocvec(&record).map_err(|_| ActionLogError::Encode)?;
        self.scratch.clear();
        encode_frame(&payload, &mut self.scratch).ok_or(ActionLogError::Encode)?;
        self.file
            .write_all(&self.scratch)
            .and_then(|()| self.file.flush())
            .map_err(|_| ActionLogError::IoError)
    }
}

/// Every complete record in the journal at `path`, oldest first.
///
/// A torn trailing frame is ignored.  Reading stops at the first frame
/// that does not decode.
pub fn read_journal(path: impl AsRef<Path>) -> io::Result<Vec<ActionRecord>> {
    let mut buf = Vec::new();
    File::open(path)?.read_to_end(&mut buf)?;

    let mut frames = Frames::new(&buf);
    let mut records = Vec::new();
    for payload in frames.by_ref() {
        match postcard::from_bytes::<ActionRecord>(payload) {
            Ok(r) => records.push(r),
            Err(_) => {
                warn!("Journal: undecodable record after {} entries", records.len());
                return Ok(records);
            }
        }
    }
    if frames.remainder() > 0 {
        warn!("Journal: ignoring {} trailing bytes", frames.remainder());
    }
    Ok(records)
}

// ───────────────────────────────────────────────────────────────
// Channel-backed log (control loop side)
// ───────────────────────────────────────────────────────────────

pub struct QueuedActionLog<'a> {
    channel: &'a JournalChannel,
}

impl<'a> QueuedActionLog<'a> {
    pub fn new(channel: &'a JournalChannel) -> Self {
        Self { channel }
    }
}

impl ActionLog for QueuedActionLog<'_> {
    fn append(&mut self, record: ActionRecord) -> Result<(), ActionLogError> {
        self.channel
            .try_send(record)
            .map_err(|_| ActionLogError::QueueFull)
    }
}
