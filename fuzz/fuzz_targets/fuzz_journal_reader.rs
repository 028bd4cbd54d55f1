//! Fuzz target: journal frame iteration + record decoding
//!
//! Treats the input as a journal file image.  Iteration must terminate,
//! never yield an empty or oversized payload, and account for every byte.
//!
//! cargo fuzz run fuzz_journal_reader

#![no_main]

use gridedge::fleet::ActionRecord;
use gridedge::protocol::framing::{Frames, MAX_FRAME_SIZE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut frames = Frames::new(data);
    let mut consumed = 0usize;
    for payload in frames.by_ref() {
        assert!(!payload.is_empty() && payload.len() <= MAX_FRAME_SIZE);
        consumed += 4 + payload.len();
        let _ = postcard::from_bytes::<ActionRecord>(payload);
    }
    assert_eq!(consumed + frames.remainder(), data.len());
});
