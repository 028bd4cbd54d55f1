//! Fuzz target: `TelemetryReading::decode`
//!
//! Accepted readings are finite and re-encode to the first 13 input bytes.
//!
//! cargo fuzz run fuzz_telemetry_datagram

#![no_main]

use gridedge::protocol::TelemetryReading;
use gridedge::protocol::telemetry::TELEMETRY_LEN;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(r) = TelemetryReading::decode(data) {
        assert!(r.power_usage.is_finite() && r.temperature.is_finite());
        assert_eq!(&r.encode()[..], &data[..TELEMETRY_LEN]);
    }
});
