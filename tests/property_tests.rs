//! Property tests for the control packet codec and the decision engine.

use std::collections::BTreeSet;

use gridedge::control::DecisionEngine;
use gridedge::fleet::HouseSample;
use gridedge::protocol::packet::{ControlPacket, MAX_PARAMETERS};
use gridedge::protocol::{ParamType, ParamValue, ParameterOracle, ParameterSpec};
use proptest::prelude::*;

fn oracle() -> ParameterOracle {
    ParameterOracle::new((0..=u8::MAX).map(|id| ParameterSpec {
        name: format!("p{id}"),
        id,
        kind: match id % 3 {
            0 => ParamType::Bool,
            1 => ParamType::Int,
            _ => ParamType::Float,
        },
    }))
}

fn value_for(id: u8, raw: u64) -> ParamValue {
    match id % 3 {
        0 => ParamValue::Bool(raw & 1 == 1),
        1 => ParamValue::Int(raw),
        _ => ParamValue::Float(raw as f64 / 7.0),
    }
}

#[derive(Debug, Clone)]
enum Op {
    Clock(u32),
    Param(u8, u64),
    Signal(bool, u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u32>().prop_map(Op::Clock),
        (any::<u8>(), any::<u64>()).prop_map(|(id, v)| Op::Param(id, v)),
        (any::<bool>(), any::<u8>()).prop_map(|(on, d)| Op::Signal(on, d)),
    ]
}

fn apply(packet: &mut ControlPacket, oracle: &ParameterOracle, op: &Op) {
    match *op {
        Op::Clock(v) => packet.add_clock_sync(v).unwrap(),
        Op::Param(id, raw) => packet.add_parameter(oracle, id, value_for(id, raw)).unwrap(),
        Op::Signal(on, d) => packet.add_device_signal(on, d).unwrap(),
    }
}

// ── Packet codec ──────────────────────────────────────────────

proptest! {
    /// Whatever the mutation order, the encoded bytes parse back to the
    /// same packet and the last write of each field wins.
    #[test]
    fn packet_round_trips_and_last_write_wins(ops in proptest::collection::vec(op(), 0..24)) {
        let o = oracle();
        let mut p = ControlPacket::new();
        for op in &ops {
            apply(&mut p, &o, op);
        }

        let parsed = ControlPacket::from_bytes(&p.encode()).unwrap();
        prop_assert_eq!(&parsed, &p);

        let d = p.decode().unwrap();
        let last_clock = ops.iter().rev().find_map(|op| match op {
            Op::Clock(v) => Some(*v),
            _ => None,
        });
        prop_assert_eq!(d.clock, last_clock);

        let last_signal = ops.iter().rev().find_map(|op| match op {
            Op::Signal(on, devs) => Some((*on, *devs)),
            _ => None,
        });
        prop_assert_eq!(p.device_signal(), last_signal);
    }

    /// Parameter ids are strictly ascending after any sequence of adds,
    /// so a repeated id replaces instead of duplicating.
    #[test]
    fn parameter_ids_sorted_and_unique(ops in proptest::collection::vec((any::<u8>(), any::<u64>()), 1..40)) {
        let o = oracle();
        let mut p = ControlPacket::new();
        for (id, raw) in &ops {
            p.add_parameter(&o, *id, value_for(*id, *raw)).unwrap();
        }
        let ids: Vec<u8> = p.decode().unwrap().parameters.unwrap().iter().map(|p| p.id).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let distinct: BTreeSet<u8> = ops.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(ids.len(), distinct.len());
        prop_assert!(ids.len() <= MAX_PARAMETERS);
    }

    /// Arbitrary bytes either fail to parse or re-encode byte-identically.
    #[test]
    fn parser_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        if let Ok(p) = ControlPacket::from_bytes(&bytes) {
            prop_assert_eq!(p.encode(), bytes);
        }
    }
}

// ── Decision engine ───────────────────────────────────────────

fn sample_set() -> impl Strategy<Value = Vec<HouseSample>> {
    proptest::collection::vec((0.0f32..8.0, -20.0f32..30.0), 0..8).prop_map(|v| {
        v.into_iter()
            .enumerate()
            .map(|(i, (power_usage, temperature))| HouseSample {
                house_id: i as u32 + 1,
                device_state: 1,
                power_usage,
                temperature,
                timestamp: 0,
            })
            .collect()
    })
}

proptest! {
    // The in-band `prop_assume!` below rejects most generated sets; raise the
    // reject budget so the runner can reach its case count.
    #![proptest_config(ProptestConfig { max_global_rejects: 16384, ..ProptestConfig::default() })]

    /// Same input, same output.
    #[test]
    fn decide_is_deterministic(samples in sample_set(), mask in any::<u8>()) {
        let engine = DecisionEngine::new(5.0, 10.0);
        let suppressed: BTreeSet<u32> = samples
            .iter()
            .filter(|s| mask & (1 << (s.house_id - 1)) != 0)
            .map(|s| s.house_id)
            .collect();
        prop_assert_eq!(
            engine.decide(&samples, &suppressed),
            engine.decide(&samples, &suppressed)
        );
    }

    /// Inside the band with nothing suppressed the engine never acts.
    #[test]
    fn hysteresis_holds_in_band(samples in sample_set()) {
        let engine = DecisionEngine::new(5.0, 10.0);
        let total: f32 = samples.iter().map(|s| s.power_usage).sum();
        prop_assume!(total > 5.0 && total < 10.0);
        prop_assert_eq!(engine.decide(&samples, &BTreeSet::new()), Ok(None));
    }
}
