//! Decoder properties over the full Forza Horizon 4 schema.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use paddock::schema::{fh4::PACKET_SIZE, forza_horizon_4};
use paddock::{Classification, Decoder, LabelFilter, PacketSchema, TelemetryError, decode};

fn schema() -> PacketSchema {
    forza_horizon_4().unwrap()
}

fn emitted_labels(schema: &PacketSchema) -> Vec<String> {
    schema
        .labels(Classification::Field)
        .chain(schema.labels(Classification::Tag))
        .map(str::to_string)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_full_width_buffer_decodes(bytes in prop::collection::vec(any::<u8>(), PACKET_SIZE)) {
        let schema = schema();
        let packet = decode(&bytes, &schema, &LabelFilter::allow_all()).unwrap();

        // Every field and tag is present when nothing is filtered.
        prop_assert_eq!(packet.fields().len(), schema.labels(Classification::Field).count());
        prop_assert_eq!(packet.tags().len(), schema.labels(Classification::Tag).count());
    }

    #[test]
    fn allow_list_is_intersection(
        bytes in prop::collection::vec(any::<u8>(), PACKET_SIZE),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let schema = schema();
        let labels = emitted_labels(&schema);
        let mut allowed: HashSet<String> = picks.iter().map(|i| i.get(&labels).clone()).collect();
        allowed.insert("timestamp_ms".to_string());
        allowed.insert("not_a_label".to_string());

        let everything = decode(&bytes, &schema, &LabelFilter::allow_all()).unwrap();
        let subset = decode(&bytes, &schema, &LabelFilter::allow_list(allowed.iter().cloned())).unwrap();

        let expected: HashSet<&str> = everything.labels().filter(|l| allowed.contains(*l)).collect();
        let actual: HashSet<&str> = subset.labels().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn any_wrong_length_fails(len in 0usize..(2 * PACKET_SIZE)) {
        prop_assume!(len != PACKET_SIZE);
        let result = decode(&vec![0u8; len], &schema(), &LabelFilter::allow_all());
        let malformed = matches!(
            result,
            Err(ref e @ (TelemetryError::Truncated { .. } | TelemetryError::Oversized { .. })) if e.is_malformed_packet()
        );
        prop_assert!(malformed);
    }
}

#[test]
fn shared_decoder_across_threads() {
    let decoder = Decoder::new(Arc::new(schema()), LabelFilter::allow_list(["speed", "gear"]));

    let handles: Vec<_> = (0u8..8)
        .map(|seed| {
            let decoder = decoder.clone();
            std::thread::spawn(move || {
                let buffer = vec![seed; PACKET_SIZE];
                let first = decoder.decode(&buffer).unwrap();
                let second = decoder.decode(&buffer).unwrap();
                assert_eq!(first, second);
                first.fields().len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
