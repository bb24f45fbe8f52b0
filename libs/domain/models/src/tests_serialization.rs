// [libs/domain/models/src/tests_serialization.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE PARIDAD DE SERIALIZACIÓN (V2.2)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2
 * RESPONSABILIDAD: AUDITORÍA DE CONTRATOS SERDE EN EL ALAMBRE
 * =================================================================
 */

use super::*;
use serde_json::json;

#[test]
fn letter_event_prediction_round_trips_with_tagged_union() {
    let wire_payload = json!({
        "session_id": "sess-01",
        "connection_id": "conn-01",
        "timestamp": "2026-02-11T10:00:00Z",
        "event_type": "prediction",
        "prediction": "A",
        "confidence": 0.92,
        "handedness": "right",
        "multi_hand": false,
        "processing_time_ms": 4.2,
        "metadata": {"source": "letter-engine"}
    });

    let parsed_event: LetterEvent =
        serde_json::from_value(wire_payload).expect("WIRE_FAULT: prediction rejected");

    match parsed_event {
        LetterEvent::Prediction { prediction, confidence, handedness, .. } => {
            assert_eq!(prediction, "A");
            assert!((confidence - 0.92).abs() < f64::EPSILON);
            assert_eq!(handedness, Handedness::Right);
        }
        LetterEvent::Skip { .. } => panic!("TAG_FAULT: prediction decoded as skip"),
    }
}

#[test]
fn letter_event_skip_round_trips_with_reason() {
    let wire_payload = json!({
        "session_id": "sess-02",
        "connection_id": "conn-02",
        "timestamp": "2026-02-11T10:00:01Z",
        "event_type": "skip",
        "skip_reason": "multi_hand",
        "multi_hand": true,
        "processing_time_ms": 1.1,
        "metadata": null
    });

    let parsed_event: LetterEvent =
        serde_json::from_value(wire_payload).expect("WIRE_FAULT: skip rejected");

    match parsed_event {
        LetterEvent::Skip { skip_reason, multi_hand, session_id, .. } => {
            assert_eq!(skip_reason, SkipReason::MultiHand);
            assert!(multi_hand);
            assert_eq!(session_id, "sess-02");
        }
        LetterEvent::Prediction { .. } => panic!("TAG_FAULT: skip decoded as prediction"),
    }
}

#[test]
fn landmark_record_geometry_guard_detects_violations() {
    let mut record = LandmarkRecord {
        session_id: "sess-03".into(),
        connection_id: "conn-03".into(),
        timestamp: "2026-02-11T10:00:02Z".into(),
        landmarks: vec![0.0; HOLISTIC_FRAME_VALUES],
        metadata: SourceMeta { source: "websocket".into(), event_time: Some(1_770_000_000_000) },
    };
    assert!(record.has_valid_geometry());

    record.landmarks.pop();
    assert!(!record.has_valid_geometry(), "CARDINALITY_FAULT: 1661 values accepted");

    record.landmarks.push(f64::NAN);
    assert!(!record.has_valid_geometry(), "FINITUDE_FAULT: NaN accepted");
}

#[test]
fn word_buffer_tracks_commit_chronology() {
    let mut buffer = WordBuffer::new("sess-04", "user-04", 1000.0);
    assert_eq!(buffer.current_word(), "");
    assert!(buffer.time_since_last_commit_ms(1001.0).is_none());

    buffer.letters.extend(['A', 'W', 'S']);
    buffer.last_commit_time = Some(1000.6);

    assert_eq!(buffer.current_word(), "AWS");
    let elapsed_ms = buffer.time_since_last_commit_ms(1002.6).expect("CHRONO_FAULT");
    assert!((elapsed_ms - 2000.0).abs() < 1e-6);
}

#[test]
fn alias_job_status_survives_ledger_round_trip() {
    for status in [
        AliasJobStatus::Running,
        AliasJobStatus::Succeeded,
        AliasJobStatus::Failed,
        AliasJobStatus::Ingested,
        AliasJobStatus::Completed,
    ] {
        let stored: String = status.to_string();
        let recovered: AliasJobStatus = stored.parse().expect("LEDGER_FAULT: status unparsable");
        assert_eq!(recovered, status);
    }
    assert!("ARCHIVED".parse::<AliasJobStatus>().is_err());
}

#[test]
fn alphabet_contains_exactly_the_recognition_symbols() {
    assert_eq!(RECOGNITION_ALPHABET.len(), 37);
    assert!(is_alphabet_symbol('A'));
    assert!(is_alphabet_symbol('0'));
    assert!(is_alphabet_symbol('_'));
    assert!(!is_alphabet_symbol('a'));
    assert!(!is_alphabet_symbol('-'));
}
