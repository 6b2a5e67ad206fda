//! End-to-end properties of the reconciliation pipeline: raw engine
//! events through normalize and apply, down to wire frames.

use colloquy_engine::RawAgentEvent;
use colloquy_stream::{clean, encode, normalize, OutgoingEvent, StreamState};
use serde_json::{json, Value};

fn raw(kind: &str, payload: Value) -> Option<RawAgentEvent> {
    Some(RawAgentEvent::new(kind, payload))
}

fn drive(events: Vec<Option<RawAgentEvent>>) -> Vec<OutgoingEvent> {
    let mut state = StreamState::new();
    let mut out = Vec::new();
    for event in events {
        out.extend(state.apply(normalize(event)));
        if state.is_terminal() {
            break;
        }
    }
    out
}

fn content_concat(frames: &[OutgoingEvent]) -> String {
    frames
        .iter()
        .filter_map(|f| match f {
            OutgoingEvent::Content { content } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

fn response_text(frames: &[OutgoingEvent]) -> &str {
    frames
        .iter()
        .find_map(|f| match f {
            OutgoingEvent::Response { response, .. } => Some(response.as_str()),
            _ => None,
        })
        .expect("stream has a response frame")
}

#[test]
fn test_cleaner_idempotence() {
    let inputs = [
        "I am searching the archive. Berkeley is mentioned. It was founded in 1868.",
        "Moreover, this sentence goes. This one stays because it is long enough.",
        "A paragraph about campus life\n\nA paragraph about campus life\n\nAnother one entirely about the library",
        "Now querying. Retrieving...",
    ];

    for input in inputs {
        let once = clean(input);
        assert_eq!(clean(&once), once);
    }
}

#[test]
fn test_duplicate_paragraph_signature_keeps_first() {
    // Same first-50-chars signature, different tails, both long enough.
    let first = "The nineteen sixty-four rallies are described at length in the Savio interviews";
    let second = "The nineteen sixty-four rallies are described at length but only in passing";
    let sig_first: String = first.trim().chars().take(50).collect::<String>().to_lowercase();
    let sig_second: String = second.trim().chars().take(50).collect::<String>().to_lowercase();
    assert_eq!(sig_first, sig_second);

    let cleaned = clean(&format!("{}\n\n{}", first, second));
    assert_eq!(cleaned, first);
}

#[test]
fn test_no_double_emission_for_extensions() {
    let frames = drive(vec![
        raw("text", json!({"text": "The stadium opened in nineteen twenty-three"})),
        raw(
            "text",
            json!({"text": "The stadium opened in nineteen twenty-three and held sixty thousand people"}),
        ),
        raw(
            "text",
            json!({"text": "The stadium opened in nineteen twenty-three and held sixty thousand people at capacity"}),
        ),
        raw("completed", json!(null)),
    ]);

    assert_eq!(content_concat(&frames), response_text(&frames));
}

#[test]
fn test_status_deduplication() {
    let frames = drive(vec![
        raw("status", json!({"text": "Searching collections"})),
        raw("status", json!({"text": "Searching collections"})),
        raw("status", json!({"text": "Writing answer"})),
        raw("completed", json!(null)),
    ]);

    let statuses: Vec<_> = frames
        .iter()
        .filter(|f| matches!(f, OutgoingEvent::Status { .. }))
        .collect();
    assert_eq!(statuses.len(), 2);
}

#[test]
fn test_terminal_guarantee() {
    let sequences = vec![
        vec![raw("completed", json!(null))],
        vec![
            raw("status", json!({"text": "Working"})),
            raw("text", json!({"text": "An answer that is comfortably long enough to keep."})),
            raw("completed", json!(null)),
        ],
        vec![
            raw("text", json!({"text": "First draft answer, long enough to be kept as is."})),
            raw("text", json!({"text": "Replaced answer which shares no prefix with the draft."})),
            raw("completed", json!(null)),
        ],
    ];

    for events in sequences {
        let frames = drive(events);
        assert!(frames.len() >= 2);
        assert!(matches!(frames[frames.len() - 2], OutgoingEvent::Response { .. }));
        assert!(matches!(frames[frames.len() - 1], OutgoingEvent::Done));

        let responses = frames
            .iter()
            .filter(|f| matches!(f, OutgoingEvent::Response { .. }))
            .count();
        let dones = frames
            .iter()
            .filter(|f| matches!(f, OutgoingEvent::Done))
            .count();
        assert_eq!((responses, dones), (1, 1));
    }
}

#[test]
fn test_streaming_scenario() {
    let final_text = "I am searching the archive. Berkeley is mentioned. It was founded in 1868.";
    let frames = drive(vec![
        raw("status", json!({"text": "Initializing..."})),
        raw("text", json!({"text": "I am searching the archive. Berkeley is mentioned."})),
        raw("text", json!({"text": final_text})),
        raw(
            "completed",
            json!({"conversation_history": [{"role": "assistant", "content": final_text}]}),
        ),
    ]);

    assert_eq!(frames.len(), 5);
    match &frames[0] {
        OutgoingEvent::Status { message } => assert_eq!(message, "Initializing..."),
        other => panic!("Expected Status, got {:?}", other),
    }
    match &frames[1] {
        OutgoingEvent::Content { content } => assert_eq!(content, "Berkeley is mentioned."),
        other => panic!("Expected Content, got {:?}", other),
    }
    match &frames[2] {
        OutgoingEvent::Content { content } => assert_eq!(content, " It was founded in 1868."),
        other => panic!("Expected Content, got {:?}", other),
    }
    match &frames[3] {
        OutgoingEvent::Response { response, objects } => {
            assert_eq!(response, "Berkeley is mentioned. It was founded in 1868.");
            assert!(objects.is_empty());
        }
        other => panic!("Expected Response, got {:?}", other),
    }
    assert!(matches!(frames[4], OutgoingEvent::Done));
}

#[test]
fn test_non_extension_scenario() {
    let replacement = "Completely different answer, rewritten from scratch late in the run.";
    let frames = drive(vec![
        raw("text", json!({"text": "Draft answer that will be thrown away by the agent."})),
        raw("text", json!({"text": replacement})),
        raw(
            "completed",
            json!({"conversation_history": [{"role": "assistant", "content": replacement}]}),
        ),
    ]);

    // One content frame for the draft, none for the replacement; the
    // response frame carries the corrected full text exactly once.
    let contents: Vec<_> = frames
        .iter()
        .filter(|f| matches!(f, OutgoingEvent::Content { .. }))
        .collect();
    assert_eq!(contents.len(), 1);
    assert_eq!(response_text(&frames), replacement);
}

#[test]
fn test_objects_travel_once() {
    let frames = drive(vec![
        raw("result", json!({"objects": [{"id": 1}, {"id": 2}]})),
        raw("result", json!({"objects": [{"id": 3}]})),
        raw(
            "text",
            json!({"text": "The retrieved segments all concern the same interview."}),
        ),
        raw("completed", json!(null)),
    ]);

    let counts: Vec<usize> = frames
        .iter()
        .filter_map(|f| match f {
            OutgoingEvent::Objects { count } => Some(*count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![2, 3]);

    assert!(matches!(frames.last(), Some(OutgoingEvent::Done)));
    match &frames[frames.len() - 2] {
        OutgoingEvent::Response { objects, .. } => assert_eq!(objects.len(), 3),
        other => panic!("Expected Response, got {:?}", other),
    }
}

#[test]
fn test_unknown_and_null_events_are_transparent() {
    let frames = drive(vec![
        None,
        raw("tree_update", json!({"reasoning": "choosing a branch"})),
        raw("heartbeat", json!({})),
        raw("text", json!({"text": "Only this answer text should ever reach the wire."})),
        raw("completed", json!(null)),
    ]);

    assert_eq!(frames.len(), 3);
    assert!(matches!(frames[0], OutgoingEvent::Content { .. }));
}

#[test]
fn test_scenario_frames_encode_to_wire_format() {
    let frames = drive(vec![
        raw("status", json!({"text": "Initializing..."})),
        raw("completed", json!(null)),
    ]);

    let wire: Vec<String> = frames.iter().map(|f| encode(f).unwrap()).collect();
    assert_eq!(wire[0], "data: {\"type\":\"status\",\"message\":\"Initializing...\"}\n\n");
    assert!(wire.iter().all(|f| f.starts_with("data: ") && f.ends_with("\n\n")));
    assert_eq!(wire.last().unwrap(), "data: {\"type\":\"done\"}\n\n");
}
