#![forbid(unsafe_code)]

//! Console-line envelope codec for the `pagesense-sig-v1` frame format.
//!
//! One [`Signal`] maps to exactly one frame, a single line of text:
//!
//! ```text
//! +----------------+--------------------------------+
//! | PAGESENSE_SIG: | base64(JSON(signal))           |
//! +----------------+--------------------------------+
//! ```
//!
//! - **prefix**: fixed literal, agreed out-of-band, never negotiated.
//! - **payload**: the signal serialized as JSON, then base64 (standard
//!   alphabet, padded) so the result is one printable line.
//!
//! The payload format is fixed process-wide. The producer and the host
//! decoder must both speak [`PROTOCOL_VERSION`]; a payload in any other
//! encoding (MessagePack, say) must surface as a [`CodecError`], never be
//! sniffed or fallen back from. Frames carry no length or sequence
//! number; ordering is transport emission order.

use crate::signal::Signal;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed literal that opens every frame line.
pub const FRAME_PREFIX: &str = "PAGESENSE_SIG:";

/// Name of the declared payload format both sides must implement.
///
/// This string never appears on the wire; it names the contract that the
/// conformance tests pin.
pub const PROTOCOL_VERSION: &str = "pagesense-sig-v1";

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Errors from encoding a signal or decoding a frame payload.
///
/// Every decode failure is distinct and loud so the host can report a
/// format mismatch as such, instead of mistaking it for a non-frame line
/// or for a signal from a different source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The payload is not valid base64 (standard alphabet, padded).
    Base64(String),
    /// The base64 decoded, but the bytes are not UTF-8 text. A binary
    /// payload (e.g. MessagePack) lands here.
    NonUtf8Payload,
    /// JSON (de)serialization failed: malformed JSON, a missing field, or
    /// an unknown source tag.
    Json(String),
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Base64(msg) => write!(f, "invalid base64 payload: {msg}"),
            Self::NonUtf8Payload => write!(f, "payload bytes are not UTF-8 ({PROTOCOL_VERSION} expects JSON text)"),
            Self::Json(msg) => write!(f, "payload is not a {PROTOCOL_VERSION} signal: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode a signal into one frame line: `PAGESENSE_SIG:` + base64(JSON).
///
/// The output contains no newline: base64 over the standard alphabet is a
/// single printable run, and the prefix is a fixed literal. A signal whose
/// `value` cannot serialize fails only this emission; the caller drops the
/// frame and the channel stays usable for the next signal.
pub fn encode(signal: &Signal) -> Result<String, CodecError> {
    let json = serde_json::to_vec(signal).map_err(|e| CodecError::Json(e.to_string()))?;
    let mut frame = String::with_capacity(FRAME_PREFIX.len() + json.len().div_ceil(3) * 4);
    frame.push_str(FRAME_PREFIX);
    STANDARD.encode_string(&json, &mut frame);
    Ok(frame)
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Recognize a frame line and return its payload.
///
/// `None` means the line is not a protocol frame at all (no prefix) and
/// must be ignored by consumers, not reported as an error. The match is
/// exact and case-sensitive.
#[must_use]
pub fn frame_payload(line: &str) -> Option<&str> {
    line.strip_prefix(FRAME_PREFIX)
}

/// Decode a frame payload (the text after the prefix) into a signal.
pub fn decode_payload(payload: &str) -> Result<Signal, CodecError> {
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CodecError::Base64(e.to_string()))?;
    let text = std::str::from_utf8(&bytes).map_err(|_| CodecError::NonUtf8Payload)?;
    serde_json::from_str(text).map_err(|e| CodecError::Json(e.to_string()))
}

/// Classify and decode one line from the transport stream.
///
/// - `None`: not a frame; ignore.
/// - `Some(Ok(signal))`: a well-formed frame.
/// - `Some(Err(e))`: a frame whose payload does not decode under
///   [`PROTOCOL_VERSION`] — a protocol compatibility error, to be reported
///   distinctly from the `None` case.
#[must_use]
pub fn decode_line(line: &str) -> Option<Result<Signal, CodecError>> {
    frame_payload(line).map(decode_payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalSource;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    // -- Wire format verification --

    #[test]
    fn fiber_wire_format_is_exact() {
        let signal = Signal::new(SignalSource::Fiber, "root", Value::Null, 0);
        let frame = encode(&signal).unwrap();
        // base64 of {"source":"Fiber","selector":"root","value":null,"timestamp":0}
        assert_eq!(
            frame,
            "PAGESENSE_SIG:eyJzb3VyY2UiOiJGaWJlciIsInNlbGVjdG9yIjoicm9vdCIsInZhbHVlIjpudWxsLCJ0aW1lc3RhbXAiOjB9"
        );
    }

    #[test]
    fn dom_wire_format_is_exact() {
        let signal = Signal::new(
            SignalSource::Dom,
            "DIV",
            json!({"type": "childList", "id": "x"}),
            1,
        );
        let frame = encode(&signal).unwrap();
        // JSON object keys inside `value` serialize in sorted order
        // ("id" before "type"); the envelope fields keep declaration order.
        assert_eq!(
            frame,
            "PAGESENSE_SIG:eyJzb3VyY2UiOiJET00iLCJzZWxlY3RvciI6IkRJViIsInZhbHVlIjp7ImlkIjoieCIsInR5cGUiOiJjaGlsZExpc3QifSwidGltZXN0YW1wIjoxfQ=="
        );
    }

    #[test]
    fn frame_is_single_line_and_prefixed() {
        let signal = Signal::new(
            SignalSource::Dom,
            "PRE",
            json!({"type": "childList", "id": "multi\nline\tid"}),
            99,
        );
        let frame = encode(&signal).unwrap();
        assert!(frame.starts_with(FRAME_PREFIX));
        assert!(!frame.contains('\n'));
        assert!(!frame.contains('\r'));
    }

    // -- Round-trip --

    #[test]
    fn roundtrip_fiber_found() {
        let signal = Signal::new(
            SignalSource::Fiber,
            "root",
            json!({"status": "found", "key": null}),
            42,
        );
        let frame = encode(&signal).unwrap();
        let decoded = decode_line(&frame).unwrap().unwrap();
        assert_eq!(decoded, signal);
    }

    #[test]
    fn roundtrip_all_sources() {
        for source in [SignalSource::Fiber, SignalSource::Dom, SignalSource::Network] {
            let signal = Signal::new(source, "sel", json!({"k": "v"}), 7);
            let decoded = decode_line(&encode(&signal).unwrap()).unwrap().unwrap();
            assert_eq!(decoded, signal, "roundtrip failed for {source:?}");
        }
    }

    #[test]
    fn roundtrip_unicode_selector_and_value() {
        let signal = Signal::new(
            SignalSource::Dom,
            "CUSTOM-ÉLÉMENT",
            json!({"type": "attributes", "id": "日本語-id"}),
            u64::MAX,
        );
        let decoded = decode_line(&encode(&signal).unwrap()).unwrap().unwrap();
        assert_eq!(decoded, signal);
    }

    // -- Frame recognition --

    #[test]
    fn non_frame_lines_are_not_frames() {
        assert_eq!(decode_line("PageSense bridge: online"), None);
        assert_eq!(decode_line(""), None);
        assert_eq!(decode_line("PAGESENSE_SIG"), None); // missing colon
        assert_eq!(decode_line("pagesense_sig:abc"), None); // case-sensitive
        assert_eq!(decode_line(" PAGESENSE_SIG:abc"), None); // leading junk
    }

    #[test]
    fn prefix_recognition_strips_exactly_the_prefix() {
        assert_eq!(frame_payload("PAGESENSE_SIG:abc"), Some("abc"));
        assert_eq!(frame_payload("PAGESENSE_SIG:"), Some(""));
        assert_eq!(frame_payload("no prefix here"), None);
    }

    // -- Decode failures are distinct and loud --

    #[test]
    fn invalid_base64_is_rejected() {
        let result = decode_line("PAGESENSE_SIG:!!!not-base64!!!").unwrap();
        assert!(matches!(result, Err(CodecError::Base64(_))));
    }

    #[test]
    fn empty_payload_is_a_format_mismatch() {
        let result = decode_line("PAGESENSE_SIG:").unwrap();
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn non_utf8_payload_is_rejected() {
        // base64 of the bytes FF FE FD.
        let result = decode_line("PAGESENSE_SIG://79").unwrap();
        assert_eq!(result, Err(CodecError::NonUtf8Payload));
    }

    #[test]
    fn messagepack_payload_is_a_format_mismatch() {
        // A MessagePack fixmap {"source": "Fiber"}: 0x81 starts the map and
        // is never valid UTF-8 as a leading byte.
        let msgpack = [0x81u8, 0xA6, b's', b'o', b'u', b'r', b'c', b'e', 0xA5, b'F', b'i', b'b', b'e', b'r'];
        let payload = STANDARD.encode(msgpack);
        let result = decode_payload(&payload);
        assert_eq!(result, Err(CodecError::NonUtf8Payload));
    }

    #[test]
    fn non_json_text_is_rejected() {
        // base64 of "not json".
        let result = decode_line("PAGESENSE_SIG:bm90IGpzb24=").unwrap();
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn unknown_source_tag_is_rejected() {
        // base64 of {"source":"Timer","selector":"x","value":null,"timestamp":0}
        let result = decode_line(
            "PAGESENSE_SIG:eyJzb3VyY2UiOiJUaW1lciIsInNlbGVjdG9yIjoieCIsInZhbHVlIjpudWxsLCJ0aW1lc3RhbXAiOjB9",
        )
        .unwrap();
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn missing_field_is_rejected() {
        let payload = STANDARD.encode(r#"{"source":"DOM","selector":"DIV"}"#);
        let result = decode_payload(&payload);
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn error_display_names_the_protocol() {
        let err = decode_payload("AAAA").unwrap_err();
        assert!(format!("{err}").contains(PROTOCOL_VERSION));
    }

    // -- Property: decode(encode(s)) == s --

    fn value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 _.-]{0,24}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 16, 4, |inner| {
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        })
    }

    proptest! {
        #[test]
        fn roundtrip_holds_for_arbitrary_signals(
            source in prop_oneof![
                Just(SignalSource::Fiber),
                Just(SignalSource::Dom),
                Just(SignalSource::Network),
            ],
            selector in "\\PC{0,32}",
            value in value_strategy(),
            timestamp in any::<u64>(),
        ) {
            let signal = Signal::new(source, selector, value, timestamp);
            let frame = encode(&signal).unwrap();
            prop_assert!(!frame.contains('\n'));
            let decoded = decode_line(&frame).unwrap().unwrap();
            prop_assert_eq!(decoded, signal);
        }
    }
}
