//! Built-in codec set.
//!
//! Matching rules follow the persisted grammar exactly; see each codec.
//! Note the deliberate gaps: dotted IP literals are guarded so the numeric
//! codecs cannot capture them, and commas inside encoded array elements are
//! not escaped, so such elements will corrupt on decode. The latter is a
//! documented limitation of the format, not something the codecs repair.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::{Codec, CodecRegistry};
use crate::value::{RangeValue, Value};

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

/// `[a,b,c]`: comma-joined recursively encoded elements.
pub struct ArrayCodec;

impl Codec for ArrayCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Array(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        text.len() >= 2 && text.starts_with('[') && text.ends_with(']')
    }

    fn encode(&self, value: &Value, registry: &CodecRegistry) -> String {
        let Value::Array(items) = value else {
            return value.to_string();
        };
        let encoded: Vec<String> = items.iter().map(|item| registry.encode(item)).collect();
        format!("[{}]", encoded.join(","))
    }

    fn decode(&self, text: &str, registry: &CodecRegistry) -> Value {
        let inner = &text[1..text.len() - 1];
        if inner.is_empty() {
            return Value::Array(Vec::new());
        }
        Value::Array(inner.split(',').map(|item| registry.decode(item)).collect())
    }
}

/// `true` / `false`, case-insensitive on decode.
pub struct BooleanCodec;

impl Codec for BooleanCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        value.to_string()
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        Value::Bool(text.eq_ignore_ascii_case("true"))
    }
}

/// `:name`: atom-like identifier with a leading colon.
pub struct SymbolCodec;

impl Codec for SymbolCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Symbol(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        text.starts_with(':')
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        value.to_string()
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        Value::Symbol(text[1..].to_string())
    }
}

/// `1..10` (inclusive) / `1...10` (end-exclusive) integer intervals.
///
/// Decode tolerates surrounding whitespace and zero-padded endpoints:
/// `"00 .. 09"` decodes to the inclusive range 0..9. Text that contains
/// `..` but does not parse as two integer endpoints is returned unchanged.
pub struct RangeCodec;

impl Codec for RangeCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Range(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        text.contains("..")
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        value.to_string()
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        let (start, end, exclusive) = match text.find("...") {
            Some(idx) => (&text[..idx], &text[idx + 3..], true),
            None => match text.find("..") {
                Some(idx) => (&text[..idx], &text[idx + 2..], false),
                None => return Value::Text(text.to_string()),
            },
        };
        // i64 parsing accepts zero-padded endpoints like "09" directly.
        match (start.trim().parse::<i64>(), end.trim().parse::<i64>()) {
            (Ok(start), Ok(end)) => Value::Range(RangeValue {
                start,
                end,
                exclusive,
            }),
            _ => Value::Text(text.to_string()),
        }
    }
}

/// `YYYY-MM-DD`, no time-of-day.
pub struct DateCodec;

impl DateCodec {
    fn looks_like_date(text: &str) -> bool {
        let mut parts = text.split('-');
        matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some(y), Some(m), Some(d), None)
                if is_all_digits(y) && is_all_digits(m) && is_all_digits(d)
        )
    }
}

impl Codec for DateCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Date(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        Self::looks_like_date(text)
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        value.to_string()
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(date) => Value::Date(date),
            Err(_) => Value::Text(text.to_string()),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS TZ`.
///
/// Values are held in UTC. Encoding writes a literal `UTC` suffix; decoding
/// accepts `UTC`/`GMT`/`Z`, a numeric offset, or no zone at all (taken as
/// UTC).
pub struct TimeCodec;

impl TimeCodec {
    /// Split "YYYY-MM-DD HH:MM:SS[ TZ]" into the timestamp and the zone.
    fn split_zone(text: &str) -> (String, &str) {
        let mut tokens = text.splitn(3, ' ');
        let date = tokens.next().unwrap_or("");
        let clock = tokens.next().unwrap_or("");
        let zone = tokens.next().unwrap_or("").trim();
        (format!("{date} {clock}"), zone)
    }
}

impl Codec for TimeCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Time(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        let mut parts = text.splitn(2, ' ');
        let (Some(date), Some(rest)) = (parts.next(), parts.next()) else {
            return false;
        };
        if !DateCodec::looks_like_date(date) {
            return false;
        }
        let clock = rest.split(' ').next().unwrap_or("");
        clock.split(':').count() == 3 && clock.split(':').all(is_all_digits)
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        value.to_string()
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        let (stamp, zone) = Self::split_zone(text);
        let Ok(naive) = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S") else {
            return Value::Text(text.to_string());
        };
        match zone {
            "" | "UTC" | "GMT" | "Z" => Value::Time(Utc.from_utc_datetime(&naive)),
            offset => match DateTime::parse_from_str(
                &format!("{stamp} {offset}"),
                "%Y-%m-%d %H:%M:%S %#z",
            ) {
                Ok(t) => Value::Time(t.with_timezone(&Utc)),
                Err(_) => Value::Text(text.to_string()),
            },
        }
    }
}

/// Guard keeping dotted IP literals (`10.0.0.1`, `192.168.1`) out of the
/// numeric codecs. Decode-only: such text stays a plain string.
pub struct IpLiteralCodec;

impl Codec for IpLiteralCodec {
    fn matches_value(&self, _: &Value) -> bool {
        false
    }

    fn matches_text(&self, text: &str) -> bool {
        let groups: Vec<&str> = text.split('.').collect();
        (3..=4).contains(&groups.len()) && groups.iter().all(|g| is_all_digits(g))
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        value.to_string()
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        Value::Text(text.to_string())
    }
}

/// Optionally signed digits with `_` or `,` separators.
pub struct IntegerCodec;

impl Codec for IntegerCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Int(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        let body = strip_sign(text);
        !body.is_empty()
            && body.bytes().all(|b| b.is_ascii_digit() || b == b'_' || b == b',')
            && body.bytes().any(|b| b.is_ascii_digit())
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        value.to_string()
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        let cleaned: String = text.chars().filter(|c| *c != '_' && *c != ',').collect();
        match cleaned.parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Text(text.to_string()),
        }
    }
}

/// Decimal-point numerics, with `_` or `,` separators tolerated.
pub struct FloatCodec;

impl Codec for FloatCodec {
    fn matches_value(&self, value: &Value) -> bool {
        matches!(value, Value::Float(_))
    }

    fn matches_text(&self, text: &str) -> bool {
        let body = strip_sign(text);
        body.contains('.')
            && body
                .bytes()
                .all(|b| b.is_ascii_digit() || b == b'_' || b == b',' || b == b'.')
            && body.bytes().any(|b| b.is_ascii_digit())
    }

    fn encode(&self, value: &Value, _: &CodecRegistry) -> String {
        let mut s = value.to_string();
        // Keep whole floats decodable as floats ("10" would come back an Int).
        if !s.contains('.') && !s.contains('e') && !s.contains("inf") && !s.contains("NaN") {
            s.push_str(".0");
        }
        s
    }

    fn decode(&self, text: &str, _: &CodecRegistry) -> Value {
        let cleaned: String = text.chars().filter(|c| *c != '_' && *c != ',').collect();
        match cleaned.parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Text(text.to_string()),
        }
    }
}
