//! Pluggable value codecs.
//!
//! Registry entries persist keys and values as strings. A [`Codec`] converts
//! one native value kind to and from that string form; the [`CodecRegistry`]
//! holds an ordered list of them and picks the first codec that matches.
//!
//! Registration order is load-bearing: more specific codecs must be
//! registered before general ones (the boolean codec before the string
//! fallback, the IP-literal guard before the integer codec, and so on).
//! [`CodecRegistry::with_defaults`] registers the built-in set in the
//! required order; [`CodecRegistry::empty`] starts from nothing for callers
//! that want to opt out of the lossy numeric heuristics.
//!
//! Encoding and decoding are total: a value no codec claims falls back to its
//! literal string form, and text no codec claims decodes to [`Value::Text`].

mod builtin;

pub use builtin::{
    ArrayCodec, BooleanCodec, DateCodec, FloatCodec, IntegerCodec, IpLiteralCodec, RangeCodec,
    SymbolCodec, TimeCodec,
};

use crate::value::Value;

/// A bidirectional converter between one native value kind and its persisted
/// string form.
///
/// `matches_value` is consulted on the encode path, `matches_text` on the
/// decode path. A codec claims a side by returning `true`; the registry
/// stops at the first claim.
pub trait Codec: Send + Sync {
    /// True if this codec encodes the given native value.
    fn matches_value(&self, value: &Value) -> bool;

    /// True if this codec decodes the given persisted string.
    fn matches_text(&self, text: &str) -> bool;

    /// Convert a native value to its persisted string form.
    fn encode(&self, value: &Value, registry: &CodecRegistry) -> String;

    /// Convert a persisted string back to a native value.
    ///
    /// Must not fail: a string that turns out to be malformed after
    /// `matches_text` claimed it is returned unchanged as [`Value::Text`].
    fn decode(&self, text: &str, registry: &CodecRegistry) -> Value;
}

/// An ordered collection of codecs; first match wins.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
}

impl CodecRegistry {
    /// Create a registry with no codecs.
    ///
    /// Every encode degrades to the literal string form and every decode to
    /// `Value::Text`. Use this as the base when the default numeric
    /// heuristics (which can reinterpret e.g. leading-zero zip codes as
    /// integers) are unwanted.
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Create a registry with the built-in codec set.
    ///
    /// Registration order, and therefore match priority:
    /// array, boolean, symbol, range, date, time, IP-literal guard,
    /// integer, float. Anything unclaimed is a plain string.
    ///
    /// The integer and float codecs decode any numeric-looking string, which
    /// silently reinterprets intentionally-string values such as zip codes.
    /// This is a known lossy heuristic; build on [`CodecRegistry::empty`] to
    /// leave them out.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ArrayCodec);
        registry.register(BooleanCodec);
        registry.register(SymbolCodec);
        registry.register(RangeCodec);
        registry.register(DateCodec);
        registry.register(TimeCodec);
        registry.register(IpLiteralCodec);
        registry.register(IntegerCodec);
        registry.register(FloatCodec);
        registry
    }

    /// Append a codec, giving it lower priority than everything registered
    /// so far.
    pub fn register(&mut self, codec: impl Codec + 'static) {
        self.codecs.push(Box::new(codec));
    }

    /// Prepend a codec, giving it priority over everything registered so far.
    pub fn register_front(&mut self, codec: impl Codec + 'static) {
        self.codecs.insert(0, Box::new(codec));
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Convert a native value to the string form stored in the backend.
    ///
    /// Never fails: values no codec claims use their literal string form.
    pub fn encode(&self, value: &Value) -> String {
        for codec in &self.codecs {
            if codec.matches_value(value) {
                return codec.encode(value, self);
            }
        }
        value.to_string()
    }

    /// Convert a stored string back to a native value.
    ///
    /// Never fails: text no codec claims comes back as [`Value::Text`].
    pub fn decode(&self, text: &str) -> Value {
        for codec in &self.codecs {
            if codec.matches_text(text) {
                return codec.decode(text, self);
            }
        }
        Value::Text(text.to_string())
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codecs.len())
            .finish()
    }
}
