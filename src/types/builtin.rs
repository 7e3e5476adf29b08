//! The built-in argument types.
//!
//! ```text
//! bool
//! string (single_word | quotable_phrase | greedy_phrase)
//! integer [min [max]]      long [min [max]]
//! float   [min [max]]      double [min [max]]
//! ```
//!
//! A bound is either a literal of the numeric kind or one of the words `min`
//! and `max`, standing for the most negative and most positive (finite) value
//! of that kind. Omitted bounds default to those same extremes.

use std::fmt::Display;

use crate::ast::{ArgumentTypeSpec, StringMode};
use crate::diagnostics::BoxedCause;
use crate::err_at;
use crate::syntax::lexer::TokenStream;
use crate::syntax::Spanned;
use crate::CommodoreError;

pub const BUILTIN_TYPE_NAMES: [&str; 6] = ["bool", "string", "integer", "long", "float", "double"];

/// One of the six built-in argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Bool,
    String,
    Integer,
    Long,
    Float,
    Double,
}

impl BuiltinKind {
    /// Exact, case-sensitive lookup of a built-in type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(BuiltinKind::Bool),
            "string" => Some(BuiltinKind::String),
            "integer" => Some(BuiltinKind::Integer),
            "long" => Some(BuiltinKind::Long),
            "float" => Some(BuiltinKind::Float),
            "double" => Some(BuiltinKind::Double),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Bool => "bool",
            BuiltinKind::String => "string",
            BuiltinKind::Integer => "integer",
            BuiltinKind::Long => "long",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
        }
    }
}

/// Reads the parameters of a built-in type from the token stream.
pub fn parse_builtin(
    kind: BuiltinKind,
    tokens: &mut dyn TokenStream,
) -> Result<ArgumentTypeSpec, CommodoreError> {
    match kind {
        BuiltinKind::Bool => Ok(ArgumentTypeSpec::Bool),
        BuiltinKind::String => parse_string_mode(tokens).map(|mode| ArgumentTypeSpec::String { mode }),
        BuiltinKind::Integer => {
            parse_bounds::<i32>(tokens).map(|(min, max)| ArgumentTypeSpec::Integer { min, max })
        }
        BuiltinKind::Long => {
            parse_bounds::<i64>(tokens).map(|(min, max)| ArgumentTypeSpec::Long { min, max })
        }
        BuiltinKind::Float => {
            parse_bounds::<f32>(tokens).map(|(min, max)| ArgumentTypeSpec::Float { min, max })
        }
        BuiltinKind::Double => {
            parse_bounds::<f64>(tokens).map(|(min, max)| ArgumentTypeSpec::Double { min, max })
        }
    }
}

fn parse_string_mode(tokens: &mut dyn TokenStream) -> Result<StringMode, CommodoreError> {
    let token = tokens.next_token()?;
    let Some(word) = token.value.as_word() else {
        return Err(err_at!(
            Type,
            token.span,
            "expected string type (single_word, quotable_phrase or greedy_phrase), found {}",
            token.value.describe()
        ));
    };
    StringMode::from_keyword(word).ok_or_else(|| {
        err_at!(Type, token.span, "unknown string type '{}'", word)
            .with_help("use single_word, quotable_phrase or greedy_phrase")
    })
}

// ============================================================================
// NUMERIC BOUNDS
// ============================================================================

/// A numeric kind usable as an argument bound.
pub trait Bound: Copy + PartialOrd + Display {
    const KIND: &'static str;
    const MIN: Self;
    const MAX: Self;

    fn parse_literal(text: &str) -> Result<Self, BoxedCause>;

    fn is_nan(self) -> bool {
        false
    }
}

macro_rules! int_bound {
    ($ty:ty, $kind:literal) => {
        impl Bound for $ty {
            const KIND: &'static str = $kind;
            const MIN: Self = <$ty>::MIN;
            const MAX: Self = <$ty>::MAX;

            fn parse_literal(text: &str) -> Result<Self, BoxedCause> {
                text.parse::<$ty>().map_err(Into::into)
            }
        }
    };
}

macro_rules! float_bound {
    ($ty:ty, $kind:literal) => {
        impl Bound for $ty {
            const KIND: &'static str = $kind;
            const MIN: Self = <$ty>::MIN;
            const MAX: Self = <$ty>::MAX;

            fn parse_literal(text: &str) -> Result<Self, BoxedCause> {
                text.parse::<$ty>().map_err(Into::into)
            }

            fn is_nan(self) -> bool {
                <$ty>::is_nan(self)
            }
        }
    };
}

int_bound!(i32, "integer");
int_bound!(i64, "long");
float_bound!(f32, "float");
float_bound!(f64, "double");

/// Reads zero, one or two bound words following a numeric type name.
pub fn parse_bounds<B: Bound>(tokens: &mut dyn TokenStream) -> Result<(B, B), CommodoreError> {
    let Some(min_word) = tokens.next_word_if_present()? else {
        return Ok((B::MIN, B::MAX));
    };
    let min = parse_bound::<B>(&min_word)?;

    let Some(max_word) = tokens.next_word_if_present()? else {
        return Ok((min, B::MAX));
    };
    let max = parse_bound::<B>(&max_word)?;

    if min > max {
        return Err(err_at!(
            Type,
            max_word.span,
            "{} lower bound {} is greater than upper bound {}",
            B::KIND,
            min,
            max
        ));
    }
    Ok((min, max))
}

fn parse_bound<B: Bound>(word: &Spanned<String>) -> Result<B, CommodoreError> {
    match word.value.as_str() {
        "min" => Ok(B::MIN),
        "max" => Ok(B::MAX),
        text => {
            let value = B::parse_literal(text).map_err(|e| {
                err_at!(Type, word.span, "expected {} but got '{}'", B::KIND, text).with_cause(e)
            })?;
            if value.is_nan() {
                return Err(err_at!(
                    Type,
                    word.span,
                    "{} bound '{}' is not a number",
                    B::KIND,
                    text
                ));
            }
            Ok(value)
        }
    }
}
