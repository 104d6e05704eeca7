//! String form of values.
//!
//! Used at serialization boundaries only: attribute strings, `Name="value"`
//! lists and snapshots. Live dynamic calls exchange [`Value`]s.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use thiserror::Error;

use super::{EnumInfo, TypeDesc, Value, ValueKind};

// -----------------------------------------------------------------------------
// ParseError

/// An error returned by [`TypeDesc::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("`{input}` is not a valid {expected}")]
    Invalid {
        expected: &'static str,
        input: String,
    },
    #[error("`{input}` is out of range for {expected}")]
    OutOfRange {
        expected: &'static str,
        input: String,
    },
    #[error("`{name}` is not declared by {type_name}")]
    UnknownName {
        type_name: &'static str,
        name: String,
    },
    #[error("unterminated quote in `{0}`")]
    UnterminatedQuote(String),
    #[error("unterminated `[` in `{0}`")]
    UnterminatedList(String),
    #[error("values of type {0} have no string form")]
    Unsupported(&'static str),
}

impl ParseError {
    #[inline]
    fn invalid(desc: &TypeDesc, input: &str) -> Self {
        Self::Invalid {
            expected: desc.name(),
            input: input.into(),
        }
    }

    #[inline]
    fn out_of_range(desc: &TypeDesc, input: &str) -> Self {
        Self::OutOfRange {
            expected: desc.name(),
            input: input.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// Format

impl TypeDesc {
    /// Formats a value the way this type is written in attribute strings.
    ///
    /// - booleans as `true` / `false`;
    /// - floats in the shortest decimal form that reads back to the same
    ///   value, at single precision for `float`;
    /// - enums by declared name, flags as `A|B`;
    /// - lists as comma-separated items, strings quoted and nested lists
    ///   in brackets.
    ///
    /// Values that don't match the described kind are formatted without
    /// type information.
    ///
    /// # Examples
    ///
    /// ```
    /// use pl_reflect::value::{Reflected, Value};
    ///
    /// assert_eq!(f32::type_desc().format(&Value::Float(0.0)), "0");
    /// assert_eq!(f32::type_desc().format(&0.1_f32.to_value()), "0.1");
    /// assert_eq!(bool::type_desc().format(&Value::Bool(true)), "true");
    /// ```
    pub fn format(&self, value: &Value) -> String {
        let mut out = String::new();
        self.format_into(&mut out, value);
        out
    }

    fn format_into(&self, out: &mut String, value: &Value) {
        match (self.kind(), value) {
            (ValueKind::Float, Value::Float(x)) if self.size() == 4 => {
                let _ = write!(out, "{}", *x as f32);
            }
            (ValueKind::Enum, Value::Enum(i) | Value::Int(i)) => {
                match self.enum_info().and_then(|info| info.name_of(*i)) {
                    Some(name) => out.push_str(name),
                    None => {
                        let _ = write!(out, "{i}");
                    }
                }
            }
            (ValueKind::Flags, Value::Flags(bits) | Value::UInt(bits)) => match self.enum_info() {
                Some(info) => format_flags(out, info, *bits),
                None => {
                    let _ = write!(out, "{bits}");
                }
            },
            (ValueKind::List, Value::List(items)) => {
                let element = self.element();
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    match (element, item) {
                        (_, Value::Str(s)) => quote_into(out, s),
                        (element, Value::List(_)) => {
                            out.push('[');
                            match element {
                                Some(desc) => desc.format_into(out, item),
                                None => {
                                    let _ = write!(out, "{item}");
                                }
                            }
                            out.push(']');
                        }
                        (Some(desc), item) => desc.format_into(out, item),
                        (None, item) => {
                            let _ = write!(out, "{item}");
                        }
                    }
                }
            }
            (_, value) => {
                let _ = write!(out, "{value}");
            }
        }
    }

    /// Parses the string form of this type.
    ///
    /// Surrounding whitespace is ignored, except for strings which are
    /// taken verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use pl_reflect::value::{Reflected, Value};
    ///
    /// assert_eq!(bool::type_desc().parse("TRUE"), Ok(Value::Bool(true)));
    /// assert_eq!(bool::type_desc().parse("0"), Ok(Value::Bool(false)));
    /// assert_eq!(i32::type_desc().parse(" 42 "), Ok(Value::Int(42)));
    /// assert!(u8::type_desc().parse("256").is_err());
    /// ```
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        let trimmed = input.trim();
        match self.kind() {
            ValueKind::Void => Ok(Value::Void),
            ValueKind::Bool => parse_bool(trimmed)
                .map(Value::Bool)
                .ok_or_else(|| ParseError::invalid(self, input)),
            ValueKind::Int => {
                let i: i64 = trimmed
                    .parse()
                    .map_err(|_| ParseError::invalid(self, input))?;
                if self.int_in_range(i) {
                    Ok(Value::Int(i))
                } else {
                    Err(ParseError::out_of_range(self, input))
                }
            }
            ValueKind::UInt => {
                let u: u64 = trimmed
                    .parse()
                    .map_err(|_| ParseError::invalid(self, input))?;
                if self.uint_in_range(u) {
                    Ok(Value::UInt(u))
                } else {
                    Err(ParseError::out_of_range(self, input))
                }
            }
            ValueKind::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ParseError::invalid(self, input)),
            ValueKind::String => Ok(Value::Str(input.into())),
            ValueKind::Enum => self.parse_enum(trimmed),
            ValueKind::Flags => self.parse_flags(trimmed),
            ValueKind::List => self.parse_list(trimmed),
            ValueKind::Object | ValueKind::Custom => Err(ParseError::Unsupported(self.name())),
        }
    }

    fn int_in_range(&self, i: i64) -> bool {
        match self.size() {
            0 | 8.. => true,
            size => {
                let bits = size as u32 * 8;
                let max = (1_i64 << (bits - 1)) - 1;
                (-max - 1..=max).contains(&i)
            }
        }
    }

    fn uint_in_range(&self, u: u64) -> bool {
        match self.size() {
            0 | 8.. => true,
            size => u < 1_u64 << (size as u32 * 8),
        }
    }

    fn parse_enum(&self, input: &str) -> Result<Value, ParseError> {
        if let Some(value) = self.enum_info().and_then(|info| info.value_of(input)) {
            return Ok(Value::Enum(value as i64));
        }
        match input.parse::<i64>() {
            Ok(i) => Ok(Value::Enum(i)),
            Err(_) => Err(ParseError::UnknownName {
                type_name: self.name(),
                name: input.into(),
            }),
        }
    }

    fn parse_flags(&self, input: &str) -> Result<Value, ParseError> {
        let mut bits = 0_u64;
        for part in input.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(value) = self.enum_info().and_then(|info| info.value_of(part)) {
                bits |= value;
            } else if let Ok(raw) = part.parse::<u64>() {
                bits |= raw;
            } else {
                return Err(ParseError::UnknownName {
                    type_name: self.name(),
                    name: part.into(),
                });
            }
        }
        Ok(Value::Flags(bits))
    }

    fn parse_list(&self, input: &str) -> Result<Value, ParseError> {
        let Some(element) = self.element() else {
            return Err(ParseError::Unsupported(self.name()));
        };
        if input.is_empty() {
            return Ok(Value::List(Vec::new()));
        }
        split_list(input)?
            .iter()
            .map(|item| element.parse(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn parse_bool(input: &str) -> Option<bool> {
    if input.eq_ignore_ascii_case("true") || input == "1" {
        Some(true)
    } else if input.eq_ignore_ascii_case("false") || input == "0" {
        Some(false)
    } else {
        None
    }
}

fn format_flags(out: &mut String, info: &EnumInfo, bits: u64) {
    let mut remaining = bits;
    let mut first = true;
    for entry in info.entries() {
        if entry.value != 0 && bits & entry.value == entry.value && remaining & entry.value != 0 {
            if !first {
                out.push('|');
            }
            out.push_str(entry.name);
            remaining &= !entry.value;
            first = false;
        }
    }
    if remaining != 0 {
        if !first {
            out.push('|');
        }
        out.push_str(&remaining.to_string());
    }
}

fn quote_into(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

// Splits at top-level commas. Quoted items are unescaped and returned
// without their quotes, bracketed items are returned verbatim without
// their outer brackets.
fn split_list(input: &str) -> Result<Vec<String>, ParseError> {
    let mut items = Vec::new();
    let mut chars = input.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut item = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(c) => item.push(c),
                        None => return Err(ParseError::UnterminatedQuote(input.into())),
                    },
                    Some('"') => break,
                    Some(c) => item.push(c),
                    None => return Err(ParseError::UnterminatedQuote(input.into())),
                }
            }
            while chars.next_if(|c| *c != ',').is_some() {}
        } else if chars.next_if_eq(&'[').is_some() {
            let mut depth = 1_usize;
            let mut quoted = false;
            loop {
                let Some(c) = chars.next() else {
                    return Err(ParseError::UnterminatedList(input.into()));
                };
                match c {
                    '\\' if quoted => {
                        item.push(c);
                        match chars.next() {
                            Some(escaped) => item.push(escaped),
                            None => return Err(ParseError::UnterminatedQuote(input.into())),
                        }
                        continue;
                    }
                    '"' => quoted = !quoted,
                    '[' if !quoted => depth += 1,
                    ']' if !quoted => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                item.push(c);
            }
            while chars.next_if(|c| *c != ',').is_some() {}
        } else {
            while let Some(c) = chars.next_if(|c| *c != ',') {
                item.push(c);
            }
        }
        items.push(item);
        if chars.next().is_none() {
            return Ok(items);
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ParseError;
    use crate::value::{Reflected, TypeDesc, Value, ValueKind};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn floats_are_locale_independent_and_short() {
        let double = f64::type_desc();
        assert_eq!(double.format(&Value::Float(88.5)), "88.5");
        assert_eq!(double.format(&Value::Float(-0.25)), "-0.25");
        assert_eq!(double.format(&Value::Float(0.1)), "0.1");
        assert_eq!(double.parse("88.5"), Ok(Value::Float(88.5)));
        assert!(double.parse("88,5").is_err());

        // single precision does not print widening noise
        let float = f32::type_desc();
        assert_eq!(float.format(&0.753_f32.to_value()), "0.753");
    }

    #[test]
    fn integer_ranges_follow_size() {
        assert_eq!(i8::type_desc().parse("-128"), Ok(Value::Int(-128)));
        assert!(matches!(
            i8::type_desc().parse("128"),
            Err(ParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            u32::type_desc().parse("-1"),
            Err(ParseError::Invalid { .. })
        ));
        assert_eq!(
            u64::type_desc().parse("18446744073709551615"),
            Ok(Value::UInt(u64::MAX))
        );
    }

    #[test]
    fn strings_are_verbatim() {
        let desc = String::type_desc();
        assert_eq!(desc.parse("  padded "), Ok(Value::Str("  padded ".into())));
        assert_eq!(desc.format(&Value::Str("a b".into())), "a b");
    }

    #[test]
    fn lists_quote_strings() {
        let desc = Vec::<String>::type_desc();
        let value = vec![String::from("a,b"), String::from("say \"hi\"")].to_value();
        let text = desc.format(&value);
        assert_eq!(text, r#""a,b","say \"hi\"""#);
        assert_eq!(desc.parse(&text), Ok(value));

        let numbers = Vec::<i32>::type_desc();
        assert_eq!(
            numbers.parse("1, 2,3"),
            Ok(Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
        );
        assert_eq!(numbers.parse(""), Ok(Value::List(Vec::new())));
        assert!(matches!(
            desc.parse("\"open"),
            Err(ParseError::UnterminatedQuote(_))
        ));
    }

    #[test]
    fn nested_lists_keep_their_shape() {
        let grid = Vec::<Vec<i32>>::type_desc();
        let value = vec![vec![1, 2], vec![3], vec![]].to_value();
        let text = grid.format(&value);
        assert_eq!(text, "[1,2],[3],[]");
        assert_eq!(grid.parse(&text), Ok(value));

        let words = Vec::<Vec<String>>::type_desc();
        let value = vec![vec![String::from("a],b"), String::from("[c")], vec![]].to_value();
        let text = words.format(&value);
        assert_eq!(text, r#"["a],b","[c"],[]"#);
        assert_eq!(words.parse(&text), Ok(value));

        assert_eq!(
            grid.parse(" [1] , [2,3]"),
            Ok(vec![vec![1], vec![2, 3]].to_value())
        );
        assert!(matches!(
            grid.parse("[1,2"),
            Err(ParseError::UnterminatedList(_))
        ));
    }

    #[test]
    fn custom_types_have_no_string_form() {
        let desc = TypeDesc::new("Matrix", ValueKind::Custom, 64);
        assert_eq!(desc.parse("1"), Err(ParseError::Unsupported("Matrix")));
    }
}
