//! `Name="value"` lists.
//!
//! The format used by [`ObjectExt::get_values`] / [`ObjectExt::set_values`]
//! and by string-encoded method and constructor arguments:
//!
//! ```text
//! Speed="88.5" Name='Car "A"' Wheels=4
//! ```
//!
//! Values are double quoted, single quoted or bare (up to the next
//! whitespace). Inside quotes a backslash escapes the quote character and
//! the backslash itself.
//!
//! [`ObjectExt::get_values`]: crate::object::ObjectExt::get_values
//! [`ObjectExt::set_values`]: crate::object::ObjectExt::set_values

use alloc::string::String;
use core::iter::FusedIterator;
use core::str::CharIndices;

use super::ParseError;

// -----------------------------------------------------------------------------
// ParamsParser

/// Iterates over the `(name, value)` pairs of a params string.
///
/// Stops at the first malformed token, yielding its error.
///
/// # Examples
///
/// ```
/// use pl_reflect::value::ParamsParser;
///
/// let pairs: Result<Vec<_>, _> = ParamsParser::new(r#"Param0=200 Param1='0.753'"#).collect();
/// let pairs = pairs.unwrap();
/// assert_eq!(pairs[0], ("Param0", "200".to_string()));
/// assert_eq!(pairs[1], ("Param1", "0.753".to_string()));
/// ```
pub struct ParamsParser<'a> {
    input: &'a str,
    chars: CharIndices<'a>,
    done: bool,
}

impl<'a> ParamsParser<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices(),
            done: false,
        }
    }

    fn skip_whitespace(&mut self) -> Option<(usize, char)> {
        loop {
            let (index, c) = self.chars.next()?;
            if !c.is_whitespace() {
                return Some((index, c));
            }
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, c)) if c == quote || c == '\\' => value.push(c),
                    Some((_, c)) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => return Err(ParseError::UnterminatedQuote(self.input.into())),
                },
                Some((_, c)) if c == quote => return Ok(value),
                Some((_, c)) => value.push(c),
                None => return Err(ParseError::UnterminatedQuote(self.input.into())),
            }
        }
    }

    fn bare(&mut self) -> String {
        let mut value = String::new();
        for (_, c) in self.chars.by_ref() {
            if c.is_whitespace() {
                break;
            }
            value.push(c);
        }
        value
    }

    fn next_pair(&mut self) -> Option<Result<(&'a str, String), ParseError>> {
        let (start, _) = self.skip_whitespace()?;
        let end = loop {
            match self.chars.next() {
                Some((index, '=')) => break index,
                Some((_, c)) if !c.is_whitespace() => {}
                _ => {
                    return Some(Err(ParseError::Invalid {
                        expected: "`Name=value` pair",
                        input: self.input[start..].into(),
                    }));
                }
            }
        };
        let name = &self.input[start..end];
        let value = match self.chars.clone().next() {
            Some((_, quote @ ('"' | '\''))) => {
                self.chars.next();
                self.quoted(quote)
            }
            Some((_, c)) if c.is_whitespace() => Ok(String::new()),
            Some(_) => Ok(self.bare()),
            None => Ok(String::new()),
        };
        Some(value.map(|value| (name, value)))
    }
}

impl<'a> Iterator for ParamsParser<'a> {
    type Item = Result<(&'a str, String), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_pair();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl FusedIterator for ParamsParser<'_> {}

// -----------------------------------------------------------------------------
// write_param

/// Appends `name="value"` to `out`, separated by a space if `out` is not
/// empty.
///
/// Double quotes are used unless the value contains some and no single
/// quotes.
///
/// # Examples
///
/// ```
/// use pl_reflect::value::write_param;
///
/// let mut out = String::new();
/// write_param(&mut out, "Speed", "88.5");
/// write_param(&mut out, "Label", r#"say "hi""#);
/// assert_eq!(out, r#"Speed="88.5" Label='say "hi"'"#);
/// ```
pub fn write_param(out: &mut String, name: &str, value: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    out.push_str(name);
    out.push('=');
    out.push(quote);
    for c in value.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ParamsParser, write_param};
    use crate::value::ParseError;
    use alloc::string::String;
    use alloc::vec::Vec;

    fn parse(input: &str) -> Result<Vec<(&str, String)>, ParseError> {
        ParamsParser::new(input).collect()
    }

    #[test]
    fn mixed_quoting() {
        let pairs = parse(" A=1  B=\"two words\" C='x' D= E=\"\"").unwrap();
        let names: Vec<_> = pairs.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);
        assert_eq!(pairs[1].1, "two words");
        assert_eq!(pairs[3].1, "");
        assert_eq!(pairs[4].1, "");
    }

    #[test]
    fn escapes_round_trip() {
        let mut out = String::new();
        write_param(&mut out, "Path", r"C:\data");
        write_param(&mut out, "Both", r#"it's "x""#);
        let pairs = parse(&out).unwrap();
        assert_eq!(pairs[0].1, r"C:\data");
        assert_eq!(pairs[1].1, r#"it's "x""#);

        // unknown escapes are kept
        assert_eq!(parse(r#"P="a\nb""#).unwrap()[0].1, r"a\nb");
    }

    #[test]
    fn malformed_input_stops_iteration() {
        let mut parser = ParamsParser::new("A=1 oops B=2");
        assert!(matches!(parser.next(), Some(Ok(("A", _)))));
        assert!(matches!(parser.next(), Some(Err(ParseError::Invalid { .. }))));
        assert!(parser.next().is_none());

        assert!(matches!(
            parse("A='open"),
            Err(ParseError::UnterminatedQuote(_))
        ));
    }
}
