//! Splitting a raw text buffer into arguments.
//!
//! The grammar is a small subset of shell quoting:
//!
//! - Unquoted ASCII whitespace separates arguments; runs of whitespace
//!   collapse and leading/trailing whitespace is ignored.
//! - A double quote toggles quoting and is dropped.  Text directly before
//!   and after a quoted span joins into the same argument.
//! - `\"` is a literal double quote and does not toggle quoting.  A
//!   backslash before anything else is kept as-is.
//!
//! There is no failure mode: an unterminated quote simply runs to the end
//! of the buffer.

use std::iter::Peekable;
use std::str::Chars;

const QUOTE: char = '"';
const BACKSLASH: char = '\\';

/// An iterator over the arguments of a quoted text buffer.
///
/// This is created by [`Tokens::new`]; see [`tokenize`] for the
/// collected form.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokens<'a> {
    /// Start tokenizing `buffer`.
    pub fn new(buffer: &'a str) -> Self {
        Self {
            chars: buffer.chars().peekable(),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let mut token = String::new();
        // Set by any character other than separating whitespace, including a
        // bare quote toggle, so `""` yields an empty argument.
        let mut started = false;
        let mut in_quotes = false;

        while let Some(c) = self.chars.next() {
            match c {
                BACKSLASH if self.chars.peek() == Some(&QUOTE) => {
                    self.chars.next();
                    token.push(QUOTE);
                    started = true;
                }
                QUOTE => {
                    in_quotes = !in_quotes;
                    started = true;
                }
                c if !in_quotes && c.is_ascii_whitespace() => {
                    if started {
                        return Some(token);
                    }
                }
                c => {
                    token.push(c);
                    started = true;
                }
            }
        }

        started.then_some(token)
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

/// Split `buffer` into arguments, honoring double quotes and `\"` escapes.
///
/// Empty and whitespace-only buffers produce no arguments.
pub fn tokenize(buffer: &str) -> Vec<String> {
    let tokens: Vec<String> = Tokens::new(buffer).collect();
    tracing::trace!("tokenized {} bytes into {} arguments", buffer.len(), tokens.len());
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n").is_empty());
        assert!(tokenize("\r\n  \t ").is_empty());
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("foo bar baz"), ["foo", "bar", "baz"]);
        assert_eq!(tokenize("  foo    bar\tbaz\n"), ["foo", "bar", "baz"]);
        assert_eq!(tokenize("single"), ["single"]);
    }

    #[test]
    fn test_tokenize_quoting() {
        let input = " a\"\\bc de\\\"f g\"\\h ij    k\" \"lm";
        assert_eq!(tokenize(input), ["a\\bc de\"f g\\h", "ij", "k lm"]);
    }

    #[test]
    fn test_tokenize_quoted_switch_value() {
        let input = "init_command --SWITCH Arg --switch2=brea\\d --switch3=\"and \\\"butt\"er\\\"   -- --actually_an_arg";
        assert_eq!(
            tokenize(input),
            [
                "init_command",
                "--SWITCH",
                "Arg",
                "--switch2=brea\\d",
                "--switch3=and \"butter\"",
                "--",
                "--actually_an_arg",
            ]
        );
    }

    #[test]
    fn test_tokenize_escaped_quote_keeps_mode() {
        // outside quotes the escaped quote does not open a quoted span, so
        // the following space still separates
        assert_eq!(tokenize("a\\\" b"), ["a\"", "b"]);
        // inside quotes it does not close the span either
        assert_eq!(tokenize("\"a\\\" b\""), ["a\" b"]);
    }

    #[test]
    fn test_tokenize_backslashes() {
        assert_eq!(tokenize("a\\b"), ["a\\b"]);
        assert_eq!(tokenize("trailing\\"), ["trailing\\"]);
        assert_eq!(tokenize("\\\\\""), ["\\\""]);
        assert_eq!(tokenize("\\ x"), ["\\", "x"]);
    }

    #[test]
    fn test_tokenize_empty_quotes() {
        assert_eq!(tokenize("\"\""), [""]);
        assert_eq!(tokenize("a \"\" b"), ["a", "", "b"]);
        assert_eq!(tokenize("a\"\"b"), ["ab"]);
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        assert_eq!(tokenize("foo \"bar baz"), ["foo", "bar baz"]);
        assert_eq!(tokenize("foo \""), ["foo", ""]);
        assert_eq!(tokenize("\"  trailing  "), ["  trailing  "]);
    }

    #[test]
    fn test_tokenize_rejoin_is_stable() {
        let input = "  --alpha   beta --gamma=delta\tepsilon  ";
        let first = tokenize(input);
        let second = tokenize(&first.join(" "));
        assert_eq!(first, second);
    }

    #[test]
    fn test_tokens_iterator() {
        let mut tokens = Tokens::new("one \"two three\" four");
        assert_eq!(tokens.next().as_deref(), Some("one"));
        assert_eq!(tokens.next().as_deref(), Some("two three"));
        assert_eq!(tokens.next().as_deref(), Some("four"));
        assert_eq!(tokens.next(), None);
        assert_eq!(tokens.next(), None);
    }
}
