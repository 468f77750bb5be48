//! Byte-level scanning of embedded JavaScript.
//!
//! Template expressions are not parsed here, only delimited: the scanner
//! finds the `}` that closes an expression while skipping over strings,
//! template literals, comments and regex literals, so that braces inside
//! them do not count.

/// Nesting contexts tracked while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nest {
    Brace,
    Paren,
    Bracket,
    /// Inside the text of a template literal.
    Template,
    /// Inside a `${...}` substitution of a template literal.
    Substitution,
}

/// Finds the offset of the `}` closing an expression that starts at `start`.
///
/// Returns `None` if the source ends first.
pub(crate) fn find_closing_brace(source: &str, start: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut stack: Vec<Nest> = Vec::new();
    // Last significant byte, used to tell a regex from a division.
    let mut prev = b'(';
    let mut i = start;

    while i < bytes.len() {
        let c = bytes[i];

        if stack.last() == Some(&Nest::Template) {
            match c {
                b'\\' => i += 2,
                b'`' => {
                    stack.pop();
                    prev = b'`';
                    i += 1;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    stack.push(Nest::Substitution);
                    prev = b'{';
                    i += 2;
                }
                _ => i += 1,
            }
            continue;
        }

        match c {
            b'\'' | b'"' => {
                i = skip_string(bytes, i)?;
                prev = c;
                continue;
            }
            b'`' => stack.push(Nest::Template),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |n| i + n);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = source[i + 2..].find("*/").map(|n| i + 2 + n + 2)?;
                continue;
            }
            b'/' if could_start_regex(prev) => {
                i = skip_regex(bytes, i);
                prev = b'a';
                continue;
            }
            b'{' => stack.push(Nest::Brace),
            b'(' => stack.push(Nest::Paren),
            b'[' => stack.push(Nest::Bracket),
            b'}' => match stack.pop() {
                None => return Some(i),
                Some(Nest::Substitution) => {
                    // Back inside the template literal text.
                    i += 1;
                    continue;
                }
                Some(_) => {}
            },
            b')' | b']' => {
                stack.pop();
            }
            _ => {}
        }

        if !c.is_ascii_whitespace() {
            prev = c;
        }
        i += 1;
    }

    None
}

/// Skips a string literal starting at the quote at `start`, returning the
/// offset just past the closing quote.
pub(crate) fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Whether a `/` following `prev` starts a regex literal rather than a
/// division.
fn could_start_regex(prev: u8) -> bool {
    matches!(
        prev,
        b'=' | b'!'
            | b'+'
            | b'-'
            | b'*'
            | b'%'
            | b'<'
            | b'>'
            | b'&'
            | b'|'
            | b'^'
            | b'~'
            | b'?'
            | b':'
            | b'('
            | b'['
            | b'{'
            | b','
            | b';'
    )
}

/// Skips a regex literal starting at the `/` at `start`, flags included.
/// An unterminated regex stops at the end of the line.
fn skip_regex(bytes: &[u8], start: usize) -> usize {
    let mut in_class = false;
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return i;
            }
            b'\n' => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(source: &str) -> Option<usize> {
        // Scans from just past the leading `{`.
        find_closing_brace(source, 1)
    }

    #[test]
    fn test_simple_expression() {
        assert_eq!(close("{x}"), Some(2));
        assert_eq!(close("{a + b} rest"), Some(6));
    }

    #[test]
    fn test_nested_braces() {
        let source = "{{color: 'red', nested: {a: 1}}}";
        assert_eq!(close(source), Some(source.len() - 1));
    }

    #[test]
    fn test_braces_in_strings_are_ignored() {
        let source = r#"{"}" + '{' + "\"}"}"#;
        assert_eq!(close(source), Some(source.len() - 1));
    }

    #[test]
    fn test_template_literal_substitutions() {
        let source = "{`a ${ {b: 1}.b } }`}";
        assert_eq!(close(source), Some(source.len() - 1));
    }

    #[test]
    fn test_comments_are_ignored() {
        let source = "{() => {\n  // it's } here\n  /* } */ go();\n}}";
        assert_eq!(close(source), Some(source.len() - 1));
    }

    #[test]
    fn test_regex_and_division() {
        let source = "{x.replace(/}/g, '')}";
        assert_eq!(close(source), Some(source.len() - 1));
        assert_eq!(close("{a / b}"), Some(6));
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(close("{foo("), None);
        assert_eq!(close("{'abc}"), None);
    }
}
