//! Splits a command line into words with shell quoting rules.

use std::borrow::Cow;

pub use shell_words::ParseError;

/// Splits `line` into words. A word may start with `#` (record references
/// such as `#2`); only the shell loop treats a whole line starting with `#`
/// as a comment.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    shell_words::split(&escape_word_hashes(line))
}

/// Escapes every unquoted `#` that begins a word so the splitter keeps it as
/// a literal character.
fn escape_word_hashes(line: &str) -> Cow<'_, str> {
    if !line.contains('#') {
        return Cow::Borrowed(line);
    }

    let mut escaped = String::with_capacity(line.len() + 4);
    let mut word_start = true;
    let mut quote: Option<char> = None;
    let mut after_backslash = false;

    for ch in line.chars() {
        if after_backslash {
            after_backslash = false;
            escaped.push(ch);
            continue;
        }
        match quote {
            Some(open) => {
                if ch == open {
                    quote = None;
                } else if ch == '\\' && open == '"' {
                    after_backslash = true;
                }
                escaped.push(ch);
            }
            None => {
                match ch {
                    '#' if word_start => escaped.push_str("\\#"),
                    '\\' => after_backslash = true,
                    '\'' | '"' => quote = Some(ch),
                    _ => {}
                }
                if ch != '#' || !word_start {
                    escaped.push(ch);
                }
                word_start = ch.is_whitespace();
            }
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = tokenize(r#"add 2024-01-05 12.5 food "Lunch with team""#).unwrap();
        assert_eq!(tokens, ["add", "2024-01-05", "12.5", "food", "Lunch with team"]);
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        assert!(tokenize(r#"add "unterminated"#).is_err());
    }

    #[test]
    fn position_references_are_kept() {
        assert_eq!(tokenize("delete #2 --yes").unwrap(), ["delete", "#2", "--yes"]);
        assert_eq!(
            tokenize("edit #1 2024-01-06 15 entertainment Movie").unwrap(),
            ["edit", "#1", "2024-01-06", "15", "entertainment", "Movie"]
        );
    }

    #[test]
    fn hashes_inside_words_and_quotes_are_untouched() {
        assert_eq!(
            tokenize(r##"add 2024-01-05 3 food "#1 fan" C#"##).unwrap(),
            ["add", "2024-01-05", "3", "food", "#1 fan", "C#"]
        );
        assert_eq!(tokenize(r"list --search \#tag").unwrap(), ["list", "--search", "#tag"]);
    }
}
