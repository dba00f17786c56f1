// Argument tokenizer
// reason: shell-words for POSIX-style quoting without expansion

use super::error::CommandError;

/// Split a command line into an argument vector
///
/// Honors single/double quoting and backslash escaping the way a POSIX shell
/// would, but performs no variable expansion, globbing or redirection. The
/// result is always passed to the launcher as-is, never to a shell.
///
/// # Errors
/// - `CommandError::MalformedCommand` on unterminated quoting, a dangling
///   escape, or input with no tokens at all
pub fn tokenize(command: &str) -> Result<Vec<String>, CommandError> {
    let tokens = shell_words::split(command)
        .map_err(|e| CommandError::MalformedCommand(format!("{}: {}", e, command)))?;

    if tokens.is_empty() {
        return Err(CommandError::MalformedCommand(
            "empty command".to_string(),
        ));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words_match_whitespace_split() {
        for line in ["echo hello", "uname -r", "ls -la /tmp", "  sleep   5  "] {
            let expected: Vec<String> = line.split_whitespace().map(String::from).collect();
            assert_eq!(tokenize(line).unwrap(), expected, "line: {:?}", line);
        }
    }

    #[test]
    fn test_quotes_keep_one_token() {
        assert_eq!(
            tokenize(r#"grep "hello world" 'a  b' file"#).unwrap(),
            vec!["grep", "hello world", "a  b", "file"]
        );
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(
            tokenize(r#"echo hello\ world "say \"hi\"""#).unwrap(),
            vec!["echo", "hello world", r#"say "hi""#]
        );
    }

    #[test]
    fn test_adjacent_segments_concatenate() {
        assert_eq!(tokenize(r#"a"b"'c'd"#).unwrap(), vec!["abcd"]);
        assert_eq!(tokenize("printf ''").unwrap(), vec!["printf", ""]);
    }

    #[test]
    fn test_no_expansion() {
        assert_eq!(
            tokenize("echo $HOME *.rs | wc > out").unwrap(),
            vec!["echo", "$HOME", "*.rs", "|", "wc", ">", "out"]
        );
    }

    #[test]
    fn test_empty_is_malformed() {
        assert!(matches!(
            tokenize(""),
            Err(CommandError::MalformedCommand(_))
        ));
        assert!(matches!(
            tokenize("   \t "),
            Err(CommandError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        for line in [r#"echo "unterminated"#, "echo 'open", r#"a "b'c"#] {
            let err = tokenize(line).unwrap_err();
            assert!(
                matches!(err, CommandError::MalformedCommand(_)),
                "line {:?} gave {:?}",
                line,
                err
            );
        }
    }
}
