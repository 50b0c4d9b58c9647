// SPDX-License-Identifier: GPL-3.0-or-later

//! Splits a transcript line into argument tokens.
//!
//! The build tool prints the commands it would execute, with the shell quoting
//! still in place. Splitting on whitespace breaks quoted arguments apart, so
//! the pieces are joined back as long as a token has an unterminated quote.
//!
//! A line with a quote that never terminates ends in a single token, which
//! absorbs everything up to the end of the line.

/// Splits the line into tokens, keeping quoted whitespace inside a token.
pub fn split(line: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    for piece in line.split_whitespace() {
        match tokens.last_mut() {
            Some(last) if has_unbalanced_quotes(last) => {
                last.push(' ');
                last.push_str(piece);
            }
            _ => tokens.push(piece.to_string()),
        }
    }

    tokens
}

/// Returns true if the number of single or double quotes is odd.
fn has_unbalanced_quotes(token: &str) -> bool {
    let (single, double) = token.chars().fold((0usize, 0usize), |(single, double), c| match c {
        '\'' => (single + 1, double),
        '"' => (single, double + 1),
        _ => (single, double),
    });

    single % 2 == 1 || double % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(split("gcc -c main.c"), vec!["gcc", "-c", "main.c"]);
    }

    #[test]
    fn test_empty_line() {
        assert!(split("").is_empty());
        assert!(split("   \t ").is_empty());
    }

    #[test]
    fn test_quoted_span_stays_joined() {
        assert_eq!(split(r#"a "b c" d"#), vec!["a", r#""b c""#, "d"]);
    }

    #[test]
    fn test_quoted_macro_value() {
        assert_eq!(
            split(r#"gcc -DNAME='"hello world"' -c main.c"#),
            vec!["gcc", r#"-DNAME='"hello world"'"#, "-c", "main.c"]
        );
    }

    #[test]
    fn test_interior_whitespace_is_normalized_to_one_space() {
        assert_eq!(split("x 'a    b' y"), vec!["x", "'a b'", "y"]);
    }

    #[test]
    fn test_unterminated_quote_absorbs_rest_of_line() {
        assert_eq!(split(r#"gcc -DX="abc -c main.c"#), vec!["gcc", r#"-DX="abc -c main.c"#]);
    }

    #[test]
    fn test_trailing_newline() {
        assert_eq!(split("gcc -Wall\n"), vec!["gcc", "-Wall"]);
    }

    fn unquoted_word() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_=./+-]{1,8}"
    }

    fn quoted_word() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z0-9]{1,5}", 1..4).prop_map(|parts| format!("\"{}\"", parts.join(" ")))
    }

    proptest! {
        #[test]
        fn test_extra_unquoted_whitespace_is_invariant(
            words in prop::collection::vec(prop_oneof![unquoted_word(), quoted_word()], 0..10),
            gaps in prop::collection::vec(1usize..5, 10),
        ) {
            let compact = words.join(" ");
            let spread = words
                .iter()
                .zip(gaps.iter())
                .map(|(word, gap)| format!("{}{}", " ".repeat(*gap), word))
                .collect::<String>();

            prop_assert_eq!(split(&compact), split(&spread));
            prop_assert_eq!(split(&compact), words);
        }

        #[test]
        fn test_finalized_tokens_have_balanced_quotes(
            words in prop::collection::vec(prop_oneof![unquoted_word(), quoted_word()], 1..10),
        ) {
            for token in split(&words.join(" ")) {
                prop_assert!(!has_unbalanced_quotes(&token));
            }
        }
    }
}
