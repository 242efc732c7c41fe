/// A lexical token of the search query language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    /// A bare word, or the contents of a double-quoted group.
    Word(String),
    /// The `:` separating a constraint key from its value.
    Colon,
}

/// Splits a search string into tokens.
///
/// Returns the tokens and whether the input was fully consumed. An
/// unterminated double quote stops lexing: everything before the quote is
/// returned and the partial group is dropped.
pub(crate) fn lex(s: &str) -> (Vec<Token>, bool) {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            ':' => {
                flush(&mut tokens, &mut word);
                tokens.push(Token::Colon);
            }
            '"' => {
                flush(&mut tokens, &mut word);
                let mut escaped = false;
                loop {
                    match chars.next() {
                        None => return (tokens, false),
                        Some('\\') if !escaped => escaped = true,
                        Some('"') if !escaped => {
                            // An empty group is still a word.
                            tokens.push(Token::Word(std::mem::take(&mut word)));
                            break;
                        }
                        Some(c) => {
                            escaped = false;
                            word.push(c);
                        }
                    }
                }
            }
            ' ' | '\t' => flush(&mut tokens, &mut word),
            c => word.push(c),
        }
    }

    flush(&mut tokens, &mut word);
    (tokens, true)
}

fn flush(tokens: &mut Vec<Token>, word: &mut String) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}
