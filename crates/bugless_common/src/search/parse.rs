use super::lex::Token;

/// A `key:value` filter in a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Constraint {
    pub key: String,
    pub value: String,
}

/// One element of a parsed query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Element {
    Constraint(Constraint),
    /// A free-standing word (or quoted group) not part of any constraint.
    Word(String),
}

/// Recursive-descent parser over lexed tokens.
pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens }
    }

    pub fn parse(mut self) -> Vec<Element> {
        let mut elements = Vec::new();
        loop {
            if let Some(constraint) = self.parse_constraint() {
                elements.push(Element::Constraint(constraint));
                continue;
            }
            if let Some(word) = self.parse_word() {
                elements.push(Element::Word(word));
                continue;
            }
            // Stray colon: skip it.
            if self.read(1).is_none() {
                break;
            }
        }
        elements
    }

    fn peek(&self, n: usize) -> Option<&'a [Token]> {
        self.tokens.get(..n)
    }

    fn read(&mut self, n: usize) -> Option<&'a [Token]> {
        let tokens = self.peek(n)?;
        self.tokens = &self.tokens[n..];
        Some(tokens)
    }

    fn parse_constraint(&mut self) -> Option<Constraint> {
        let constraint = match self.peek(3)? {
            [Token::Word(key), Token::Colon, Token::Word(value)] => Constraint {
                key: key.clone(),
                value: value.clone(),
            },
            _ => return None,
        };
        self.read(3);
        Some(constraint)
    }

    fn parse_word(&mut self) -> Option<String> {
        let word = match self.peek(1)? {
            [Token::Word(word)] => word.clone(),
            _ => return None,
        };
        self.read(1);
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    fn constraint(key: &str, value: &str) -> Element {
        Element::Constraint(Constraint {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_single_constraint() {
        let tokens = vec![word("author"), Token::Colon, word("foo")];
        assert_eq!(Parser::new(&tokens).parse(), vec![constraint("author", "foo")]);
    }

    #[test]
    fn test_mixed_with_stray_colons() {
        let tokens = vec![
            Token::Colon,
            word("author"),
            Token::Colon,
            word("foo"),
            word("bar baz"),
            word("title"),
            Token::Colon,
            word("foo"),
            word("bar"),
            word("baz"),
            Token::Colon,
        ];
        assert_eq!(
            Parser::new(&tokens).parse(),
            vec![
                constraint("author", "foo"),
                Element::Word("bar baz".to_string()),
                constraint("title", "foo"),
                Element::Word("bar".to_string()),
                Element::Word("baz".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty() {
        assert!(Parser::new(&[]).parse().is_empty());
    }
}
