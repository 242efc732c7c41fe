//! The Bugless search query language.
//!
//! A query is made of key/value constraints like `author:q3k` and free
//! keywords. `author:q3k foo "bar foo" status:new` selects issues authored
//! by q3k whose status is new, ranked by the keywords `foo` and `bar foo`.
//! Double quotes group words, and `\` escapes the next character inside a
//! group.

mod lex;
mod parse;

use parse::{Element, Parser};

/// A parsed, lightly typed search query.
///
/// Constraint values are kept as typed by the user; consumers decide how
/// strictly to interpret them (see [`IssueStatus::parse`](crate::IssueStatus::parse)).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub id: Option<String>,
    pub author: Option<String>,
    pub assignee: Option<String>,
    pub status: Option<String>,
    /// Words that are not part of a constraint, in query order.
    pub keywords: Vec<String>,
    /// The query as given.
    pub original: String,
    /// False if lexing stopped at an unterminated double quote.
    pub terminated: bool,
}

impl SearchQuery {
    /// Parses `s`. Never fails: unknown constraint keys and stray tokens are ignored.
    pub fn parse(s: &str) -> Self {
        let (tokens, terminated) = lex::lex(s);
        let mut query = SearchQuery {
            original: s.to_string(),
            terminated,
            ..Default::default()
        };

        for element in Parser::new(&tokens).parse() {
            match element {
                Element::Constraint(constraint) => {
                    let slot = match constraint.key.to_lowercase().as_str() {
                        "id" => &mut query.id,
                        "author" => &mut query.author,
                        "assignee" => &mut query.assignee,
                        "status" => &mut query.status,
                        _ => {
                            log::trace!("ignoring unknown search key {:?}", constraint.key);
                            continue;
                        }
                    };
                    *slot = Some(constraint.value);
                }
                Element::Word(word) => query.keywords.push(word),
            }
        }
        query
    }

    /// True if the query has at least one recognised constraint.
    pub fn has_constraints(&self) -> bool {
        self.id.is_some() || self.author.is_some() || self.assignee.is_some() || self.status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let q = SearchQuery::parse("assignee:q3k status:assigned");
        assert_eq!(q.assignee.as_deref(), Some("q3k"));
        assert_eq!(q.status.as_deref(), Some("assigned"));
        assert!(q.keywords.is_empty());

        let q = SearchQuery::parse("id:1234");
        assert_eq!(q.id.as_deref(), Some("1234"));

        let q = SearchQuery::parse("bugless \"bug less\"");
        assert_eq!(q.keywords, vec!["bugless", "bug less"]);
        assert!(!q.has_constraints());

        let q = SearchQuery::parse("author:\"q3k@q3k.org\" \"foo bar\"");
        assert_eq!(q.author.as_deref(), Some("q3k@q3k.org"));
        assert_eq!(q.keywords, vec!["foo bar"]);
        assert!(q.terminated);
    }

    #[test]
    fn test_keys_are_case_insensitive_and_unknown_keys_ignored() {
        let q = SearchQuery::parse("Author:q3k title:foo bar");
        assert_eq!(q.author.as_deref(), Some("q3k"));
        assert_eq!(q.keywords, vec!["bar"]);
        assert_eq!(q.original, "Author:q3k title:foo bar");
    }

    #[test]
    fn test_email_author_is_one_constraint() {
        let q = SearchQuery::parse("author:q3k@q3k.org");
        assert_eq!(q.author.as_deref(), Some("q3k@q3k.org"));
        assert!(q.has_constraints());
    }

    #[test]
    fn test_unterminated_query() {
        let q = SearchQuery::parse("status:new \"oops");
        assert!(!q.terminated);
        assert_eq!(q.status.as_deref(), Some("new"));
        assert!(q.keywords.is_empty());
    }
}
