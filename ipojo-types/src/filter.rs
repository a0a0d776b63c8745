use crate::error::TypesError;
use crate::properties::Properties;

/// A parsed LDAP filter expression (RFC 4515 subset).
///
/// Supports the operators iPOJO-style dependency filters and interceptor
/// target expressions actually use: equality, ordering comparisons,
/// approximate match, presence, substrings, and the `&`/`|`/`!` combinators.
/// Extended match (`attr:dn:=value`) is out of scope; nothing in §6 needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LdapFilter {
    /// `(attr=value)`, where `value` may contain `*` wildcards for substring
    /// matching, or be the bare string `*` for a presence test.
    Equality { attr: String, value: String },
    /// `(attr>=value)`.
    GreaterOrEqual { attr: String, value: String },
    /// `(attr<=value)`.
    LessOrEqual { attr: String, value: String },
    /// `(attr~=value)`. Treated exactly as [`LdapFilter::Equality`]: no
    /// phonetic/approximate-match library is pulled in for a single operator
    /// no caller in this workspace relies on for fuzzy matching.
    Approx { attr: String, value: String },
    /// `(&f1 f2 ...)`: every branch must match.
    And(Vec<LdapFilter>),
    /// `(|f1 f2 ...)`: at least one branch must match.
    Or(Vec<LdapFilter>),
    /// `(!f)`: the branch must not match.
    Not(Box<LdapFilter>),
}

impl LdapFilter {
    /// Parse a filter string. Surrounding parentheses are required at every
    /// nesting level, matching RFC 4515's grammar.
    pub fn parse(input: &str) -> Result<Self, TypesError> {
        let mut parser = Parser::new(input);
        let filter = parser.parse_filter()?;
        parser.skip_whitespace();
        if !parser.is_at_end() {
            return Err(TypesError::InvalidFilterSyntax(format!(
                "trailing input after filter: {input}"
            )));
        }
        Ok(filter)
    }

    /// Evaluate this filter against a property snapshot.
    ///
    /// Multi-valued properties match if *any* element satisfies the clause,
    /// mirroring OSGi's `Filter.match` semantics for list-valued properties.
    #[must_use]
    pub fn matches(&self, properties: &Properties) -> bool {
        match self {
            Self::Equality { attr, value } => match_values(properties, attr, value, eq_clause),
            Self::GreaterOrEqual { attr, value } => {
                match_values(properties, attr, value, ge_clause)
            }
            Self::LessOrEqual { attr, value } => match_values(properties, attr, value, le_clause),
            Self::Approx { attr, value } => match_values(properties, attr, value, eq_clause),
            Self::And(branches) => branches.iter().all(|f| f.matches(properties)),
            Self::Or(branches) => branches.iter().any(|f| f.matches(properties)),
            Self::Not(inner) => !inner.matches(properties),
        }
    }
}

fn match_values(
    properties: &Properties,
    attr: &str,
    pattern: &str,
    clause: impl Fn(&str, &str) -> bool,
) -> bool {
    if pattern == "*" {
        return properties.contains_key(attr);
    }
    properties
        .get(attr)
        .map(|value| value.string_values().iter().any(|v| clause(v, pattern)))
        .unwrap_or(false)
}

fn eq_clause(actual: &str, pattern: &str) -> bool {
    if pattern.contains('*') {
        substring_match(actual, pattern)
    } else {
        actual == pattern
    }
}

fn ge_clause(actual: &str, pattern: &str) -> bool {
    match (actual.parse::<i64>(), pattern.parse::<i64>()) {
        (Ok(a), Ok(p)) => a >= p,
        _ => actual >= pattern,
    }
}

fn le_clause(actual: &str, pattern: &str) -> bool {
    match (actual.parse::<i64>(), pattern.parse::<i64>()) {
        (Ok(a), Ok(p)) => a <= p,
        _ => actual <= pattern,
    }
}

/// `*`-delimited substring match: `pattern` is split on `*`; the leading
/// segment must prefix `actual`, the trailing segment must suffix it, and
/// every segment in between must appear, in order, somewhere between them.
fn substring_match(actual: &str, pattern: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    let mut rest = actual;

    if let Some(first) = segments.first() {
        if !first.is_empty() {
            if !rest.starts_with(first) {
                return false;
            }
            rest = &rest[first.len()..];
        }
    }

    if let Some(last) = segments.last() {
        if !last.is_empty() {
            if !rest.ends_with(last) {
                return false;
            }
            rest = &rest[..rest.len() - last.len()];
        }
    }

    for middle in segments.iter().skip(1).take(segments.len().saturating_sub(2)) {
        if middle.is_empty() {
            continue;
        }
        match rest.find(middle) {
            Some(idx) => rest = &rest[idx + middle.len()..],
            None => return false,
        }
    }

    true
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), TypesError> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            other => Err(TypesError::InvalidFilterSyntax(format!(
                "expected '{expected}', found {other:?} at position {}",
                self.pos
            ))),
        }
    }

    fn parse_filter(&mut self) -> Result<LdapFilter, TypesError> {
        self.skip_whitespace();
        self.expect('(')?;
        self.skip_whitespace();
        let filter = match self.peek() {
            Some('&') => {
                self.bump();
                LdapFilter::And(self.parse_filter_list()?)
            }
            Some('|') => {
                self.bump();
                LdapFilter::Or(self.parse_filter_list()?)
            }
            Some('!') => {
                self.bump();
                let inner = self.parse_filter()?;
                LdapFilter::Not(Box::new(inner))
            }
            _ => self.parse_item()?,
        };
        self.skip_whitespace();
        self.expect(')')?;
        Ok(filter)
    }

    fn parse_filter_list(&mut self) -> Result<Vec<LdapFilter>, TypesError> {
        let mut filters = Vec::new();
        self.skip_whitespace();
        while self.peek() == Some('(') {
            filters.push(self.parse_filter()?);
            self.skip_whitespace();
        }
        if filters.is_empty() {
            return Err(TypesError::InvalidFilterSyntax(
                "combinator requires at least one branch".to_string(),
            ));
        }
        Ok(filters)
    }

    fn parse_item(&mut self) -> Result<LdapFilter, TypesError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, '=' | '>' | '<' | '~' | ')' | '('))
        {
            self.bump();
        }
        let attr = self.input[start..self.pos].trim();
        if attr.is_empty() {
            return Err(TypesError::InvalidFilterSyntax(
                "missing attribute name".to_string(),
            ));
        }

        let op_start = self.pos;
        enum Op {
            Ge,
            Le,
            Approx,
            Eq,
        }
        let op = match self.peek() {
            Some('>') => {
                self.bump();
                self.expect('=')?;
                Op::Ge
            }
            Some('<') => {
                self.bump();
                self.expect('=')?;
                Op::Le
            }
            Some('~') => {
                self.bump();
                self.expect('=')?;
                Op::Approx
            }
            Some('=') => {
                self.bump();
                Op::Eq
            }
            other => {
                return Err(TypesError::InvalidFilterSyntax(format!(
                    "unexpected operator {other:?} at position {op_start}"
                )))
            }
        };

        let value_start = self.pos;
        while self.peek().is_some_and(|c| c != ')') {
            self.bump();
        }
        let value = self.input[value_start..self.pos].to_string();
        let attr = attr.to_string();

        Ok(match op {
            Op::Ge => LdapFilter::GreaterOrEqual { attr, value },
            Op::Le => LdapFilter::LessOrEqual { attr, value },
            Op::Approx => LdapFilter::Approx { attr, value },
            Op::Eq => LdapFilter::Equality { attr, value },
        })
    }
}
