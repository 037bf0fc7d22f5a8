//! Constrained read-only query evaluation.
//!
//! Grammar: `SELECT <cols|*> FROM <table> [WHERE col = <literal> [AND ...]]
//! [ORDER BY col [ASC|DESC]]`, optionally semicolon-terminated. Anything
//! else is an invalid query.
//!
//! Before parsing, query text is screened against a keyword denylist
//! (`drop`, `delete`, `alter`, `truncate` as whole words, case-insensitive).
//! The denylist is advisory only and is NOT a security boundary: it matches
//! keywords, not semantics, and must never be relied on in a security
//! context.

use valdesk_core::SourceError;
use valdesk_model::{EntitySchema, Record};

const FORBIDDEN_KEYWORDS: [&str; 4] = ["drop", "delete", "alter", "truncate"];

/// Reject empty text and denylisted keywords. Runs before parsing, so even
/// statements the evaluator cannot parse are keyword-screened first.
pub(crate) fn validate_text(text: &str) -> Result<(), SourceError> {
    if text.trim().is_empty() {
        return Err(SourceError::InvalidQuery("query is empty".to_string()));
    }
    let mut word = String::new();
    for c in text.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c.to_ascii_lowercase());
        } else if !word.is_empty() {
            if FORBIDDEN_KEYWORDS.contains(&word.as_str()) {
                return Err(SourceError::ForbiddenKeyword(word));
            }
            word.clear();
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderBy {
    pub column: String,
    pub descending: bool,
}

/// A parsed statement. `columns` of `None` means `SELECT *`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectStatement {
    pub columns: Option<Vec<String>>,
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
}

impl SelectStatement {
    pub(crate) fn parse(text: &str) -> Result<Self, SourceError> {
        Parser::new(text)?.statement()
    }

    /// Apply filters, ordering, and projection to an entity's rows.
    pub(crate) fn evaluate(
        &self,
        schema: &EntitySchema,
        rows: &[Record],
    ) -> Result<Vec<Record>, SourceError> {
        let check_column = |column: &str| -> Result<(), SourceError> {
            if schema.field(column).is_none() {
                return Err(SourceError::UnknownColumn {
                    entity: schema.name().to_string(),
                    column: column.to_string(),
                });
            }
            Ok(())
        };
        if let Some(columns) = &self.columns {
            for column in columns {
                check_column(column)?;
            }
        }
        for filter in &self.filters {
            check_column(&filter.column)?;
        }
        if let Some(order) = &self.order {
            check_column(&order.column)?;
        }

        let mut matched: Vec<Record> = rows
            .iter()
            .filter(|row| {
                self.filters.iter().all(|filter| {
                    row.value_or_null(&filter.column).key_string() == filter.value
                })
            })
            .cloned()
            .collect();

        if let Some(order) = &self.order {
            matched.sort_by(|a, b| {
                let left = a.value_or_null(&order.column).key_string();
                let right = b.value_or_null(&order.column).key_string();
                let ordering = match (left.parse::<f64>(), right.parse::<f64>()) {
                    (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(std::cmp::Ordering::Equal),
                    _ => left.cmp(&right),
                };
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        match &self.columns {
            None => Ok(matched),
            Some(columns) => Ok(matched
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| (column.clone(), row.value_or_null(column)))
                        .collect()
                })
                .collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Literal(String),
    Comma,
    Eq,
    Star,
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Self, SourceError> {
        Ok(Self {
            tokens: tokenize(text)?,
            position: 0,
        })
    }

    fn statement(mut self) -> Result<SelectStatement, SourceError> {
        self.expect_keyword("select")?;
        let columns = self.column_list()?;
        self.expect_keyword("from")?;
        let table = self.identifier("table name")?;
        let mut filters = Vec::new();
        if self.take_keyword("where") {
            loop {
                let column = self.identifier("filter column")?;
                self.expect(&Token::Eq, "=")?;
                let value = self.literal()?;
                filters.push(Filter { column, value });
                if !self.take_keyword("and") {
                    break;
                }
            }
        }
        let mut order = None;
        if self.take_keyword("order") {
            self.expect_keyword("by")?;
            let column = self.identifier("order column")?;
            let descending = if self.take_keyword("desc") {
                true
            } else {
                self.take_keyword("asc");
                false
            };
            order = Some(OrderBy { column, descending });
        }
        if self.position != self.tokens.len() {
            return Err(invalid("unexpected trailing input"));
        }
        Ok(SelectStatement {
            columns,
            table,
            filters,
            order,
        })
    }

    fn column_list(&mut self) -> Result<Option<Vec<String>>, SourceError> {
        if self.take(&Token::Star) {
            return Ok(None);
        }
        let mut columns = vec![self.identifier("column name")?];
        while self.take(&Token::Comma) {
            columns.push(self.identifier("column name")?);
        }
        Ok(Some(columns))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn take(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn take_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, token: &Token, shown: &str) -> Result<(), SourceError> {
        if self.take(token) {
            Ok(())
        } else {
            Err(invalid(&format!("expected {shown}")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), SourceError> {
        if self.take_keyword(keyword) {
            Ok(())
        } else {
            Err(invalid(&format!("expected keyword {}", keyword.to_uppercase())))
        }
    }

    fn identifier(&mut self, what: &str) -> Result<String, SourceError> {
        match self.peek() {
            Some(Token::Word(word)) => {
                let word = word.clone();
                self.position += 1;
                Ok(word)
            }
            _ => Err(invalid(&format!("expected {what}"))),
        }
    }

    fn literal(&mut self) -> Result<String, SourceError> {
        match self.peek() {
            Some(Token::Literal(text)) => {
                let text = text.clone();
                self.position += 1;
                Ok(text)
            }
            Some(Token::Word(word)) => {
                let word = word.clone();
                self.position += 1;
                Ok(word)
            }
            _ => Err(invalid("expected literal value")),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, SourceError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ';' => {
                chars.next();
                // Only a trailing semicolon is tolerated.
                if chars.any(|rest| !rest.is_whitespace()) {
                    return Err(invalid("text after statement terminator"));
                }
                break;
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == quote {
                        closed = true;
                        break;
                    }
                    literal.push(inner);
                }
                if !closed {
                    return Err(invalid("unterminated string literal"));
                }
                tokens.push(Token::Literal(literal));
            }
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if w.is_ascii_alphanumeric() || w == '_' || w == '.' || w == '-' {
                        word.push(w);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word));
            }
            other => {
                return Err(invalid(&format!("unexpected character {other:?}")));
            }
        }
    }
    Ok(tokens)
}

fn invalid(message: &str) -> SourceError {
    SourceError::InvalidQuery(message.to_string())
}
