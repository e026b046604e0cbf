//! Textual filter expressions.
//!
//! Lets a caller describe a predicate as a string:
//! - `attendanceRate < 75`
//! - `department == 'Computer Science'`
//! - `status == 'Present' OR status == 'Late'`
//! - `NOT (present == true) AND email IS NOT NULL`
//!
//! Keywords are case-insensitive. A comparison against a field the record
//! does not carry is false; `IS NULL` treats an absent field as null.

use crate::record::Record;
use crate::value::FieldValue;
use std::cmp::Ordering;

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        field: String,
        op: CompareOp,
        literal: FieldValue,
    },
    IsNull(String),
    IsNotNull(String),
    /// Conjunction of two or more terms
    And(Vec<Expr>),
    /// Disjunction of two or more terms
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

/// Deepest nesting of parentheses and `NOT` the parser accepts
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(FieldValue),
    Op(CompareOp),
    And,
    Or,
    Not,
    Is,
    LParen,
    RParen,
    Eof,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    /// Consumes `=` after an operator character, returning whether it was there.
    fn eat_eq(&mut self) -> bool {
        if self.peek() == Some('=') {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().map_or(false, &keep) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn number(&mut self, negative: bool) -> Result<Token, String> {
        let text = self.take_while(|c| c.is_ascii_digit() || c == '.');
        let signed = if negative { format!("-{}", text) } else { text };
        if signed.contains('.') {
            signed
                .parse::<f64>()
                .map(|v| Token::Literal(FieldValue::Float(v)))
                .map_err(|_| format!("Invalid number: {}", signed))
        } else {
            signed
                .parse::<i64>()
                .map(|v| Token::Literal(FieldValue::Int(v)))
                .map_err(|_| format!("Invalid number: {}", signed))
        }
    }

    fn quoted(&mut self, quote: char) -> Result<Token, String> {
        self.bump();
        let mut text = String::new();
        while let Some(c) = self.bump() {
            match c {
                c if c == quote => return Ok(Token::Literal(FieldValue::Text(text))),
                '\\' => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(other) => text.push(other),
                    None => break,
                },
                c => text.push(c),
            }
        }
        Err("Unterminated string".to_string())
    }

    fn next_token(&mut self) -> Result<Token, String> {
        self.take_while(char::is_whitespace);

        let c = match self.peek() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        match c {
            '(' => {
                self.bump();
                Ok(Token::LParen)
            }
            ')' => {
                self.bump();
                Ok(Token::RParen)
            }
            '=' => {
                self.bump();
                // `=` and `==` are the same operator
                self.eat_eq();
                Ok(Token::Op(CompareOp::Eq))
            }
            '!' => {
                self.bump();
                Ok(if self.eat_eq() { Token::Op(CompareOp::Ne) } else { Token::Not })
            }
            '<' => {
                self.bump();
                Ok(Token::Op(if self.eat_eq() { CompareOp::Le } else { CompareOp::Lt }))
            }
            '>' => {
                self.bump();
                Ok(Token::Op(if self.eat_eq() { CompareOp::Ge } else { CompareOp::Gt }))
            }
            '\'' | '"' => self.quoted(c),
            '-' if self.peek_at(1).map_or(false, |d| d.is_ascii_digit() || d == '.') => {
                self.bump();
                self.number(true)
            }
            c if c.is_ascii_digit() => self.number(false),
            c if c.is_alphabetic() || c == '_' => {
                let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
                Ok(match word.to_ascii_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    "IS" => Token::Is,
                    "NULL" => Token::Literal(FieldValue::Null),
                    "TRUE" => Token::Literal(FieldValue::Bool(true)),
                    "FALSE" => Token::Literal(FieldValue::Bool(false)),
                    _ => Token::Ident(word),
                })
            }
            other => Err(format!("Unexpected character: {}", other)),
        }
    }
}

/// Recursive-descent parser: OR < AND < NOT < comparison
struct Parser {
    lexer: Lexer,
    current: Token,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, String> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            depth: 0,
        })
    }

    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(format!("Expression nested too deeply (limit {})", MAX_DEPTH));
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<Token, String> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    // Chains of AND/OR are collected flat so their length never adds depth
    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut terms = vec![self.parse_and()?];
        while self.current == Token::Or {
            self.advance()?;
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Expr::Or(terms) })
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut terms = vec![self.parse_not()?];
        while self.current == Token::And {
            self.advance()?;
            terms.push(self.parse_not()?);
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Expr::And(terms) })
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        if self.current == Token::Not {
            self.advance()?;
            self.descend()?;
            let inner = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_term()
    }

    fn parse_term(&mut self) -> Result<Expr, String> {
        if self.current == Token::LParen {
            self.advance()?;
            self.descend()?;
            let inner = self.parse_or()?;
            if self.current != Token::RParen {
                return Err(format!("Expected ')', got {:?}", self.current));
            }
            self.advance()?;
            self.depth -= 1;
            return Ok(inner);
        }

        let field = match self.advance()? {
            Token::Ident(name) => name,
            other => return Err(format!("Expected field name, got {:?}", other)),
        };

        match self.advance()? {
            Token::Is => {
                let negated = if self.current == Token::Not {
                    self.advance()?;
                    true
                } else {
                    false
                };
                match self.advance()? {
                    Token::Literal(FieldValue::Null) if negated => Ok(Expr::IsNotNull(field)),
                    Token::Literal(FieldValue::Null) => Ok(Expr::IsNull(field)),
                    other => Err(format!("Expected NULL after IS, got {:?}", other)),
                }
            }
            Token::Op(op) => match self.advance()? {
                Token::Literal(literal) => Ok(Expr::Compare { field, op, literal }),
                other => Err(format!("Expected literal value, got {:?}", other)),
            },
            other => Err(format!("Expected comparison operator, got {:?}", other)),
        }
    }
}

/// Parse an expression string.
pub fn parse_expr(input: &str) -> Result<Expr, String> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_or()?;
    if parser.current != Token::Eof {
        return Err(format!("Unexpected token after expression: {:?}", parser.current));
    }
    Ok(expr)
}

/// Evaluate an expression against a record.
pub fn eval_expr(expr: &Expr, record: &Record) -> bool {
    match expr {
        Expr::Compare { field, op, literal } => match record.get(field) {
            Some(value) => compare(value, *op, literal),
            None => false,
        },
        Expr::IsNull(field) => record.get(field).map_or(true, FieldValue::is_null),
        Expr::IsNotNull(field) => record.get(field).map_or(false, |v| !v.is_null()),
        Expr::And(terms) => terms.iter().all(|t| eval_expr(t, record)),
        Expr::Or(terms) => terms.iter().any(|t| eval_expr(t, record)),
        Expr::Not(inner) => !eval_expr(inner, record),
    }
}

fn compare(value: &FieldValue, op: CompareOp, literal: &FieldValue) -> bool {
    match (value, literal) {
        // NULL never compares; use IS NULL
        (FieldValue::Null, _) | (_, FieldValue::Null) => false,
        (FieldValue::Bool(a), FieldValue::Bool(b)) => match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            _ => false,
        },
        (FieldValue::Text(_), FieldValue::Text(_)) => op.holds(value.natural_cmp(literal)),
        (a, b) if a.is_number() && b.is_number() => {
            // NaN never compares, like NULL
            !a.is_nan() && !b.is_nan() && op.holds(a.natural_cmp(b))
        }
        _ => false,
    }
}

/// Distinct field names an expression reads, sorted.
pub fn referenced_fields(expr: &Expr) -> Vec<String> {
    fn walk(expr: &Expr, out: &mut Vec<String>) {
        match expr {
            Expr::Compare { field, .. } | Expr::IsNull(field) | Expr::IsNotNull(field) => {
                out.push(field.clone())
            }
            Expr::And(terms) | Expr::Or(terms) => {
                for term in terms {
                    walk(term, out);
                }
            }
            Expr::Not(inner) => walk(inner, out),
        }
    }

    let mut fields = Vec::new();
    walk(expr, &mut fields);
    fields.sort();
    fields.dedup();
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Record {
        Record::new()
            .with("id", "IEC2022063")
            .with("name", "Aman Kumar")
            .with("department", "Electronics")
            .with("attendanceRate", 76)
            .with("gpa", 7.61)
            .with("present", false)
            .with("email", FieldValue::Null)
    }

    fn check(input: &str) -> bool {
        eval_expr(&parse_expr(input).unwrap(), &student())
    }

    #[test]
    fn test_comparisons() {
        assert!(check("attendanceRate < 85"));
        assert!(check("attendanceRate >= 76"));
        assert!(!check("attendanceRate > 76"));
        assert!(check("gpa > 7.5"));
        assert!(check("attendanceRate = 76.0"));
        assert!(check("department == 'Electronics'"));
        assert!(check("department != \"Computer Science\""));
        assert!(check("present == false"));
    }

    #[test]
    fn test_boolean_connectives_and_precedence() {
        assert!(check("attendanceRate < 75 OR department == 'Electronics'"));
        assert!(!check("attendanceRate < 75 AND department == 'Electronics'"));
        assert!(check("NOT present == true"));
        // AND binds tighter than OR
        assert!(check("gpa > 9 AND present == true OR attendanceRate == 76"));
        assert!(!check("gpa > 9 AND (present == true OR attendanceRate == 76)"));
        assert!(check("not (gpa > 9) and name == 'Aman Kumar'"));
    }

    #[test]
    fn test_absent_and_null_fields() {
        assert!(!check("semester == '6th'"));
        assert!(!check("semester != '6th'"));
        assert!(check("semester IS NULL"));
        assert!(check("email IS NULL"));
        assert!(!check("email IS NOT NULL"));
        assert!(check("name IS NOT NULL"));
        assert!(!check("email == NULL"));
    }

    #[test]
    fn test_type_mismatch_is_false() {
        assert!(!check("attendanceRate == '76'"));
        assert!(!check("present < true"));
        assert!(!check("name > 3"));
    }

    #[test]
    fn test_negative_numbers() {
        let record = Record::new().with("id", "x").with("delta", -3);
        assert!(eval_expr(&parse_expr("delta < -2").unwrap(), &record));
        assert!(eval_expr(&parse_expr("delta > -3.5").unwrap(), &record));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expr("").is_err());
        assert!(parse_expr("rate <").is_err());
        assert!(parse_expr("(rate < 3").is_err());
        assert!(parse_expr("rate < 3 rate").is_err());
        assert!(parse_expr("name == 'open").unwrap_err().contains("Unterminated"));
        assert!(parse_expr("rate IS 5").is_err());
        assert!(parse_expr("rate # 5").unwrap_err().contains("Unexpected character"));
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}a == 1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(parse_expr(&ok).is_ok());

        let deep = format!("{}a == 1{}", "(".repeat(50_000), ")".repeat(50_000));
        assert!(parse_expr(&deep).unwrap_err().contains("nested too deeply"));

        let nots = format!("{}a == 1", "NOT ".repeat(50_000));
        assert!(parse_expr(&nots).unwrap_err().contains("nested too deeply"));
    }

    #[test]
    fn test_long_and_chain_is_flat() {
        let input = vec!["attendanceRate == 76"; 40_000].join(" AND ");
        let expr = parse_expr(&input).unwrap();
        match &expr {
            Expr::And(terms) => assert_eq!(terms.len(), 40_000),
            other => panic!("expected AND, got {:?}", other),
        }
        assert!(eval_expr(&expr, &student()));

        let input = vec!["gpa > 9"; 40_000].join(" or ");
        assert!(!check(&input));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let record = Record::new().with("id", "x").with("big", i64::MAX);
        // i64::MAX widens to 2^63 as f64
        assert!(eval_expr(&parse_expr("big < 9223372036854775808.0").unwrap(), &record));
        assert!(!eval_expr(&parse_expr("big == 9223372036854775808.0").unwrap(), &record));
    }

    #[test]
    fn test_referenced_fields() {
        let expr = parse_expr("b > 1 AND (a IS NULL OR b < 5)").unwrap();
        assert_eq!(referenced_fields(&expr), ["a", "b"]);
    }
}
