//! Rule DSL front end: tokenizer and expression parser.
//!
//! Rule predicates are written in a small fixed vocabulary:
//!
//! ```text
//! AVAILABLE(x)  USED(x)  SIZE(x)  TYPE(x,y)  LARGEST()
//! &&  ||  !  ==  !=  <  <=  >  >=  integers  ( )
//! ```
//!
//! The text is tokenized and parsed into an expression AST up front, so a
//! rule can only ever reference the five predicates and the boolean and
//! comparison connectives. There is no general-purpose evaluator behind
//! this, hence nothing for a rule to escape into: no identifiers, no
//! statements, no assignment.
//!
//! Precedence, loosest first: `||`, `&&`, `!`, comparisons. `!` binding
//! looser than a comparison means `!SIZE(x) > 4` negates the whole
//! comparison.

use thiserror::Error;

/// A rule text that does not conform to the DSL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError
{
    /// A character outside the DSL alphabet.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar
    {
        /// The offending character
        found: char,
        /// Byte offset into the rule text
        offset: usize,
    },

    /// A word that is not one of the five predicate names.
    #[error("unknown predicate {0:?}")]
    UnknownPredicate(String),

    /// A predicate call with the wrong argument shape.
    #[error("malformed arguments for {0}")]
    BadArguments(&'static str),

    /// The token stream did not form a single boolean expression.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken
    {
        /// What the parser was looking for
        expected: &'static str,
        /// What it found instead
        found: String,
    },

    /// Input ended in the middle of an expression.
    #[error("unexpected end of rule")]
    UnexpectedEnd,
}

/// One of the five table predicates, with its arguments captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate
{
    /// `AVAILABLE(x)`: the symbol exists in the table.
    Available(String),
    /// `USED(x)`: the symbol exists and the file under test defines or
    /// references it.
    Used(String),
    /// `SIZE(x)`: the symbol's size, or the empty sentinel.
    Size(String),
    /// `TYPE(x, y)`: the symbol's recorded type. The second argument is
    /// accepted but not compared against; see the evaluator.
    Type(String, String),
    /// `LARGEST()`: the maximum size over all entries.
    Largest,
}

/// Comparison operators usable between two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp
{
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Compiled rule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr
{
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    Call(Predicate),
    Int(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token
{
    Call(Predicate),
    Int(u64),
    AndAnd,
    OrOr,
    Not,
    Compare(CompareOp),
    LParen,
    RParen,
}

impl Token
{
    fn describe(&self) -> String
    {
        match self {
            Token::Call(pred) => format!("predicate {pred:?}"),
            Token::Int(value) => format!("integer {value}"),
            Token::AndAnd => "'&&'".to_string(),
            Token::OrOr => "'||'".to_string(),
            Token::Not => "'!'".to_string(),
            Token::Compare(op) => format!("comparison {op:?}"),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

/// Compile a rule text into an evaluable expression.
pub fn compile_rule(text: &str) -> Result<Expr, CompileError>
{
    let tokens = tokenize(text)?;
    Parser { tokens, pos: 0 }.parse()
}

fn tokenize(text: &str) -> Result<Vec<Token>, CompileError>
{
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        match byte {
            b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
            b'(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            b'&' if bytes.get(pos + 1) == Some(&b'&') => {
                tokens.push(Token::AndAnd);
                pos += 2;
            }
            b'|' if bytes.get(pos + 1) == Some(&b'|') => {
                tokens.push(Token::OrOr);
                pos += 2;
            }
            b'!' if bytes.get(pos + 1) == Some(&b'=') => {
                tokens.push(Token::Compare(CompareOp::Ne));
                pos += 2;
            }
            b'!' => {
                tokens.push(Token::Not);
                pos += 1;
            }
            b'=' if bytes.get(pos + 1) == Some(&b'=') => {
                tokens.push(Token::Compare(CompareOp::Eq));
                pos += 2;
            }
            b'<' if bytes.get(pos + 1) == Some(&b'=') => {
                tokens.push(Token::Compare(CompareOp::Le));
                pos += 2;
            }
            b'<' => {
                tokens.push(Token::Compare(CompareOp::Lt));
                pos += 1;
            }
            b'>' if bytes.get(pos + 1) == Some(&b'=') => {
                tokens.push(Token::Compare(CompareOp::Ge));
                pos += 2;
            }
            b'>' => {
                tokens.push(Token::Compare(CompareOp::Gt));
                pos += 1;
            }
            b'0'..=b'9' => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                let digits = &text[start..pos];
                let value = digits.parse::<u64>().map_err(|_| CompileError::UnexpectedToken {
                    expected: "integer literal",
                    found: digits.to_string(),
                })?;
                tokens.push(Token::Int(value));
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                let start = pos;
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
                let word = &text[start..pos];
                let (call, consumed) = lex_predicate(word, &text[pos..])?;
                tokens.push(Token::Call(call));
                pos += consumed;
            }
            _ => {
                let offset = pos;
                let found = text[pos..].chars().next().unwrap_or('\u{fffd}');
                return Err(CompileError::UnexpectedChar { found, offset });
            }
        }
    }

    Ok(tokens)
}

/// Lex the argument list following a predicate name. Returns the predicate
/// and how many bytes of `rest` were consumed.
fn lex_predicate(word: &str, rest: &str) -> Result<(Predicate, usize), CompileError>
{
    let (name, arity): (&'static str, usize) = match word {
        "AVAILABLE" => ("AVAILABLE", 1),
        "USED" => ("USED", 1),
        "SIZE" => ("SIZE", 1),
        "TYPE" => ("TYPE", 2),
        "LARGEST" => ("LARGEST", 0),
        _ => return Err(CompileError::UnknownPredicate(word.to_string())),
    };

    let Some(args_end) = rest.find(')') else {
        return Err(CompileError::BadArguments(name));
    };
    if !rest.starts_with('(') {
        return Err(CompileError::BadArguments(name));
    }
    let args_text = &rest[1..args_end];

    let args: Vec<&str> = if arity == 0 {
        if !args_text.trim().is_empty() {
            return Err(CompileError::BadArguments(name));
        }
        Vec::new()
    } else {
        // An empty argument is a valid (never-matching) symbol name.
        args_text.split(',').map(str::trim).collect()
    };
    if args.len() != arity || !args.iter().all(|arg| is_symbol_name(arg)) {
        return Err(CompileError::BadArguments(name));
    }

    let call = match word {
        "AVAILABLE" => Predicate::Available(args[0].to_string()),
        "USED" => Predicate::Used(args[0].to_string()),
        "SIZE" => Predicate::Size(args[0].to_string()),
        "TYPE" => Predicate::Type(args[0].to_string(), args[1].to_string()),
        _ => Predicate::Largest,
    };
    Ok((call, args_end + 1))
}

/// Predicate arguments follow the original `[A-Za-z0-9_]*` shape. An empty
/// argument is allowed there too, so it is allowed here.
fn is_symbol_name(arg: &str) -> bool
{
    arg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Parser
{
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser
{
    fn parse(mut self) -> Result<Expr, CompileError>
    {
        let expr = self.parse_or()?;
        match self.peek() {
            None => Ok(expr),
            Some(extra) => Err(CompileError::UnexpectedToken {
                expected: "end of rule",
                found: extra.describe(),
            }),
        }
    }

    fn peek(&self) -> Option<&Token>
    {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token>
    {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<Expr, CompileError>
    {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, CompileError>
    {
        let mut left = self.parse_not()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, CompileError>
    {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, CompileError>
    {
        let left = self.parse_primary()?;
        if let Some(Token::Compare(op)) = self.peek().cloned() {
            self.advance();
            let right = self.parse_primary()?;
            return Ok(Expr::Compare(Box::new(left), op, Box::new(right)));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError>
    {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(CompileError::UnexpectedToken {
                        expected: "')'",
                        found: other.describe(),
                    }),
                    None => Err(CompileError::UnexpectedEnd),
                }
            }
            Some(Token::Call(pred)) => Ok(Expr::Call(pred)),
            Some(Token::Int(value)) => Ok(Expr::Int(value)),
            Some(other) => Err(CompileError::UnexpectedToken {
                expected: "predicate, integer or '('",
                found: other.describe(),
            }),
            None => Err(CompileError::UnexpectedEnd),
        }
    }
}
