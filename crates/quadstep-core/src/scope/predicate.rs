//! Rule conditions: a small boolean language compiled to an AST.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | primary
//! primary := "true" | "false" | "(" or ")"
//!          | "a.isStateAffected(" INT ")"
//!          | switch
//!          | variable OP INT
//! switch  := "s[" INT "]" | "s.value(" INT ")"
//! variable:= "v[" INT "]" | "v.value(" INT ")"
//! OP      := "==" | "===" | "!=" | "!==" | "<" | "<=" | ">" | ">="
//! ```

use serde::{Deserialize, Serialize};

use super::{ScopeContext, ScopeRuleError};

/// Comparison against a game variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Applies the comparison.
    #[must_use]
    pub fn apply(self, left: i64, right: i64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// A compiled rule condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Literal `true` or `false`
    Const(bool),
    /// The acting battler has a state
    StateAffected(u32),
    /// A switch is on
    Switch(u32),
    /// A variable compared with a constant
    Compare {
        /// Variable ID
        variable: u32,
        /// Comparison
        op: CompareOp,
        /// Right-hand side
        value: i64,
    },
    /// Negation
    Not(Box<Predicate>),
    /// Both hold
    And(Box<Predicate>, Box<Predicate>),
    /// Either holds
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Compiles condition text.
    ///
    /// # Errors
    ///
    /// [`ScopeRuleError::Parse`] with the offset of the first bad token.
    pub fn parse(text: &str) -> Result<Self, ScopeRuleError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            tokens: &tokens,
            index: 0,
            end: text.len(),
            depth: 0,
        };
        let predicate = parser.or()?;
        match parser.peek() {
            None => Ok(predicate),
            Some((_, position)) => Err(parse_error(position, "unexpected trailing input")),
        }
    }

    /// Evaluates against the game state. `&&` and `||` short-circuit.
    #[must_use]
    pub fn evaluate(&self, ctx: &dyn ScopeContext) -> bool {
        match self {
            Self::Const(value) => *value,
            Self::StateAffected(state) => ctx.is_state_affected(*state),
            Self::Switch(id) => ctx.switch(*id),
            Self::Compare {
                variable,
                op,
                value,
            } => op.apply(ctx.variable(*variable), *value),
            Self::Not(inner) => !inner.evaluate(ctx),
            Self::And(left, right) => left.evaluate(ctx) && right.evaluate(ctx),
            Self::Or(left, right) => left.evaluate(ctx) || right.evaluate(ctx),
        }
    }
}

fn parse_error(position: usize, reason: &str) -> ScopeRuleError {
    ScopeRuleError::Parse {
        position,
        reason: reason.to_string(),
    }
}

// =============================================================================
// Tokens
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Int(i64),
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Not,
    And,
    Or,
    Op(CompareOp),
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ScopeRuleError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();
        let token = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'.' => Token::Dot,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b'&' if next == Some(b'&') => {
                i += 1;
                Token::And
            }
            b'|' if next == Some(b'|') => {
                i += 1;
                Token::Or
            }
            b'=' if next == Some(b'=') => {
                i += 1;
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                }
                Token::Op(CompareOp::Eq)
            }
            b'!' if next == Some(b'=') => {
                i += 1;
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 1;
                }
                Token::Op(CompareOp::Ne)
            }
            b'!' => Token::Not,
            b'<' | b'>' => {
                let or_equal = next == Some(b'=');
                if or_equal {
                    i += 1;
                }
                Token::Op(match (c, or_equal) {
                    (b'<', false) => CompareOp::Lt,
                    (b'<', true) => CompareOp::Le,
                    (_, false) => CompareOp::Gt,
                    (_, true) => CompareOp::Ge,
                })
            }
            b'-' | b'0'..=b'9' => {
                i += 1;
                while bytes.get(i).is_some_and(u8::is_ascii_digit) {
                    i += 1;
                }
                let literal = &text[start..i];
                let value = literal
                    .parse()
                    .map_err(|_| parse_error(start, "expected an integer"))?;
                tokens.push((Token::Int(value), start));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while bytes
                    .get(i)
                    .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
                {
                    i += 1;
                }
                tokens.push((Token::Ident(text[start..i].to_string()), start));
                continue;
            }
            _ => return Err(parse_error(start, "unexpected character")),
        };
        i += 1;
        tokens.push((token, start));
    }
    Ok(tokens)
}

// =============================================================================
// Parser
// =============================================================================

/// Deepest condition tree accepted. `!`, parentheses and each chained
/// `&&`/`||` add one level.
const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    index: usize,
    end: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<(&Token, usize)> {
        self.tokens
            .get(self.index)
            .map(|(token, position)| (token, *position))
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |(_, position)| position)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().is_some_and(|(token, _)| token == expected) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, reason: &str) -> Result<(), ScopeRuleError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(parse_error(self.position(), reason))
        }
    }

    fn int(&mut self) -> Result<i64, ScopeRuleError> {
        match self.peek() {
            Some((Token::Int(value), _)) => {
                let value = *value;
                self.index += 1;
                Ok(value)
            }
            _ => Err(parse_error(self.position(), "expected an integer")),
        }
    }

    fn id(&mut self) -> Result<u32, ScopeRuleError> {
        let position = self.position();
        let value = self.int()?;
        u32::try_from(value).map_err(|_| parse_error(position, "expected a non-negative ID"))
    }

    fn descend(&mut self, position: usize) -> Result<(), ScopeRuleError> {
        if self.depth >= MAX_DEPTH {
            return Err(parse_error(position, "condition nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn or(&mut self) -> Result<Predicate, ScopeRuleError> {
        let depth = self.depth;
        let mut left = self.and()?;
        loop {
            let position = self.position();
            if !self.eat(&Token::Or) {
                break;
            }
            self.descend(position)?;
            let right = self.and()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn and(&mut self) -> Result<Predicate, ScopeRuleError> {
        let depth = self.depth;
        let mut left = self.unary()?;
        loop {
            let position = self.position();
            if !self.eat(&Token::And) {
                break;
            }
            self.descend(position)?;
            let right = self.unary()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Predicate, ScopeRuleError> {
        let position = self.position();
        if self.eat(&Token::Not) {
            self.descend(position)?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Predicate::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Predicate, ScopeRuleError> {
        let position = self.position();
        if self.eat(&Token::LParen) {
            self.descend(position)?;
            let inner = self.or()?;
            self.expect(&Token::RParen, "expected ')'")?;
            self.depth -= 1;
            return Ok(inner);
        }
        let name = match self.peek() {
            Some((Token::Ident(name), _)) => name.clone(),
            _ => return Err(parse_error(position, "expected a condition")),
        };
        self.index += 1;

        match name.as_str() {
            "true" => Ok(Predicate::Const(true)),
            "false" => Ok(Predicate::Const(false)),
            "a" => {
                self.expect(&Token::Dot, "expected '.'")?;
                self.expect(
                    &Token::Ident("isStateAffected".to_string()),
                    "expected isStateAffected",
                )?;
                self.expect(&Token::LParen, "expected '('")?;
                let state = self.id()?;
                self.expect(&Token::RParen, "expected ')'")?;
                Ok(Predicate::StateAffected(state))
            }
            "s" => Ok(Predicate::Switch(self.index_suffix()?)),
            "v" => {
                let variable = self.index_suffix()?;
                let op = match self.peek() {
                    Some((Token::Op(op), _)) => *op,
                    _ => return Err(parse_error(self.position(), "expected a comparison")),
                };
                self.index += 1;
                let value = self.int()?;
                Ok(Predicate::Compare {
                    variable,
                    op,
                    value,
                })
            }
            _ => Err(parse_error(position, "unknown name")),
        }
    }

    /// `[N]` or `.value(N)`
    fn index_suffix(&mut self) -> Result<u32, ScopeRuleError> {
        if self.eat(&Token::LBracket) {
            let id = self.id()?;
            self.expect(&Token::RBracket, "expected ']'")?;
            return Ok(id);
        }
        self.expect(&Token::Dot, "expected '[' or '.value('")?;
        self.expect(&Token::Ident("value".to_string()), "expected value")?;
        self.expect(&Token::LParen, "expected '('")?;
        let id = self.id()?;
        self.expect(&Token::RParen, "expected ')'")?;
        Ok(id)
    }
}

// =============================================================================
// Tests
// =============================================================================
