// SPDX-License-Identifier: MIT

use super::ast::{ArithOp, CompareOp, Expr};
use super::lexer::{tokenize, Tok};
use crate::errors::ExpressionError;

pub fn parse(src: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        match parser.peek() {
            Some(Tok::Dot) | Some(Tok::LParen) | Some(Tok::LBracket) => {
                return Err(ExpressionError::Unsafe(
                    "attribute access, subscription, or call is not permitted".to_string(),
                ))
            }
            _ => {
                return Err(ExpressionError::Syntax {
                    position: parser.pos,
                    message: "unexpected trailing tokens".to_string(),
                })
            }
        }
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok, context: &str) -> Result<(), ExpressionError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(ExpressionError::Syntax { position: self.pos, message: format!("expected token in {context}") })
        }
    }

    fn is_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(w)) if w == word)
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.is_keyword(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ExpressionError> {
        if self.eat_keyword("not") {
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.parse_arith()?;
        let mut chain = Vec::new();

        loop {
            let op = if self.eat(&Tok::Eq) {
                CompareOp::Eq
            } else if self.eat(&Tok::Ne) {
                CompareOp::Ne
            } else if self.eat(&Tok::Le) {
                CompareOp::Le
            } else if self.eat(&Tok::Ge) {
                CompareOp::Ge
            } else if self.eat(&Tok::Lt) {
                CompareOp::Lt
            } else if self.eat(&Tok::Gt) {
                CompareOp::Gt
            } else if self.eat_keyword("in") {
                CompareOp::In
            } else if self.is_keyword("not") && self.peek_is_not_in() {
                self.pos += 1; // consume 'not'
                self.pos += 1; // consume 'in'
                CompareOp::NotIn
            } else if self.eat_keyword("is") {
                if self.eat_keyword("not") {
                    CompareOp::IsNot
                } else {
                    CompareOp::Is
                }
            } else {
                break;
            };
            let rhs = self.parse_arith()?;
            chain.push((op, rhs));
        }

        if chain.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), chain))
        }
    }

    fn peek_is_not_in(&self) -> bool {
        matches!(self.tokens.get(self.pos), Some(Tok::Ident(w)) if w == "not")
            && matches!(self.tokens.get(self.pos + 1), Some(Tok::Ident(w)) if w == "in")
    }

    fn parse_arith(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_term()?;
        loop {
            if self.eat(&Tok::Plus) {
                let right = self.parse_term()?;
                left = Expr::Arith(Box::new(left), ArithOp::Add, Box::new(right));
            } else if self.eat(&Tok::Minus) {
                let right = self.parse_term()?;
                left = Expr::Arith(Box::new(left), ArithOp::Sub, Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            if self.eat(&Tok::Star) {
                let right = self.parse_unary()?;
                left = Expr::Arith(Box::new(left), ArithOp::Mul, Box::new(right));
            } else if self.eat(&Tok::Slash) {
                let right = self.parse_unary()?;
                left = Expr::Arith(Box::new(left), ArithOp::Div, Box::new(right));
            } else if self.eat(&Tok::Percent) {
                let right = self.parse_unary()?;
                left = Expr::Arith(Box::new(left), ArithOp::Mod, Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        if self.eat(&Tok::Minus) {
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Tok::Plus) {
            return Ok(Expr::Pos(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        let expr = match self.next() {
            Some(Tok::Num(n)) => Expr::Num(n),
            Some(Tok::Str(s)) => Expr::Str(s),
            Some(Tok::Ident(word)) => match word.as_str() {
                "true" | "True" | "TRUE" => Expr::Bool(true),
                "false" | "False" | "FALSE" => Expr::Bool(false),
                "none" | "None" | "null" => Expr::None,
                _ => {
                    return Err(ExpressionError::Unsafe(format!(
                        "name lookup is not permitted: '{word}'"
                    )))
                }
            },
            Some(Tok::LParen) => {
                if self.eat(&Tok::RParen) {
                    Expr::Tuple(Vec::new())
                } else {
                    let first = self.parse_or()?;
                    if self.eat(&Tok::Comma) {
                        let mut items = vec![first];
                        while !matches!(self.peek(), Some(Tok::RParen)) {
                            items.push(self.parse_or()?);
                            if !self.eat(&Tok::Comma) {
                                break;
                            }
                        }
                        self.expect(&Tok::RParen, "tuple literal")?;
                        Expr::Tuple(items)
                    } else {
                        self.expect(&Tok::RParen, "parenthesized expression")?;
                        first
                    }
                }
            }
            Some(Tok::LBracket) => {
                let mut items = Vec::new();
                if !matches!(self.peek(), Some(Tok::RBracket)) {
                    loop {
                        items.push(self.parse_or()?);
                        if !self.eat(&Tok::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Tok::RBracket, "list literal")?;
                Expr::List(items)
            }
            Some(Tok::LBrace) => {
                let mut entries = Vec::new();
                if !matches!(self.peek(), Some(Tok::RBrace)) {
                    loop {
                        let key = self.parse_or()?;
                        self.expect(&Tok::Colon, "dict literal")?;
                        let value = self.parse_or()?;
                        entries.push((key, value));
                        if !self.eat(&Tok::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Tok::RBrace, "dict literal")?;
                Expr::Dict(entries)
            }
            Some(Tok::Dot) => {
                return Err(ExpressionError::Unsafe("attribute access is not permitted".to_string()))
            }
            other => {
                return Err(ExpressionError::Syntax {
                    position: self.pos,
                    message: format!("unexpected token {other:?}"),
                })
            }
        };

        if matches!(self.peek(), Some(Tok::Dot)) {
            return Err(ExpressionError::Unsafe("attribute access is not permitted".to_string()));
        }
        if matches!(self.peek(), Some(Tok::LParen)) {
            return Err(ExpressionError::Unsafe("function calls are not permitted".to_string()));
        }
        if matches!(self.peek(), Some(Tok::LBracket)) {
            return Err(ExpressionError::Unsafe("subscription is not permitted".to_string()));
        }

        Ok(expr)
    }
}
