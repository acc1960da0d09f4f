// SPDX-License-Identifier: MIT

//! AST for the safe expression evaluator (§4.5). Every variant here is in
//! the accepted whitelist; anything that would need another variant
//! (attribute access, subscription, name lookup, call, lambda,
//! comprehension, import) is rejected by the parser before an AST node for
//! it could ever exist.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Str(String),
    Bool(bool),
    None,
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Neg(Box<Expr>),
    Pos(Box<Expr>),
    Not(Box<Expr>),
    Arith(Box<Expr>, ArithOp, Box<Expr>),
    /// A chain of comparisons sharing operands left-to-right, e.g. `a < b <
    /// c` is `[(a, Lt, b), (b, Le... )]`-style pairwise evaluation (§4.5).
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}
