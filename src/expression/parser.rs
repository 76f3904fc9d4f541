//! Recursive-descent parser for lambda source text.
//!
//! ```text
//! lambda      := params "=>" expr
//! params      := ident | "(" [param ("," param)*] ")"
//! param       := ident [":" type]
//! expr        := or ["?" expr ":" expr]
//! or          := and ("||" and)*
//! and         := equality ("&&" equality)*
//! equality    := comparison (("==" | "!=") comparison)*
//! comparison  := term (("<" | "<=" | ">" | ">=") term)*
//! term        := factor (("+" | "-") factor)*
//! factor      := unary (("*" | "/" | "%") unary)*
//! unary       := ("!" | "-") unary | postfix
//! postfix     := primary ("." ident ["(" args ")"] | "as" type)*
//! primary     := literal | ident | ident "(" args ")" | "(" expr ")"
//! ```

use smallvec::SmallVec;

use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::expression::lambda::{Lambda, Predicate, Selector};
use crate::expression::lexer::{Span, Token, TokenKind, lex};
use crate::foundation::error::{ExprKitError, ExprKitResult};
use crate::foundation::value::{Value, ValueType};

/// Tallest tree the parser returns, counted in nodes from the body root to the deepest leaf.
const MAX_DEPTH: usize = 128;

/// Bound on nested groups, ternary branches, call arguments and prefix operators.
///
/// Canonical text of a tree at [`MAX_DEPTH`] nests at most two levels per node, so it stays
/// parseable.
const MAX_NESTING: usize = 2 * MAX_DEPTH + 1;

/// Parse `params => body` into a lambda whose body references its own parameter nodes.
pub fn parse_lambda(src: &str) -> ExprKitResult<Lambda> {
    let tokens = lex(src)?;
    let mut p = Parser {
        tokens,
        pos: 0,
        nesting: 0,
        params: SmallVec::new(),
    };
    p.parse_params()?;
    p.expect(TokenKind::Arrow)?;
    let body = p.parse_expr()?;
    p.expect(TokenKind::Eof)?;
    Lambda::new(p.params, body.expr)
}

/// Parse a single-parameter lambda as a predicate.
pub fn parse_predicate(src: &str) -> ExprKitResult<Predicate> {
    Predicate::new(parse_lambda(src)?)
}

/// Parse a single-parameter lambda as a selector.
pub fn parse_selector(src: &str) -> ExprKitResult<Selector> {
    Selector::new(parse_lambda(src)?)
}

/// An expression together with its height in nodes.
struct Node {
    expr: Expr,
    height: usize,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
    params: SmallVec<[Expr; 2]>,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, ahead: usize) -> &TokenKind {
        let i = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[i].kind
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn enter(&mut self) -> ExprKitResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ExprKitError::parse(
                self.span().start,
                "expression nests too deeply",
            ));
        }
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> ExprKitResult<()> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(ExprKitError::parse(
                self.span().start,
                format!(
                    "expected {}, found {}",
                    kind.describe(),
                    self.peek().kind.describe()
                ),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self, what: &str) -> ExprKitResult<(String, Span)> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Ident(s) => Ok((s, t.span)),
            other => Err(ExprKitError::parse(
                t.span.start,
                format!("expected {what}, found {}", other.describe()),
            )),
        }
    }

    fn parse_params(&mut self) -> ExprKitResult<()> {
        if !self.consume(TokenKind::LParen) {
            let (name, _) = self.expect_ident("parameter name")?;
            self.params.push(Expr::parameter(name, ValueType::Any));
            return Ok(());
        }
        if self.consume(TokenKind::RParen) {
            return Ok(());
        }
        loop {
            let (name, span) = self.expect_ident("parameter name")?;
            if self
                .params
                .iter()
                .any(|p| p.as_parameter().is_some_and(|(n, _)| n == name))
            {
                return Err(ExprKitError::parse(
                    span.start,
                    format!("duplicate parameter `{name}`"),
                ));
            }
            let ty = if self.consume(TokenKind::Colon) {
                self.parse_type()?
            } else {
                ValueType::Any
            };
            self.params.push(Expr::parameter(name, ty));
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(());
        }
    }

    fn parse_type(&mut self) -> ExprKitResult<ValueType> {
        let (name, _) = self.expect_ident("type name")?;
        Ok(ValueType::from_keyword(&name).unwrap_or_else(|| ValueType::record(name)))
    }

    /// Wrap a freshly built node, rejecting it if the tree grows past [`MAX_DEPTH`].
    fn node(&self, expr: Expr, children: &[usize]) -> ExprKitResult<Node> {
        let height = children.iter().copied().max().unwrap_or(0) + 1;
        if height > MAX_DEPTH {
            return Err(ExprKitError::parse(
                self.span().start,
                "expression nests too deeply",
            ));
        }
        Ok(Node { expr, height })
    }

    fn parse_expr(&mut self) -> ExprKitResult<Node> {
        let saved = self.nesting;
        self.enter()?;
        let test = self.parse_or()?;
        let e = if self.consume(TokenKind::Question) {
            let if_true = self.parse_expr()?;
            self.expect(TokenKind::Colon)?;
            let if_false = self.parse_expr()?;
            let heights = [test.height, if_true.height, if_false.height];
            self.node(
                Expr::conditional(test.expr, if_true.expr, if_false.expr),
                &heights,
            )?
        } else {
            test
        };
        self.nesting = saved;
        Ok(e)
    }

    fn binary(&self, op: BinaryOp, l: Node, r: Node) -> ExprKitResult<Node> {
        self.node(Expr::binary(op, l.expr, r.expr), &[l.height, r.height])
    }

    fn parse_or(&mut self) -> ExprKitResult<Node> {
        let mut e = self.parse_and()?;
        while self.consume(TokenKind::OrOr) {
            let r = self.parse_and()?;
            e = self.binary(BinaryOp::Or, e, r)?;
        }
        Ok(e)
    }

    fn parse_and(&mut self) -> ExprKitResult<Node> {
        let mut e = self.parse_equality()?;
        while self.consume(TokenKind::AndAnd) {
            let r = self.parse_equality()?;
            e = self.binary(BinaryOp::And, e, r)?;
        }
        Ok(e)
    }

    fn parse_equality(&mut self) -> ExprKitResult<Node> {
        let mut e = self.parse_comparison()?;
        loop {
            let op = if self.consume(TokenKind::EqEq) {
                BinaryOp::Eq
            } else if self.consume(TokenKind::Ne) {
                BinaryOp::Ne
            } else {
                break;
            };
            let r = self.parse_comparison()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_comparison(&mut self) -> ExprKitResult<Node> {
        let mut e = self.parse_term()?;
        loop {
            let op = if self.consume(TokenKind::Lt) {
                BinaryOp::Lt
            } else if self.consume(TokenKind::Le) {
                BinaryOp::Le
            } else if self.consume(TokenKind::Gt) {
                BinaryOp::Gt
            } else if self.consume(TokenKind::Ge) {
                BinaryOp::Ge
            } else {
                break;
            };
            let r = self.parse_term()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_term(&mut self) -> ExprKitResult<Node> {
        let mut e = self.parse_factor()?;
        loop {
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let r = self.parse_factor()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_factor(&mut self) -> ExprKitResult<Node> {
        let mut e = self.parse_unary()?;
        loop {
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.consume(TokenKind::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let r = self.parse_unary()?;
            e = self.binary(op, e, r)?;
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> ExprKitResult<Node> {
        if self.peek().kind == TokenKind::Minus {
            if let Some(lit) = self.negative_literal()? {
                return Ok(lit);
            }
            self.bump();
            return self.parse_prefixed(UnaryOp::Neg);
        }
        if self.consume(TokenKind::Bang) {
            return self.parse_prefixed(UnaryOp::Not);
        }
        self.parse_postfix()
    }

    fn parse_prefixed(&mut self, op: UnaryOp) -> ExprKitResult<Node> {
        let saved = self.nesting;
        self.enter()?;
        let e = self.parse_unary()?;
        self.nesting = saved;
        self.node(Expr::unary(op, e.expr), &[e.height])
    }

    /// `-` directly followed by a numeric literal that has no postfix folds into one constant.
    fn negative_literal(&mut self) -> ExprKitResult<Option<Node>> {
        if matches!(self.peek_at(2), TokenKind::Dot | TokenKind::As) {
            return Ok(None);
        }
        let start = self.span().start;
        let v = match *self.peek_at(1) {
            TokenKind::Int(v) if v <= i64::MAX as u64 => Value::Int(-(v as i64)),
            TokenKind::Int(v) if v == i64::MAX as u64 + 1 => Value::Int(i64::MIN),
            TokenKind::Int(_) => {
                return Err(ExprKitError::parse(start, "integer literal out of range"));
            }
            TokenKind::Float(v) => Value::Float(-v),
            _ => return Ok(None),
        };
        self.bump();
        self.bump();
        self.node(Expr::constant(v), &[]).map(Some)
    }

    fn parse_postfix(&mut self) -> ExprKitResult<Node> {
        let mut e = self.parse_primary()?;

        loop {
            if self.consume(TokenKind::Dot) {
                let (name, _) = self.expect_ident("member name after '.'")?;
                if self.consume(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    let heights: Vec<usize> = std::iter::once(e.height)
                        .chain(args.iter().map(|a| a.height))
                        .collect();
                    let args = args.into_iter().map(|a| a.expr).collect();
                    e = self.node(Expr::call(Some(e.expr), name, args), &heights)?;
                } else {
                    e = self.node(e.expr.member(name), &[e.height])?;
                }
                continue;
            }

            if self.consume(TokenKind::As) {
                let ty = self.parse_type()?;
                e = self.node(e.expr.convert(ty), &[e.height])?;
                continue;
            }

            break;
        }

        Ok(e)
    }

    fn parse_args(&mut self) -> ExprKitResult<Vec<Node>> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> ExprKitResult<Node> {
        let t = self.bump().clone();
        let leaf = match t.kind {
            TokenKind::Int(v) => i64::try_from(v)
                .map(Expr::constant)
                .map_err(|_| ExprKitError::parse(t.span.start, "integer literal out of range"))?,
            TokenKind::Float(v) => Expr::constant(v),
            TokenKind::Str(s) => Expr::constant(s),
            TokenKind::True => Expr::constant(true),
            TokenKind::False => Expr::constant(false),
            TokenKind::Null => Expr::constant(Value::Null),
            TokenKind::Ident(name) => {
                if self.consume(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    let heights: Vec<usize> = args.iter().map(|a| a.height).collect();
                    let args = args.into_iter().map(|a| a.expr).collect();
                    return self.node(Expr::call(None, name, args), &heights);
                }
                self.params
                    .iter()
                    .find(|p| p.as_parameter().is_some_and(|(n, _)| n == name))
                    .cloned()
                    .ok_or_else(|| {
                        ExprKitError::parse(t.span.start, format!("unknown identifier `{name}`"))
                    })?
            }
            TokenKind::LParen => {
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(e);
            }
            other => {
                return Err(ExprKitError::parse(
                    t.span.start,
                    format!("unexpected {}", other.describe()),
                ));
            }
        };
        self.node(leaf, &[])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/parser.rs"]
mod tests;
