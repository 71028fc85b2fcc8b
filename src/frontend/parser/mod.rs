//! Parser module
//!
//! 递归下降解析，直接产出表达式：
//!
//! ```text
//! program := stmt (';' stmt)*
//! stmt    := NAME '=' expr | expr
//! expr    := binder* app
//! binder  := ident '->'
//! app     := atom+ [expr]        // 末尾的抽象向右延伸到底：`K x->x` = `K (x->x)`
//! atom    := '(' expr ')' | NAME | numeral | '+'
//! ```
//!
//! 名字按 绑定变量 → 命名表 → 自由变量 的顺序解析。
//! 程序的值是最后一条语句的值；定义语句的值是新定义的别名。

mod state;

pub use state::ParserState;

use crate::engine::error::Result;
use crate::engine::expr::{Expr, FreeVar};
use crate::frontend::env::Environment;
use crate::frontend::lexer::tokenize;
use crate::frontend::lexer::tokens::TokenKind;
use crate::frontend::ParseError;
use tracing::debug;

/// Parse a program against a naming table
///
/// 定义语句会写入 `env`。
pub fn parse(
    source: &str,
    env: &mut Environment,
) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        state: ParserState::new(&tokens),
        env,
        locals: Vec::new(),
    };
    parser.program()
}

struct Parser<'a, 'e> {
    state: ParserState<'a>,
    env: &'e mut Environment,
    /// 当前可见的绑定变量，内层在后
    locals: Vec<FreeVar>,
}

impl Parser<'_, '_> {
    fn program(&mut self) -> Result<Expr> {
        let mut last = None;
        loop {
            // 允许空语句
            while self.state.skip(&TokenKind::Semicolon) {}
            if self.state.at_end() {
                break;
            }
            last = Some(self.statement()?);
            if !self.state.skip(&TokenKind::Semicolon) {
                break;
            }
        }
        if !self.state.at_end() {
            return Err(self.state.unexpected().into());
        }
        match last {
            Some(expr) => Ok(expr),
            None => Err(self.state.unexpected().into()),
        }
    }

    fn statement(&mut self) -> Result<Expr> {
        if !self.state.at_definition() {
            return self.expr();
        }
        let Some(name) = self.state.kind().name() else {
            return Err(self.state.unexpected().into());
        };
        self.state.bump();
        self.state.bump();
        let value = self.expr()?;
        debug!("define {} = {}", name, value);
        self.env.define(&name, value)
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut params = Vec::new();
        while self.state.at_binder() {
            if let TokenKind::Ident(name) = self.state.kind() {
                params.push(FreeVar::new(name));
            }
            self.state.bump();
            self.state.bump();
        }
        if params.is_empty() {
            return self.application();
        }

        let depth = self.locals.len();
        self.locals.extend(params.iter().cloned());
        let body = self.application();
        self.locals.truncate(depth);
        Expr::lambda_n(&params, body?)
    }

    fn application(&mut self) -> Result<Expr> {
        let mut expr = self.atom()?;
        loop {
            if self.state.at_binder() {
                let arg = self.expr()?;
                return Ok(Expr::app(expr, arg));
            }
            if !self.state.can_start_atom() {
                return Ok(expr);
            }
            let arg = self.atom()?;
            expr = Expr::app(expr, arg);
        }
    }

    fn atom(&mut self) -> Result<Expr> {
        match self.state.kind().clone() {
            TokenKind::LParen => {
                let open = self.state.position();
                self.state.bump();
                let inner = self.expr()?;
                if self.state.skip(&TokenKind::RParen) {
                    return Ok(inner);
                }
                Err(match self.state.kind() {
                    TokenKind::Eof => ParseError::UnbalancedParen { position: open },
                    _ => self.state.unexpected(),
                }
                .into())
            }
            TokenKind::Upper(_) | TokenKind::Ident(_) => {
                let name = self.state.kind().name().unwrap_or_default();
                self.state.bump();
                Ok(self.resolve(&name))
            }
            TokenKind::Numeral(n) => {
                self.state.bump();
                Ok(Expr::numeral(n))
            }
            TokenKind::Plus => {
                self.state.bump();
                Ok(self.resolve("+"))
            }
            _ => Err(self.state.unexpected().into()),
        }
    }

    fn resolve(
        &self,
        name: &str,
    ) -> Expr {
        if let Some(var) = self.locals.iter().rev().find(|v| v.name() == name) {
            return Expr::var(var.clone());
        }
        if let Some(expr) = self.env.get(name) {
            return expr.clone();
        }
        Expr::var(self.env.scope().var(name))
    }
}
