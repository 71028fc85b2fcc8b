//! 括号抽象：lambda 项 → 组合子
//!
//! 每次拉取只改写一处。按前序找到第一个可处理的节点：
//!
//! - 别名、数字：先用 `infer` 展开成规则能处理的形状；数字推断不出范式时，
//!   退回一层 Church 展开 `f -> x -> f ((n-1) f x)`；
//! - 函数体里没有抽象、别名、数字的 `x -> body`，按以下规则改写一次：
//!   1. `body` 就是 `x` ⇒ `I`
//!   2. `body` 不含 `x` ⇒ `K body`
//!   3. `body = F x` 且 `F` 不含 `x` ⇒ `F`（eta 化简，省掉一个 `S`）
//!   4. `body = F A` ⇒ `S (x -> F) (x -> A)`
//!
//! 原语与自由变量原样保留。

use crate::engine::canon::InferOptions;
use crate::engine::expr::{native, Expr, FreeVar, Lambda, Node};
use crate::engine::traverse::Control;
use tracing::debug;

/// 一个中间形式
#[derive(Debug, Clone)]
pub struct SkiStep {
    pub expr: Expr,
    /// 已执行的改写次数
    pub steps: usize,
    /// 是否已经是纯组合子
    pub is_final: bool,
}

/// 括号抽象的惰性序列
#[derive(Debug)]
pub struct ToSki {
    current: Option<Expr>,
    steps: usize,
    options: InferOptions,
}

impl Expr {
    /// 逐步转换为组合子
    pub fn to_ski(
        &self,
        options: InferOptions,
    ) -> ToSki {
        ToSki {
            current: Some(self.clone()),
            steps: 0,
            options,
        }
    }
}

impl ToSki {
    /// 一直拉取到结束，返回最后的形式
    pub fn last_form(self) -> Option<SkiStep> {
        self.last()
    }
}

impl Iterator for ToSki {
    type Item = SkiStep;

    fn next(&mut self) -> Option<SkiStep> {
        let expr = self.current.take()?;
        let is_final = is_combinator(&expr);
        if !is_final {
            if let Some(next) = rewrite_once(&expr, self.options) {
                self.current = Some(next);
            }
        }
        let item = SkiStep {
            expr,
            steps: self.steps,
            is_final,
        };
        if self.current.is_some() {
            self.steps += 1;
        }
        Some(item)
    }
}

/// 只由变量、原语（非数字）和应用构成
fn is_combinator(expr: &Expr) -> bool {
    expr.fold(true, |_, e| {
        if needs_rewrite(e) {
            Control::Stop(false)
        } else {
            Control::Continue(true)
        }
    })
}

fn needs_rewrite(expr: &Expr) -> bool {
    match expr.node() {
        Node::Lambda(_) | Node::Alias(_) => true,
        Node::Native(n) => n.numeral().is_some(),
        _ => false,
    }
}

fn rewrite_once(
    expr: &Expr,
    options: InferOptions,
) -> Option<Expr> {
    expr.traverse(|e| match e.node() {
        Node::Alias(alias) => {
            let expanded = if alias.is_outdated() {
                alias.target().clone()
            } else {
                canonical_or(e, options, alias.target())
            };
            debug!("ski: expand {} => {}", e, expanded);
            Control::Stop(Some(expanded))
        }
        Node::Native(n) => match n.numeral() {
            Some(value) => {
                let expanded = canonical_or(e, options, &church_layer(value));
                debug!("ski: expand {} => {}", e, expanded);
                Control::Stop(Some(expanded))
            }
            None => Control::Continue(None),
        },
        Node::Lambda(lambda) if is_combinator(lambda.body()) => {
            let rewritten = abstract_once(lambda);
            debug!("ski: {} => {}", e, rewritten);
            Control::Stop(Some(rewritten))
        }
        _ => Control::Continue(None),
    })
}

fn canonical_or(
    expr: &Expr,
    options: InferOptions,
    fallback: &Expr,
) -> Expr {
    let inference = expr.infer(options);
    match inference.expr {
        Some(canonical) if inference.normal => canonical,
        _ => fallback.clone(),
    }
}

/// 剥一层的 Church 数字，内层仍是数字 `n-1`
fn church_layer(n: u64) -> Expr {
    let f = FreeVar::new("f");
    let x = FreeVar::new("x");
    let body = match n.checked_sub(1) {
        None => Expr::var(x.clone()),
        Some(pred) => Expr::app(
            Expr::var(f.clone()),
            native::numeral(pred).apply([Expr::var(f.clone()), Expr::var(x.clone())]),
        ),
    };
    Expr::lambda(&f, Expr::lambda(&x, body))
}

fn abstract_once(lambda: &Lambda) -> Expr {
    let param = lambda.param();
    let body = lambda.body();
    if body.as_var() == Some(param) {
        return native::i();
    }
    if !body.mentions(param) {
        return Expr::app(native::k(), body.clone());
    }
    match body.as_app() {
        Some(app) if app.arg().as_var() == Some(param) && !app.fun().mentions(param) => {
            app.fun().clone()
        }
        Some(app) => native::s().apply([
            Expr::lambda(param, app.fun().clone()),
            Expr::lambda(param, app.arg().clone()),
        ]),
        // 纯函数体要么是变量要么是应用，不提及参数的情况已在上面处理
        None => Expr::app(native::k(), body.clone()),
    }
}
