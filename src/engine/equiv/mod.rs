//! 替换与结构等价
//!
//! `subst` 按身份（而非名字）查找目标，没有命中时返回 `None`，
//! 调用方可以直接跳过未受影响的子树。这是归约的内层循环。
//!
//! `equals`/`diff` 不做归约：别名先展开，再沿左侧的前序 `fold` 同步走右侧，
//! 在第一个分歧处 `Stop`。两侧同层抽象的参数视为同一个（alpha 等价），
//! 原语按身份/数值比较。
//! 因此 `K` 与 `x->y->x` 不相等，尽管二者行为相同。

use crate::engine::error::{EngineError, Result};
use crate::engine::expr::{Expr, FormatOptions, FreeVar, Node};
use crate::engine::traverse::Control;
use tracing::trace;

impl Expr {
    /// 把所有与 `target` 身份相同的节点替换为 `value`
    pub fn subst(
        &self,
        target: &Expr,
        value: &Expr,
    ) -> Option<Expr> {
        if self.is_same(target) {
            return Some(value.clone());
        }
        match self.node() {
            Node::App(app) => {
                let fun = app.fun().subst(target, value);
                let arg = app.arg().subst(target, value);
                if fun.is_none() && arg.is_none() {
                    return None;
                }
                Some(Expr::app(
                    fun.unwrap_or_else(|| app.fun().clone()),
                    arg.unwrap_or_else(|| app.arg().clone()),
                ))
            }
            Node::Lambda(lambda) => lambda
                .body()
                .subst(target, value)
                .map(|body| Expr::rebind(lambda.param().clone(), body)),
            // 变量、原语、别名都是原子
            _ => None,
        }
    }

    /// 语法相等（模 alpha 等价、别名透明）
    pub fn equals(
        &self,
        other: &Expr,
    ) -> bool {
        self.diff(other).is_none()
    }

    /// 找出第一个分歧点，用 `[期望 != 实际]` 标出
    pub fn diff(
        &self,
        other: &Expr,
    ) -> Option<String> {
        let left = self.expand();
        let (index, marker) = first_divergence(&left, &other.expand())?;
        let diff = render(&left, index, &marker);
        trace!("diff {} vs {}: {}", self, other, diff);
        Some(diff)
    }

    /// 断言 `self` 等于 `expected`，否则返回带双方文本的错误
    pub fn expect_equal(
        &self,
        expected: &Expr,
    ) -> Result<()> {
        match expected.diff(self) {
            None => Ok(()),
            Some(diff) => Err(EngineError::Mismatch {
                expected: expected.to_string(),
                actual: self.to_string(),
                diff,
            }),
        }
    }
}

/// 与左侧前序遍历同步的右侧游标
struct Cursor {
    /// 待比较的右侧节点，以及它所在作用域的绑定层数
    pending: Vec<(Expr, usize)>,
    /// 两侧同层抽象的参数
    binders: Vec<(FreeVar, FreeVar)>,
    /// 已经走过的左侧节点数
    visited: usize,
    found: Option<(usize, String)>,
}

/// 第一个分歧点在左侧前序中的位置，以及标记文本
fn first_divergence(
    left: &Expr,
    right: &Expr,
) -> Option<(usize, String)> {
    let cursor = Cursor {
        pending: vec![(right.clone(), 0)],
        binders: Vec::new(),
        visited: 0,
        found: None,
    };
    left.fold(cursor, |mut cursor, l| {
        let Some((r, depth)) = cursor.pending.pop() else {
            return Control::Stop(cursor);
        };
        cursor.binders.truncate(depth);
        let index = cursor.visited;
        cursor.visited += 1;
        let renamed = cursor.binders.iter().any(|(a, b)| a != b);
        if l.is_same(&r) && !renamed {
            cursor.visited += l.size() - 1;
            return Control::Prune(cursor);
        }
        let matched = match (l.node(), r.node()) {
            (Node::App(_), Node::App(b)) => {
                let depth = cursor.binders.len();
                cursor.pending.push((b.arg().clone(), depth));
                cursor.pending.push((b.fun().clone(), depth));
                true
            }
            (Node::Lambda(a), Node::Lambda(b)) => {
                cursor.binders.push((a.param().clone(), b.param().clone()));
                cursor.pending.push((b.body().clone(), cursor.binders.len()));
                true
            }
            (Node::Var(a), Node::Var(b)) => same_binding(a, b, &cursor.binders),
            (Node::Native(a), Node::Native(b)) => a.same_as(b),
            _ => false,
        };
        if matched {
            Control::Continue(cursor)
        } else {
            cursor.found = Some((index, format!("[{} != {}]", l, r)));
            Control::Stop(cursor)
        }
    })
    .found
}

/// 两侧变量指向同一层绑定，或者是同一个自由变量
fn same_binding(
    left: &FreeVar,
    right: &FreeVar,
    binders: &[(FreeVar, FreeVar)],
) -> bool {
    let l = binders.iter().rposition(|(a, _)| a == left);
    let r = binders.iter().rposition(|(_, b)| b == right);
    match (l, r) {
        (None, None) => left == right,
        (l, r) => l == r,
    }
}

/// 把左侧前序第 `index` 个节点换成标记后打印
fn render(
    left: &Expr,
    index: usize,
    marker: &str,
) -> String {
    let marker = Expr::var(FreeVar::new(marker));
    let mut seen = 0;
    let marked = left.traverse(|_| {
        let here = seen;
        seen += 1;
        if here == index {
            Control::Stop(Some(marker.clone()))
        } else {
            Control::Continue(None)
        }
    });
    marked
        .unwrap_or_else(|| left.clone())
        .format(&FormatOptions::spaced())
}
