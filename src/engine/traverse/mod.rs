//! 遍历与折叠
//!
//! 所有整树分析都通过这里的两个原语表达：
//!
//! - [`Expr::traverse`]: 前序遍历并重建树
//! - [`Expr::fold`]: 前序遍历并累积一个值
//!
//! 访问函数返回 [`Control`]，四种结果只在这里实现一次：
//!
//! | 结果 | traverse | fold |
//! |------|----------|------|
//! | `Continue(v)` | 用 `v`（`None` 则保留原节点），然后访问子节点 | 用新累积值访问子节点 |
//! | `Prune(v)` | 用 `v`，跳过子节点 | 用新累积值，跳过子节点 |
//! | `Stop(v)` | 用 `v`，终止整个遍历 | 立即返回该累积值 |
//! | `Redo(v)` | 对替换结果重新调用访问函数 | 用新累积值在同一节点上重新调用 |

use crate::engine::expr::{Expr, FreeVar, Node};
use indexmap::IndexSet;

/// 遍历控制信号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control<T> {
    /// 继续访问子节点（默认）
    Continue(T),
    /// 跳过子节点
    Prune(T),
    /// 终止整个遍历
    Stop(T),
    /// 把返回值当作新发现的节点重新访问
    Redo(T),
}

impl<T> Control<T> {
    pub fn value(&self) -> &T {
        match self {
            Control::Continue(v) | Control::Prune(v) | Control::Stop(v) | Control::Redo(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Control::Continue(v) | Control::Prune(v) | Control::Stop(v) | Control::Redo(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Go,
    Halt,
}

impl Expr {
    /// 前序重写
    ///
    /// 返回 `None` 表示没有任何节点被替换。
    /// `Redo(None)` 没有可重新访问的节点，按 `Continue(None)` 处理。
    pub fn traverse<F>(
        &self,
        mut visit: F,
    ) -> Option<Expr>
    where
        F: FnMut(&Expr) -> Control<Option<Expr>>,
    {
        rewrite(self, &mut visit).0
    }

    /// 前序折叠
    pub fn fold<T, F>(
        &self,
        initial: T,
        mut combine: F,
    ) -> T
    where
        F: FnMut(T, &Expr) -> Control<T>,
    {
        accumulate(self, initial, &mut combine).0
    }

    /// 把所有别名替换为它包装的表达式
    pub fn expand(&self) -> Expr {
        self.traverse(|e| match e.node() {
            Node::Alias(a) => Control::Redo(Some(a.target().clone())),
            _ => Control::Continue(None),
        })
        .unwrap_or_else(|| self.clone())
    }

    /// 出现的自由变量（按首次出现的顺序）
    pub fn free_vars(&self) -> IndexSet<FreeVar> {
        self.fold(IndexSet::new(), |mut vars, e| {
            if let Node::Var(v) = e.node() {
                vars.insert(v.clone());
            }
            Control::Continue(vars)
        })
    }

    /// 是否出现变量 `var`
    pub fn mentions(
        &self,
        var: &FreeVar,
    ) -> bool {
        self.fold(false, |_, e| match e.node() {
            Node::Var(v) if v == var => Control::Stop(true),
            _ => Control::Continue(false),
        })
    }

    /// 子节点个数之和（含自身）
    pub fn size(&self) -> usize {
        self.fold(0, |n, _| Control::Continue(n + 1))
    }
}

fn rewrite<F>(
    expr: &Expr,
    visit: &mut F,
) -> (Option<Expr>, Flow)
where
    F: FnMut(&Expr) -> Control<Option<Expr>>,
{
    let mut current: Option<Expr> = None;
    loop {
        let node = current.as_ref().unwrap_or(expr);
        match visit(node) {
            Control::Continue(value) => {
                if value.is_some() {
                    current = value;
                }
                break;
            }
            Control::Prune(value) => return (value.or(current), Flow::Go),
            Control::Stop(value) => return (value.or(current), Flow::Halt),
            Control::Redo(Some(value)) => current = Some(value),
            Control::Redo(None) => break,
        }
    }

    let node = current.clone().unwrap_or_else(|| expr.clone());
    let (rebuilt, flow) = match node.node() {
        Node::App(app) => {
            let (fun, flow) = rewrite(app.fun(), visit);
            let (arg, flow) = match flow {
                Flow::Go => rewrite(app.arg(), visit),
                Flow::Halt => (None, Flow::Halt),
            };
            let rebuilt = match (fun, arg) {
                (None, None) => None,
                (fun, arg) => Some(Expr::app(
                    fun.unwrap_or_else(|| app.fun().clone()),
                    arg.unwrap_or_else(|| app.arg().clone()),
                )),
            };
            (rebuilt, flow)
        }
        Node::Lambda(lambda) => {
            let (body, flow) = rewrite(lambda.body(), visit);
            (body.map(|body| Expr::rebind(lambda.param().clone(), body)), flow)
        }
        _ => (None, Flow::Go),
    };
    (rebuilt.or(current), flow)
}

fn accumulate<T, F>(
    expr: &Expr,
    initial: T,
    combine: &mut F,
) -> (T, Flow)
where
    F: FnMut(T, &Expr) -> Control<T>,
{
    let mut acc = initial;
    loop {
        match combine(acc, expr) {
            Control::Continue(value) => {
                acc = value;
                break;
            }
            Control::Prune(value) => return (value, Flow::Go),
            Control::Stop(value) => return (value, Flow::Halt),
            Control::Redo(value) => acc = value,
        }
    }

    match expr.node() {
        Node::App(app) => {
            let (acc, flow) = accumulate(app.fun(), acc, combine);
            match flow {
                Flow::Go => accumulate(app.arg(), acc, combine),
                Flow::Halt => (acc, flow),
            }
        }
        Node::Lambda(lambda) => accumulate(lambda.body(), acc, combine),
        _ => (acc, Flow::Go),
    }
}

#[cfg(test)]
mod tests;
