//! 命名表
//!
//! 有序的 名字 → 项 映射，预置原语 S K I B C W 和 `+`。
//! 自由变量经由共享的 [`Scope`] 解析，多次解析同一个名字得到同一个变量。

use crate::engine::canon::InferOptions;
use crate::engine::error::Result;
use crate::engine::expr::{native, Expr, FormatOptions, Node, Scope};
use crate::engine::traverse::Control;
use crate::frontend::parser;
use hashbrown::HashSet;
use indexmap::IndexMap;
use tracing::debug;

/// 命名表
#[derive(Debug, Clone)]
pub struct Environment {
    names: IndexMap<String, Expr>,
    scope: Scope,
    infer: InferOptions,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// 预置原语的命名表
    pub fn new() -> Self {
        Self::with_options(InferOptions::default())
    }

    /// 定义时按 `infer` 预算判断别名是否终结
    pub fn with_options(infer: InferOptions) -> Self {
        let mut names = IndexMap::new();
        for primitive in native::primitives() {
            if let Some(n) = primitive.as_native() {
                names.insert(n.name().to_string(), primitive.clone());
            }
        }
        Self {
            names,
            scope: Scope::new(),
            infer,
        }
    }

    /// 共享的变量作用域
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Expr> {
        self.names.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.names.contains_key(name)
    }

    /// 按定义顺序列出名字
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// 解析一段程序，定义语句写入本表
    pub fn parse(
        &mut self,
        source: &str,
    ) -> Result<Expr> {
        parser::parse(source, self)
    }

    /// 绑定 `name = expr`
    ///
    /// 能归约为 proper 组合子且元数为正的项成为终结别名，否则为普通别名。
    /// 原先绑定在这个名字上的别名被标记为过时。
    pub fn define(
        &mut self,
        name: &str,
        expr: Expr,
    ) -> Result<Expr> {
        let inference = expr.infer(self.infer);
        let alias = if inference.normal && inference.proper && inference.arity > 0 {
            Expr::terminal_alias(name, expr, inference.arity)?
        } else {
            Expr::alias(name, expr)?
        };
        if let Some(previous) = self.names.insert(name.to_string(), alias.clone()) {
            if let Some(old) = previous.as_alias() {
                debug!("{} redefined, marking previous binding outdated", name);
                old.mark_outdated();
            }
        }
        Ok(alias)
    }

    /// 按依赖顺序输出所有定义（`name=expr`），被引用者在前
    ///
    /// 输出可以重新解析为等价的命名表。
    pub fn declare(&self) -> Vec<String> {
        let mut done = HashSet::new();
        let mut out = Vec::new();
        for (name, expr) in &self.names {
            self.emit(name, expr, &mut done, &mut out);
        }
        out
    }

    fn emit(
        &self,
        name: &str,
        expr: &Expr,
        done: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        let Some(alias) = expr.as_alias() else {
            return;
        };
        if !done.insert(name.to_string()) {
            return;
        }
        for dep in dependencies(alias.target()) {
            if let Some(target) = self.names.get(&dep) {
                self.emit(&dep, target, done, out);
            }
        }
        out.push(format!(
            "{}={}",
            name,
            alias.target().format(&FormatOptions::plain())
        ));
    }
}

/// 项中引用的仍然有效的别名（过时的别名按其内容打印，所以要看进去）
fn dependencies(expr: &Expr) -> Vec<String> {
    expr.fold(Vec::new(), |mut deps, e| match e.node() {
        Node::Alias(a) if a.is_outdated() => {
            deps.extend(dependencies(a.target()));
            Control::Prune(deps)
        }
        Node::Alias(a) => {
            deps.push(a.name().to_string());
            Control::Prune(deps)
        }
        _ => Control::Continue(deps),
    })
}

#[cfg(test)]
mod tests;
