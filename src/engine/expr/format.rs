//! 表达式打印
//!
//! 一个打印器，靠装饰表切换输出风格：紧凑语法、带空格语法、全括号语法、
//! 以及仅供展示的装饰语法。除装饰语法外，输出都能重新解析为结构相等的表达式。

use super::{Expr, Node, VarId};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// 打印装饰表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// 相邻原子不会粘连时省略空格（`S(K(SI))K`）
    #[serde(default = "default_terse")]
    pub terse: bool,
    /// 嵌套应用两侧的括号
    #[serde(default = "default_around")]
    pub around: (String, String),
    /// 抽象的前缀、箭头、后缀
    #[serde(default = "default_lambda")]
    pub lambda: (String, String, String),
    /// 自由变量两侧的装饰
    #[serde(default)]
    pub var: (String, String),
    /// 每个应用都加括号
    #[serde(default)]
    pub full_parens: bool,
}

fn default_terse() -> bool {
    true
}

fn default_around() -> (String, String) {
    ("(".to_string(), ")".to_string())
}

fn default_lambda() -> (String, String, String) {
    (String::new(), "->".to_string(), String::new())
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::plain()
    }
}

impl FormatOptions {
    /// 紧凑语法
    pub fn plain() -> Self {
        Self {
            terse: true,
            around: default_around(),
            lambda: default_lambda(),
            var: (String::new(), String::new()),
            full_parens: false,
        }
    }

    /// 原子之间总有空格
    pub fn spaced() -> Self {
        Self {
            terse: false,
            ..Self::plain()
        }
    }

    /// 全括号语法
    pub fn parenthesized() -> Self {
        Self {
            terse: false,
            lambda: ("(".to_string(), "->".to_string(), ")".to_string()),
            full_parens: true,
            ..Self::plain()
        }
    }

    /// 装饰语法（不可重新解析）
    pub fn decorated() -> Self {
        Self {
            terse: false,
            lambda: ("λ".to_string(), ".".to_string(), String::new()),
            var: ("{".to_string(), "}".to_string()),
            ..Self::plain()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Top,
    Fun,
    Arg,
}

struct Printer<'a> {
    options: &'a FormatOptions,
    bound: Vec<(VarId, String)>,
}

impl Expr {
    /// 按装饰表打印
    pub fn format(
        &self,
        options: &FormatOptions,
    ) -> String {
        let mut printer = Printer {
            options,
            bound: Vec::new(),
        };
        printer.print(self, Position::Top)
    }
}

impl Printer<'_> {
    fn var_name(
        &self,
        id: VarId,
        name: &str,
    ) -> String {
        self.bound
            .iter()
            .rev()
            .find(|(bound, _)| *bound == id)
            .map(|(_, printed)| printed.clone())
            .unwrap_or_else(|| name.to_string())
    }

    fn wrap(
        &self,
        text: String,
    ) -> String {
        format!("{}{}{}", self.options.around.0, text, self.options.around.1)
    }

    /// 应用的两部分之间是否需要空格
    fn join(
        &self,
        left: &mut String,
        right: &str,
    ) {
        let space = match (left.chars().last(), right.chars().next()) {
            (Some(l), Some(r)) => !self.options.terse || needs_space(l, r),
            _ => false,
        };
        if space {
            left.push(' ');
        }
        left.push_str(right);
    }

    fn print(
        &mut self,
        expr: &Expr,
        position: Position,
    ) -> String {
        match expr.node() {
            Node::Var(v) => {
                let free = !self.bound.iter().any(|(id, _)| *id == v.id());
                let name = self.var_name(v.id(), v.name());
                if free {
                    format!("{}{}{}", self.options.var.0, name, self.options.var.1)
                } else {
                    name
                }
            }
            Node::Native(n) => n.name().to_string(),
            Node::Alias(a) if a.is_outdated() => self.print(a.target(), position),
            Node::Alias(a) => a.name().to_string(),
            Node::App(app) if self.options.full_parens => {
                let mut text = self.print(app.fun(), Position::Fun);
                let arg = self.print(app.arg(), Position::Arg);
                self.join(&mut text, &arg);
                self.wrap(text)
            }
            Node::App(_) => {
                let mut text = self.print(expr.head(), Position::Fun);
                for arg in expr.args() {
                    let arg = self.print(&arg, Position::Arg);
                    self.join(&mut text, &arg);
                }
                if position == Position::Arg {
                    self.wrap(text)
                } else {
                    text
                }
            }
            Node::Lambda(l) => {
                let name = self.binder_name(l.param().id(), l.param().name(), l.body());
                self.bound.push((l.param().id(), name.clone()));
                let body = self.print(l.body(), Position::Top);
                self.bound.pop();
                let (prefix, arrow, suffix) = &self.options.lambda;
                let text = format!("{}{}{}{}{}", prefix, name, arrow, body, suffix);
                if position != Position::Top && prefix.is_empty() {
                    self.wrap(text)
                } else {
                    text
                }
            }
        }
    }

    /// 选出不与外层绑定或函数体中其他自由变量冲突的绑定名
    fn binder_name(
        &self,
        id: VarId,
        name: &str,
        body: &Expr,
    ) -> String {
        let mut taken: HashSet<String> = self.bound.iter().map(|(_, n)| n.clone()).collect();
        for var in body.free_vars() {
            if var.id() != id {
                taken.insert(self.var_name(var.id(), var.name()));
            }
        }
        let base = if is_binder_name(name) { name } else { "a" };
        if !taken.contains(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

/// 紧凑模式下两个字符相邻会被词法分析器粘在一起（或难以阅读）
fn needs_space(
    left: char,
    right: char,
) -> bool {
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    word(left) && word(right) && !(left.is_ascii_uppercase() && right.is_ascii_uppercase())
}

fn is_binder_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
