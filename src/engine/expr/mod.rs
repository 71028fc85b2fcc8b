//! 表达式模型
//!
//! 表达式是不可变的树，节点共有五种（数字是带标记的原生组合子）：
//!
//! - `Var`: 自由变量
//! - `Native`: 原生组合子 S K I B C W + 以及数字
//! - `Lambda`: 单参数抽象，构造时把绑定变量替换成私有的新变量
//! - `Alias`: 具名引用
//! - `App`: 二元应用，n 元应用是左倾链
//!
//! 唯一的可变状态是应用节点上的纯缓存（元数、“不可归约”标记、调用延续）。
//! 缓存以别名过时纪元为戳：任何别名被标记为过时，所有缓存一并作废，
//! 因为过时的别名从此表现为透明的同义词。

pub mod format;
pub mod native;
pub mod var;

pub use format::FormatOptions;
pub use native::Native;
pub use var::{arg_name, FreeVar, Scope, VarId};

use crate::engine::error::{EngineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

thread_local! {
    /// 别名过时纪元，每次有别名过时加一
    static OUTDATE_EPOCH: Cell<u64> = const { Cell::new(0) };
}

fn current_epoch() -> u64 {
    OUTDATE_EPOCH.with(Cell::get)
}

/// 具名项的合法名字：单个大写字母，或小写标识符
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z]|[a-z_][a-z_0-9]*)$").expect("valid name pattern"));

/// 检查名字能否用于具名项
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// 调用结果
#[derive(Clone)]
pub enum Invocation {
    /// 已得到结果
    Done(Expr),
    /// 还需要更多参数
    Partial(Continuation),
    /// 无法继续
    Stuck,
}

impl fmt::Debug for Invocation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Invocation::Done(expr) => write!(f, "Done({})", expr),
            Invocation::Partial(_) => write!(f, "Partial"),
            Invocation::Stuck => write!(f, "Stuck"),
        }
    }
}

/// 等待下一个参数的延续
#[derive(Clone)]
pub struct Continuation(Rc<dyn Fn(&Expr) -> Invocation>);

impl Continuation {
    pub fn new(f: impl Fn(&Expr) -> Invocation + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(
        &self,
        arg: &Expr,
    ) -> Invocation {
        (self.0)(arg)
    }
}

/// 单参数抽象
#[derive(Debug)]
pub struct Lambda {
    param: FreeVar,
    body: Expr,
}

impl Lambda {
    pub fn param(&self) -> &FreeVar {
        &self.param
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    /// 把参数替换为 `arg` 后的函数体
    pub fn instantiate(
        &self,
        arg: &Expr,
    ) -> Expr {
        self.body
            .subst(&Expr::var(self.param.clone()), arg)
            .unwrap_or_else(|| self.body.clone())
    }
}

/// 具名引用
#[derive(Debug)]
pub struct Alias {
    name: Rc<str>,
    target: Expr,
    arity: Option<usize>,
    outdated: Cell<bool>,
}

impl Alias {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Expr {
        &self.target
    }

    /// 终结别名：参数足够前表现为原子
    pub fn is_terminal(&self) -> bool {
        self.arity.is_some()
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// 是否已被重新定义
    pub fn is_outdated(&self) -> bool {
        self.outdated.get()
    }

    /// 标记为过时。只能由命名表在重新绑定时调用，且不可撤销。
    pub fn mark_outdated(&self) {
        if !self.outdated.replace(true) {
            OUTDATE_EPOCH.with(|epoch| epoch.set(epoch.get() + 1));
        }
    }

    fn invoke(
        &self,
        arg: &Expr,
    ) -> Invocation {
        if self.is_outdated() {
            return self.target.invoke(arg);
        }
        match self.arity {
            Some(arity) => unfold_after(self.target.clone(), arity, vec![arg.clone()]),
            None => Invocation::Stuck,
        }
    }
}

fn unfold_after(
    target: Expr,
    arity: usize,
    args: Vec<Expr>,
) -> Invocation {
    if args.len() >= arity {
        return Invocation::Done(target.apply(args));
    }
    Invocation::Partial(Continuation::new(move |arg| {
        let mut next = args.clone();
        next.push(arg.clone());
        unfold_after(target.clone(), arity, next)
    }))
}

/// 应用节点上的缓存，`epoch` 不是当前纪元时整体作废
#[derive(Default)]
struct Memo {
    epoch: u64,
    arity: Option<usize>,
    irreducible: bool,
    cont: Option<Option<Continuation>>,
}

/// 二元应用
pub struct App {
    fun: Expr,
    arg: Expr,
    memo: RefCell<Memo>,
}

impl App {
    pub fn fun(&self) -> &Expr {
        &self.fun
    }

    pub fn arg(&self) -> &Expr {
        &self.arg
    }

    fn memo(&self) -> RefMut<'_, Memo> {
        let mut memo = self.memo.borrow_mut();
        let epoch = current_epoch();
        if memo.epoch != epoch {
            *memo = Memo {
                epoch,
                ..Memo::default()
            };
        }
        memo
    }

    fn arity(&self) -> usize {
        if let Some(arity) = self.memo().arity {
            return arity;
        }
        let arity = self.fun.arity().saturating_sub(1);
        self.memo().arity = Some(arity);
        arity
    }

    /// 本纪元内已确认不可归约？
    pub(crate) fn is_irreducible(&self) -> bool {
        self.memo().irreducible
    }

    pub(crate) fn mark_irreducible(&self) {
        self.memo().irreducible = true;
    }

    /// 函数位置吃下本参数之后得到的延续（缓存）
    fn continuation(&self) -> Option<Continuation> {
        if let Some(cont) = &self.memo().cont {
            return cont.clone();
        }
        let cont = match self.fun.invoke(&self.arg) {
            Invocation::Partial(k) => Some(k),
            _ => None,
        };
        self.memo().cont = Some(cont.clone());
        cont
    }
}

impl fmt::Debug for App {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("App")
            .field("fun", &self.fun)
            .field("arg", &self.arg)
            .finish()
    }
}

/// 节点
#[derive(Debug)]
pub enum Node {
    Var(FreeVar),
    Native(Native),
    Lambda(Lambda),
    Alias(Alias),
    App(App),
}

/// 表达式句柄（共享、不可变）
#[derive(Clone)]
pub struct Expr(Rc<Node>);

impl Expr {
    fn from_node(node: Node) -> Self {
        Expr(Rc::new(node))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn var(var: FreeVar) -> Self {
        Self::from_node(Node::Var(var))
    }

    pub fn native(native: Native) -> Self {
        Self::from_node(Node::Native(native))
    }

    pub fn numeral(n: u64) -> Self {
        native::numeral(n)
    }

    /// 抽象 `param -> body`；`param` 在函数体中被替换为私有的新变量
    pub fn lambda(
        param: &FreeVar,
        body: Expr,
    ) -> Self {
        let private = param.fresh_like();
        let body = body
            .subst(&Expr::var(param.clone()), &Expr::var(private.clone()))
            .unwrap_or(body);
        Self::rebind(private, body)
    }

    /// 多参数抽象 `a -> b -> ... -> body`
    pub fn lambda_n(
        params: &[FreeVar],
        body: Expr,
    ) -> Result<Self> {
        if params.is_empty() {
            return Err(EngineError::EmptyLambda);
        }
        for (index, param) in params.iter().enumerate() {
            if params[..index].iter().any(|p| p.name() == param.name()) {
                return Err(EngineError::DuplicateParam {
                    name: param.name().to_string(),
                });
            }
        }
        Ok(params
            .iter()
            .rev()
            .fold(body, |body, param| Self::lambda(param, body)))
    }

    /// 用已经私有化的参数重建抽象
    pub(crate) fn rebind(
        param: FreeVar,
        body: Expr,
    ) -> Self {
        Self::from_node(Node::Lambda(Lambda { param, body }))
    }

    /// 非终结别名：下一步无条件展开
    pub fn alias(
        name: &str,
        target: Expr,
    ) -> Result<Self> {
        Self::make_alias(name, target, None)
    }

    /// 终结别名：凑齐 `arity` 个参数后才展开
    pub fn terminal_alias(
        name: &str,
        target: Expr,
        arity: usize,
    ) -> Result<Self> {
        Self::make_alias(name, target, Some(arity).filter(|&n| n > 0))
    }

    fn make_alias(
        name: &str,
        target: Expr,
        arity: Option<usize>,
    ) -> Result<Self> {
        if !is_valid_name(name) {
            return Err(EngineError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(Self::from_node(Node::Alias(Alias {
            name: Rc::from(name),
            target,
            arity,
            outdated: Cell::new(false),
        })))
    }

    /// 二元应用
    pub fn app(
        fun: Expr,
        arg: Expr,
    ) -> Self {
        Self::from_node(Node::App(App {
            fun,
            arg,
            memo: RefCell::new(Memo::default()),
        }))
    }

    /// 依次应用若干参数
    pub fn apply<I>(
        &self,
        args: I,
    ) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        args.into_iter()
            .fold(self.clone(), |acc, arg| Expr::app(acc, arg))
    }

    /// 身份比较：同一个节点，或同一个变量
    pub fn is_same(
        &self,
        other: &Expr,
    ) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (self.node(), other.node()) {
            (Node::Var(a), Node::Var(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_var(&self) -> Option<&FreeVar> {
        match self.node() {
            Node::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_native(&self) -> Option<&Native> {
        match self.node() {
            Node::Native(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self.node() {
            Node::Lambda(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&Alias> {
        match self.node() {
            Node::Alias(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_app(&self) -> Option<&App> {
        match self.node() {
            Node::App(a) => Some(a),
            _ => None,
        }
    }

    /// 应用链的头部
    pub fn head(&self) -> &Expr {
        let mut head = self;
        while let Node::App(app) = head.node() {
            head = &app.fun;
        }
        head
    }

    /// 应用链的参数（从左到右）
    pub fn args(&self) -> Vec<Expr> {
        let mut args = Vec::new();
        let mut head = self;
        while let Node::App(app) = head.node() {
            args.push(app.arg.clone());
            head = &app.fun;
        }
        args.reverse();
        args
    }

    /// 头部规则触发前还需要的参数个数（尽力估计）
    pub fn arity(&self) -> usize {
        match self.node() {
            Node::Var(_) => 0,
            Node::Native(n) => n.arity(),
            Node::Lambda(_) => 1,
            Node::Alias(a) if a.is_outdated() => a.target.arity(),
            Node::Alias(a) => a.arity.unwrap_or(0),
            Node::App(app) => app.arity(),
        }
    }

    /// 结构权重：变量 0，原语 1，应用相加，抽象加 1，终结别名 1
    pub fn weight(&self) -> usize {
        match self.node() {
            Node::Var(_) => 0,
            Node::Native(_) => 1,
            Node::Lambda(l) => l.body.weight() + 1,
            Node::Alias(a) if a.is_terminal() && !a.is_outdated() => 1,
            Node::Alias(a) => a.target.weight(),
            Node::App(app) => app.fun.weight() + app.arg.weight(),
        }
    }

    /// 把一个参数交给本表达式
    pub fn invoke(
        &self,
        arg: &Expr,
    ) -> Invocation {
        match self.node() {
            Node::Var(_) => Invocation::Stuck,
            Node::Native(n) => n.invoke(arg),
            Node::Lambda(l) => Invocation::Done(l.instantiate(arg)),
            Node::Alias(a) => a.invoke(arg),
            Node::App(app) => match app.continuation() {
                Some(k) => k.call(arg),
                None => Invocation::Stuck,
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.format(&FormatOptions::default()))
    }
}

impl fmt::Debug for Expr {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Expr({})", self)
    }
}

impl From<FreeVar> for Expr {
    fn from(var: FreeVar) -> Self {
        Expr::var(var)
    }
}
