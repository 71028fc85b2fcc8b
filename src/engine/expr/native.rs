//! 原生组合子
//!
//! 每个原生组合子由名字、元数和一个宿主规则组成。规则一次性接收全部参数，
//! 柯里化由 [`Native::invoke`] 通过逐个收集参数的延续来完成。

use super::{Continuation, Expr, Invocation};
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 宿主规则：参数凑齐后给出结果，`None` 表示卡住
pub type Rule = Rc<dyn Fn(&[Expr]) -> Option<Expr>>;

type Args = SmallVec<[Expr; 4]>;

// 内置原语占用 1..=16，用户定义的原语从 17 开始
static NEXT_NATIVE_ID: AtomicU64 = AtomicU64::new(17);

/// 原生组合子
#[derive(Clone)]
pub struct Native {
    id: u64,
    name: Rc<str>,
    arity: usize,
    rule: Rule,
    numeral: Option<u64>,
}

impl Native {
    /// 定义新的原生组合子
    pub fn new(
        name: &str,
        arity: usize,
        rule: impl Fn(&[Expr]) -> Option<Expr> + 'static,
    ) -> Self {
        let id = NEXT_NATIVE_ID.fetch_add(1, Ordering::Relaxed);
        Self::with_id(id, name, arity, Rc::new(rule))
    }

    fn with_id(
        id: u64,
        name: &str,
        arity: usize,
        rule: Rule,
    ) -> Self {
        Self {
            id,
            name: Rc::from(name),
            arity: arity.max(1),
            rule,
            numeral: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// 数字字面量的值
    pub fn numeral(&self) -> Option<u64> {
        self.numeral
    }

    /// 原语相等：数字按值比较，其余按身份比较
    pub fn same_as(
        &self,
        other: &Native,
    ) -> bool {
        match (self.numeral, other.numeral) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.id == other.id,
            _ => false,
        }
    }

    /// 提供一个参数
    pub fn invoke(
        &self,
        arg: &Expr,
    ) -> Invocation {
        collect(self.clone(), smallvec![arg.clone()])
    }
}

fn collect(
    native: Native,
    args: Args,
) -> Invocation {
    if args.len() >= native.arity {
        return match (native.rule)(&args) {
            Some(result) => Invocation::Done(result),
            None => Invocation::Stuck,
        };
    }
    Invocation::Partial(Continuation::new(move |arg| {
        let mut next = args.clone();
        next.push(arg.clone());
        collect(native.clone(), next)
    }))
}

impl fmt::Debug for Native {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.numeral {
            Some(n) => write!(f, "Numeral({})", n),
            None => write!(f, "Native({}/{})", self.name, self.arity),
        }
    }
}

fn builtin(
    id: u64,
    name: &str,
    arity: usize,
    rule: fn(&[Expr]) -> Option<Expr>,
) -> Expr {
    Expr::native(Native::with_id(id, name, arity, Rc::new(rule)))
}

/// S x y z = x z (y z)
pub fn s() -> Expr {
    builtin(1, "S", 3, |a| {
        Some(Expr::app(
            Expr::app(a[0].clone(), a[2].clone()),
            Expr::app(a[1].clone(), a[2].clone()),
        ))
    })
}

/// K x y = x
pub fn k() -> Expr {
    builtin(2, "K", 2, |a| Some(a[0].clone()))
}

/// I x = x
pub fn i() -> Expr {
    builtin(3, "I", 1, |a| Some(a[0].clone()))
}

/// B x y z = x (y z)
pub fn b() -> Expr {
    builtin(4, "B", 3, |a| {
        Some(Expr::app(
            a[0].clone(),
            Expr::app(a[1].clone(), a[2].clone()),
        ))
    })
}

/// C x y z = x z y
pub fn c() -> Expr {
    builtin(5, "C", 3, |a| {
        Some(a[0].apply([a[2].clone(), a[1].clone()]))
    })
}

/// W x y = x y y
pub fn w() -> Expr {
    builtin(6, "W", 2, |a| {
        Some(a[0].apply([a[1].clone(), a[1].clone()]))
    })
}

/// 后继：+ n f x = f (n f x)
pub fn succ() -> Expr {
    builtin(7, "+", 3, |a| {
        Some(Expr::app(
            a[1].clone(),
            a[0].apply([a[1].clone(), a[2].clone()]),
        ))
    })
}

/// Church 数字：n f x = f (f ... (f x))
///
/// 每步只剥一层：`0 f x = x`，`n f x = f ((n-1) f x)`。
pub fn numeral(n: u64) -> Expr {
    let rule: Rule = Rc::new(move |a: &[Expr]| match n.checked_sub(1) {
        None => Some(a[1].clone()),
        Some(pred) => Some(Expr::app(
            a[0].clone(),
            numeral(pred).apply([a[0].clone(), a[1].clone()]),
        )),
    });
    let mut native = Native::with_id(8, &n.to_string(), 2, rule);
    native.numeral = Some(n);
    Expr::native(native)
}

/// 全部内置原语（数字除外）
pub fn primitives() -> Vec<Expr> {
    vec![s(), k(), i(), b(), c(), w(), succ()]
}
