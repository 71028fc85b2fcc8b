//! 规范化：推断 lambda 范式
//!
//! `infer` 回答的问题是：给表达式补上足够多的新自由变量之后，它是否总能（在预算内）
//! 归约成只由这些变量的应用构成的项？
//!
//! 做法是先归约到范式；若结果还不是“纯变量应用”，就再追加一个新变量重试，
//! 直到达到参数上限。若范式的头部已经是变量，说明再加参数也无济于事，
//! 此时把其余参数分别递归推断，得到带内嵌抽象的（非 proper）范式。

pub mod lambda;

pub use lambda::{LambdaStep, ToLambda};

use crate::engine::expr::{arg_name, Expr, FreeVar, Node, VarId};
use crate::engine::traverse::Control;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// 推断预算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferOptions {
    /// 最多追加的参数个数
    pub max_args: usize,
    /// 总归约步数上限
    pub max_steps: usize,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            max_args: 32,
            max_steps: 1000,
        }
    }
}

/// 推断结果
#[derive(Debug, Clone)]
pub struct Inference {
    /// 是否在预算内找到了范式
    pub normal: bool,
    /// 范式是否只由自身参数构成
    pub proper: bool,
    /// 最小元数
    pub arity: usize,
    /// 没有用到的参数下标
    pub discard: Vec<usize>,
    /// 用到不止一次的参数下标
    pub duplicate: Vec<usize>,
    /// 规范 lambda 表达式
    pub expr: Option<Expr>,
    /// 消耗的归约步数
    pub steps: usize,
}

impl Inference {
    fn failed(
        arity: usize,
        steps: usize,
    ) -> Self {
        Self {
            normal: false,
            proper: false,
            arity,
            discard: Vec::new(),
            duplicate: Vec::new(),
            expr: None,
            steps,
        }
    }

    /// 每个参数恰好用一次
    pub fn is_linear(&self) -> bool {
        self.proper && self.discard.is_empty() && self.duplicate.is_empty()
    }

    /// 每个参数至多用一次
    pub fn is_affine(&self) -> bool {
        self.proper && self.duplicate.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// 只由变量的应用构成
    FreeOnly,
    /// 头部是变量，参数中还有别的东西
    VarHead,
    /// 还在等待参数
    Waiting,
}

fn shape(expr: &Expr) -> Shape {
    let free_only = expr.fold(true, |_, e| match e.node() {
        Node::Var(_) | Node::App(_) => Control::Continue(true),
        _ => Control::Stop(false),
    });
    if free_only {
        Shape::FreeOnly
    } else if expr.head().as_var().is_some() {
        Shape::VarHead
    } else {
        Shape::Waiting
    }
}

impl Expr {
    /// 推断元数与规范 lambda 形式
    pub fn infer(
        &self,
        options: InferOptions,
    ) -> Inference {
        let inference = infer_from(self, options, 0);
        debug!(
            "infer {}: normal={} arity={} steps={}",
            self, inference.normal, inference.arity, inference.steps
        );
        inference
    }
}

/// `offset` 是参数命名的起点，使嵌套推断出的变量名互不重复
fn infer_from(
    expr: &Expr,
    options: InferOptions,
    offset: usize,
) -> Inference {
    let mut steps = 0;
    let mut args: Vec<FreeVar> = Vec::new();
    let mut current = expr.clone();

    loop {
        let run = current.run(options.max_steps.saturating_sub(steps));
        steps += run.steps;
        if !run.is_final {
            return Inference::failed(args.len(), steps);
        }
        match shape(&run.expr) {
            Shape::FreeOnly => return summarize(args, run.expr, steps, true),
            Shape::VarHead => {
                let inner = options_after(options, steps);
                let mut body = run.expr.head().clone();
                let mut sub_steps = 0;
                for arg in run.expr.args() {
                    if shape(&arg) == Shape::FreeOnly {
                        body = Expr::app(body, arg);
                        continue;
                    }
                    let nested = infer_from(
                        &arg,
                        options_after(inner, sub_steps),
                        offset + args.len(),
                    );
                    sub_steps += nested.steps;
                    match nested.expr {
                        Some(canonical) if nested.normal => body = Expr::app(body, canonical),
                        _ => return Inference::failed(args.len(), steps + sub_steps),
                    }
                }
                return summarize(args, body, steps + sub_steps, false);
            }
            Shape::Waiting => {
                if args.len() >= options.max_args {
                    trace!("gave up after {} arguments", args.len());
                    return Inference::failed(args.len(), steps);
                }
                let var = FreeVar::new(&arg_name(offset + args.len()));
                current = Expr::app(run.expr, Expr::var(var.clone()));
                args.push(var);
            }
        }
    }
}

fn options_after(
    options: InferOptions,
    spent: usize,
) -> InferOptions {
    InferOptions {
        max_steps: options.max_steps.saturating_sub(spent),
        ..options
    }
}

fn summarize(
    args: Vec<FreeVar>,
    body: Expr,
    steps: usize,
    free_only: bool,
) -> Inference {
    let mut uses: HashMap<VarId, usize> = HashMap::new();
    let mut foreign = false;
    body.fold((), |(), e| {
        if let Node::Var(v) = e.node() {
            if args.contains(v) {
                *uses.entry(v.id()).or_default() += 1;
            } else {
                foreign = true;
            }
        }
        Control::Continue(())
    });

    let count = |v: &FreeVar| uses.get(&v.id()).copied().unwrap_or(0);
    let discard = (0..args.len()).filter(|&i| count(&args[i]) == 0).collect();
    let duplicate = (0..args.len()).filter(|&i| count(&args[i]) > 1).collect();

    // 内嵌抽象的私有参数也算外来变量，但那时 free_only 已经是 false
    let proper = free_only && !foreign;
    let expr = if args.is_empty() {
        body
    } else {
        args.iter()
            .rev()
            .fold(body, |body, param| Expr::lambda(param, body))
    };

    Inference {
        normal: true,
        proper,
        arity: args.len(),
        discard,
        duplicate,
        expr: Some(expr),
        steps,
    }
}

#[cfg(test)]
mod tests;
