//! 归约引擎
//!
//! 正规序（最左最外）归约：
//!
//! 1. 先尝试根部的头部 redex（让函数位置的表达式吃下参数）；
//! 2. 否则递归进入函数位置，再进入参数位置，取第一个找到的子步骤；
//! 3. 都没有则不可归约，并把结论缓存在应用节点上（别名过时后缓存失效）。

use crate::engine::error::{EngineError, Result};
use crate::engine::expr::{Expr, Invocation, Node};
use tracing::{debug, trace};

/// 一次归约运行的结果
#[derive(Debug, Clone)]
pub struct Run {
    /// 最后得到的表达式
    pub expr: Expr,
    /// 实际执行的步数
    pub steps: usize,
    /// 是否已到达不可归约的状态
    pub is_final: bool,
}

impl Expr {
    /// 执行一步归约；`None` 表示不可归约
    pub fn step(&self) -> Option<Expr> {
        match self.node() {
            Node::Var(_) | Node::Native(_) => None,
            Node::Lambda(lambda) => lambda
                .body()
                .step()
                .map(|body| Expr::rebind(lambda.param().clone(), body)),
            Node::Alias(alias) if alias.is_outdated() => alias.target().step(),
            Node::Alias(alias) if alias.is_terminal() => None,
            Node::Alias(alias) => Some(alias.target().clone()),
            Node::App(app) => {
                if app.is_irreducible() {
                    return None;
                }
                if app.fun().arity() == 1 {
                    if let Invocation::Done(result) = app.fun().invoke(app.arg()) {
                        return Some(result);
                    }
                }
                if let Some(fun) = app.fun().step() {
                    return Some(Expr::app(fun, app.arg().clone()));
                }
                if let Some(arg) = app.arg().step() {
                    return Some(Expr::app(app.fun().clone(), arg));
                }
                app.mark_irreducible();
                None
            }
        }
    }

    /// 不可归约？
    pub fn is_irreducible(&self) -> bool {
        self.step().is_none()
    }

    /// 反复归约，直到不可归约或用完 `max_steps` 步
    pub fn run(
        &self,
        max_steps: usize,
    ) -> Run {
        let mut current = self.clone();
        let mut steps = 0;
        while steps < max_steps {
            match current.step() {
                Some(next) => {
                    current = next;
                    steps += 1;
                }
                None => {
                    trace!("normal form after {} steps: {}", steps, current);
                    return Run {
                        expr: current,
                        steps,
                        is_final: true,
                    };
                }
            }
        }
        let is_final = current.is_irreducible();
        if !is_final {
            debug!("budget of {} steps exhausted", max_steps);
        }
        Run {
            expr: current,
            steps,
            is_final,
        }
    }

    /// 与 [`Expr::run`] 相同，但预算耗尽时报错
    pub fn run_strict(
        &self,
        max_steps: usize,
    ) -> Result<Run> {
        let run = self.run(max_steps);
        if run.is_final {
            Ok(run)
        } else {
            Err(EngineError::BudgetExhausted {
                budget: max_steps,
                expr: run.expr.to_string(),
            })
        }
    }

    /// 以惰性序列的形式逐步归约
    ///
    /// 第一个元素是表达式本身，之后每个元素恰好比前一个多一步。
    /// 序列在不可归约或用完预算后结束，不能重新开始。
    pub fn walk(
        &self,
        max_steps: usize,
    ) -> Walk {
        Walk {
            current: Some(self.clone()),
            steps: 0,
            max_steps,
        }
    }
}

/// 逐步归约的迭代器
#[derive(Debug)]
pub struct Walk {
    current: Option<Expr>,
    steps: usize,
    max_steps: usize,
}

impl Iterator for Walk {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let expr = self.current.take()?;
        let next = expr.step();
        let item = Run {
            expr,
            steps: self.steps,
            is_final: next.is_none(),
        };
        if self.steps < self.max_steps {
            if let Some(next) = next {
                self.steps += 1;
                self.current = Some(next);
            }
        }
        Some(item)
    }
}
