//! 逐步 lambda 化
//!
//! 每次拉取从根开始做一次前序 `traverse`，尝试把每个子项替换为它的规范 lambda 形式，
//! 只有当替换能严格降低权重时才接受，接受后立即 `Stop`。
//! 每次接受都产出一个新的中间形式，因此产出序列的权重严格递减，
//! 一次遍历没有任何替换时序列结束，最后一个元素是不动点。
//!
//! 与 `infer` 不同，子项推断失败在这里是错误。

use super::InferOptions;
use crate::engine::error::{EngineError, Result};
use crate::engine::expr::{Expr, Node};
use crate::engine::traverse::Control;
use tracing::debug;

/// 一个中间形式
#[derive(Debug, Clone)]
pub struct LambdaStep {
    pub expr: Expr,
    /// 累计消耗的归约步数
    pub steps: usize,
}

/// lambda 化的惰性序列
#[derive(Debug)]
pub struct ToLambda {
    current: Expr,
    steps: usize,
    options: InferOptions,
    started: bool,
    done: bool,
}

impl Expr {
    /// 逐步化简为（部分）lambda 形式
    pub fn to_lambda(
        &self,
        options: InferOptions,
    ) -> ToLambda {
        ToLambda {
            current: self.clone(),
            steps: 0,
            options,
            started: false,
            done: false,
        }
    }
}

impl ToLambda {
    /// 一直拉取到结束，返回最后的形式
    pub fn last_form(mut self) -> Result<LambdaStep> {
        let mut last = LambdaStep {
            expr: self.current.clone(),
            steps: 0,
        };
        for step in &mut self {
            last = step?;
        }
        Ok(last)
    }
}

impl Iterator for ToLambda {
    type Item = Result<LambdaStep>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(Ok(LambdaStep {
                expr: self.current.clone(),
                steps: 0,
            }));
        }
        if self.done {
            return None;
        }

        let options = self.options;
        let mut spent = 0;
        let mut failure = None;
        let rewritten = self.current.traverse(|sub| {
            if matches!(sub.node(), Node::Var(_)) {
                return Control::Continue(None);
            }
            let inference = sub.infer(options);
            spent += inference.steps;
            match inference.expr {
                Some(canonical) if inference.normal => {
                    if canonical.weight() < sub.weight() {
                        debug!("lambdify {} => {}", sub, canonical);
                        Control::Stop(Some(canonical))
                    } else {
                        Control::Continue(None)
                    }
                }
                _ => {
                    failure = Some(EngineError::NotNormalizing {
                        expr: sub.to_string(),
                        budget: options.max_steps,
                    });
                    Control::Stop(None)
                }
            }
        });
        self.steps += spent;

        if let Some(err) = failure {
            self.done = true;
            return Some(Err(err));
        }
        match rewritten {
            Some(next) => {
                self.current = next;
                Some(Ok(LambdaStep {
                    expr: self.current.clone(),
                    steps: self.steps,
                }))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
