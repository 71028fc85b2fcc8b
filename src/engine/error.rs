//! 引擎错误
//!
//! 构造期校验立即失败；“卡住”和预算耗尽默认不是错误，
//! 只有调用方显式要求时才升级为 [`EngineError::BudgetExhausted`]。

use crate::frontend::ParseError;
use thiserror::Error;

/// 引擎错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// 多参数抽象没有参数
    #[error("Lambda abstraction needs at least one argument")]
    EmptyLambda,

    /// 同一个多参数抽象里参数重名
    #[error("Duplicate argument name in abstraction: {name}")]
    DuplicateParam { name: String },

    /// 具名项的名字不合法
    #[error("Invalid name for a named term: {name:?}")]
    InvalidName { name: String },

    /// 归约预算耗尽（仅在调用方要求时报告）
    #[error("Reduction did not finish within {budget} steps: {expr}")]
    BudgetExhausted { budget: usize, expr: String },

    /// 找不到范式
    #[error("No normal form for {expr} within {budget} steps")]
    NotNormalizing { expr: String, budget: usize },

    /// 断言相等失败
    #[error("Expected {expected}, got {actual} (diff: {diff})")]
    Mismatch {
        expected: String,
        actual: String,
        diff: String,
    },

    /// 解析错误
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// 统一结果类型
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
