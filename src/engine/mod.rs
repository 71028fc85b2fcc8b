//! 组合子逻辑引擎
//!
//! - [`expr`]: 表达式模型、构造与打印
//! - [`reduce`]: 正规序归约
//! - [`traverse`]: 遍历与折叠
//! - [`equiv`]: 替换、相等与差异
//! - [`canon`]: 元数推断与 lambda 化
//! - [`ski`]: 括号抽象
//! - [`search`]: 组合子搜索

pub mod canon;
pub mod equiv;
pub mod error;
pub mod expr;
pub mod reduce;
pub mod search;
pub mod ski;
pub mod traverse;

pub use canon::{InferOptions, Inference, LambdaStep, ToLambda};
pub use error::{EngineError, Result};
pub use expr::{native, Expr, FormatOptions, FreeVar, Invocation, Native, Node, Scope};
pub use reduce::{Run, Walk};
pub use search::{search, Penalty, Probe, Search, SearchOptions, SearchOutcome, SearchProgress, StopReason};
pub use ski::{SkiStep, ToSki};
pub use traverse::Control;
