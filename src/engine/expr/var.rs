//! 自由变量与命名作用域
//!
//! 变量身份由 `VarId` 决定，而不是名字：两个同名变量只有在
//! 来自同一个 `Scope` 时才会被视为同一个变量。

use hashbrown::HashMap;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(1);

/// 变量的稳定标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u64);

impl VarId {
    fn fresh() -> Self {
        VarId(NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 原始数值
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// 自由变量（未绑定的占位符）
#[derive(Clone)]
pub struct FreeVar {
    id: VarId,
    name: Rc<str>,
}

impl FreeVar {
    /// 创建一个全新的变量，与任何已有变量都不相同
    pub fn new(name: &str) -> Self {
        Self {
            id: VarId::fresh(),
            name: Rc::from(name),
        }
    }

    /// 同名但身份不同的新变量
    pub fn fresh_like(&self) -> Self {
        Self {
            id: VarId::fresh(),
            name: self.name.clone(),
        }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for FreeVar {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.id == other.id
    }
}

impl Eq for FreeVar {}

impl Hash for FreeVar {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FreeVar {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id.0)
    }
}

/// 命名作用域
///
/// 按名字缓存变量：在同一个作用域（及其克隆）中多次解析同一个名字，
/// 得到的是同一个变量。克隆出来的 `Scope` 共享缓存。
#[derive(Clone, Default)]
pub struct Scope {
    vars: Rc<RefCell<HashMap<String, FreeVar>>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出（必要时创建）名为 `name` 的变量
    pub fn var(
        &self,
        name: &str,
    ) -> FreeVar {
        self.vars
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| FreeVar::new(name))
            .clone()
    }

    /// 一次取出多个变量
    pub fn vars(
        &self,
        names: &[&str],
    ) -> Vec<FreeVar> {
        names.iter().map(|name| self.var(name)).collect()
    }

    /// 两个作用域是否共享同一份缓存
    pub fn same_as(
        &self,
        other: &Scope,
    ) -> bool {
        Rc::ptr_eq(&self.vars, &other.vars)
    }

    pub fn len(&self) -> usize {
        self.vars.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Scope {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Scope").field("vars", &self.len()).finish()
    }
}

/// 按位置生成的参数名：a, b, ..., z, a1, b1, ...
pub fn arg_name(index: usize) -> String {
    let letter = (b'a' + (index % 26) as u8) as char;
    match index / 26 {
        0 => letter.to_string(),
        round => format!("{}{}", letter, round),
    }
}
