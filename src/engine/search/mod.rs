//! 组合子搜索
//!
//! 生成并测试：第 1 代是种子，第 g 代由第 i 代与第 g-i 代的成员两两应用得到。
//! 候选按需逐个构造，探测预算用完时本代剩下的组合不会被生成。
//! 每个候选先推断规范形式，规范形式相同的候选只探测一次。
//!
//! 探测结果为“继续”的候选进入代桶，供之后的代组合使用。不能归约、丢弃或重复参数、
//! 非 proper 的候选会被放进更靠后的桶里（见 [`Penalty`]），而不是直接丢掉。

use crate::engine::canon::{InferOptions, Inference};
use crate::engine::expr::{Expr, FormatOptions};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// 谓词对一个候选的判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// 丢弃
    Reject,
    /// 找到了
    Accept,
    /// 保留，继续搜索
    Continue,
}

/// 推迟的代数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Penalty {
    pub non_normal: usize,
    pub discard: usize,
    pub duplicate: usize,
    pub improper: usize,
}

impl Default for Penalty {
    fn default() -> Self {
        Self {
            non_normal: 3,
            discard: 1,
            duplicate: 1,
            improper: 2,
        }
    }
}

impl Penalty {
    /// 候选应推迟的代数
    pub fn of(
        &self,
        inference: &Inference,
    ) -> usize {
        if !inference.normal {
            return self.non_normal;
        }
        let mut penalty = 0;
        if !inference.discard.is_empty() {
            penalty += self.discard;
        }
        if !inference.duplicate.is_empty() {
            penalty += self.duplicate;
        }
        if !inference.proper {
            penalty += self.improper;
        }
        penalty
    }
}

/// 搜索预算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// 最多探测的候选个数
    pub max_tries: usize,
    /// 最多生成的代数
    pub max_depth: usize,
    pub penalty: Penalty,
    pub infer: InferOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_tries: 10_000,
            max_depth: 8,
            penalty: Penalty::default(),
            infer: InferOptions::default(),
        }
    }
}

/// 搜索结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Found,
    TriesExhausted,
    DepthExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            StopReason::Found => write!(f, "found"),
            StopReason::TriesExhausted => write!(f, "try budget exhausted"),
            StopReason::DepthExhausted => write!(f, "depth budget exhausted"),
        }
    }
}

/// 一代的进度
#[derive(Debug, Clone)]
pub struct SearchProgress {
    pub generation: usize,
    /// 累计探测次数
    pub tries: usize,
    /// 本代探测次数
    pub probed: usize,
    pub found: Option<Expr>,
    /// 若搜索在本代结束，给出原因
    pub reason: Option<StopReason>,
}

/// 最终结果
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub found: Option<Expr>,
    pub tries: usize,
    pub generation: usize,
    pub reason: StopReason,
}

/// 按代推进的搜索
pub struct Search<P> {
    seeds: Vec<Expr>,
    options: SearchOptions,
    predicate: P,
    /// 下标是代数，0 号桶不用
    buckets: Vec<Vec<Expr>>,
    seen: HashSet<String>,
    generation: usize,
    tries: usize,
    done: bool,
}

impl<P> fmt::Debug for Search<P> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Search")
            .field("generation", &self.generation)
            .field("tries", &self.tries)
            .field("seen", &self.seen.len())
            .finish()
    }
}

/// 从 `seeds` 开始搜索满足 `predicate` 的组合子
pub fn search<P>(
    seeds: Vec<Expr>,
    options: SearchOptions,
    predicate: P,
) -> Search<P>
where
    P: FnMut(&Expr, &Inference) -> Probe,
{
    Search::new(seeds, options, predicate)
}

impl<P> Search<P>
where
    P: FnMut(&Expr, &Inference) -> Probe,
{
    pub fn new(
        seeds: Vec<Expr>,
        options: SearchOptions,
        predicate: P,
    ) -> Self {
        Self {
            seeds,
            options,
            predicate,
            buckets: vec![Vec::new(); 2],
            seen: HashSet::new(),
            generation: 0,
            tries: 0,
            done: false,
        }
    }

    /// 已经探测过的规范形式个数
    pub fn seen(&self) -> usize {
        self.seen.len()
    }

    /// 一直推进到结束
    pub fn run(mut self) -> SearchOutcome {
        let mut outcome = SearchOutcome {
            found: None,
            tries: 0,
            generation: 0,
            reason: StopReason::DepthExhausted,
        };
        for progress in &mut self {
            outcome.tries = progress.tries;
            outcome.generation = progress.generation;
            if let Some(reason) = progress.reason {
                outcome.reason = reason;
                outcome.found = progress.found;
            }
        }
        outcome
    }

    /// 本代的下一个候选，用到时才构造
    fn next_candidate(
        &self,
        cursor: &mut Cursor,
    ) -> Option<Expr> {
        let generation = self.generation;
        if generation == 1 {
            let seed = self.seeds.get(cursor.arg).cloned();
            cursor.arg += 1;
            return seed;
        }
        while cursor.left < generation {
            let funs = self.bucket(cursor.left);
            let args = self.bucket(generation - cursor.left);
            if cursor.fun < funs.len() && cursor.arg < args.len() {
                let candidate = Expr::app(funs[cursor.fun].clone(), args[cursor.arg].clone());
                cursor.arg += 1;
                if cursor.arg == args.len() {
                    cursor.arg = 0;
                    cursor.fun += 1;
                }
                return Some(candidate);
            }
            cursor.left += 1;
            cursor.fun = 0;
            cursor.arg = 0;
        }
        None
    }

    fn bucket(
        &self,
        generation: usize,
    ) -> &[Expr] {
        self.buckets
            .get(generation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn file(
        &mut self,
        generation: usize,
        expr: Expr,
    ) {
        if self.buckets.len() <= generation {
            self.buckets.resize_with(generation + 1, Vec::new);
        }
        self.buckets[generation].push(expr);
    }
}

/// 第 g 代的位置：左侧取自 `left` 号桶，右侧取自 `g - left` 号桶
#[derive(Debug)]
struct Cursor {
    left: usize,
    fun: usize,
    arg: usize,
}

impl Cursor {
    fn new() -> Self {
        Self {
            left: 1,
            fun: 0,
            arg: 0,
        }
    }
}

/// 去重用的键：能归约的候选按规范形式，否则按原样
fn canonical_key(
    expr: &Expr,
    inference: &Inference,
) -> String {
    match &inference.expr {
        Some(canonical) if inference.normal => {
            format!("λ:{}", canonical.format(&FormatOptions::spaced()))
        }
        _ => format!("~:{}", expr.format(&FormatOptions::spaced())),
    }
}

impl<P> Iterator for Search<P>
where
    P: FnMut(&Expr, &Inference) -> Probe,
{
    type Item = SearchProgress;

    fn next(&mut self) -> Option<SearchProgress> {
        if self.done {
            return None;
        }
        self.generation += 1;
        let generation = self.generation;
        let mut probed = 0;

        // 罚分后的候选进入第 g 代及以后的桶，本代只读更早的桶
        let mut cursor = Cursor::new();
        while let Some(candidate) = self.next_candidate(&mut cursor) {
            if self.tries >= self.options.max_tries {
                self.done = true;
                debug!("search: try budget of {} exhausted", self.options.max_tries);
                return Some(SearchProgress {
                    generation,
                    tries: self.tries,
                    probed,
                    found: None,
                    reason: Some(StopReason::TriesExhausted),
                });
            }
            let inference = candidate.infer(self.options.infer);
            if !self.seen.insert(canonical_key(&candidate, &inference)) {
                continue;
            }
            self.tries += 1;
            probed += 1;
            match (self.predicate)(&candidate, &inference) {
                Probe::Reject => {}
                Probe::Accept => {
                    self.done = true;
                    debug!("search: found {} after {} tries", candidate, self.tries);
                    return Some(SearchProgress {
                        generation,
                        tries: self.tries,
                        probed,
                        found: Some(candidate),
                        reason: Some(StopReason::Found),
                    });
                }
                Probe::Continue => {
                    let penalty = self.options.penalty.of(&inference);
                    trace!("search: keep {} (+{})", candidate, penalty);
                    self.file(generation + penalty, candidate);
                }
            }
        }

        debug!("search: generation {} probed {} candidates", generation, probed);
        let reason = if generation >= self.options.max_depth {
            self.done = true;
            Some(StopReason::DepthExhausted)
        } else {
            None
        };
        Some(SearchProgress {
            generation,
            tries: self.tries,
            probed,
            found: None,
            reason,
        })
    }
}

#[cfg(test)]
mod tests;
