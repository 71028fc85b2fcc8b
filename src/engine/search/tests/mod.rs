//! 组合子搜索单元测试

use crate::engine::canon::{InferOptions, Inference};
use crate::engine::expr::{native, Expr, FormatOptions};
use crate::engine::search::{search, Penalty, Probe, SearchOptions, StopReason};
use crate::frontend::Environment;
use hashbrown::HashSet;

fn canonical(inference: &Inference) -> Option<String> {
    inference
        .expr
        .as_ref()
        .filter(|_| inference.normal)
        .map(|e| e.format(&FormatOptions::spaced()))
}

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn test_finds_identity_from_s_and_k() {
        let outcome = search(
            vec![native::s(), native::k()],
            SearchOptions::default(),
            |_, inference| match canonical(inference).as_deref() {
                Some("a->a") => Probe::Accept,
                _ => Probe::Continue,
            },
        )
        .run();
        assert_eq!(outcome.reason, StopReason::Found);
        let found = outcome.found.unwrap();
        let inference = found.infer(InferOptions::default());
        assert_eq!(inference.expr.unwrap().to_string(), "a->a");
        assert!(outcome.generation <= SearchOptions::default().max_depth);
    }

    #[test]
    fn test_try_budget() {
        let options = SearchOptions {
            max_tries: 2,
            ..SearchOptions::default()
        };
        let outcome = search(
            vec![native::s(), native::k(), native::i()],
            options,
            |_, _| Probe::Continue,
        )
        .run();
        assert_eq!(outcome.reason, StopReason::TriesExhausted);
        assert_eq!(outcome.tries, 2);
        assert!(outcome.found.is_none());
    }

    #[test]
    fn test_try_budget_stops_inside_large_generation() {
        let no_penalty = Penalty {
            non_normal: 0,
            discard: 0,
            duplicate: 0,
            improper: 0,
        };
        let options = SearchOptions {
            max_tries: 65,
            max_depth: 2,
            penalty: no_penalty,
            ..SearchOptions::default()
        };
        let seeds: Vec<Expr> = (0..60).map(native::numeral).collect();
        let progress: Vec<_> = search(seeds, options, |_, _| Probe::Continue).collect();
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].probed, 60);
        assert_eq!(progress[1].reason, Some(StopReason::TriesExhausted));
        assert_eq!(progress[1].tries, 65);
        assert_eq!(progress[1].probed, 5);
    }

    #[test]
    fn test_depth_budget() {
        let options = SearchOptions {
            max_depth: 3,
            ..SearchOptions::default()
        };
        let outcome = search(vec![native::k()], options, |_, _| Probe::Reject).run();
        assert_eq!(outcome.reason, StopReason::DepthExhausted);
        assert_eq!(outcome.generation, 3);
        assert_eq!(outcome.tries, 1);
    }

    #[test]
    fn test_rejected_candidates_are_not_combined() {
        let options = SearchOptions {
            max_depth: 4,
            ..SearchOptions::default()
        };
        let mut probed = 0;
        search(vec![native::s(), native::k()], options, |_, _| {
            probed += 1;
            Probe::Reject
        })
        .run();
        assert_eq!(probed, 2);
    }
}

#[cfg(test)]
mod progress_tests {
    use super::*;

    #[test]
    fn test_one_generation_per_pull() {
        let options = SearchOptions {
            max_depth: 4,
            penalty: Penalty {
                non_normal: 0,
                discard: 0,
                duplicate: 0,
                improper: 0,
            },
            ..SearchOptions::default()
        };
        let progress: Vec<_> =
            search(vec![native::k(), native::i()], options, |_, _| Probe::Continue).collect();
        let generations: Vec<_> = progress.iter().map(|p| p.generation).collect();
        assert_eq!(generations, vec![1, 2, 3, 4]);
        assert_eq!(progress[0].probed, 2);
        assert!(progress.iter().take(3).all(|p| p.reason.is_none()));
        assert_eq!(progress[3].reason, Some(StopReason::DepthExhausted));
        for pair in progress.windows(2) {
            assert!(pair[1].tries >= pair[0].tries);
        }
    }

    #[test]
    fn test_penalty_defers_candidates() {
        let no_penalty = Penalty {
            non_normal: 0,
            discard: 0,
            duplicate: 0,
            improper: 0,
        };
        let eager = SearchOptions {
            max_depth: 2,
            penalty: no_penalty,
            ..SearchOptions::default()
        };
        let lazy = SearchOptions {
            max_depth: 2,
            ..SearchOptions::default()
        };
        let seeds = || vec![native::k(), native::i()];
        let eager = search(seeds(), eager, |_, _| Probe::Continue).run();
        let lazy = search(seeds(), lazy, |_, _| Probe::Continue).run();
        // K 丢弃参数，默认罚分把它推迟一代
        assert!(eager.tries > lazy.tries);
    }

    #[test]
    fn test_penalty_of() {
        let env_k = Environment::new().parse("K").unwrap();
        let penalty = Penalty::default();
        assert_eq!(penalty.of(&env_k.infer(InferOptions::default())), penalty.discard);
        let www = Environment::new().parse("W W W").unwrap();
        let inference = www.infer(InferOptions {
            max_args: 2,
            max_steps: 20,
        });
        assert_eq!(penalty.of(&inference), penalty.non_normal);
        let improper = Environment::new().parse("K x").unwrap();
        assert_eq!(
            penalty.of(&improper.infer(InferOptions::default())),
            penalty.discard + penalty.improper
        );
    }
}

#[cfg(test)]
mod dedup_tests {
    use super::*;

    #[test]
    fn test_same_canonical_probed_once() {
        let mut env = Environment::new();
        let seeds = vec![
            env.parse("I").unwrap(),
            env.parse("S K K").unwrap(),
            env.parse("K").unwrap(),
        ];
        let options = SearchOptions {
            max_depth: 1,
            ..SearchOptions::default()
        };
        let mut seen = Vec::new();
        let outcome = search(seeds, options, |candidate, _| {
            seen.push(candidate.to_string());
            Probe::Continue
        })
        .run();
        assert_eq!(seen, vec!["I", "K"]);
        assert_eq!(outcome.tries, 2);
    }

    #[test]
    fn test_no_canonical_form_probed_twice() {
        let options = SearchOptions {
            max_depth: 6,
            max_tries: 400,
            ..SearchOptions::default()
        };
        let mut keys: Vec<String> = Vec::new();
        search(
            vec![native::s(), native::k(), native::i()],
            options,
            |candidate: &Expr, inference| {
                keys.push(canonical(inference).unwrap_or_else(|| format!("~{}", candidate)));
                Probe::Continue
            },
        )
        .run();
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
        assert!(keys.len() <= 400);
    }
}
