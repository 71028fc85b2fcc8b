//! 规范化单元测试
//!
//! 元数推断与逐步 lambda 化

use crate::engine::canon::InferOptions;
use crate::engine::error::EngineError;
use crate::engine::expr::Expr;
use crate::frontend::Environment;

fn infer(source: &str) -> crate::engine::canon::Inference {
    Environment::new()
        .parse(source)
        .unwrap()
        .infer(InferOptions::default())
}

#[cfg(test)]
mod infer_tests {
    use super::*;

    #[test]
    fn test_infer_k() {
        let inference = infer("K");
        assert!(inference.normal);
        assert!(inference.proper);
        assert_eq!(inference.arity, 2);
        assert_eq!(inference.discard, vec![1]);
        assert!(inference.duplicate.is_empty());
        assert_eq!(inference.expr.unwrap().to_string(), "a->b->a");
    }

    #[test]
    fn test_infer_s() {
        let inference = infer("S");
        assert_eq!(inference.arity, 3);
        assert_eq!(inference.duplicate, vec![2]);
        assert!(inference.discard.is_empty());
        assert_eq!(inference.expr.unwrap().to_string(), "a->b->c->a c(b c)");
    }

    #[test]
    fn test_infer_identity_is_linear() {
        for source in ["I", "S K K", "x->x"] {
            let inference = infer(source);
            assert_eq!(inference.arity, 1, "{}", source);
            assert!(inference.is_linear(), "{}", source);
            assert_eq!(inference.expr.unwrap().to_string(), "a->a");
        }
    }

    #[test]
    fn test_infer_numeral() {
        let inference = infer("2");
        assert_eq!(inference.arity, 2);
        assert_eq!(inference.duplicate, vec![0]);
        assert!(!inference.is_affine());
        assert_eq!(inference.expr.unwrap().to_string(), "a->b->a(a b)");
    }

    #[test]
    fn test_infer_uses_minimal_arity() {
        let inference = infer("C I");
        assert_eq!(inference.arity, 2);
        assert_eq!(inference.expr.unwrap().to_string(), "a->b->b a");
        assert_eq!(infer("K I").arity, 2);
    }

    #[test]
    fn test_infer_non_normalizing() {
        let inference = infer("W W W");
        assert!(!inference.normal);
        assert!(!inference.proper);
        assert!(inference.expr.is_none());
        assert!(inference.steps > 0);
    }

    #[test]
    fn test_infer_respects_arg_limit() {
        let expr = Environment::new().parse("K").unwrap();
        let inference = expr.infer(InferOptions {
            max_args: 1,
            max_steps: 100,
        });
        assert!(!inference.normal);
    }

    #[test]
    fn test_infer_free_variable_is_improper() {
        let inference = infer("K x");
        assert!(inference.normal);
        assert!(!inference.proper);
        assert_eq!(inference.arity, 1);
        assert_eq!(inference.discard, vec![0]);
        assert_eq!(inference.expr.unwrap().to_string(), "a->x");
    }

    #[test]
    fn test_infer_variable_head() {
        // 头部是变量时，其余参数分别推断
        let inference = infer("x (S K K) K");
        assert!(inference.normal);
        assert!(!inference.proper);
        assert_eq!(inference.arity, 0);
        assert_eq!(inference.expr.unwrap().to_string(), "x(a->a)(a->b->a)");
    }

    #[test]
    fn test_infer_closed_term_with_nested_lambda() {
        let inference = infer("x->x K");
        assert!(inference.normal);
        assert!(!inference.proper);
        assert_eq!(inference.arity, 1);
        assert_eq!(inference.expr.unwrap().to_string(), "a->a(b->c->b)");
    }
}

#[cfg(test)]
mod to_lambda_tests {
    use super::*;

    #[test]
    fn test_first_item_is_input() {
        let expr = Environment::new().parse("S K K").unwrap();
        let first = expr.to_lambda(InferOptions::default()).next().unwrap().unwrap();
        assert!(first.expr.is_same(&expr));
        assert_eq!(first.steps, 0);
    }

    #[test]
    fn test_whole_term_simplified() {
        let expr = Environment::new().parse("S K K").unwrap();
        let forms: Vec<String> = expr
            .to_lambda(InferOptions::default())
            .map(|step| step.unwrap().expr.to_string())
            .collect();
        assert_eq!(forms, vec!["SKK", "a->a"]);
    }

    #[test]
    fn test_weights_non_increasing() {
        let mut env = Environment::new();
        let expr = env.parse("x (S K K) (K (S K K))").unwrap();
        let steps: Vec<_> = expr
            .to_lambda(InferOptions::default())
            .map(|step| step.unwrap())
            .collect();
        for pair in steps.windows(2) {
            assert!(pair[1].expr.weight() <= pair[0].expr.weight());
            assert!(pair[1].steps >= pair[0].steps);
        }
        let last = steps.last().unwrap();
        assert_eq!(last.expr.to_string(), "x(a->a)(a->b->b)");
    }

    #[test]
    fn test_last_form_is_fixed_point() {
        let mut env = Environment::new();
        let expr = env.parse("B (S K K) K").unwrap();
        let last = expr.to_lambda(InferOptions::default()).last_form().unwrap();
        let again: Vec<_> = last
            .expr
            .to_lambda(InferOptions::default())
            .map(|step| step.unwrap())
            .collect();
        assert_eq!(again.len(), 1);
        assert!(again[0].expr.is_same(&last.expr));
    }

    #[test]
    fn test_every_pull_strictly_lighter_then_exhausted() {
        let mut env = Environment::new();
        let expr = env.parse("B (S K K) K").unwrap();
        let mut pulls = expr.to_lambda(InferOptions::default());
        let forms: Vec<_> = pulls.by_ref().map(|step| step.unwrap()).collect();
        assert!(forms.len() >= 2);
        for pair in forms.windows(2) {
            assert!(pair[1].expr.weight() < pair[0].expr.weight());
        }
        assert!(pulls.next().is_none());
        assert!(pulls.next().is_none());
    }

    #[test]
    fn test_no_gain_keeps_primitive() {
        let expr = Environment::new().parse("K").unwrap();
        let last = expr.to_lambda(InferOptions::default()).last_form().unwrap();
        // a->b->a 的权重 2 大于 K 的权重 1
        assert_eq!(last.expr.to_string(), "K");
    }

    #[test]
    fn test_non_normalizing_is_error() {
        let expr = Environment::new().parse("W W W").unwrap();
        let mut steps = expr.to_lambda(InferOptions {
            max_args: 4,
            max_steps: 50,
        });
        assert!(steps.next().unwrap().is_ok());
        match steps.next().unwrap() {
            Err(EngineError::NotNormalizing { budget, .. }) => assert_eq!(budget, 50),
            other => panic!("unexpected {:?}", other.map(|s| s.expr)),
        }
        assert!(steps.next().is_none());
        assert!(Expr::numeral(1)
            .to_lambda(InferOptions::default())
            .last_form()
            .is_ok());
    }
}
