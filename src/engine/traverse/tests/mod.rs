//! 遍历与折叠单元测试
//!
//! 四种控制信号在 traverse 与 fold 中的语义

use crate::engine::expr::{native, Expr, Node};
use crate::engine::traverse::Control;
use crate::frontend::Environment;

fn parse(source: &str) -> Expr {
    Environment::new().parse(source).unwrap()
}

/// 按前序记录访问过的节点文本
fn visit_order(expr: &Expr) -> Vec<String> {
    expr.fold(Vec::new(), |mut seen, e| {
        seen.push(e.to_string());
        Control::Continue(seen)
    })
}

#[cfg(test)]
mod fold_tests {
    use super::*;

    #[test]
    fn test_preorder_function_first() {
        let expr = parse("S K I");
        assert_eq!(visit_order(&expr), vec!["SKI", "SK", "S", "K", "I"]);
    }

    #[test]
    fn test_prune_skips_children() {
        let expr = parse("S (K I) I");
        let leaves = expr.fold(0, |n, e| match e.node() {
            Node::App(app) if app.fun().to_string() == "K" => Control::Prune(n),
            Node::Native(_) => Control::Continue(n + 1),
            _ => Control::Continue(n),
        });
        // K I 被整体跳过
        assert_eq!(leaves, 2);
    }

    #[test]
    fn test_stop_returns_immediately() {
        let expr = parse("S K I");
        let first = expr.fold(None, |found, e| match e.node() {
            Node::Native(n) => Control::Stop(Some(n.name().to_string())),
            _ => Control::Continue(found),
        });
        assert_eq!(first.as_deref(), Some("S"));
    }

    #[test]
    fn test_redo_revisits_same_node() {
        let expr = native::k();
        let visits = expr.fold(0, |n, _| {
            if n < 3 {
                Control::Redo(n + 1)
            } else {
                Control::Continue(n)
            }
        });
        assert_eq!(visits, 3);
    }

    #[test]
    fn test_size_and_free_vars() {
        let mut env = Environment::new();
        let expr = env.parse("x (y x) z").unwrap();
        assert_eq!(expr.size(), 7);
        let names: Vec<_> = expr.free_vars().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert!(expr.mentions(&env.scope().var("y")));
        assert!(!expr.mentions(&env.scope().var("w")));
    }

    #[test]
    fn test_fold_enters_lambda_body() {
        let expr = parse("x->K x");
        assert_eq!(expr.size(), 4);
    }
}

#[cfg(test)]
mod traverse_tests {
    use super::*;

    #[test]
    fn test_no_change_returns_none() {
        let expr = parse("S K I");
        assert!(expr.traverse(|_| Control::Continue(None)).is_none());
    }

    #[test]
    fn test_replace_every_k() {
        let expr = parse("S K (K I)");
        let out = expr
            .traverse(|e| match e.as_native() {
                Some(n) if n.name() == "K" => Control::Continue(Some(native::i())),
                _ => Control::Continue(None),
            })
            .unwrap();
        assert_eq!(out.to_string(), "SI(II)");
    }

    #[test]
    fn test_stop_after_first_replacement() {
        let expr = parse("S K (K I)");
        let out = expr
            .traverse(|e| match e.as_native() {
                Some(n) if n.name() == "K" => Control::Stop(Some(native::i())),
                _ => Control::Continue(None),
            })
            .unwrap();
        assert_eq!(out.to_string(), "SI(KI)");
    }

    #[test]
    fn test_prune_keeps_subtree() {
        let expr = parse("K (K I) K");
        let out = expr
            .traverse(|e| match e.node() {
                Node::App(app) if app.arg().to_string() == "I" => Control::Prune(None),
                Node::Native(n) if n.name() == "K" => Control::Continue(Some(native::s())),
                _ => Control::Continue(None),
            })
            .unwrap();
        assert_eq!(out.to_string(), "S(KI)S");
    }

    #[test]
    fn test_redo_visits_replacement() {
        let mut env = Environment::new();
        env.parse("inner = K I").unwrap();
        let expr = env.parse("outer = inner S; outer K").unwrap();
        // 别名层层展开，展开结果本身也会被访问
        let expanded = expr.expand();
        assert_eq!(expanded.to_string(), "KISK");
        assert!(expanded.fold(true, |ok, e| match e.node() {
            Node::Alias(_) => Control::Stop(false),
            _ => Control::Continue(ok),
        }));
    }

    #[test]
    fn test_redo_none_acts_as_continue() {
        let expr = parse("S K");
        let mut visited = 0;
        let out = expr.traverse(|_| {
            visited += 1;
            Control::Redo(None)
        });
        assert!(out.is_none());
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_rewrite_under_lambda() {
        let expr = parse("x->K x");
        let out = expr
            .traverse(|e| match e.as_native() {
                Some(_) => Control::Continue(Some(native::i())),
                None => Control::Continue(None),
            })
            .unwrap();
        assert_eq!(out.to_string(), "x->I x");
    }

    #[test]
    fn test_expand_is_idempotent() {
        let mut env = Environment::new();
        let expr = env.parse("t = C I; u = t t; u K").unwrap();
        let once = expr.expand();
        assert!(once.expand().equals(&once));
        assert_eq!(once.to_string(), "CI(CI)K");
    }
}
