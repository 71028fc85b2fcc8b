//! 命名表测试

use crate::engine::canon::InferOptions;
use crate::engine::error::EngineError;
use crate::engine::expr::Expr;
use crate::frontend::Environment;

#[cfg(test)]
mod primitive_tests {
    use super::*;

    #[test]
    fn test_primitives_present() {
        let env = Environment::new();
        let names: Vec<_> = env.names().collect();
        assert_eq!(names, vec!["S", "K", "I", "B", "C", "W", "+"]);
        assert!(env.get("S").unwrap().as_native().is_some());
        assert!(!env.contains("T"));
    }

    #[test]
    fn test_scope_is_shared() {
        let env = Environment::new();
        assert_eq!(env.scope().var("x"), env.scope().var("x"));
        let copy = env.clone();
        assert!(env.scope().same_as(copy.scope()));
    }
}

#[cfg(test)]
mod define_tests {
    use super::*;

    #[test]
    fn test_proper_definition_is_terminal() {
        let mut env = Environment::new();
        let expr = env.parse("T = C I").unwrap();
        let alias = expr.as_alias().unwrap();
        assert!(alias.is_terminal());
        assert_eq!(alias.arity(), Some(2));
    }

    #[test]
    fn test_improper_definition_is_plain() {
        let mut env = Environment::new();
        let free = env.parse("t = K x").unwrap();
        assert!(!free.as_alias().unwrap().is_terminal());

        let omega = env.parse("omega = S I I (S I I)").unwrap();
        assert!(!omega.as_alias().unwrap().is_terminal());

        let value = env.parse("v = x").unwrap();
        assert_eq!(value.as_alias().unwrap().arity(), None);
    }

    #[test]
    fn test_inference_budget_applies() {
        let options = InferOptions {
            max_args: 1,
            ..InferOptions::default()
        };
        let mut env = Environment::with_options(options);
        let expr = env.parse("T = C I").unwrap();
        assert!(!expr.as_alias().unwrap().is_terminal());
    }

    #[test]
    fn test_redefinition_outdates_previous() {
        let mut env = Environment::new();
        let first = env.parse("a = K").unwrap();
        let user = env.parse("b = a I").unwrap();
        let second = env.parse("a = S").unwrap();

        assert!(first.as_alias().unwrap().is_outdated());
        assert!(!second.as_alias().unwrap().is_outdated());
        assert_eq!(env.get("a").unwrap().to_string(), "a");
        // 旧绑定按内容打印
        assert_eq!(user.as_alias().unwrap().target().to_string(), "KI");
    }

    #[test]
    fn test_invalid_name() {
        let mut env = Environment::new();
        let err = env.define("Foo", Expr::numeral(1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidName {
                name: "Foo".to_string()
            }
        );
        assert!(!env.contains("Foo"));
    }
}

#[cfg(test)]
mod declare_tests {
    use super::*;

    #[test]
    fn test_declare_in_definition_order() {
        let mut env = Environment::new();
        env.parse("T = C I; v = T x").unwrap();
        assert_eq!(env.declare(), vec!["T=CI", "v=T x"]);
    }

    #[test]
    fn test_declare_without_definitions() {
        assert!(Environment::new().declare().is_empty());
    }

    #[test]
    fn test_declare_puts_dependencies_first() {
        let mut env = Environment::new();
        env.parse("a = K; b = a I; a = b S").unwrap();
        // a 保留原来的位置，但新的 a 依赖 b
        assert_eq!(env.declare(), vec!["b=KI", "a=b S"]);
    }

    #[test]
    fn test_declare_reparses_to_equal_table() {
        let mut env = Environment::new();
        env.parse("a = K; b = a I; a = b S; twice = f->x->f(f x)").unwrap();
        let source = env.declare().join(";");

        let mut copy = Environment::new();
        copy.parse(&source).unwrap();
        for name in ["a", "b", "twice"] {
            let original = env.get(name).unwrap();
            let restored = copy.get(name).unwrap();
            assert!(
                original.equals(restored),
                "{}: {:?}",
                name,
                original.diff(restored)
            );
        }
    }
}
