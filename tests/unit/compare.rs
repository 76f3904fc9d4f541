use super::*;
use crate::expression::ast::ExprKind;

#[test]
fn tokens_round_trip_through_compare_op() {
    for token in ["<", "<=", ">", ">="] {
        let op: CompareOp = token.parse().unwrap();
        assert_eq!(op.token(), token);
        assert_eq!(op.to_string(), token);
    }
}

#[test]
fn unknown_tokens_are_not_supported() {
    for token in ["==", "", "=<", "!="] {
        let err = CompareOp::from_token(token).unwrap_err();
        assert!(matches!(err, ExprKitError::NotSupported(_)), "{token}");
    }
    assert!(err_is_not_supported(evaluate_comparison(3, 5, "==")));
}

fn err_is_not_supported(r: ExprKitResult<bool>) -> bool {
    matches!(r, Err(ExprKitError::NotSupported(_)))
}

#[test]
fn evaluates_the_four_orderings() {
    assert!(evaluate_comparison(3, 5, "<").unwrap());
    assert!(evaluate_comparison(5, 5, "<=").unwrap());
    assert!(evaluate_comparison(5, 3, ">").unwrap());
    assert!(evaluate_comparison(5, 3, ">=").unwrap());
    assert!(!evaluate_comparison(5, 3, "<").unwrap());
    assert!(evaluate_comparison("apple", "banana", "<").unwrap());
    assert!(evaluate_comparison(1.5, 2.5, "<").unwrap());
}

#[test]
fn nan_operands_compare_false() {
    for token in ["<", "<=", ">", ">="] {
        assert!(!evaluate_comparison(f64::NAN, 1.0, token).unwrap(), "{token}");
        assert!(!evaluate_comparison(1.0, f64::NAN, token).unwrap(), "{token}");
    }
    let cache = ComparatorCache::new();
    assert!(!cache.evaluate(f64::NAN, f64::NAN, "<=").unwrap());
}

#[test]
fn operand_types_follow_the_left_side() {
    let err = evaluate_comparison(3, "x", "<").unwrap_err();
    assert!(matches!(err, ExprKitError::Evaluation(_)));
}

#[test]
fn built_comparison_binds_two_fresh_parameters() {
    let l = build_comparison(ValueType::Int, CompareOp::Ge);
    assert_eq!(l.arity(), 2);
    let ExprKind::Binary { op, left, right } = l.body().kind() else {
        panic!("expected binary body");
    };
    assert_eq!(*op, BinaryOp::Ge);
    assert!(left.ptr_eq(&l.params()[0]));
    assert!(right.ptr_eq(&l.params()[1]));
    assert_eq!(l.to_string(), "(a: int, b: int) => (a >= b)");
}

#[test]
fn cache_compiles_each_pair_once() {
    let cache = ComparatorCache::new();
    assert!(cache.is_empty());

    assert!(cache.evaluate(3, 5, "<").unwrap());
    assert!(!cache.evaluate(7, 5, "<").unwrap());
    assert_eq!(cache.len(), 1);

    let first = cache.comparator(ValueType::Int, CompareOp::Lt).unwrap();
    let second = cache.comparator(ValueType::Int, CompareOp::Lt).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    assert!(cache.evaluate(2.0, 1.0, ">").unwrap());
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn cache_agrees_with_uncached_path() {
    let cache = ComparatorCache::with_opts(CompileOpts::default());
    for (a, b) in [(1, 2), (2, 2), (3, 2)] {
        for op in ["<", "<=", ">", ">="] {
            assert_eq!(
                cache.evaluate(a, b, op).unwrap(),
                evaluate_comparison(a, b, op).unwrap()
            );
        }
    }
    assert!(matches!(
        cache.evaluate(1, 2, "==").unwrap_err(),
        ExprKitError::NotSupported(_)
    ));
}

#[test]
fn cache_is_shareable_across_threads() {
    let cache = Arc::new(ComparatorCache::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || cache.evaluate(i, 2, "<").unwrap())
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, true, false, false]);
    assert_eq!(cache.len(), 1);
}
