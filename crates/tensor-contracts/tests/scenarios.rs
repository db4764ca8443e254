//! Whole-call scenarios: named dims, ranks, groups, named tensors and
//! return values.

mod common;

use common::{assert_fails, assert_mismatch, bindings, check, t};
use tensor_contracts::{CheckError, DType, Layout, Tensor};

#[test]
fn named_dims_agree_across_arguments() {
    let x = t(&[2, 3]);
    let y = t(&[2, 4]);
    let table = bindings(&[("x", "batch, c1", &x), ("y", "batch, c2", &y)]).unwrap();
    assert_eq!(table.size("batch"), Some(2));

    let y = t(&[3, 4]);
    let err = bindings(&[("x", "batch, c1", &x), ("y", "batch, c2", &y)]).unwrap_err();
    assert_eq!(
        err,
        CheckError::InconsistentSize {
            name: "batch".into(),
            bound: 2,
            found: 3,
        }
    );
}

#[test]
fn surplus_axes_are_rejected() {
    assert_mismatch(check(&[("x", "3, 4", &t(&[3, 4, 5]))], None));
    assert!(check(&[("x", "3, 4", &t(&[3, 4]))], None).is_ok());
}

#[test]
fn group_then_fixed_trailing_dims() {
    let spec = "batch: ..., 2, channels";
    let table = bindings(&[("x", spec, &t(&[1, 4, 2, 3]))]).unwrap();
    assert_eq!(table.group("batch"), Some(&[1, 4][..]));
    assert_eq!(table.size("channels"), Some(3));

    // an empty group is allowed
    let table = bindings(&[("x", spec, &t(&[2, 3]))]).unwrap();
    assert_eq!(table.group("batch"), Some(&[][..]));

    let err = bindings(&[("x", spec, &t(&[3]))]).unwrap_err();
    assert!(matches!(err, CheckError::Rank { rank: 1, required: 2, .. }));

    assert_mismatch(check(&[("x", spec, &t(&[1, 4, 5, 3]))], None));
}

#[test]
fn named_tensor_mode() {
    let named = Tensor::new([2, 3]).with_names([Some("a"), Some("b")]);
    let half = Tensor::new([2, 3]).with_names([None, Some("b")]);

    assert!(check(&[("x", "NamedTensorType[a, b]", &named)], None).is_ok());
    assert_mismatch(check(&[("x", "NamedTensorType[a, b]", &half)], None));

    assert!(check(&[("x", "a, b", &named)], None).is_ok());
    assert!(check(&[("x", "a, b", &half)], None).is_ok());
    assert_mismatch(check(&[("x", "a, 4", &half)], None));
}

#[test]
fn named_detail_flag_enables_name_checking() {
    let half = Tensor::new([2, 3]).with_names([None, Some("b")]);
    assert_mismatch(check(&[("x", "a, b, named_detail", &half)], None));
}

#[test]
fn return_reuses_argument_bindings() {
    let x = t(&[5]);
    assert!(check(&[("x", "n", &x)], Some(("n", &t(&[5])))).is_ok());
    let err = check(&[("x", "n", &x)], Some(("n", &t(&[4])))).unwrap_err();
    assert!(matches!(
        err,
        CheckError::InconsistentSize { ref name, bound: 5, found: 4 } if name == "n"
    ));
}

#[test]
fn fixed_int_dims() {
    let x = t(&[3]);
    assert!(check(&[("x", "3", &x)], None).is_ok());
    for spec in ["3, -1", "4", "4, -1", "-1, 4", "-1, -1", "3, 4", "3, 4, -1", "-1, 4, -1"] {
        assert_fails(check(&[("x", spec, &x)], None));
    }

    let x = t(&[3, 4]);
    for spec in ["3, -1", "-1, 4", "-1, -1", "3, 4"] {
        assert!(check(&[("x", spec, &x)], None).is_ok(), "{spec}");
    }
    for spec in ["3", "4", "4, -1", "3, 4, -1", "-1, 4, -1"] {
        assert_fails(check(&[("x", spec, &x)], None));
    }
}

#[test]
fn str_dims() {
    let x = t(&[3, 4]);
    for spec in ["a, b", "c, b", "a, -1", "-1, b"] {
        assert!(check(&[("x", spec, &x)], None).is_ok(), "{spec}");
    }
    for spec in ["a", "a, b, c", "a, b, -1", "-1, b, -1"] {
        assert_fails(check(&[("x", spec, &x)], None));
    }
}

#[test]
fn named_exact_dims() {
    let x = t(&[3, 4]);
    for spec in ["a: 3, b: 4", "a: 3, b: -1", "a: -1, b: 4", "a: 3, b", "a, b: 4"] {
        assert!(check(&[("x", spec, &x)], None).is_ok(), "{spec}");
    }
    for spec in ["a: 5, b: 4", "a: 5, b: -1", "-1, b: 4, -1"] {
        assert_fails(check(&[("x", spec, &x)], None));
    }
}

#[test]
fn repeated_name_within_one_argument() {
    assert!(check(&[("x", "a, a", &t(&[3, 3]))], None).is_ok());
    assert_fails(check(&[("x", "a, a", &t(&[3, 4]))], None));
}

#[test]
fn indirect_size_refers_to_another_symbol() {
    let x = t(&[4]);
    let y = t(&[4, 2]);
    assert!(check(&[("x", "n", &x), ("y", "m: n, 2", &y)], None).is_ok());
    assert_fails(check(&[("x", "n", &x), ("y", "m: n, 2", &t(&[5, 2]))], None));
}

#[test]
fn dtype_and_layout_details() {
    let ints = Tensor::new([3]).with_dtype(DType::I64);
    assert!(check(&[("x", "3, int", &ints)], None).is_ok());
    assert_mismatch(check(&[("x", "3, float", &ints)], None));

    let sparse = Tensor::new([3]).with_layout(Layout::SparseCoo);
    assert!(check(&[("x", "sparse_coo", &sparse)], None).is_ok());
    assert_mismatch(check(&[("x", "strided", &sparse)], None));
}

#[test]
fn float_tensor_type() {
    let ints = Tensor::new([3]).with_dtype(DType::I32);
    let err = check(&[("x", "FloatTensorType[3]", &ints)], None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "x must be of type FloatTensorType[(3,), float_detail], \
         got type FloatTensorType[(3,)] instead."
    );
    assert!(check(&[("x", "FloatTensorType[3]", &t(&[3]))], None).is_ok());
}

#[test]
fn zero_dim_tensor() {
    assert!(check(&[("x", "()", &t(&[]))], None).is_ok());
    assert_mismatch(check(&[("x", "()", &t(&[1]))], None));
    assert!(check(&[("x", "...", &t(&[]))], None).is_ok());
}

#[test]
fn unsupported_spec_is_reported_at_check_time() {
    let err = check(&[("x", "3, ...", &t(&[3]))], None).unwrap_err();
    assert!(matches!(err, CheckError::Specification(ref e) if e.is_unsupported()));
}

mod ellipsis {
    use super::*;

    #[test]
    fn basic() {
        let x = "dim1: ..., dim2, dim3";
        let y = "dim2, dim3";
        for (a, b) in [
            (vec![2, 2], vec![2, 2]),
            (vec![2, 3], vec![2, 3]),
            (vec![1, 4, 2, 3], vec![2, 3]),
            (vec![2, 3, 2, 3], vec![2, 3]),
        ] {
            assert!(check(&[("x", x, &t(&a)), ("y", y, &t(&b))], None).is_ok());
        }
        for (a, b) in [
            (vec![2, 3], vec![3, 2]),
            (vec![1, 4, 2, 3], vec![3, 2]),
            (vec![2, 3, 2, 3], vec![3, 2]),
        ] {
            assert_fails(check(&[("x", x, &t(&a)), ("y", y, &t(&b))], None));
        }
    }

    #[test]
    fn zero_size_groups() {
        let spec = "dim1: ..., dim2, dim3";
        for (a, b) in [
            (vec![2, 2], vec![2, 2, 2]),
            (vec![2, 2, 2], vec![2, 2]),
            (vec![2, 3], vec![2, 2, 3]),
            (vec![2, 2, 3], vec![2, 3]),
        ] {
            assert_fails(check(&[("x", spec, &t(&a)), ("y", spec, &t(&b))], None));
        }
    }

    #[test]
    fn multiple_groups() {
        let x = "dim1: ..., dim2: ...";
        let y = "dim2: ...";
        let ret = "dim1: ...";
        let call = |a: &[usize], b: &[usize], r: &[usize]| {
            check(&[("x", x, &t(a)), ("y", y, &t(b))], Some((ret, &t(r))))
        };
        assert!(call(&[1, 2], &[2], &[1]).is_ok());
        assert!(call(&[3, 4, 5, 9], &[5, 9], &[3, 4]).is_ok());
        assert!(call(&[3, 4, 11, 5, 9], &[5, 9], &[3, 4, 11]).is_ok());
        assert!(call(&[3, 4, 11, 5, 9], &[11, 5, 9], &[3, 4]).is_ok());
        assert_fails(call(&[1], &[2], &[]));
        assert_fails(call(&[1, 3, 5], &[3], &[1, 3]));
        assert_fails(call(&[1, 4], &[1, 1, 4], &[]));
    }

    #[test]
    fn multiple_groups_argument_order_does_not_matter() {
        let err = check(
            &[
                ("x", "dim2: ...", &t(&[1, 1, 4])),
                ("y", "dim1: ..., dim2: ...", &t(&[1, 4])),
            ],
            None,
        );
        assert_fails(err);
    }

    #[test]
    fn three_groups() {
        let args = |a: &[usize], b: &[usize], c: &[usize]| {
            bindings(&[
                ("x", "dim1: ..., dim2: ..., dim3: ...", &t(a)),
                ("y", "dim2: ..., dim3: ...", &t(b)),
                ("z", "dim2: ...", &t(c)),
            ])
        };
        let table = args(&[1, 2, 3], &[2, 3], &[2]).unwrap();
        assert_eq!(table.group("dim1"), Some(&[1][..]));
        assert_eq!(table.group("dim3"), Some(&[3][..]));

        let table = args(&[3, 5, 6, 7, 8, 0], &[5, 6, 7, 8, 0], &[5, 6, 7]).unwrap();
        assert_eq!(table.group("dim3"), Some(&[8, 0][..]));
        assert!(args(&[3, 5, 6, 7, 8, 9], &[5, 6, 7, 8, 9], &[5, 6, 7]).is_ok());
    }

    #[test]
    fn repeated_group() {
        let call = |a: &[usize], b: &[usize]| {
            check(&[("x", "dim1: ..., dim1: ...", &t(a)), ("y", "dim1: ...", &t(b))], None)
        };
        assert!(call(&[3, 4, 3, 4], &[3, 4]).is_ok());
        assert!(call(&[5, 5], &[5]).is_ok());
        for (a, b) in [
            (vec![7, 9], vec![7]),
            (vec![7, 4, 9, 4], vec![7, 4]),
            (vec![7, 9], vec![9]),
            (vec![3, 7, 3, 9], vec![3, 9]),
            (vec![7, 3, 3, 9], vec![3, 9]),
            (vec![7, 7], vec![3]),
        ] {
            assert_fails(call(&a, &b));
        }
    }

    #[test]
    fn repeated_group_pinned_through_a_chain() {
        let call = |a: &[usize], b: &[usize], c: &[usize]| {
            check(
                &[
                    ("x", "dim1: ..., dim1: ...", &t(a)),
                    ("y", "dim1: ..., dim2: ...", &t(b)),
                    ("z", "dim2: ...", &t(c)),
                ],
                None,
            )
        };
        assert!(call(&[4, 4], &[4, 5], &[5]).is_ok());
        assert!(call(&[3, 4, 3, 4], &[3, 4, 5], &[5]).is_ok());
        assert!(call(&[2, 3, 4, 2, 3, 4], &[2, 3, 4, 5, 6], &[5, 6]).is_ok());
        assert_fails(call(&[2, 3, 4, 2, 3], &[2, 3, 4, 5, 6], &[5, 6]));
        assert_fails(call(&[2, 3, 4, 2, 3], &[2, 3, 4, 6], &[3, 4]));
    }

    #[test]
    fn ambiguous() {
        let err = check(&[("x", "dim1: ..., dim2: ...", &t(&[2, 2]))], None).unwrap_err();
        assert!(matches!(err, CheckError::Ambiguous { ref argnames } if argnames == &["x"]));
        let err = check(&[("x", "dim1: ..., dim1: ...", &t(&[2, 2]))], None).unwrap_err();
        assert!(matches!(err, CheckError::Ambiguous { .. }));
    }

    #[test]
    fn star_shorthand() {
        let table = bindings(&[("x", "*batch, n", &t(&[2, 3, 4]))]).unwrap();
        assert_eq!(table.group("batch"), Some(&[2, 3][..]));
    }

    #[test]
    fn anonymous_group_with_named_group() {
        let call = |a: &[usize], b: &[usize]| {
            check(&[("x", "..., g: ..., 3", &t(a)), ("y", "g: ...", &t(b))], None)
        };
        assert!(call(&[9, 9, 4, 3], &[4]).is_ok());
        assert!(call(&[4, 3], &[4]).is_ok());
        assert_fails(call(&[9, 5, 3], &[4]));
    }

    #[test]
    fn size_and_group_share_names() {
        let err = check(&[("x", "n", &t(&[3])), ("y", "n: ...", &t(&[3]))], None).unwrap_err();
        assert_eq!(err, CheckError::InconsistentSymbolKind { name: "n".into() });
    }
}

mod tensor_like {
    use tensor_contracts::{
        ArgValue, CallGuard, CheckError, DType, Inspect, Layout, Tensor, TensorLike,
    };

    use super::common::assert_fails;

    /// A tensor that is not a [`Tensor`], with a layout of its own.
    #[derive(Debug)]
    struct Pooled {
        shape: Vec<usize>,
        dtype: DType,
    }

    impl Pooled {
        fn new(shape: &[usize]) -> Self {
            Self {
                shape: shape.to_vec(),
                dtype: DType::F32,
            }
        }

        /// Adds `other` and averages over the last axis.
        fn add_mean(&self, _other: &Tensor) -> Pooled {
            Pooled::new(&self.shape[..self.shape.len().saturating_sub(1)])
        }
    }

    impl TensorLike for Pooled {
        fn shape(&self) -> &[usize] {
            &self.shape
        }

        fn dtype(&self) -> DType {
            self.dtype
        }

        fn layout(&self) -> Layout {
            Layout::SparseCsr
        }

        fn is_floating_point(&self) -> bool {
            self.dtype == DType::F32
        }
    }

    impl Inspect for Pooled {
        fn inspect(&self) -> ArgValue<'_> {
            ArgValue::Tensor(self)
        }
    }

    fn pooled_add(x: &Pooled, y: &Tensor, returns: &str) -> Result<Pooled, CheckError> {
        let mut guard = CallGuard::always("pooled_add");
        guard.check_arguments(&[("x", "x, y", x.inspect()), ("y", "x, y", y.inspect())])?;
        let out = x.add_mean(y);
        guard.check_return(returns, out.inspect())?;
        Ok(out)
    }

    #[test]
    fn custom_tensor_like_shares_bindings_with_tensors() {
        let x = Pooled::new(&[2, 3]);
        let out = pooled_add(&x, &Tensor::new([2, 3]), "x").unwrap();
        assert_eq!(out.shape(), [2]);

        let err = pooled_add(&x, &Tensor::new([2, 4]), "x").unwrap_err();
        assert!(matches!(err, CheckError::InconsistentSize { ref name, .. } if name == "y"));
    }

    #[test]
    fn custom_tensor_like_failures() {
        let x = Pooled::new(&[2, 3]);
        // wrong rank for x
        assert_fails(pooled_add(&Pooled::new(&[1]), &Tensor::new([2, 3]), "x").map(|_| ()));
        // wrong rank for y
        assert_fails(pooled_add(&x, &Tensor::new([1]), "x").map(|_| ()));
        // return declared with one axis too many
        assert_fails(pooled_add(&x, &Tensor::new([2, 3]), "x, y").map(|_| ()));
    }

    #[test]
    fn custom_layout_is_checked() {
        let x = Pooled::new(&[2, 3]);
        let mut guard = CallGuard::always("layout");
        assert!(guard.check_arguments(&[("x", "x, y, sparse_csr", x.inspect())]).is_ok());
        let mut guard = CallGuard::always("layout");
        let err = guard
            .check_arguments(&[("x", "x, y, strided", x.inspect())])
            .unwrap_err();
        assert!(matches!(err, CheckError::TypeMismatch { ref argname, .. } if argname == "x"));
        assert!(err.to_string().contains("sparse_csr"), "{err}");
    }
}
