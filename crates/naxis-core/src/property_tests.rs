//! Property-based tests for named-shape operations
//!
//! This module uses proptest to check broadcasting, shape operations and
//! interpolation across randomly generated named shapes and data.

#[cfg(test)]
mod tests {
    use crate::{
        broadcast_shapes, Array, HasShape, Interpolate, LinearSpace, Materialize, NamedShape,
        ScalarArray,
    };
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    const NAMES: [&str; 4] = ["a", "b", "c", "d"];

    // Two broadcast-compatible shapes over a common pool of axis names. The
    // second lists its axes in reverse order and may shrink shared axes to 1.
    fn shape_pair_strategy() -> impl Strategy<Value = (NamedShape, NamedShape)> {
        (
            prop::collection::vec(1usize..5, 4),
            prop::collection::vec(any::<bool>(), 4),
            prop::collection::vec(any::<bool>(), 4),
            prop::collection::vec(any::<bool>(), 4),
        )
            .prop_map(|(sizes, in_a, in_b, ones)| {
                let a = NamedShape::from_pairs(
                    (0..4).filter(|&i| in_a[i]).map(|i| (NAMES[i], sizes[i])),
                )
                .unwrap();
                let b = NamedShape::from_pairs(
                    (0..4)
                        .rev()
                        .filter(|&i| in_b[i])
                        .map(|i| (NAMES[i], if ones[i] { 1 } else { sizes[i] })),
                )
                .unwrap();
                (a, b)
            })
    }

    fn shape_strategy() -> impl Strategy<Value = NamedShape> {
        prop::collection::vec(1usize..5, 1..=4).prop_map(|sizes| {
            NamedShape::from_pairs(sizes.iter().enumerate().map(|(i, &s)| (NAMES[i], s))).unwrap()
        })
    }

    fn sorted_pairs(shape: &NamedShape) -> Vec<(String, usize)> {
        let mut pairs: Vec<(String, usize)> =
            shape.iter().map(|(n, s)| (n.to_string(), s)).collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_proptest_smoke() {
        let shape = NamedShape::from_pairs([("a", 2), ("b", 3)]).unwrap();
        assert_eq!(ScalarArray::<f64>::zeros(&shape).size(), 6);
    }

    proptest! {
        #[test]
        fn prop_broadcast_sizes_commute((a, b) in shape_pair_strategy()) {
            let ab = broadcast_shapes(&[&a, &b]).unwrap();
            let ba = broadcast_shapes(&[&b, &a]).unwrap();
            prop_assert_eq!(sorted_pairs(&ab), sorted_pairs(&ba));
        }

        #[test]
        fn prop_broadcast_covers_every_axis((a, b) in shape_pair_strategy()) {
            let c = broadcast_shapes(&[&a, &b]).unwrap();
            for (name, size) in a.iter().chain(b.iter()) {
                let merged = c.get(name).unwrap();
                prop_assert!(merged == size || size == 1);
            }
            let names: std::collections::BTreeSet<String> =
                a.names().into_iter().chain(b.names()).collect();
            prop_assert_eq!(c.len(), names.len());
        }

        #[test]
        fn prop_broadcast_idempotent(shape in shape_strategy()) {
            prop_assert_eq!(broadcast_shapes(&[&shape, &shape]).unwrap(), shape);
        }

        #[test]
        fn prop_reshape_roundtrip(shape in shape_strategy()) {
            let n = shape.size();
            let array = ScalarArray::from_vec((0..n).map(|i| i as f64).collect(), &shape).unwrap();
            let flat_shape = NamedShape::from_pairs([("flat", n)]).unwrap();
            let flat = array.reshape(&flat_shape).unwrap();
            prop_assert_eq!(flat.shape(), flat_shape);

            let restored = flat.reshape(&shape).unwrap();
            prop_assert_eq!(restored.shape(), shape);
            prop_assert_eq!(restored.ndarray(), array.ndarray());
        }

        #[test]
        fn prop_transpose_twice_is_identity(shape in shape_strategy()) {
            let n = shape.size();
            let array = ScalarArray::from_vec((0..n).map(|i| i as f64).collect(), &shape).unwrap();
            let back = array.transpose(None).unwrap().transpose(None).unwrap();
            prop_assert_eq!(back.shape(), shape);
            prop_assert_eq!(back.ndarray(), array.ndarray());
        }

        #[test]
        fn prop_add_then_sub_restores_values((a, b) in shape_pair_strategy()) {
            let x = ScalarArray::full(&a, 1.5);
            let y = ScalarArray::full(&b, -0.25);
            let z = x.checked_add(&y).unwrap().checked_sub(&y).unwrap();
            prop_assert_eq!(z.shape(), broadcast_shapes(&[&a, &b]).unwrap());
            prop_assert!(z.ndarray().iter().all(|&v| v == 1.5));
        }

        #[test]
        fn prop_interp_exact_at_samples(
            values in prop::collection::vec(-100.0f64..100.0, 2..10),
            k in 0usize..10,
        ) {
            let k = k % values.len();
            let shape = NamedShape::from_pairs([("i", values.len())]).unwrap();
            let array = ScalarArray::from_vec(values.clone(), &shape).unwrap();
            let item = BTreeMap::from([("i".to_string(), Array::from(k as f64))]);
            let y = array.interp_linear(&item).unwrap().to_scalar().unwrap();
            prop_assert_eq!(y.item().unwrap(), values[k]);
        }

        #[test]
        fn prop_linear_space_endpoints(
            start in -10.0f64..10.0,
            stop in -10.0f64..10.0,
            num in 2usize..40,
        ) {
            let space = LinearSpace::new(start, stop, "t", num).unwrap();
            let values = space.explicit().unwrap();
            prop_assert_eq!(values.size(), num);
            prop_assert!((values.value_at(&[("t", 0)]).unwrap() - start).abs() < 1e-12);
            prop_assert!((values.value_at(&[("t", num - 1)]).unwrap() - stop).abs() < 1e-9);
        }
    }
}
