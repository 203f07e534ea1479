//! Tests for discounted sums, returns and episode masks.
//!
//! Expected values are worked out by hand from the closed forms in each
//! function's documentation.

use super::*;
use crate::error::UtilsError;
use burn::backend::NdArray;
use burn::tensor::{Int, Tensor};

type TestBackend = NdArray<f32>;

fn device() -> <TestBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}

fn batch(rows: &[&[f32]]) -> Tensor<TestBackend, 2> {
    let cols = rows[0].len();
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Tensor::<TestBackend, 1>::from_floats(flat.as_slice(), &device()).reshape([rows.len(), cols])
}

fn vector(values: &[f32]) -> Tensor<TestBackend, 1> {
    Tensor::<TestBackend, 1>::from_floats(values, &device())
}

fn read<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
    t.into_data().to_vec::<f32>().unwrap()
}

fn assert_close(got: &[f32], want: &[f32]) {
    assert_eq!(got.len(), want.len(), "length mismatch: {:?} vs {:?}", got, want);
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        assert!((g - w).abs() < 1e-4, "index {}: expected {}, got {}", i, w, g);
    }
}

// ============================================================================
// discounted_future_sum
// ============================================================================

mod discounted_future_sum_tests {
    use super::*;

    #[test]
    fn matches_documented_example() {
        let out = discounted_future_sum(batch(&[&[5.0, 6.0, 7.0]]), 0.9, 3).unwrap();
        assert_close(&read(out), &[5.0 + 6.0 * 0.9 + 7.0 * 0.81, 6.0 + 7.0 * 0.9, 7.0]);
    }

    #[test]
    fn window_shorter_than_sequence() {
        let out = discounted_future_sum(batch(&[&[1.0, 2.0, 3.0, 4.0]]), 0.5, 2).unwrap();
        assert_close(&read(out), &[2.0, 3.5, 5.0, 4.0]);
    }

    #[test]
    fn window_longer_than_sequence_is_clamped() {
        let values = [5.0, 6.0, 7.0];
        let full = read(discounted_future_sum(batch(&[&values]), 0.9, 3).unwrap());
        let long = read(discounted_future_sum(batch(&[&values]), 0.9, 100).unwrap());
        assert_close(&long, &full);
    }

    #[test]
    fn single_step_is_identity() {
        let out = discounted_future_sum(batch(&[&[1.0, -2.0], &[3.0, 4.0]]), 0.99, 1).unwrap();
        assert_close(&read(out), &[1.0, -2.0, 3.0, 4.0]);
    }

    #[test]
    fn matches_geometric_series_for_constant_rewards() {
        let gamma = 0.8f32;
        let total = 4;
        let out = read(discounted_future_sum(batch(&[&[1.0; 4]]), gamma, total).unwrap());

        let expected: Vec<f32> = (0..total)
            .map(|j| (1.0 - gamma.powi((total - j) as i32)) / (1.0 - gamma))
            .collect();
        assert_close(&out, &expected);
    }

    #[test]
    fn rows_are_independent() {
        let out = discounted_future_sum(batch(&[&[1.0, 0.0], &[0.0, 1.0]]), 0.5, 2).unwrap();
        assert_close(&read(out), &[1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn zero_steps_rejected() {
        assert!(matches!(
            discounted_future_sum(batch(&[&[1.0]]), 0.9, 0),
            Err(UtilsError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn masked_zeroes_values_after_episode_end() {
        let values = batch(&[&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]]);
        let out = discounted_future_sum_masked(values, 0.5, 3, &[2, 3]).unwrap();
        assert_close(&read(out), &[1.5, 1.0, 0.0, 1.75, 1.5, 1.0]);
    }

    #[test]
    fn masked_rejects_wrong_length_count() {
        let values = batch(&[&[1.0, 1.0], &[1.0, 1.0]]);
        assert!(discounted_future_sum_masked(values, 0.5, 2, &[1]).is_err());
    }
}

// ============================================================================
// shift_values
// ============================================================================

mod shift_values_tests {
    use super::*;

    #[test]
    fn shifts_and_pads_with_discounted_final_values() {
        let out = shift_values(batch(&[&[1.0, 2.0, 3.0, 4.0]]), 0.5, 2, Some(vector(&[10.0]))).unwrap();
        assert_close(&read(out), &[0.75, 1.0, 2.5, 5.0]);
    }

    #[test]
    fn defaults_final_values_to_zero() {
        let out = shift_values(batch(&[&[1.0, 2.0, 3.0]]), 1.0, 1, None).unwrap();
        assert_close(&read(out), &[2.0, 3.0, 0.0]);
    }

    #[test]
    fn shift_beyond_sequence_uses_only_final_values() {
        let out = shift_values(batch(&[&[1.0, 2.0]]), 0.5, 5, Some(vector(&[4.0]))).unwrap();
        assert_close(&read(out), &[1.0, 2.0]);
    }

    #[test]
    fn zero_shift_is_identity() {
        let out = shift_values(batch(&[&[1.0, 2.0]]), 0.5, 0, None).unwrap();
        assert_close(&read(out), &[1.0, 2.0]);
    }

    #[test]
    fn rejects_final_values_of_wrong_length() {
        let result = shift_values(batch(&[&[1.0, 2.0]]), 0.5, 1, Some(vector(&[1.0, 2.0])));
        assert!(matches!(result, Err(UtilsError::ShapeMismatch { .. })));
    }
}

// ============================================================================
// compute_returns
// ============================================================================

mod compute_returns_tests {
    use super::*;

    #[test]
    fn zero_discount_stops_accumulation() {
        let rewards = vector(&[1.0, 1.0, 1.0, 1.0]);
        let discounts = vector(&[0.9, 0.9, 0.0, 0.9]);
        let out = compute_returns(rewards, discounts).unwrap();
        assert_close(&read(out), &[2.71, 1.9, 1.0, 1.0]);
    }

    #[test]
    fn matches_discounted_future_sum_without_terminals() {
        let rewards = [5.0, 6.0, 7.0];
        let out = compute_returns(vector(&rewards), vector(&[0.9, 0.9, 0.9])).unwrap();
        let expected = discounted_future_sum(batch(&[&rewards]), 0.9, 3).unwrap();
        assert_close(&read(out), &read(expected));
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(compute_returns(vector(&[1.0, 2.0]), vector(&[1.0])).is_err());
    }

    #[test]
    fn batched_matches_per_row() {
        let rewards = batch(&[&[1.0, 1.0, 1.0, 1.0], &[0.0, 0.0, 0.0, 2.0]]);
        let discounts = batch(&[&[0.9, 0.9, 0.0, 0.9], &[0.5, 0.5, 0.5, 0.5]]);
        let out = compute_returns_batched(rewards, discounts).unwrap();
        assert_close(&read(out), &[2.71, 1.9, 1.0, 1.0, 0.25, 0.5, 1.0, 2.0]);
    }

    #[test]
    fn batched_rejects_shape_mismatch() {
        let rewards = batch(&[&[1.0, 1.0]]);
        let discounts = batch(&[&[1.0], &[1.0]]);
        assert!(compute_returns_batched(rewards, discounts).is_err());
    }
}

// ============================================================================
// Masks
// ============================================================================

mod mask_tests {
    use super::*;

    #[test]
    fn episode_mask_zeroes_last_steps() {
        let steps = StepType::to_tensor::<TestBackend>(
            &[
                StepType::First,
                StepType::Mid,
                StepType::Last,
                StepType::First,
                StepType::Last,
            ],
            &device(),
        );
        assert_close(&read(episode_mask(steps)), &[1.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn episode_mask_keeps_shape() {
        let steps = Tensor::<TestBackend, 1, Int>::from_ints([0, 2, 1, 2], &device()).reshape([2, 2]);
        let mask = episode_mask(steps);
        assert_eq!(mask.dims(), [2, 2]);
        assert_close(&read(mask), &[1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn contiguous_sub_episodes_stop_after_first_end() {
        let discounts = batch(&[
            &[1.0, 1.0, 0.0, 1.0, 1.0],
            &[1.0, 1.0, 1.0, 1.0, 1.0],
            &[0.0, 1.0, 1.0, 1.0, 1.0],
        ]);
        let mask = contiguous_sub_episodes(discounts).unwrap();
        assert_close(
            &read(mask),
            &[
                1.0, 1.0, 1.0, 0.0, 0.0, //
                1.0, 1.0, 1.0, 1.0, 1.0, //
                1.0, 0.0, 0.0, 0.0, 0.0,
            ],
        );
    }

    #[test]
    fn step_type_encoding() {
        assert_eq!(StepType::First.as_int(), 0);
        assert_eq!(StepType::Mid.as_int(), 1);
        assert_eq!(StepType::Last.as_int(), 2);
    }
}

// ============================================================================
// Property tests
// ============================================================================

mod proptest_returns {
    use super::*;
    use proptest::prelude::*;

    /// Row-major `[batch, steps]` values with their shape.
    fn value_batch() -> impl Strategy<Value = (usize, usize, Vec<f32>)> {
        (1usize..4, 1usize..10).prop_flat_map(|(batch_size, steps)| {
            (
                Just(batch_size),
                Just(steps),
                prop::collection::vec(-10.0f32..10.0, batch_size * steps),
            )
        })
    }

    fn tensor2(values: &[f32], batch_size: usize, steps: usize) -> Tensor<TestBackend, 2> {
        Tensor::<TestBackend, 1>::from_floats(values, &device()).reshape([batch_size, steps])
    }

    fn naive_discounted_sum(values: &[f32], steps: usize, gamma: f32, num_steps: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; values.len()];
        for (row_in, row_out) in values.chunks(steps).zip(out.chunks_mut(steps)) {
            for j in 0..steps {
                let mut discount = 1.0f32;
                for k in 0..num_steps {
                    if j + k >= steps {
                        break;
                    }
                    row_out[j] += discount * row_in[j + k];
                    discount *= gamma;
                }
            }
        }
        out
    }

    fn close(got: &[f32], want: &[f32]) -> bool {
        got.len() == want.len()
            && got
                .iter()
                .zip(want)
                .all(|(g, w)| (g - w).abs() <= 1e-3 * (1.0 + w.abs()))
    }

    proptest! {
        /// Property: discounted_future_sum agrees with a direct double loop.
        #[test]
        fn test_discounted_future_sum_matches_naive(
            (batch_size, steps, values, num_steps) in value_batch().prop_flat_map(|(b, t, v)| {
                (Just(b), Just(t), Just(v), 1usize..=t + 2)
            }),
            gamma in 0.0f32..=1.0,
        ) {
            let out = discounted_future_sum(tensor2(&values, batch_size, steps), gamma, num_steps).unwrap();
            let got = read(out);
            let want = naive_discounted_sum(&values, steps, gamma, num_steps);
            prop_assert!(close(&got, &want), "got {:?}, want {:?}", got, want);
        }

        /// Property: compute_returns follows R_t = r_t + d_t * R_{t+1}.
        #[test]
        fn test_compute_returns_matches_recurrence(
            (rewards, discounts) in (1usize..30).prop_flat_map(|n| (
                prop::collection::vec(-10.0f32..10.0, n),
                prop::collection::vec(0.0f32..=1.0, n),
            )),
        ) {
            let got = read(compute_returns(vector(&rewards), vector(&discounts)).unwrap());

            let mut want = vec![0.0f32; rewards.len()];
            let mut next = 0.0f32;
            for t in (0..rewards.len()).rev() {
                next = rewards[t] + discounts[t] * next;
                want[t] = next;
            }
            prop_assert!(close(&got, &want), "got {:?}, want {:?}", got, want);
        }

        /// Property: every mask row is a run of ones followed by zeros, with at least one 1.
        #[test]
        fn test_contiguous_sub_episodes_shape(
            (batch_size, steps, discounts) in (1usize..4, 1usize..10).prop_flat_map(|(b, t)| (
                Just(b),
                Just(t),
                prop::collection::vec(prop::sample::select(vec![0.0f32, 0.5, 1.0]), b * t),
            )),
        ) {
            let mask = read(contiguous_sub_episodes(tensor2(&discounts, batch_size, steps)).unwrap());

            for (row, discount_row) in mask.chunks(steps).zip(discounts.chunks(steps)) {
                prop_assert_eq!(row[0], 1.0);
                let ones = row.iter().take_while(|&&m| m == 1.0).count();
                prop_assert!(row[ones..].iter().all(|&m| m == 0.0), "row {:?}", row);

                // Ones run up to and including the first episode end.
                let expected_ones = discount_row
                    .iter()
                    .position(|&d| d == 0.0)
                    .map_or(steps, |end| end + 1);
                prop_assert_eq!(ones, expected_ones);
            }
        }
    }
}
