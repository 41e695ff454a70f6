use cnn_forward::ops::{
    argmax, average_pool, conv_forward_valid, fully_forward, fully_forward_par, fully_forward_seq,
    relu2, relu4, ExecutionMode,
};
use cnn_forward::tensor::Tensor;
use cnn_forward::Error;

const MODES: [ExecutionMode; 2] = [ExecutionMode::Sequential, ExecutionMode::Parallel];

// Straight transcription of the convolution sum, for comparison.
fn naive_conv(input: &Tensor, filter: &Tensor) -> Tensor {
    let x = input.dims4("naive").unwrap();
    let f = filter.dims4("naive").unwrap().as_filter();
    let (oh, ow) = (x.h - f.fh + 1, x.w - f.fw + 1);
    let mut out = Tensor::zeros(vec![x.n, oh, ow, f.cout]);
    for n in 0..x.n {
        for h in 0..oh {
            for w in 0..ow {
                for m in 0..f.cout {
                    let mut sum = 0.0;
                    for p in 0..f.fh {
                        for q in 0..f.fw {
                            for c in 0..f.cin {
                                sum += input[[n, h + p, w + q, c]] * filter[[p, q, c, m]];
                            }
                        }
                    }
                    out[[n, h, w, m]] = sum;
                }
            }
        }
    }
    out
}

#[test]
fn test_conv_literal_single_channel() {
    let input = Tensor::new((1..=9).map(|x| x as f32).collect(), vec![1, 3, 3, 1]);
    let filter = Tensor::new(vec![1.0, 0.0, 0.0, 1.0], vec![2, 2, 1, 1]);

    for mode in MODES {
        let out = conv_forward_valid(&input, &filter, mode).unwrap();
        assert_eq!(out.shape(), &[1, 2, 2, 1]);
        assert_eq!(out.data, vec![6.0, 8.0, 12.0, 14.0]);
    }
}

#[test]
fn test_conv_literal_multi_channel() {
    let input = Tensor::new(vec![2.0, 3.0], vec![1, 1, 1, 2]);
    let filter = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![1, 1, 2, 2]);

    let out = conv_forward_valid(&input, &filter, ExecutionMode::Sequential).unwrap();
    assert_eq!(out.shape(), &[1, 1, 1, 2]);
    assert_eq!(out.data, vec![11.0, 16.0]);
}

#[test]
fn test_conv_shape_law() {
    let cases = [
        ([2, 28, 28, 1], [5, 5, 1, 32]),
        ([3, 12, 12, 32], [5, 5, 32, 64]),
        ([1, 7, 9, 3], [3, 2, 3, 4]),
        ([1, 5, 5, 1], [5, 5, 1, 1]),
    ];
    for (x, f) in cases {
        let input = Tensor::zeros(x.to_vec());
        let filter = Tensor::zeros(f.to_vec());
        let out = conv_forward_valid(&input, &filter, ExecutionMode::Sequential).unwrap();
        assert_eq!(out.shape(), &[x[0], x[1] - f[0] + 1, x[2] - f[1] + 1, f[3]]);
    }
}

#[test]
fn test_conv_matches_formula() {
    let input = Tensor::random_range(vec![2, 9, 8, 3], -1.0, 1.0, 1);
    let filter = Tensor::random_range(vec![3, 4, 3, 5], -1.0, 1.0, 2);
    let expected = naive_conv(&input, &filter);

    for mode in MODES {
        let out = conv_forward_valid(&input, &filter, mode).unwrap();
        assert_eq!(out, expected);
    }
}

#[test]
fn test_conv_zero_input_gives_zero_output() {
    let input = Tensor::zeros(vec![2, 10, 10, 2]);
    let filter = Tensor::random(vec![3, 3, 2, 4], 9);

    let out = conv_forward_valid(&input, &filter, ExecutionMode::Parallel).unwrap();
    assert_eq!(out.shape(), &[2, 8, 8, 4]);
    assert!(out.data.iter().all(|&x| x == 0.0));
}

#[test]
fn test_conv_sequential_and_parallel_agree_bitwise() {
    let input = Tensor::random(vec![4, 12, 12, 2], 3);
    let filter = Tensor::random(vec![5, 5, 2, 6], 4);

    let seq = conv_forward_valid(&input, &filter, ExecutionMode::Sequential).unwrap();
    let par = conv_forward_valid(&input, &filter, ExecutionMode::Parallel).unwrap();
    assert_eq!(seq.data, par.data);
}

#[test]
fn test_conv_channel_mismatch() {
    let input = Tensor::zeros(vec![1, 8, 8, 3]);
    let filter = Tensor::zeros(vec![3, 3, 2, 4]);

    let err = conv_forward_valid(&input, &filter, ExecutionMode::Sequential).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { stage: "conv", .. }));
}

#[test]
fn test_conv_filter_larger_than_input() {
    let input = Tensor::zeros(vec![1, 4, 8, 1]);
    let filter = Tensor::zeros(vec![5, 5, 1, 1]);

    let err = conv_forward_valid(&input, &filter, ExecutionMode::Sequential).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn test_conv_rejects_wrong_rank() {
    let input = Tensor::zeros_2d(8, 8);
    let filter = Tensor::zeros(vec![3, 3, 1, 1]);
    assert!(conv_forward_valid(&input, &filter, ExecutionMode::Sequential).is_err());
}

#[test]
fn test_relu_values() {
    let mut tensor = Tensor::new(vec![-1.0, 0.0, 2.5, -0.1], vec![1, 2, 2, 1]);
    relu4(&mut tensor).unwrap();
    assert_eq!(tensor.data, vec![0.0, 0.0, 2.5, 0.0]);

    let mut matrix = Tensor::new_2d(vec![-3.0, 3.0], 1, 2);
    relu2(&mut matrix).unwrap();
    assert_eq!(matrix.data, vec![0.0, 3.0]);
}

#[test]
fn test_relu_is_idempotent() {
    let original = Tensor::random_range(vec![2, 5, 5, 3], -1.0, 1.0, 11);

    let mut once = original.clone();
    relu4(&mut once).unwrap();
    let mut twice = once.clone();
    relu4(&mut twice).unwrap();

    assert_eq!(once.data, twice.data);
    assert!(once.data.iter().all(|&x| x >= 0.0));
}

#[test]
fn test_relu_rank_checks() {
    let mut matrix = Tensor::zeros_2d(2, 2);
    assert!(relu4(&mut matrix).is_err());

    let mut volume = Tensor::zeros(vec![1, 2, 2, 1]);
    assert!(relu2(&mut volume).is_err());
}

#[test]
fn test_pool_literal() {
    let input = Tensor::new((0..16).map(|x| x as f32).collect(), vec![1, 4, 4, 1]);

    for mode in MODES {
        let out = average_pool(&input, 2, mode).unwrap();
        assert_eq!(out.shape(), &[1, 2, 2, 1]);
        assert_eq!(out.data, vec![2.5, 4.5, 10.5, 12.5]);
    }
}

#[test]
fn test_pool_keeps_channels_separate() {
    // channel 0 holds 1.0, channel 1 holds 3.0
    let data = (0..8).map(|i| if i % 2 == 0 { 1.0 } else { 3.0 }).collect();
    let input = Tensor::new(data, vec![1, 2, 2, 2]);

    let out = average_pool(&input, 2, ExecutionMode::Sequential).unwrap();
    assert_eq!(out.shape(), &[1, 1, 1, 2]);
    assert_eq!(out.data, vec![1.0, 3.0]);
}

#[test]
fn test_pool_constant_input() {
    let input = Tensor::filled(vec![3, 8, 8, 4], 0.7);

    let out = average_pool(&input, 2, ExecutionMode::Parallel).unwrap();
    assert_eq!(out.shape(), &[3, 4, 4, 4]);
    assert!(out.data.iter().all(|&x| (x - 0.7).abs() < 1e-6));
}

#[test]
fn test_pool_truncates_remainder() {
    let input = Tensor::random(vec![2, 5, 7, 3], 5);

    let out = average_pool(&input, 2, ExecutionMode::Sequential).unwrap();
    assert_eq!(out.shape(), &[2, 2, 3, 3]);

    let out = average_pool(&input, 3, ExecutionMode::Sequential).unwrap();
    assert_eq!(out.shape(), &[2, 1, 2, 3]);
    let expected: f32 = (0..3)
        .flat_map(|p| (0..3).map(move |q| (p, q)))
        .map(|(p, q)| input[[1, p, 3 + q, 2]] / 9.0)
        .sum();
    assert!((out[[1, 0, 1, 2]] - expected).abs() < 1e-6);
}

#[test]
fn test_pool_size_one_is_identity() {
    let input = Tensor::random(vec![1, 3, 3, 2], 6);
    let out = average_pool(&input, 1, ExecutionMode::Sequential).unwrap();
    assert_eq!(out.data, input.data);
}

#[test]
fn test_pool_size_zero_is_invalid() {
    let input = Tensor::zeros(vec![1, 4, 4, 1]);
    let err = average_pool(&input, 0, ExecutionMode::Sequential).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { stage: "pool", .. }));
}

#[test]
fn test_pool_window_larger_than_input() {
    let input = Tensor::zeros(vec![1, 2, 2, 1]);
    assert!(average_pool(&input, 3, ExecutionMode::Sequential).is_err());
}

#[test]
fn test_dense_identity() {
    let x = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
    let identity = Tensor::new_2d(vec![1.0, 0.0, 0.0, 1.0], 2, 2);

    for mode in MODES {
        let y = fully_forward(&x, &identity, mode).unwrap();
        assert_eq!(y.shape(), &[2, 2]);
        assert_eq!(y.data, x.data);
    }
}

#[test]
fn test_dense_basic_multiplication() {
    let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
    let b = Tensor::new_2d(vec![5.0, 6.0, 7.0, 8.0], 2, 2);

    assert_eq!(fully_forward_seq(&a, &b).unwrap().data, vec![19.0, 22.0, 43.0, 50.0]);
    assert_eq!(fully_forward_par(&a, &b).unwrap().data, vec![19.0, 22.0, 43.0, 50.0]);
}

#[test]
fn test_dense_shape_law() {
    let x = Tensor::random_2d(7, 13, 1);
    let w = Tensor::random_2d(13, 5, 2);

    let seq = fully_forward_seq(&x, &w).unwrap();
    let par = fully_forward_par(&x, &w).unwrap();
    assert_eq!(seq.shape(), &[7, 5]);
    assert_eq!(seq.data, par.data);
}

#[test]
fn test_dense_dimension_mismatch() {
    let x = Tensor::zeros_2d(2, 3);
    let w = Tensor::zeros_2d(4, 2);

    let err = fully_forward(&x, &w, ExecutionMode::Sequential).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { stage: "dense", .. }));
}

#[test]
fn test_argmax_tie_break() {
    let x = Tensor::new_2d(vec![3.0, 5.0, 5.0, 1.0], 1, 4);
    assert_eq!(argmax(&x).unwrap(), vec![1]);
}

#[test]
fn test_argmax_rows() {
    let x = Tensor::new_2d(vec![
        0.1, 0.7, 0.2,
        0.9, 0.0, 0.1,
        -1.0, -2.0, -0.5,
        0.0, 0.0, 0.0,
    ], 4, 3);
    assert_eq!(argmax(&x).unwrap(), vec![1, 0, 2, 0]);
}

#[test]
fn test_argmax_needs_columns() {
    let x = Tensor::zeros_2d(3, 0);
    assert!(argmax(&x).is_err());
    assert!(argmax(&Tensor::zeros(vec![1, 1, 1, 3])).is_err());
}
