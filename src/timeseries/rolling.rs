//! Window kernels over a single column
//!
//! Kernels take the values of one column (or one group of it) in row order and
//! return the raw aggregate *ending at* each row, i.e. including the row itself.
//! Historical features apply [`shift`] by one on top of these.
//! `None` marks an undefined value, on input and output.

/// Shift values forward by `k` positions; the first `k` rows become undefined
pub fn shift(values: &[Option<f64>], k: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    for i in k..n {
        result[i] = values[i - k];
    }
    result
}

/// Trailing sum over `window` rows; requires `window` defined values
pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    let mut sum = 0.0;
    let mut defined = 0usize;

    for i in 0..n {
        if let Some(v) = values[i] {
            sum += v;
            defined += 1;
        }
        if i >= window {
            if let Some(v) = values[i - window] {
                sum -= v;
                defined -= 1;
            }
        }
        if defined == window {
            result[i] = Some(sum);
        }
    }

    result
}

/// Trailing mean over up to `window` rows; needs one defined value
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean(&values[start..=i])
        })
        .collect()
}

/// Running sum from the first row, skipping undefined values
pub fn expanding_sum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut sum = 0.0;
    let mut seen = false;
    values
        .iter()
        .map(|v| {
            if let Some(x) = v {
                sum += x;
                seen = true;
            }
            seen.then_some(sum)
        })
        .collect()
}

/// Running mean from the first row, skipping undefined values
pub fn expanding_mean(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut sum = 0.0;
    let mut count = 0usize;
    values
        .iter()
        .map(|v| {
            if let Some(x) = v {
                sum += x;
                count += 1;
            }
            (count > 0).then(|| sum / count as f64)
        })
        .collect()
}

/// Exponentially weighted mean without bias adjustment.
///
/// Undefined inputs carry the previous smoothed value forward.
pub fn ewm_mean(values: &[Option<f64>], alpha: f64) -> Vec<Option<f64>> {
    let mut state: Option<f64> = None;
    values
        .iter()
        .map(|v| {
            state = match (state, v) {
                (None, Some(x)) => Some(*x),
                (Some(s), Some(x)) => Some(alpha * x + (1.0 - alpha) * s),
                (s, None) => s,
            };
            state
        })
        .collect()
}

/// Sum of the last `k` rows; `None` unless all `k` are present and defined
pub fn tail_sum(values: &[Option<f64>], k: usize) -> Option<f64> {
    if values.len() < k {
        return None;
    }
    values[values.len() - k..].iter().copied().sum()
}

/// Mean of the defined values among the last `k` rows
pub fn tail_mean(values: &[Option<f64>], k: usize) -> Option<f64> {
    let start = values.len().saturating_sub(k);
    mean(&values[start..])
}

/// Sum of every defined value; an empty column sums to zero
pub fn total_sum(values: &[Option<f64>]) -> Option<f64> {
    Some(values.iter().flatten().sum())
}

/// Mean of every defined value
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Last smoothed value of [`ewm_mean`]
pub fn final_ewm(values: &[Option<f64>], alpha: f64) -> Option<f64> {
    ewm_mean(values, alpha).last().copied().flatten()
}
