use crate::error::{ProcessingError, Result};

/// Window length actually usable for a series of `len` points: at most
/// `len - 1`, so at least one (window, target) pair exists.
pub fn effective_window(requested: usize, len: usize) -> Result<usize> {
    if len < 2 {
        return Err(ProcessingError::InsufficientData(format!(
            "need at least 2 observations to train a recurrent model, found {}",
            len
        )));
    }

    let window = requested.min(len - 1);
    if window == 0 {
        return Err(ProcessingError::InsufficientData(
            "window length must be at least 1".to_string(),
        ));
    }
    if window < requested {
        tracing::warn!(
            "Reducing window length from {} to {} for a series of {} points",
            requested,
            window,
            len
        );
    }
    Ok(window)
}

/// Sliding (input window, next value) pairs.
pub fn prepare_windows(series: &[f64], window: usize) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    if window == 0 || series.len() <= window {
        return Err(ProcessingError::InsufficientData(format!(
            "cannot form a window of {} from {} points",
            window,
            series.len()
        )));
    }

    let inputs = series.windows(window + 1).map(|w| w[..window].to_vec()).collect();
    let targets = series[window..].to_vec();
    Ok((inputs, targets))
}
