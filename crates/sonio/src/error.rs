use reqwest::StatusCode;
use std::time::Duration;

// Custom error types for acquisition operations

/// Failure of a single acquisition strategy. Always recovered inside the
/// orchestrator loop; callers only ever see these aggregated inside
/// [`AcquisitionError::Exhausted`].
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status code {0}")]
    StatusCode(StatusCode),

    #[error("invalid URL: {0}")]
    Url(String),

    #[error("no usable audio format: {0}")]
    NoFormat(String),

    #[error("malformed player response: {0}")]
    Parse(String),

    #[error("response too small: {size} bytes (floor is {floor})")]
    TooSmall { size: usize, floor: usize },

    #[error("no data received for {}s", .0.as_secs())]
    Stalled(Duration),

    #[error("attempt timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),
}

/// One failed strategy attempt, as reported in the terminal aggregate.
#[derive(Debug)]
pub struct StrategyFailure {
    /// Name of the strategy that failed
    pub strategy: &'static str,
    /// Why it failed
    pub error: StrategyError,
    /// Wall-clock duration of the attempt
    pub elapsed: Duration,
}

fn list_failures(attempts: &[StrategyFailure]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.strategy, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Terminal error for a whole `acquire` call.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("all acquisition strategies failed [{}]", list_failures(.attempts))]
    Exhausted { attempts: Vec<StrategyFailure> },

    #[error("too many concurrent acquisitions in flight, retry later")]
    AtCapacity,

    #[error("invalid proxy configuration: {0}")]
    ProxyError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl AcquisitionError {
    /// Whether the caller can reasonably retry the same request as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AtCapacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_lists_every_attempt_in_order() {
        let err = AcquisitionError::Exhausted {
            attempts: vec![
                StrategyFailure {
                    strategy: "direct-format",
                    error: StrategyError::NoFormat("no audio streams".into()),
                    elapsed: Duration::from_millis(120),
                },
                StrategyFailure {
                    strategy: "streaming-chunk",
                    error: StrategyError::Stalled(Duration::from_secs(5)),
                    elapsed: Duration::from_secs(5),
                },
            ],
        };

        let rendered = err.to_string();
        let direct = rendered.find("direct-format").unwrap();
        let streaming = rendered.find("streaming-chunk").unwrap();
        assert!(direct < streaming, "attempt order must be preserved");
        assert!(rendered.contains("no audio streams"));
        assert!(rendered.contains("no data received"));
    }

    #[test]
    fn only_capacity_is_retryable() {
        assert!(AcquisitionError::AtCapacity.is_retryable());
        assert!(
            !AcquisitionError::Exhausted { attempts: vec![] }.is_retryable()
        );
    }
}
