use super::model::TimingDiffResult;
use crate::common::models::ResponseTiming;

fn phase_delta(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(l), Some(r)) => Some(r - l),
        _ => None,
    }
}

/// Compare two timing breakdowns, right minus left.
///
/// A phase delta is only reported when both sides measured that phase.
pub fn compare_timing(left: &ResponseTiming, right: &ResponseTiming) -> TimingDiffResult {
    let total_delta = right.total - left.total;
    let percentage_change = if left.total > 0.0 {
        total_delta / left.total * 100.0
    } else {
        0.0
    };

    TimingDiffResult {
        total_delta,
        percentage_change,
        dns_delta: phase_delta(left.dns, right.dns),
        connect_delta: phase_delta(left.connect, right.connect),
        tls_delta: phase_delta(left.tls, right.tls),
        ttfb_delta: phase_delta(left.ttfb, right.ttfb),
        download_delta: phase_delta(left.download, right.download),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_and_percentage() {
        let result = compare_timing(&ResponseTiming::total(100.0), &ResponseTiming::total(150.0));
        assert_eq!(result.total_delta, 50.0);
        assert_eq!(result.percentage_change, 50.0);

        let faster = compare_timing(&ResponseTiming::total(200.0), &ResponseTiming::total(150.0));
        assert_eq!(faster.total_delta, -50.0);
        assert_eq!(faster.percentage_change, -25.0);
    }

    #[test]
    fn test_zero_baseline() {
        let result = compare_timing(&ResponseTiming::total(0.0), &ResponseTiming::total(40.0));
        assert_eq!(result.total_delta, 40.0);
        assert_eq!(result.percentage_change, 0.0);
    }

    #[test]
    fn test_phase_present_only_when_both_measured() {
        let left = ResponseTiming {
            total: 100.0,
            dns: Some(10.0),
            connect: Some(20.0),
            ttfb: Some(30.0),
            ..Default::default()
        };
        let right = ResponseTiming {
            total: 100.0,
            dns: Some(10.0),
            ttfb: Some(45.0),
            download: Some(5.0),
            ..Default::default()
        };

        let result = compare_timing(&left, &right);
        // Measured on both sides and unchanged
        assert_eq!(result.dns_delta, Some(0.0));
        assert_eq!(result.ttfb_delta, Some(15.0));
        assert_eq!(result.connect_delta, None);
        assert_eq!(result.download_delta, None);
        assert_eq!(result.tls_delta, None);
    }
}
