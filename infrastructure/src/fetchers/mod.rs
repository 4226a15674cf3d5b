//! Metric fetchers
//!
//! One adapter per data source, each implementing the `MetricFetcher`
//! port and normalizing its source's native response into the common
//! section payloads. Shared helpers for SDK timestamp conversion and
//! ALB metric dimensions live here.

pub mod deployment;
pub mod requests;
pub mod response_time;
pub(crate) mod target_groups;
pub mod target_health;
pub mod utilization;

use chrono::{DateTime, Utc};

/// Convert an SDK timestamp to chrono, dropping out-of-range values.
pub(crate) fn to_chrono(ts: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ts.to_millis().ok()?)
}

pub(crate) fn to_smithy(ts: DateTime<Utc>) -> aws_smithy_types::DateTime {
    aws_smithy_types::DateTime::from_millis(ts.timestamp_millis())
}

/// The `LoadBalancer` metric dimension: everything after `loadbalancer/`
/// in the load balancer ARN.
pub(crate) fn lb_dimension(load_balancer_arn: &str) -> Option<&str> {
    load_balancer_arn
        .split_once("loadbalancer/")
        .map(|(_, rest)| rest)
}

/// The `TargetGroup` metric dimension: the trailing
/// `targetgroup/name/id` segment of the target group ARN.
pub(crate) fn tg_dimension(target_group_arn: &str) -> &str {
    target_group_arn
        .rsplit(':')
        .next()
        .unwrap_or(target_group_arn)
}

/// Mask the account-identifying first label of a registry host
/// (`123456789.dkr.ecr...` -> `******.dkr.ecr...`). Images without a
/// dotted registry host pass through unchanged.
pub(crate) fn mask_registry(image: &str) -> String {
    match image.split_once('/') {
        Some((host, rest)) if host.contains('.') => match host.split_once('.') {
            Some((_, domain)) => format!("******.{domain}/{rest}"),
            None => image.to_string(),
        },
        _ => image.to_string(),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Seconds to milliseconds, rounded to two decimals.
pub(crate) fn secs_to_ms(value: f64) -> f64 {
    round2(value * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lb_dimension_strips_arn_prefix() {
        let arn = "arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/web/50dc6c495c0c9188";
        assert_eq!(lb_dimension(arn), Some("app/web/50dc6c495c0c9188"));
        assert_eq!(lb_dimension("not-an-arn"), None);
    }

    #[test]
    fn tg_dimension_keeps_trailing_segment() {
        let arn = "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/web/73e2d6bc24d8a067";
        assert_eq!(tg_dimension(arn), "targetgroup/web/73e2d6bc24d8a067");
    }

    #[test]
    fn registry_account_is_masked() {
        assert_eq!(
            mask_registry("123456789.dkr.ecr.us-east-1.amazonaws.com/app:v1"),
            "******.dkr.ecr.us-east-1.amazonaws.com/app:v1"
        );
    }

    #[test]
    fn bare_images_pass_through() {
        assert_eq!(mask_registry("nginx:latest"), "nginx:latest");
        assert_eq!(mask_registry("library/nginx"), "library/nginx");
    }

    #[test]
    fn seconds_become_rounded_milliseconds() {
        assert_eq!(secs_to_ms(0.123456), 123.46);
        assert_eq!(secs_to_ms(1.0), 1000.0);
    }

    #[test]
    fn smithy_round_trip_preserves_millis() {
        let now = DateTime::<Utc>::from_timestamp_millis(1_750_000_000_123).unwrap();
        assert_eq!(to_chrono(&to_smithy(now)), Some(now));
    }
}
