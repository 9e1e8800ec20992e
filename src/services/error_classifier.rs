//! Classification of cost source failures
//!
//! Upstream errors are opaque strings. They are mapped onto a small taxonomy
//! by case-insensitive substring matching against known provider error
//! signatures; anything unrecognized is `Unknown`.

use crate::types::{ErrorCategory, FetchError, FetchFailure};

/// Ordered signature table; first match wins
const SIGNATURES: &[(&str, ErrorCategory)] = &[
    ("accessdenied", ErrorCategory::Authorization),
    ("unauthorizedoperation", ErrorCategory::Authorization),
    ("not authorized to perform", ErrorCategory::Authorization),
    ("forbidden", ErrorCategory::Authorization),
    ("unrecognizedclient", ErrorCategory::Authentication),
    ("invalidclienttokenid", ErrorCategory::Authentication),
    ("signaturedoesnotmatch", ErrorCategory::Authentication),
    ("invalidsignature", ErrorCategory::Authentication),
    ("expiredtoken", ErrorCategory::Authentication),
    ("could not load credentials", ErrorCategory::Authentication),
    ("unauthorized", ErrorCategory::Authentication),
    ("requestlimitexceeded", ErrorCategory::Throttling),
    ("throttl", ErrorCategory::Throttling),
    ("too many requests", ErrorCategory::Throttling),
    ("toomanyrequests", ErrorCategory::Throttling),
    ("rate exceeded", ErrorCategory::Throttling),
    ("servicequotaexceeded", ErrorCategory::QuotaExceeded),
    ("quotaexceeded", ErrorCategory::QuotaExceeded),
    ("limitexceeded", ErrorCategory::QuotaExceeded),
    ("validationexception", ErrorCategory::InvalidParameter),
    ("invalidparameter", ErrorCategory::InvalidParameter),
    ("invalidnexttoken", ErrorCategory::InvalidParameter),
    ("dataunavailable", ErrorCategory::InvalidParameter),
    ("serviceunavailable", ErrorCategory::ServiceUnavailable),
    ("service unavailable", ErrorCategory::ServiceUnavailable),
    ("internalfailure", ErrorCategory::ServiceUnavailable),
    ("internal server error", ErrorCategory::ServiceUnavailable),
    ("internalerror", ErrorCategory::ServiceUnavailable),
    ("timed out", ErrorCategory::ServiceUnavailable),
    ("connection refused", ErrorCategory::ServiceUnavailable),
    ("could not connect", ErrorCategory::ServiceUnavailable),
];

/// Classify an upstream error message
pub fn classify(message: &str) -> ErrorCategory {
    let lower = message.to_lowercase();
    SIGNATURES
        .iter()
        .find(|(signature, _)| lower.contains(signature))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Unknown)
}

impl ErrorCategory {
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ErrorCategory::Throttling | ErrorCategory::ServiceUnavailable | ErrorCategory::Unknown
        )
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => {
                "The cost reporting API could not verify the supplied credentials."
            }
            ErrorCategory::Authorization => {
                "The credentials are valid but are not allowed to read cost and usage data."
            }
            ErrorCategory::Throttling => {
                "The cost reporting API is rate limiting requests from this account."
            }
            ErrorCategory::InvalidParameter => {
                "The cost reporting API rejected the request parameters."
            }
            ErrorCategory::ServiceUnavailable => {
                "The cost reporting API is temporarily unavailable."
            }
            ErrorCategory::QuotaExceeded => {
                "A service quota for cost reporting requests has been exhausted."
            }
            ErrorCategory::Unknown => "The cost reporting API returned an unexpected error.",
        }
    }

    /// Remediation steps, most useful first
    pub fn suggestions(&self) -> [&'static str; 3] {
        match self {
            ErrorCategory::Authentication => [
                "Check that access keys or session credentials are configured",
                "Refresh expired session tokens or SSO logins",
                "Verify the system clock is correct, since request signatures are time-sensitive",
            ],
            ErrorCategory::Authorization => [
                "Grant the ce:GetCostAndUsage permission to the calling identity",
                "Confirm Cost Explorer is enabled for the account",
                "Check organization policies that may deny billing access",
            ],
            ErrorCategory::Throttling => [
                "Wait a few seconds and retry the request",
                "Reduce how often cost reports are requested",
                "Enable the report cache to avoid repeated queries for settled periods",
            ],
            ErrorCategory::InvalidParameter => [
                "Check that the period start is before its end and not in the future",
                "Verify the group-by dimension key is supported",
                "Verify the cost metric name is spelled correctly",
            ],
            ErrorCategory::ServiceUnavailable => [
                "Retry the request after a short delay",
                "Check the provider status page for ongoing incidents",
                "Verify network connectivity to the cost reporting endpoint",
            ],
            ErrorCategory::QuotaExceeded => [
                "Wait for the quota window to reset before retrying",
                "Request a quota increase from the provider",
                "Narrow the query to fewer periods or dimensions",
            ],
            ErrorCategory::Unknown => [
                "Retry the request",
                "Run with --verbose to see the full upstream error",
                "Check the endpoint configuration in ~/.costlens/config.json",
            ],
        }
    }
}

impl FetchFailure {
    /// Classify `error` into a caller-facing failure
    pub fn from_error(error: &FetchError) -> Self {
        let category = classify(&error.message);
        Self {
            category,
            message: error.message.clone(),
            explanation: category.explanation().to_string(),
            suggestions: category.suggestions().iter().map(|s| s.to_string()).collect(),
            retryable: category.retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCategory; 7] = [
        ErrorCategory::Authentication,
        ErrorCategory::Authorization,
        ErrorCategory::Throttling,
        ErrorCategory::InvalidParameter,
        ErrorCategory::ServiceUnavailable,
        ErrorCategory::QuotaExceeded,
        ErrorCategory::Unknown,
    ];

    // ========== classify() ==========

    #[test]
    fn test_access_denied_is_authorization() {
        let failure = FetchFailure::from_error(&FetchError::new(
            "AccessDeniedException: User is not authorized to perform: ce:GetCostAndUsage",
        ));
        assert_eq!(failure.category, ErrorCategory::Authorization);
        assert!(!failure.retryable);
        assert_eq!(
            failure.suggestions,
            vec![
                "Grant the ce:GetCostAndUsage permission to the calling identity",
                "Confirm Cost Explorer is enabled for the account",
                "Check organization policies that may deny billing access",
            ]
        );
    }

    #[test]
    fn test_authentication_signatures() {
        for message in [
            "UnrecognizedClientException: The security token included in the request is invalid",
            "ExpiredTokenException: The security token included in the request is expired",
            "InvalidClientTokenId",
            "SignatureDoesNotMatch",
        ] {
            assert_eq!(classify(message), ErrorCategory::Authentication, "{}", message);
        }
    }

    #[test]
    fn test_throttling_signatures() {
        assert_eq!(classify("ThrottlingException: Rate exceeded"), ErrorCategory::Throttling);
        assert_eq!(classify("HTTP 429 Too Many Requests"), ErrorCategory::Throttling);
        assert_eq!(classify("RequestLimitExceeded"), ErrorCategory::Throttling);
    }

    #[test]
    fn test_quota_and_limit() {
        assert_eq!(
            classify("LimitExceededException: You have exceeded the limit"),
            ErrorCategory::QuotaExceeded
        );
        assert_eq!(classify("ServiceQuotaExceededException"), ErrorCategory::QuotaExceeded);
    }

    #[test]
    fn test_invalid_parameter() {
        assert_eq!(
            classify("ValidationException: Start date must be before end date"),
            ErrorCategory::InvalidParameter
        );
        assert_eq!(classify("DataUnavailableException"), ErrorCategory::InvalidParameter);
    }

    #[test]
    fn test_service_unavailable() {
        assert_eq!(classify("ServiceUnavailable"), ErrorCategory::ServiceUnavailable);
        assert_eq!(
            classify("HTTP request timed out: error sending request: operation timed out"),
            ErrorCategory::ServiceUnavailable
        );
        assert_eq!(
            classify("HTTP could not connect: error sending request for url"),
            ErrorCategory::ServiceUnavailable
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("accessdenied"), ErrorCategory::Authorization);
        assert_eq!(classify("THROTTLING"), ErrorCategory::Throttling);
    }

    #[test]
    fn test_unmatched_is_unknown() {
        assert_eq!(classify("something odd happened"), ErrorCategory::Unknown);
        assert_eq!(classify(""), ErrorCategory::Unknown);
    }

    // ========== Category metadata ==========

    #[test]
    fn test_retryable_flags() {
        assert!(ErrorCategory::Throttling.retryable());
        assert!(ErrorCategory::ServiceUnavailable.retryable());
        assert!(ErrorCategory::Unknown.retryable());
        assert!(!ErrorCategory::Authentication.retryable());
        assert!(!ErrorCategory::Authorization.retryable());
        assert!(!ErrorCategory::InvalidParameter.retryable());
        assert!(!ErrorCategory::QuotaExceeded.retryable());
    }

    #[test]
    fn test_every_category_has_explanation_and_three_suggestions() {
        for category in ALL {
            assert!(!category.explanation().is_empty());
            assert!(category.suggestions().iter().all(|s| !s.is_empty()));
        }
    }

    #[test]
    fn test_failure_keeps_raw_message() {
        let failure = FetchFailure::from_error(&FetchError::new("weird"));
        assert_eq!(failure.message, "weird");
        assert_eq!(failure.category, ErrorCategory::Unknown);
        assert!(failure.retryable);
        assert_eq!(failure.suggestions.len(), 3);
    }
}
