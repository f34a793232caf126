//! Validation of caller-supplied submission input.
//!
//! Applicant details are validated once, at submission; the stored
//! snapshot is trusted afterwards. Failures collect every offending
//! field so the caller can fix them in one round trip.

use crate::error::LifecycleError;
use crate::types::ApplicantDetails;

/// Validates the applicant snapshot taken at submission.
///
/// Required: non-empty name, address line, district, state; a ten-digit
/// mobile number (optionally `+91`-prefixed) starting with 6-9; a
/// six-digit PIN code not starting with `0`. The email, when present,
/// must contain exactly one `@` with text on both sides.
///
/// # Errors
///
/// Returns [`LifecycleError::Validation`] listing every failed field.
pub fn validate_applicant_details(details: &ApplicantDetails) -> Result<(), LifecycleError> {
    let mut issues: Vec<String> = Vec::new();

    if details.full_name.trim().is_empty() {
        issues.push("full_name is required".to_string());
    }

    if !is_valid_phone(&details.phone) {
        issues.push(format!(
            "phone must be a 10-digit mobile number (got {:?})",
            details.phone
        ));
    }

    if let Some(email) = &details.email {
        if !is_plausible_email(email) {
            issues.push(format!("email is not a valid address (got {email:?})"));
        }
    }

    let address = &details.address;
    if address.line1.trim().is_empty() {
        issues.push("address.line1 is required".to_string());
    }
    if address.district.trim().is_empty() {
        issues.push("address.district is required".to_string());
    }
    if address.state.trim().is_empty() {
        issues.push("address.state is required".to_string());
    }
    if !is_valid_pin_code(&address.pin_code) {
        issues.push(format!(
            "address.pin_code must be a 6-digit PIN code (got {:?})",
            address.pin_code
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(LifecycleError::validation(issues.join("; ")))
    }
}

/// Ten digits starting with 6-9, optionally prefixed with `+91`.
fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix("+91").unwrap_or(phone);
    digits.len() == 10
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits.starts_with(['6', '7', '8', '9'])
}

/// Six digits, first digit non-zero.
fn is_valid_pin_code(pin: &str) -> bool {
    pin.len() == 6 && pin.chars().all(|c| c.is_ascii_digit()) && !pin.starts_with('0')
}

/// Loose structural check; real address verification happens upstream.
fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Address;

    fn valid_details() -> ApplicantDetails {
        ApplicantDetails {
            full_name: "Asha Verma".to_string(),
            phone: "+919876543210".to_string(),
            email: Some("asha@example.in".to_string()),
            address: Address {
                line1: "14 MG Road".to_string(),
                line2: None,
                district: "Pune".to_string(),
                state: "Maharashtra".to_string(),
                pin_code: "411001".to_string(),
            },
        }
    }

    #[test]
    fn accepts_valid_details() {
        assert!(validate_applicant_details(&valid_details()).is_ok());
    }

    #[test]
    fn accepts_bare_ten_digit_phone() {
        let mut details = valid_details();
        details.phone = "9876543210".to_string();
        assert!(validate_applicant_details(&details).is_ok());
    }

    #[test]
    fn rejects_short_phone() {
        let mut details = valid_details();
        details.phone = "98765".to_string();
        let err = validate_applicant_details(&details).unwrap_err();
        assert!(err.to_string().contains("phone"));
    }

    #[test]
    fn rejects_landline_prefix() {
        let mut details = valid_details();
        details.phone = "0201234567".to_string();
        assert!(validate_applicant_details(&details).is_err());
    }

    #[test]
    fn rejects_bad_pin_code() {
        for pin in ["41100", "4110011", "041001", "4110a1"] {
            let mut details = valid_details();
            details.address.pin_code = pin.to_string();
            assert!(
                validate_applicant_details(&details).is_err(),
                "PIN {pin:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_missing_required_fields() {
        let mut details = valid_details();
        details.full_name = "  ".to_string();
        details.address.district = String::new();
        let err = validate_applicant_details(&details).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("full_name"));
        assert!(message.contains("address.district"));
    }

    #[test]
    fn missing_email_is_fine_but_malformed_email_is_not() {
        let mut details = valid_details();
        details.email = None;
        assert!(validate_applicant_details(&details).is_ok());

        details.email = Some("not-an-address".to_string());
        assert!(validate_applicant_details(&details).is_err());
    }
}
