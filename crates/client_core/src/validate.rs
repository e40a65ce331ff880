use thiserror::Error;

use crate::FormState;

pub const NAME_MAX_CHARS: usize = 30;
pub const EMAIL_MAX_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email address is not well formed")]
    MalformedEmail,
    #[error("name may only contain letters and spaces")]
    InvalidNameChars,
    #[error("name cannot be longer than 30 characters")]
    NameTooLong,
    #[error("email cannot be longer than 40 characters")]
    EmailTooLong,
}

/// Checks the form ahead of a create call. Rules run in a fixed order and
/// stop at the first failure, so multiply invalid input reports one stable
/// message.
pub fn check_submission(form: &FormState) -> Result<(), ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if form.email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !is_well_formed_email(&form.email) {
        return Err(ValidationError::MalformedEmail);
    }
    if !form
        .name
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return Err(ValidationError::InvalidNameChars);
    }
    if form.name.chars().count() > NAME_MAX_CHARS {
        return Err(ValidationError::NameTooLong);
    }
    if form.email.chars().count() > EMAIL_MAX_CHARS {
        return Err(ValidationError::EmailTooLong);
    }
    Ok(())
}

// Accepts local@domain where neither side carries whitespace or a second
// at sign, and the domain has a dot with at least one character on each side.
fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str) -> FormState {
        FormState {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn accepts_a_plain_submission() {
        assert_eq!(
            check_submission(&form("Alice Smith", "alice@example.com")),
            Ok(())
        );
    }

    #[test]
    fn rejects_blank_names_before_any_other_rule() {
        assert_eq!(
            check_submission(&form("", "alice@example.com")),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            check_submission(&form("   ", "bob@@x")),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn rejects_blank_emails_before_pattern_rules() {
        assert_eq!(
            check_submission(&form("Bob2", " ")),
            Err(ValidationError::EmptyEmail)
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in [
            "bob@@x",
            "bob.com",
            "bob@x",
            "bob@x.",
            "bob@.x",
            "b ob@x.com",
            "@x.com",
        ] {
            assert_eq!(
                check_submission(&form("Bob", email)),
                Err(ValidationError::MalformedEmail),
                "{email}"
            );
        }
    }

    #[test]
    fn accepts_odd_but_matching_emails() {
        // The pattern only demands an interior dot somewhere after the at
        // sign; it is not a full address grammar.
        for email in ["a@b.c", "a@.b.c", "a@b.c."] {
            assert_eq!(check_submission(&form("Bob", email)), Ok(()), "{email}");
        }
    }

    #[test]
    fn rejects_names_with_digits_or_symbols() {
        for name in ["Bob2", "Anne-Marie", "José", "Bob!"] {
            assert_eq!(
                check_submission(&form(name, "bob@x.com")),
                Err(ValidationError::InvalidNameChars),
                "{name}"
            );
        }
    }

    #[test]
    fn email_pattern_outranks_name_pattern() {
        assert_eq!(
            check_submission(&form("Bob2", "not-an-email")),
            Err(ValidationError::MalformedEmail)
        );
    }

    #[test]
    fn name_length_boundary_sits_at_thirty() {
        assert_eq!(check_submission(&form(&"a".repeat(30), "a@x.com")), Ok(()));
        assert_eq!(
            check_submission(&form(&"a".repeat(31), "a@x.com")),
            Err(ValidationError::NameTooLong)
        );
    }

    #[test]
    fn email_length_boundary_sits_at_forty() {
        let at_limit = format!("a@{}.com", "b".repeat(34));
        assert_eq!(at_limit.chars().count(), 40);
        assert_eq!(check_submission(&form("Bob", &at_limit)), Ok(()));

        let over_limit = format!("a@{}.com", "b".repeat(35));
        assert_eq!(
            check_submission(&form("Bob", &over_limit)),
            Err(ValidationError::EmailTooLong)
        );
    }
}
