//! User Entity

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::validation::{ValidationErrors, Violation};
use platform::password::{HashedPassword, PasswordPolicyError};
use unicode_normalization::UnicodeNormalization;

pub const USERNAME_MAX_LENGTH: usize = 64;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const DISPLAY_NAME_MAX_LENGTH: usize = 64;
pub const BIO_MAX_LENGTH: usize = 2_000;
pub const IMAGE_MAX_LENGTH: usize = 2_048;

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: HashedPassword,
    pub display_name: String,
    pub bio: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            bio: self.bio.clone(),
            image: self.image.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_identity(&self.username, &self.email, &mut errors);
        check_optional_text(&mut errors, "displayName", &self.display_name, DISPLAY_NAME_MAX_LENGTH);
        check_optional_text(&mut errors, "bio", &self.bio, BIO_MAX_LENGTH);
        check_optional_text(&mut errors, "image", &self.image, IMAGE_MAX_LENGTH);
        errors.into_result()
    }
}

/// Public part of a user embedded in articles and comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub bio: String,
    pub image: String,
}

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: HashedPassword,
}

impl NewUser {
    /// Normalizes username and email
    pub fn new(username: &str, email: &str, password_hash: HashedPassword) -> Self {
        Self {
            username: normalize_username(username),
            email: normalize_email(email),
            password_hash,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_identity(&self.username, &self.email, &mut errors);
        errors.into_result()
    }
}

// ============================================================================
// Partial update
// ============================================================================

/// Profile update; `None` and empty strings leave the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl UserPatch {
    /// New user value with every supplied field overwritten
    ///
    /// The password is not touched here; see [`UserPatch::new_password`].
    pub fn merge(&self, user: &User) -> User {
        let mut merged = user.clone();

        if let Some(username) = supplied(&self.username) {
            merged.username = normalize_username(username);
        }
        if let Some(email) = supplied(&self.email) {
            merged.email = normalize_email(email);
        }
        if let Some(display_name) = supplied(&self.display_name) {
            merged.display_name = display_name.trim().to_string();
        }
        if let Some(bio) = supplied(&self.bio) {
            merged.bio = bio.to_string();
        }
        if let Some(image) = supplied(&self.image) {
            merged.image = image.trim().to_string();
        }

        merged
    }

    /// Plaintext password to re-hash, if one was supplied
    pub fn new_password(&self) -> Option<&str> {
        supplied(&self.password)
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.username,
            &self.email,
            &self.password,
            &self.display_name,
            &self.bio,
            &self.image,
        ]
        .into_iter()
        .all(|field| supplied(field).is_none())
    }
}

fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

// ============================================================================
// Normalization & validation
// ============================================================================

pub fn normalize_username(raw: &str) -> String {
    raw.nfkc().collect::<String>().trim().to_string()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Username and email rules shared by registration and updates
pub fn check_identity(username: &str, email: &str, errors: &mut ValidationErrors) {
    validate_username(username, errors);
    validate_email(email, errors);
}

/// Field violation for a rejected password
pub fn password_violation(err: &PasswordPolicyError) -> Violation {
    match err {
        PasswordPolicyError::TooShort { min, .. } => Violation::TooShort {
            field: "password",
            min: *min,
        },
        PasswordPolicyError::TooLong { max, .. } => Violation::TooLong {
            field: "password",
            max: *max,
        },
        PasswordPolicyError::EmptyOrWhitespace => Violation::Required { field: "password" },
        PasswordPolicyError::InvalidCharacter => Violation::InvalidFormat { field: "password" },
    }
}

fn validate_username(username: &str, errors: &mut ValidationErrors) {
    errors.check_text("username", username, USERNAME_MAX_LENGTH);
    if !username.is_empty() && username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        errors.push(Violation::InvalidFormat { field: "username" });
    }
}

fn validate_email(email: &str, errors: &mut ValidationErrors) {
    errors.check_text("email", email, EMAIL_MAX_LENGTH);
    if !email.is_empty() && !looks_like_email(email) {
        errors.push(Violation::InvalidFormat { field: "email" });
    }
}

/// `local@domain.tld` with no whitespace
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn check_optional_text(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(Violation::TooLong { field, max });
    }
}
