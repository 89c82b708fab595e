//! Form validation schemas.
//!
//! Each user-facing action has an explicit schema struct borrowing its
//! fields from the request, with a `validate` method that checks every
//! field and reports all failures at once as a list of field errors.

use serde::Serialize;

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors collected from validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Ok when no field failed, Err(self) otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "This field is required");
        }
    }

    fn require_email(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "This field is required");
        } else if !is_valid_email(value) {
            self.push(field, "Enter a valid email address");
        }
    }

    fn require_min_len(&mut self, field: &'static str, value: &str, min: usize) {
        if value.len() < min {
            self.push(field, format!("Must be at least {min} characters"));
        }
    }
}

/// Syntactic email check: one `@`, non-empty local part, and a domain
/// with a dot separating non-empty labels.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty() && !value.contains(char::is_whitespace)
}

/// Registration form: account fields plus password confirmation.
#[derive(Debug, Clone, Copy)]
pub struct RegisterForm<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
}

impl RegisterForm<'_> {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.require_email("email", self.email);
        errors.require("first_name", self.first_name);
        errors.require("last_name", self.last_name);
        errors.require_min_len("password", self.password, 8);
        if self.password != self.password_confirm {
            errors.push("password_confirm", "Passwords do not match");
        }
        errors.into_result()
    }
}

/// Profile edit form. No password field here.
#[derive(Debug, Clone, Copy)]
pub struct ProfileForm<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl ProfileForm<'_> {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.require_email("email", self.email);
        errors.require("first_name", self.first_name);
        errors.require("last_name", self.last_name);
        errors.into_result()
    }
}

/// Post create/edit form. The category itself is checked against the
/// store by the handler; here only presence of text fields.
#[derive(Debug, Clone, Copy)]
pub struct PostForm<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

impl PostForm<'_> {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.require("title", self.title);
        errors.require("content", self.content);
        errors.into_result()
    }
}

/// Comment submission form.
#[derive(Debug, Clone, Copy)]
pub struct CommentForm<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub body: &'a str,
}

impl CommentForm<'_> {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.require("name", self.name);
        errors.require_email("email", self.email);
        errors.require("body", self.body);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("commenter@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user name@example.com"));
    }

    #[test]
    fn valid_register_form() {
        let form = RegisterForm {
            email: "testuser@example.com",
            first_name: "Test",
            last_name: "User",
            password: "password123",
            password_confirm: "password123",
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn register_password_mismatch() {
        let form = RegisterForm {
            email: "testuser@example.com",
            first_name: "Test",
            last_name: "User",
            password: "password123",
            password_confirm: "password124",
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "password_confirm");
    }

    #[test]
    fn register_reports_every_failing_field() {
        let form = RegisterForm {
            email: "not-an-email",
            first_name: "",
            last_name: "",
            password: "short",
            password_confirm: "short",
        };
        let errors = form.validate().unwrap_err();
        let fields: Vec<_> = errors.0.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["email", "first_name", "last_name", "password"]);
    }

    #[test]
    fn valid_comment_form() {
        let form = CommentForm {
            name: "Commenter",
            email: "commenter@example.com",
            body: "Test Comment",
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn comment_requires_body_and_valid_email() {
        let form = CommentForm {
            name: "Commenter",
            email: "commenter-at-example.com",
            body: "   ",
        };
        let errors = form.validate().unwrap_err();
        let fields: Vec<_> = errors.0.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["email", "body"]);
    }

    #[test]
    fn valid_post_form() {
        let form = PostForm {
            title: "Test Title",
            content: "Test Content",
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn valid_profile_form() {
        let form = ProfileForm {
            email: "testuser@example.com",
            first_name: "Test",
            last_name: "User",
        };
        assert!(form.validate().is_ok());
    }
}
