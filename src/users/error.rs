use super::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Email already exists")]
    DuplicateEmail,
    /// Creation lost a race against a concurrent writer.
    #[error("User with this username or email already exists")]
    DuplicateConstraint,
    /// Update lost a race against a concurrent writer.
    #[error("Update failed due to constraint violation")]
    ConstraintViolation,
    #[error("User not found")]
    NotFound,
    #[error("password hashing failed")]
    Hashing(#[source] anyhow::Error),
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl UserError {
    /// Errors the operator can fix by changing the submitted form.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            UserError::Validation(_)
                | UserError::DuplicateUsername
                | UserError::DuplicateEmail
                | UserError::DuplicateConstraint
                | UserError::ConstraintViolation
        )
    }
}
