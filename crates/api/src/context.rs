/// Identity of the caller, decoded from a verified bearer token.
///
/// Present in request extensions on protected routes only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    email: String,
}

impl CallerContext {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether the caller is the owner of `email`.
    pub fn is(&self, email: &str) -> bool {
        self.email == email
    }
}
