use fairway_api::{ApiError, Identity};
use thiserror::Error;
use tracing::{debug, info};

/// Whether a credential submission is a login or a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    fn verb(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
        }
    }
}

/// Runtime authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Identity),
}

/// A validated credential submission, ready for the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRequest {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
}

/// Local credential checks that run before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email and password cannot be empty.")]
    EmptyCredential,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password should be at least 6 characters.")]
    PasswordTooShort,
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

/// Why a submission did not produce a network request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    /// A previous submission is still in flight; this one is ignored.
    #[error("a submission is already in flight")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Validate credentials locally. Registration additionally requires a
/// matching confirmation password.
pub fn validate_credentials(
    mode: AuthMode,
    email: &str,
    password: &str,
    confirm_password: Option<&str>,
) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::EmptyCredential);
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < 6 {
        return Err(ValidationError::PasswordTooShort);
    }
    if mode == AuthMode::Register && confirm_password != Some(password) {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Holds the authenticated identity and drives the login/register flow.
///
/// `begin_submit` validates and hands back the request to perform; the
/// caller injects the outcome through `on_auth_result`. A busy flag guards
/// against re-entrant submissions while one is outstanding.
#[derive(Debug, Default)]
pub struct SessionManager {
    state: SessionState,
    busy: bool,
    error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Unauthenticated
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current identity, or `None` when unauthenticated.
    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Unauthenticated => None,
        }
    }

    /// Last user-visible auth failure, cleared on the next submission.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `true` while a login/register call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Validate and stage a credential submission.
    ///
    /// On success the manager is marked busy and the returned request must
    /// be resolved through [`Self::on_auth_result`]. Validation failures
    /// store their message for the presentation layer; a busy rejection
    /// leaves previous state untouched.
    pub fn begin_submit(
        &mut self,
        mode: AuthMode,
        email: &str,
        password: &str,
        confirm_password: Option<&str>,
    ) -> Result<CredentialRequest, SubmitRejection> {
        if self.busy {
            debug!("submission ignored: one already in flight");
            return Err(SubmitRejection::Busy);
        }

        self.error = None;
        if let Err(invalid) = validate_credentials(mode, email, password, confirm_password) {
            self.error = Some(invalid.to_string());
            return Err(invalid.into());
        }

        self.busy = true;
        Ok(CredentialRequest {
            mode,
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }

    /// Apply the outcome of a staged submission.
    ///
    /// Register success counts as login: the identity becomes current
    /// immediately. HTTP 400 on register is the server's "already
    /// registered" answer; every other failure maps to a generic message.
    pub fn on_auth_result(&mut self, mode: AuthMode, result: Result<Identity, ApiError>) {
        self.busy = false;
        match result {
            Ok(identity) => {
                info!(user_id = identity.user_id, "signed in");
                self.error = None;
                self.state = SessionState::Authenticated(identity);
            }
            Err(err) => {
                self.error = Some(describe_auth_failure(mode, &err));
            }
        }
    }

    /// Drop the identity and return to `Unauthenticated`.
    pub fn logout(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.busy = false;
        self.error = None;
    }
}

fn describe_auth_failure(mode: AuthMode, err: &ApiError) -> String {
    match err {
        ApiError::Http { status: 400, .. } if mode == AuthMode::Register => {
            "This email is already registered.".to_string()
        }
        ApiError::Http { status, .. } => format!("{} failed: {status}", mode.verb()),
        ApiError::Network(detail) => format!("Network error: {detail}"),
        ApiError::Decode(_) => format!("{} failed: malformed server response", mode.verb()),
    }
}
