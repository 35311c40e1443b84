//! Sign-in, registration and sign-out flows on top of the API client and the
//! session store.

use crate::api::ApiClient;
use crate::error::{ApiError, LoginError, RegisterError};
use crate::models::{LoginRequest, RegisterRequest, Role};
use crate::session::{Session, SessionStore};

pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed.";

pub async fn sign_in(
    api: &ApiClient,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<Session, LoginError> {
    let request = LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    };
    let resp = api.login(&request).await?;
    let session = Session::from(resp);
    store.set(&session)?;
    tracing::info!(user = %session.user.id, role = session.user.role.as_str(), "signed in");
    Ok(session)
}

pub fn sign_out(store: &SessionStore) {
    store.clear();
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
    pub skills: Vec<String>,
}

impl RegisterForm {
    /// Adds a trimmed, non-empty skill not already listed. Returns whether
    /// anything was added.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) {
        self.skills.retain(|s| s != skill);
    }

    pub fn validate(&self) -> Result<RegisterRequest, RegisterError> {
        let required = [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        let Some(role) = self.role else {
            return Err(RegisterError::Invalid("All fields are required.".into()));
        };
        if required.iter().any(|f| f.is_empty()) {
            return Err(RegisterError::Invalid("All fields are required.".into()));
        }
        if !looks_like_email(&self.email) {
            return Err(RegisterError::Invalid("Invalid email format.".into()));
        }
        if self.password != self.confirm_password {
            return Err(RegisterError::Invalid("Passwords do not match.".into()));
        }

        Ok(RegisterRequest {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            role,
            skills: if role == Role::Developer {
                self.skills.clone()
            } else {
                Vec::new()
            },
        })
    }
}

/// `local@domain.tld` with no whitespace in any part.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    [local, host, tld]
        .iter()
        .all(|part| !part.is_empty() && !part.chars().any(char::is_whitespace))
}

pub async fn register(
    api: &ApiClient,
    store: &SessionStore,
    form: &RegisterForm,
) -> Result<Session, RegisterError> {
    let request = form.validate()?;
    let resp = api.register(&request).await.map_err(|err| match err {
        ApiError::Network(_) => RegisterError::Login(LoginError::Unreachable),
        other => RegisterError::Invalid(
            other
                .server_message()
                .unwrap_or(REGISTRATION_FAILED_MESSAGE)
                .to_string(),
        ),
    })?;
    let session = Session::from(resp);
    store.set(&session).map_err(LoginError::from)?;
    tracing::info!(user = %session.user.id, "registered");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::harness;
    use crate::error::{INVALID_CREDENTIALS_MESSAGE, UNREACHABLE_MESSAGE};
    use serde_json::json;

    fn auth_body(role: &str) -> serde_json::Value {
        json!({
            "accessToken": "jwt-1",
            "user": {
                "id": "u-7",
                "firstName": "Ada",
                "lastName": "Byron",
                "email": "ada@flowdesk.io",
                "role": role
            }
        })
    }

    fn form() -> RegisterForm {
        RegisterForm {
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            email: "ada@flowdesk.io".into(),
            password: "secret".into(),
            confirm_password: "secret".into(),
            role: Some(Role::Developer),
            skills: vec!["rust".into()],
        }
    }

    #[tokio::test]
    async fn sign_in_persists_matching_pair() {
        let h = harness();
        h.transport.reply(200, auth_body("MANAGER"));

        let session = sign_in(&h.api, &h.store, " ada@flowdesk.io ", "pw")
            .await
            .expect("sign in");

        assert_eq!(session.token, "jwt-1");
        assert_eq!(h.store.get(), Some(session.clone()));
        assert_eq!(
            h.transport.sent()[0].1.body,
            Some(json!({"email": "ada@flowdesk.io", "password": "pw"}))
        );
        assert_eq!(h.store.token().as_deref(), Some("jwt-1"));
        assert!(h.store.user().is_some_and(|u| u.is_manager()));
    }

    #[tokio::test]
    async fn bad_credentials_are_an_inline_error() {
        let h = harness();
        h.transport.reply(401, json!({}));
        h.transport.reply(400, json!({"message": "Bad credentials"}));

        let err = sign_in(&h.api, &h.store, "a@b.c", "x").await.expect_err("401");
        assert_eq!(err.to_string(), INVALID_CREDENTIALS_MESSAGE);

        let err = sign_in(&h.api, &h.store, "a@b.c", "x").await.expect_err("400");
        assert_eq!(err, LoginError::InvalidCredentials("Bad credentials".into()));
        assert_eq!(h.store.get(), None);
    }

    #[tokio::test]
    async fn unreachable_backend_is_distinct_from_bad_credentials() {
        let h = harness();
        h.transport.fail(ApiError::Network("connection refused".into()));

        let err = sign_in(&h.api, &h.store, "a@b.c", "x").await.expect_err("network");
        assert_eq!(err, LoginError::Unreachable);
        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
    }

    #[test]
    fn register_form_validation_messages() {
        let mut f = form();
        f.role = None;
        assert_eq!(
            f.validate(),
            Err(RegisterError::Invalid("All fields are required.".into()))
        );

        let mut f = form();
        f.email = "ada@flowdesk".into();
        assert_eq!(
            f.validate(),
            Err(RegisterError::Invalid("Invalid email format.".into()))
        );

        let mut f = form();
        f.confirm_password = "other".into();
        assert_eq!(
            f.validate(),
            Err(RegisterError::Invalid("Passwords do not match.".into()))
        );
    }

    #[test]
    fn skills_only_sent_for_developers() {
        let mut f = form();
        assert!(!f.add_skill("   "));
        assert!(f.add_skill(" leptos "));
        assert!(!f.add_skill("rust"));
        assert_eq!(f.validate().expect("valid").skills, vec!["rust", "leptos"]);

        f.role = Some(Role::Manager);
        assert!(f.validate().expect("valid").skills.is_empty());
    }

    #[tokio::test]
    async fn register_surfaces_server_message() {
        let h = harness();
        h.transport.reply(409, json!({"message": "Email already registered"}));
        h.transport.reply(500, json!({}));
        h.transport.reply(200, auth_body("DEVELOPER"));

        let err = register(&h.api, &h.store, &form()).await.expect_err("409");
        assert_eq!(err, RegisterError::Invalid("Email already registered".into()));

        let err = register(&h.api, &h.store, &form()).await.expect_err("500");
        assert_eq!(err.to_string(), REGISTRATION_FAILED_MESSAGE);

        let session = register(&h.api, &h.store, &form()).await.expect("registered");
        assert_eq!(session.user.role, Role::Developer);
        assert!(h.store.is_authenticated());
    }

    #[tokio::test]
    async fn sign_out_clears_everything() {
        let h = harness();
        h.transport.reply(200, auth_body("DEVELOPER"));
        sign_in(&h.api, &h.store, "a@b.c", "x").await.expect("sign in");

        sign_out(&h.store);
        assert_eq!(h.store.token(), None);
        assert_eq!(h.store.user(), None);
    }
}
