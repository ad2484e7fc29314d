//! User lifecycle: guest accounts, sign-up, email verification, roles and
//! profile images.

use crate::clients::{EmailMessage, EmailSender, ImageGenerator};
use crate::entity_service::EntityService;
use atelier_config::AppConfig;
use atelier_core::domain::{random_nine_digits, ImageRatio, User};
use atelier_core::{guarded, DomainError, Entity, Interface, ResultValue, TracingErrorSink};
use atelier_repository::EntityRepository;
use atelier_security::CredentialHasher;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;
use validator::ValidateEmail;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// User service trait.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Generic operations on users.
    fn users(&self) -> &EntityService<User>;

    /// Fails with `GetUsersByUsername-E02` when nobody has the username.
    async fn get_user_by_username(&self, username: &str) -> ResultValue<User>;

    /// Creates and stores a guest with a random name and password.
    async fn create_user(&self) -> ResultValue<User>;

    /// Turns a guest into a signed-up user and emails a verification code.
    async fn verify_user(&self, user_id: Uuid, email: &str, username: &str, password: &str) -> ResultValue<User>;

    /// Emails a fresh verification code to the user.
    async fn send_verification_code(&self, user_id: Uuid) -> ResultValue<bool>;

    /// Marks the user verified when `code` matches the last code sent.
    async fn verify_email(&self, user_id: Uuid, code: &str) -> ResultValue<User>;

    async fn add_role(&self, user_id: Uuid, role: &str) -> ResultValue<User>;

    async fn set_profile_image(&self, user_id: Uuid, image_url: &str) -> ResultValue<User>;

    /// Generates candidate profile images from a description.
    async fn generate_profile_images(&self, user_id: Uuid, description: &str) -> ResultValue<Vec<String>>;
}

/// Checks the password policy.
///
/// `UserService-EnsurePasswordStrength-E01` when shorter than eight
/// characters, `-E02` without an uppercase letter, `-E03` without a
/// lowercase letter.
pub fn ensure_password_strength(password: &str) -> ResultValue<bool> {
    let failure = |code: &str, message: &str| {
        ResultValue::failure(DomainError::new(
            format!("UserService-EnsurePasswordStrength-{code}"),
            message,
        ))
    };

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return failure("E01", "Password must be at least 8 characters.");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return failure("E02", "Password must contain at least one uppercase letter.");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return failure("E03", "Password must contain at least one lowercase letter.");
    }
    ResultValue::success(true)
}

/// `true` for a syntactically valid address whose domain has a dot.
pub fn validate_email(email: &str) -> bool {
    email.validate_email() && email.rsplit_once('@').is_some_and(|(_, domain)| domain.contains('.'))
}

/// Verification email carrying `code`.
pub fn verification_email(product: &str, recipient: &str, username: &str, code: &str) -> EmailMessage {
    EmailMessage {
        subject: format!("{product} Verification Code - {code}"),
        recipient: recipient.to_string(),
        body: format!(
            "<div style='font-family: Arial, sans-serif; color: #1E1E32;'>\
             <h2 style='color: #393939;'>Your {product} Verification Code</h2>\
             <p>Welcome to {product}, {username}! Please use the following verification code to complete your sign-up:</p>\
             <p style='font-size: 1.5em; font-weight: bold; color: #333;'>{code}</p>\
             <p>If you didn't request this code, please ignore this email.</p>\
             <br><p>Thanks,</p>\
             <p>The {product} Team</p>\
             </div>"
        ),
        is_html: true,
    }
}

/// Tunables of the user lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSettings {
    /// Product name shown in emails.
    pub product_name: String,
    /// Minimum delay between two verification codes.
    pub resend_interval: Duration,
    /// Lifetime of a verification code.
    pub code_ttl: Duration,
    /// Number of profile images generated per request.
    pub profile_image_count: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl UserSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            product_name: config.app.name.clone(),
            resend_interval: config.security.verification_resend_interval(),
            code_ttl: config.security.verification_ttl(),
            profile_image_count: config.providers.image_count,
        }
    }
}

/// Time elapsed since `then`, zero when `then` is in the future.
fn elapsed_since(then: chrono::DateTime<Utc>) -> Duration {
    (Utc::now() - then).to_std().unwrap_or_default()
}

/// User service implementation.
pub struct UserServiceImpl {
    users: EntityService<User>,
    hasher: Arc<dyn CredentialHasher>,
    email: Arc<dyn EmailSender>,
    images: Arc<dyn ImageGenerator>,
    settings: UserSettings,
}

impl UserServiceImpl {
    /// Creates a new user service.
    pub fn new(
        repository: EntityRepository<User>,
        hasher: Arc<dyn CredentialHasher>,
        email: Arc<dyn EmailSender>,
        images: Arc<dyn ImageGenerator>,
        settings: UserSettings,
    ) -> Self {
        Self {
            users: EntityService::new(repository),
            hasher,
            email,
            images,
            settings,
        }
    }

    fn repository(&self) -> &EntityRepository<User> {
        self.users.repository()
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    fn users(&self) -> &EntityService<User> {
        &self.users
    }

    async fn get_user_by_username(&self, username: &str) -> ResultValue<User> {
        guarded("UserService-GetUserByUsername", async move {
            Ok(self.repository().get_user_by_username(username).await)
        })
        .await
    }

    async fn create_user(&self) -> ResultValue<User> {
        guarded("UserService-CreateUser", async move {
            let salt = random_nine_digits();
            let password = self.hasher.hash(&format!("{}{salt}", random_nine_digits()))?;
            let user = self.users.upsert(User::guest(salt, password)).await.value_or_raise(None)?;

            info!(user_id = %user.id(), "Guest user created");
            Ok(ResultValue::success(user))
        })
        .await
    }

    async fn verify_user(&self, user_id: Uuid, email: &str, username: &str, password: &str) -> ResultValue<User> {
        guarded("UserService-VerifyUser", async move {
            if self.get_user_by_username(username).await.is_success() {
                return Ok(ResultValue::failure(DomainError::new("UserService-VerifyUser-E02", "Username taken")));
            }

            if self.repository().get_user_by_email(email).await.is_success() {
                return Ok(ResultValue::failure(DomainError::new(
                    "UserService-VerifyUser-E05",
                    "Email already in use, please sign in",
                )));
            }

            let mut user = self.users.get_by_id(user_id).await.value_or_raise(None)?;
            if user.is_verified || !user.is_guest {
                return Ok(ResultValue::failure(DomainError::new(
                    "UserService-VerifyUser-E03",
                    "User already signed up.",
                )));
            }

            ensure_password_strength(password).value_or_raise(None)?;

            if !validate_email(email) {
                return Ok(ResultValue::failure(DomainError::new("UserService-VerifyUser-E04", "Invalid email")));
            }

            user.email = email.to_string();
            user.username = username.to_string();
            user.password = self.hasher.hash(&format!("{password}{}", user.salt))?;
            user.is_guest = false;

            let user = self.users.upsert(user).await.value_or_raise(None)?;
            info!(user_id = %user.id(), "User signed up");

            // A failed email must not undo the sign-up.
            self.send_verification_code(user.id())
                .await
                .value_or_default_logged(false, &TracingErrorSink);

            Ok(ResultValue::success(user))
        })
        .await
    }

    async fn send_verification_code(&self, user_id: Uuid) -> ResultValue<bool> {
        guarded("UserService-SendVerificationCode", async move {
            let mut user = self.repository().get_by_id(user_id).await.value_or_raise(None)?;

            if !validate_email(&user.email) {
                return Ok(ResultValue::failure(DomainError::new(
                    "UserService-SendVerificationCode-E04",
                    "Invalid email",
                )));
            }

            if user.is_verified {
                return Ok(ResultValue::failure(DomainError::new(
                    "UserService-SendVerificationCode-E02",
                    "User is already verified.",
                )));
            }

            if user
                .verification_send_time
                .is_some_and(|sent| elapsed_since(sent) < self.settings.resend_interval)
            {
                return Ok(ResultValue::failure(DomainError::new(
                    "UserService-SendVerificationCode-E03",
                    "Already sent a code in the last minute.",
                )));
            }

            let code = random_nine_digits();
            user.verification_hash = self.hasher.hash(&format!("{code}{}", user.salt))?;
            user.verification_send_time = Some(Utc::now());

            let user = self.repository().upsert_by_id(user).await.value_or_raise(None)?;

            let message = verification_email(&self.settings.product_name, &user.email, &user.username, &code);
            self.email.send(message).await.value_or_raise(None)?;

            debug!(user_id = %user.id(), "Verification code sent");
            Ok(ResultValue::success(true))
        })
        .await
    }

    async fn verify_email(&self, user_id: Uuid, code: &str) -> ResultValue<User> {
        guarded("UserService-VerifyEmail", async move {
            let mut user = self.repository().get_by_id(user_id).await.value_or_raise(None)?;

            if user
                .verification_send_time
                .is_some_and(|sent| elapsed_since(sent) > self.settings.code_ttl)
            {
                return Ok(ResultValue::failure(DomainError::new(
                    "UserService-VerifyEmail-E03",
                    "Code has expired.",
                )));
            }

            let matches = !user.verification_hash.is_empty()
                && self.hasher.verify(&format!("{code}{}", user.salt), &user.verification_hash)?;
            if !matches {
                return Ok(ResultValue::failure(DomainError::new("UserService-VerifyEmail-E04", "Invalid code.")));
            }

            user.is_verified = true;
            let user = self.repository().upsert_by_id(user).await.value_or_raise(None)?;

            info!(user_id = %user.id(), "Email verified");
            Ok(ResultValue::success(user))
        })
        .await
    }

    async fn add_role(&self, user_id: Uuid, role: &str) -> ResultValue<User> {
        guarded("UserService-AddRole", async move {
            let mut user = self.users.get_by_id(user_id).await.value_or_raise(None)?;
            if user.has_role(role) {
                return Ok(ResultValue::failure(DomainError::validation(
                    "UserService-AddRole-E02",
                    "User already has role.",
                )));
            }

            user.roles.push(role.to_string());
            Ok(self.users.upsert(user).await)
        })
        .await
    }

    async fn set_profile_image(&self, user_id: Uuid, image_url: &str) -> ResultValue<User> {
        guarded("UserService-SetProfileImage", async move {
            let mut user = self.users.get_by_id(user_id).await.value_or_raise(None)?;
            user.profile_image_url = Some(image_url.to_string());
            Ok(self.users.upsert(user).await)
        })
        .await
    }

    async fn generate_profile_images(&self, user_id: Uuid, description: &str) -> ResultValue<Vec<String>> {
        guarded("UserService-GenerateProfileImages", async move {
            let user = self.users.get_by_id(user_id).await.value_or_raise(None)?;
            debug!(user_id = %user.id(), "Generating profile images");

            Ok(self
                .images
                .generate(description, ImageRatio::Square, self.settings.profile_image_count)
                .await)
        })
        .await
    }
}
