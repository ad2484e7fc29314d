//! Common test infrastructure: in-memory store and fake providers.

#![allow(dead_code)]

use atelier_config::AppConfig;
use atelier_core::domain::{ImageRatio, User};
use atelier_core::{DomainError, Entity, FixedActor, ResultValue};
use atelier_repository::{DocumentStore, EntityRepository, InMemoryDocumentStore};
use atelier_security::{CredentialHasher, PasswordHasher};
use atelier_service::{EmailMessage, EmailSender, ImageGenerator, Services};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Email sender that keeps every message.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent.lock().last().cloned()
    }

    /// Makes every following send fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Code carried by the last message's subject.
    pub fn last_code(&self) -> String {
        let subject = self.last().expect("an email was sent").subject;
        subject.rsplit(' ').next().unwrap_or_default().to_string()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> ResultValue<bool> {
        if self.failing.load(Ordering::SeqCst) {
            return ResultValue::failure(DomainError::internal("EmailClient-SendEmail-E01", "Provider rejected the message"));
        }
        self.sent.lock().push(message);
        ResultValue::success(true)
    }
}

/// Image generator returning predictable URLs.
#[derive(Default)]
pub struct FakeImageGenerator {
    calls: Mutex<Vec<(String, ImageRatio, usize)>>,
}

impl FakeImageGenerator {
    pub fn calls(&self) -> Vec<(String, ImageRatio, usize)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeImageGenerator {
    async fn generate(&self, prompt: &str, ratio: ImageRatio, count: usize) -> ResultValue<Vec<String>> {
        self.calls.lock().push((prompt.to_string(), ratio, count));
        ResultValue::success((0..count).map(|n| format!("https://images.test/{}/{n}.png", ratio.size())).collect())
    }
}

/// Services wired over an in-memory store and fake providers.
pub struct TestContext {
    pub config: AppConfig,
    pub store: Arc<InMemoryDocumentStore>,
    pub hasher: Arc<PasswordHasher>,
    pub email: Arc<RecordingEmailSender>,
    pub generator: Arc<FakeImageGenerator>,
    pub actor_id: Uuid,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.app.name = "Studio".to_string();
        config.security.password_hash_memory_kib = 64;
        config.security.password_hash_iterations = 1;

        let store = Arc::new(InMemoryDocumentStore::new());
        let hasher = Arc::new(PasswordHasher::from_config(&config.security));
        let email = Arc::new(RecordingEmailSender::default());
        let generator = Arc::new(FakeImageGenerator::default());
        let actor_id = Uuid::now_v7();

        let services = Services::new(
            &config,
            store.clone(),
            hasher.clone(),
            Arc::new(FixedActor(actor_id)),
            email.clone(),
            generator.clone(),
        );

        Self {
            config,
            store,
            hasher,
            email,
            generator,
            actor_id,
            services,
        }
    }

    /// Direct repository access for arranging state.
    pub fn users(&self) -> EntityRepository<User> {
        let store: Arc<dyn DocumentStore> = self.store.clone();
        EntityRepository::new(store, Arc::new(FixedActor(self.actor_id)))
    }

    /// A guest turned into a signed-up user, with a code emailed.
    pub async fn signed_up(&self, email: &str, username: &str) -> User {
        let guest = self.services.users.create_user().await.value_or_raise(None).unwrap();
        self.services
            .users
            .verify_user(guest.id(), email, username, "Sup3rSecret")
            .await
            .value_or_raise(None)
            .unwrap()
    }

    pub fn password_matches(&self, user: &User, password: &str) -> bool {
        self.hasher.verify(&format!("{password}{}", user.salt), &user.password).unwrap()
    }
}
