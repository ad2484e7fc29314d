//! Dependency wiring.
//!
//! Stateless infrastructure (document store, password hasher) lives in a
//! Shaku module; services are assembled on top of it together with the
//! caller's actor provider and the external provider clients.

use crate::auth_service::{AuthService, AuthServiceImpl};
use crate::clients::{EmailSender, ImageGenerator};
use crate::image_generation_service::ImageGenerationService;
use crate::user_service::{UserService, UserServiceImpl, UserSettings};
use atelier_config::{AppConfig, ConfigLoader, SecurityConfig};
use atelier_core::telemetry::init_telemetry;
use atelier_core::{ActorProvider, DomainResult};
use atelier_repository::{DocumentStore, EntityRepository, InMemoryDocumentStore};
use atelier_security::{CredentialHasher, PasswordHasher, PasswordHasherParameters};
use shaku::{module, HasComponent};
use std::sync::Arc;
use tracing::{info, warn};

module! {
    pub InfrastructureModule {
        components = [
            InMemoryDocumentStore,
            PasswordHasher,
        ],
        providers = [],
    }
}

/// Builds the infrastructure module with the configured hashing cost.
pub fn build_infrastructure(security: &SecurityConfig) -> Arc<InfrastructureModule> {
    let password_hasher = PasswordHasher::from_config(security);

    let module = InfrastructureModule::builder()
        .with_component_parameters::<PasswordHasher>(PasswordHasherParameters {
            argon2: password_hasher.argon2_arc(),
        })
        .build();

    Arc::new(module)
}

/// The assembled service layer.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UserService>,
    pub auth: Arc<dyn AuthService>,
    pub images: Arc<ImageGenerationService>,
}

impl Services {
    /// Wires every service over the given collaborators.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn DocumentStore>,
        hasher: Arc<dyn CredentialHasher>,
        actor: Arc<dyn ActorProvider>,
        email: Arc<dyn EmailSender>,
        generator: Arc<dyn ImageGenerator>,
    ) -> Self {
        let users: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(
            EntityRepository::new(Arc::clone(&store), Arc::clone(&actor)),
            Arc::clone(&hasher),
            email,
            Arc::clone(&generator),
            UserSettings::from_config(config),
        ));
        let auth: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(Arc::clone(&users), hasher));
        let images = Arc::new(ImageGenerationService::new(EntityRepository::new(store, actor), generator));

        Self { users, auth, images }
    }

    /// Wires every service over the components of `module`.
    pub fn from_module(
        module: &InfrastructureModule,
        config: &AppConfig,
        actor: Arc<dyn ActorProvider>,
        email: Arc<dyn EmailSender>,
        generator: Arc<dyn ImageGenerator>,
    ) -> Self {
        let store: Arc<dyn DocumentStore> = module.resolve();
        let hasher: Arc<dyn CredentialHasher> = module.resolve();
        Self::new(config, store, hasher, actor, email, generator)
    }
}

/// Loads configuration from `config_dir`, installs logging and wires the
/// services.
///
/// A logging subscriber installed earlier by the host is kept.
///
/// # Errors
///
/// Configuration load or validation failures.
pub async fn bootstrap(
    config_dir: &str,
    actor: Arc<dyn ActorProvider>,
    email: Arc<dyn EmailSender>,
    generator: Arc<dyn ImageGenerator>,
) -> DomainResult<(AppConfig, Services)> {
    let loader = ConfigLoader::new(config_dir)?;
    let config = loader.get().await;

    if let Err(err) = init_telemetry(&config.observability.telemetry()) {
        warn!(error_code = %err.error_code(), "Keeping the existing log subscriber");
    }

    let module = build_infrastructure(&config.security);
    let services = Services::from_module(&module, &config, actor, email, generator);

    info!(app = %config.app.name, environment = %config.app.environment, "Services ready");
    Ok((config, services))
}
