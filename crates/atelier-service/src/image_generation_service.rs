//! Image generation: calls the image provider and stores every result.

use crate::clients::ImageGenerator;
use crate::entity_service::EntityService;
use atelier_core::domain::{ImageGeneration, ImageRatio, ImageResultDto};
use atelier_core::{guarded, DomainResult, ResultValue};
use atelier_repository::EntityRepository;
use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

/// [`EntityService`] for [`ImageGeneration`] plus generation.
pub struct ImageGenerationService {
    images: EntityService<ImageGeneration>,
    generator: Arc<dyn ImageGenerator>,
}

impl ImageGenerationService {
    #[must_use]
    pub fn new(repository: EntityRepository<ImageGeneration>, generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            images: EntityService::new(repository),
            generator,
        }
    }

    pub const fn images(&self) -> &EntityService<ImageGeneration> {
        &self.images
    }

    /// Generates `count` images and stores one [`ImageGeneration`] per URL.
    ///
    /// The records are written concurrently; the first failed write fails
    /// the whole call.
    pub async fn generate_images(&self, prompt: &str, ratio: ImageRatio, count: usize) -> ResultValue<Vec<ImageGeneration>> {
        guarded("ImageGenerationService-GenerateImages", async move {
            let urls = self.generator.generate(prompt, ratio, count).await.value_or_raise(None)?;

            let writes = urls
                .into_iter()
                .map(|url| self.images.upsert(ImageGeneration::new(prompt, url)));
            let stored = join_all(writes)
                .await
                .into_iter()
                .map(|result| result.value_or_raise(None))
                .collect::<DomainResult<Vec<_>>>()?;

            info!(count = stored.len(), ratio = %ratio, "Stored generated images");
            Ok(ResultValue::success(stored))
        })
        .await
    }

    /// [`ImageGenerationService::generate_images`] shaped as response bodies.
    pub async fn generate_image_results(&self, prompt: &str, ratio: ImageRatio, count: usize) -> ResultValue<Vec<ImageResultDto>> {
        self.generate_images(prompt, ratio, count)
            .await
            .map(|images| images.iter().map(ImageResultDto::from).collect())
    }
}
