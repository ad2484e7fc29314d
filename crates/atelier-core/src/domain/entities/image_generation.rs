//! Generated image entity.

use crate::domain::dto::ImageResultDto;
use crate::{entity, AuditInfo};

entity! {
    /// An image produced from a prompt.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ImageGeneration {
        pub prompt: String => "prompt",
        pub image_url: String => "imageUrl",
    }
}

impl ImageGeneration {
    #[must_use]
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            audit: AuditInfo::new(),
            prompt: prompt.into(),
            image_url: image_url.into(),
        }
    }
}

impl From<&ImageGeneration> for ImageResultDto {
    fn from(image: &ImageGeneration) -> Self {
        Self {
            image_url: image.image_url.clone(),
            image_prompt: image.prompt.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entity, Record};

    #[test]
    fn test_names() {
        assert_eq!(ImageGeneration::collection_name(), "imageGenerations");
        assert_eq!(ImageGeneration::route_prefix(), "/image-generations");
    }

    #[test]
    fn test_export() {
        let image = ImageGeneration::new("a fox", "https://img/1.png");
        let json = image.export(true).to_json();
        assert_eq!(json["prompt"], "a fox");
        assert_eq!(json["imageUrl"], "https://img/1.png");
        assert!(json["createdDate"].is_null());
    }

    #[test]
    fn test_into_result_dto() {
        let dto = ImageResultDto::from(&ImageGeneration::new("a fox", "https://img/1.png"));
        assert_eq!(dto.image_url, "https://img/1.png");
        assert_eq!(dto.image_prompt, "a fox");
    }
}
