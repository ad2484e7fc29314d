//! Request and response bodies.

use crate::record;

record! {
    /// A single text value.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StringDto {
        pub value: String => "value",
    }
}

record! {
    /// A generated image and the prompt that produced it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ImageResultDto {
        pub image_url: String => "imageUrl",
        pub image_prompt: String => "imagePrompt",
    }
}
