//! Provider specific [`ImageGenerationClient`](crate::image_generation::ImageGenerationClient)
//! implementations.

pub mod gemini;
