pub mod attributes;
pub mod uploads;

pub use attributes::{AttributeGenerator, OllamaAttributeGenerator};
pub use uploads::UploadStore;
