pub mod lost_form;

pub use lost_form::{LostSubmission, SavedImage, parse_attributes};
