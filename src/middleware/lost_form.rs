use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::LostFoundError;
use crate::router::LostFoundState;

const DESCRIPTION_FIELD: &str = "description";
const IMAGE_FIELD: &str = "image";
const ATTRIBUTES_FIELD: &str = "attributes";

/// An image part that has been fully written to the upload directory.
#[derive(Debug, Clone)]
pub struct SavedImage {
    pub name: String,
    pub path: PathBuf,
    /// Served path stored on the record, e.g. `/uploads/{name}`.
    pub public_path: String,
}

/// Parsed `POST /lost` form. The image, if any, is already on disk.
#[derive(Debug)]
pub struct LostSubmission {
    pub description: String,
    /// Client-supplied attributes, already validated. Blank or `null` counts as absent.
    pub attributes: Option<Value>,
    pub image: Option<SavedImage>,
}

impl FromRequest<LostFoundState> for LostSubmission {
    type Rejection = LostFoundError;

    async fn from_request(req: Request, state: &LostFoundState) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| LostFoundError::FormParse(rejection.body_text()))?;

        let mut image = None;
        match parse_fields(multipart, state, &mut image).await {
            Ok((description, attributes)) => Ok(LostSubmission {
                description,
                attributes,
                image,
            }),
            Err(e) => {
                // nothing may reference a half-parsed submission's file
                if let Some(saved) = image {
                    state.uploads.discard(&saved.path).await;
                }
                Err(e)
            }
        }
    }
}

async fn parse_fields(
    mut multipart: Multipart,
    state: &LostFoundState,
    image: &mut Option<SavedImage>,
) -> Result<(String, Option<Value>), LostFoundError> {
    let mut description: Option<String> = None;
    let mut attributes: Option<Value> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(DESCRIPTION_FIELD) => description = Some(field.text().await?),
            Some(ATTRIBUTES_FIELD) => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    // invalid JSON fails the whole form
                    attributes =
                        parse_attributes(&text).map_err(LostFoundError::InvalidAttributes)?;
                }
            }
            Some(IMAGE_FIELD) if image.is_none() => {
                let original = field.file_name().unwrap_or_default().to_string();
                if original.is_empty() {
                    // browsers send an empty, nameless part when no file was chosen
                    continue;
                }
                let upload = state.uploads.create(&original).await?;
                let public_path = upload.public_path();
                let (name, path) = (upload.name, upload.path);
                match write_field(field, upload.file).await {
                    Ok(bytes) => {
                        info!(path = %public_path, bytes, "stored upload");
                        *image = Some(SavedImage {
                            name,
                            path,
                            public_path,
                        });
                    }
                    Err(e) => {
                        state.uploads.discard(&path).await;
                        return Err(e);
                    }
                }
            }
            other => debug!(field = ?other, "ignoring multipart field"),
        }
    }

    let description = description
        .ok_or_else(|| LostFoundError::FormParse("missing `description` field".to_string()))?;
    Ok((description, attributes))
}

/// JSON `null` is the same as no attributes.
pub fn parse_attributes(text: &str) -> Result<Option<Value>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    Ok((!value.is_null()).then_some(value))
}

/// Stream one part to `file` chunk by chunk; returns bytes written.
async fn write_field(mut field: Field<'_>, mut file: File) -> Result<u64, LostFoundError> {
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(LostFoundError::FileWrite)?;
        written += chunk.len() as u64;
    }
    // the record must not point at a file still being written
    file.flush().await.map_err(LostFoundError::FileWrite)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_attributes_accepts_objects_and_treats_null_as_absent() {
        assert_eq!(
            parse_attributes(r#"{"color":"blue"}"#).unwrap(),
            Some(json!({"color": "blue"}))
        );
        assert_eq!(parse_attributes("null").unwrap(), None);
        assert!(parse_attributes("{color: blue").is_err());
    }
}
