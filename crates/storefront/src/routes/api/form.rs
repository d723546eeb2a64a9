//! Multipart form parsing for the image-bearing admin endpoints.
//!
//! Text fields are collected by name (last value wins). File fields are kept
//! in arrival order; an empty file input (no file name, no bytes) is skipped
//! the way browsers submit it when nothing was chosen.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;

use jewelbox_core::Money;

use crate::error::AppError;
use crate::services::UploadedImage;
use crate::services::images::{IMAGES_ONLY, is_allowed_image};

/// A parsed multipart body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, UploadedImage)>,
}

impl MultipartForm {
    /// Read every part of `multipart`, accepting at most `max_files` images.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a malformed body, a non-image file
    /// or too many files.
    pub async fn parse(mut multipart: Multipart, max_files: usize) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_owned) {
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;

                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if !is_allowed_image(&file_name, &content_type) {
                    return Err(AppError::BadRequest(IMAGES_ONLY.to_string()));
                }
                if form.files.len() >= max_files {
                    return Err(AppError::BadRequest(format!(
                        "At most {max_files} images may be uploaded"
                    )));
                }

                form.files.push((
                    name,
                    UploadedImage {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                ));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Build a form directly; used by tests.
    #[cfg(test)]
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            files: Vec::new(),
        }
    }

    /// Raw text value.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed text value, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        self.raw(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    /// A text value that must be present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` naming the missing field.
    pub fn required(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
    }

    /// Parse a non-blank value with `FromStr`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the value does not parse.
    pub fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid {name}: {v}")))
            })
            .transpose()
    }

    /// A money amount.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a malformed or negative amount.
    pub fn money(&self, name: &str) -> Result<Option<Money>, AppError> {
        self.text(name)
            .map(|v| Money::parse(&v).map_err(AppError::from))
            .transpose()
    }

    /// A checkbox or boolean field: `true`, `on`, `1` and `yes` are true.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.text(name).map(|v| {
            matches!(
                v.to_ascii_lowercase().as_str(),
                "true" | "on" | "1" | "yes"
            )
        })
    }

    /// Uploaded images for a field, in arrival order.
    pub fn files<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UploadedImage> + 'a {
        self.files
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, file)| file)
    }

    /// The first uploaded image for a field.
    pub fn file<'a>(&'a self, name: &'a str) -> Option<&'a UploadedImage> {
        self.files(name).next()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_trims_and_drops_blanks() {
        let form = MultipartForm::from_fields([("name", "  Ring "), ("description", "   ")]);
        assert_eq!(form.text("name").as_deref(), Some("Ring"));
        assert_eq!(form.text("description"), None);
        assert_eq!(form.raw("description"), Some("   "));
        assert!(form.required("description").is_err());
    }

    #[test]
    fn test_flag_values() {
        let form = MultipartForm::from_fields([("a", "true"), ("b", "on"), ("c", "false")]);
        assert_eq!(form.flag("a"), Some(true));
        assert_eq!(form.flag("b"), Some(true));
        assert_eq!(form.flag("c"), Some(false));
        assert_eq!(form.flag("missing"), None);
    }

    #[test]
    fn test_money_and_parsed() {
        let form = MultipartForm::from_fields([("price", "120.50"), ("stock", "x")]);
        assert_eq!(
            form.money("price").unwrap(),
            Some(Money::parse("120.50").unwrap())
        );
        assert!(form.parsed::<i32>("stock").is_err());
        assert_eq!(form.parsed::<i32>("missing").unwrap(), None);
    }

    #[test]
    fn test_file_lookup_with_borrowed_name() {
        let form = MultipartForm::from_fields([("name", "Ring")]);
        let field = String::from("image");
        assert!(form.file(&field).is_none());
        assert_eq!(form.files(&field).count(), 0);
    }
}
