use std::{path::PathBuf, sync::LazyLock};

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;

use crate::models::{BRAND_NAME, OrderState};

pub const PNG_MIME_TYPE: &str = "image/png";

const FILE_PREFIX: &str = "cake-order-";
const FALLBACK_SLUG: &str = "customer";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// The exported image, ready to be shared or saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn png(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: PNG_MIME_TYPE,
            bytes,
        }
    }
}

/// Lowercased customer name with whitespace runs collapsed to `-` and
/// characters that are reserved in file names removed.
///
/// Falls back to `customer` when nothing usable is left.
pub fn file_slug(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    let slug = WHITESPACE_RUN.replace_all(cleaned.trim(), "-");
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.into_owned()
    }
}

/// `cake-order-<slug>.png`
pub fn export_file_name(customer_name: &str) -> String {
    format!("{FILE_PREFIX}{}.png", file_slug(customer_name))
}

/// Title and body passed to the platform share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub text: String,
}

impl ShareRequest {
    pub fn for_order(state: &OrderState) -> Self {
        let name = state.name().trim();
        Self {
            title: format!("{BRAND_NAME} Cake Order"),
            text: format!("Cake order for {name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// The user dismissed the share sheet. Not a failure.
    #[error("share was cancelled")]
    Cancelled,

    #[error("share failed: {0}")]
    Failed(String),
}

/// The platform's native share mechanism.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Whether the platform can share this particular file.
    fn can_share(
        &self,
        file: &ExportFile,
    ) -> bool;

    async fn share(
        &self,
        file: &ExportFile,
        request: &ShareRequest,
    ) -> Result<(), ShareError>;
}

/// A platform without native file sharing; every export downloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNativeShare;

#[async_trait]
impl ShareTarget for NoNativeShare {
    fn can_share(
        &self,
        _file: &ExportFile,
    ) -> bool {
        false
    }

    async fn share(
        &self,
        _file: &ExportFile,
        _request: &ShareRequest,
    ) -> Result<(), ShareError> {
        Err(ShareError::Failed("native share is not available".to_string()))
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("no download location is available")]
    NoLocation,

    #[error("could not write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Direct download: hands the file to the user synchronously.
pub trait Downloader: Send + Sync {
    /// Returns where the file ended up.
    fn download(
        &self,
        file: &ExportFile,
    ) -> Result<PathBuf, DownloadError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::TextField;

    #[test]
    fn slug_lowercases_and_collapses_whitespace() {
        assert_eq!(file_slug("Jane   Smith"), "jane-smith");
        assert_eq!(file_slug("  Mary\tAnn  Lee "), "mary-ann-lee");
    }

    #[test]
    fn slug_strips_reserved_characters() {
        assert_eq!(file_slug("A/B: C?"), "ab-c");
    }

    #[test]
    fn slug_keeps_non_ascii_letters() {
        assert_eq!(file_slug("Adéọlá Ògún"), "adéọlá-ògún");
    }

    #[test]
    fn empty_name_falls_back_to_generic_slug() {
        assert_eq!(file_slug(""), "customer");
        assert_eq!(file_slug("   "), "customer");
        assert_eq!(file_slug("///"), "customer");
    }

    #[test]
    fn export_file_name_follows_the_pattern() {
        assert_eq!(export_file_name("John Doe"), "cake-order-john-doe.png");
    }

    #[test]
    fn share_request_mentions_the_customer() {
        let mut state = OrderState::default();
        state.set_text(TextField::Name, " Jane Smith ");

        let request = ShareRequest::for_order(&state);

        assert_eq!(request.title, "Dídùn Cake Order");
        assert_eq!(request.text, "Cake order for Jane Smith");
    }

    #[tokio::test]
    async fn no_native_share_never_offers_sharing() {
        let file = ExportFile::png("x.png", vec![1, 2, 3]);

        assert!(!NoNativeShare.can_share(&file));
        assert!(NoNativeShare
            .share(&file, &ShareRequest::for_order(&OrderState::default()))
            .await
            .is_err());
    }
}
