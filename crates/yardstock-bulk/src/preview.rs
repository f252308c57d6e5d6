//! Scoped acquisition of image preview handles.
//!
//! Every [`ImageAttachment`] is created through [`PreviewRegistry::attach`],
//! which issues its preview handle, and must leave through
//! [`PreviewRegistry::dispose`] (or a bulk release) so the handle is
//! returned. `live_count` makes leaks observable in tests.

use std::collections::HashMap;
use std::sync::Arc;

use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

use yardstock_core::{ImageAttachment, PreviewHandle, UploadedFile};

const ATTACHMENT_ID_LEN: usize = 8;
const DIGEST_HEX_LEN: usize = 12;

#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<String, PreviewHandle>,
}

impl PreviewRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `source` to a new attachment with a freshly derived preview.
    pub fn attach(&mut self, source: Arc<UploadedFile>) -> ImageAttachment {
        let id = self.unused_id();
        let preview = PreviewHandle {
            attachment_id: id.clone(),
            digest: content_digest(&source.bytes),
        };
        self.live.insert(id.clone(), preview.clone());
        tracing::debug!(attachment_id = %id, file = %source.name, "preview acquired");

        ImageAttachment {
            id,
            declared_name: source.name.clone(),
            size: source.size,
            mime_type: source.mime_type.clone(),
            preview,
            source,
        }
    }

    /// Releases the attachment's preview. Returns `false` if the handle was
    /// not issued by this registry or was already released.
    pub fn dispose(&mut self, attachment: ImageAttachment) -> bool {
        let released = self.live.remove(&attachment.preview.attachment_id).is_some();
        if released {
            tracing::debug!(attachment_id = %attachment.id, "preview released");
        } else {
            tracing::warn!(attachment_id = %attachment.id, "preview was not live");
        }
        released
    }

    /// Releases every preview in `attachments`, returning how many were live.
    pub fn dispose_all(&mut self, attachments: impl IntoIterator<Item = ImageAttachment>) -> usize {
        attachments
            .into_iter()
            .map(|a| usize::from(self.dispose(a)))
            .sum()
    }

    /// Drops every outstanding handle, returning how many were live.
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        if count > 0 {
            tracing::debug!(count, "released all previews");
        }
        count
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_live(&self, attachment_id: &str) -> bool {
        self.live.contains_key(attachment_id)
    }

    fn unused_id(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let candidate: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(ATTACHMENT_ID_LEN)
                .map(char::from)
                .collect();
            if !self.live.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

fn content_digest(bytes: &[u8]) -> String {
    let hex = format!("{:x}", Sha256::digest(bytes));
    hex[..DIGEST_HEX_LEN].to_string()
}
