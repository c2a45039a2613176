use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// The canonical content a workspace API request is signed over.
///
/// `verb\npath\nmd5(body)\ncontent-type\nnonce\n`, where the md5 and the hmac are both hex
/// encoded before being base64 encoded into headers.
#[derive(Debug)]
pub(crate) struct HmacContent {
    method: String,
    path: String,
    md5: String,
    content_type: String,
    pub(crate) nonce: String,
}

impl HmacContent {
    pub(crate) fn new(method: &str, path: &str, body: &str, content_type: &str) -> Self {
        Self::with_nonce(
            method,
            path,
            body,
            content_type,
            chrono::Utc::now().timestamp_millis().to_string(),
        )
    }

    pub(crate) fn with_nonce(
        method: &str,
        path: &str,
        body: &str,
        content_type: &str,
        nonce: String,
    ) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            md5: format!("{:x}", md5::compute(body.as_bytes())),
            content_type: content_type.to_string(),
            nonce,
        }
    }

    pub(crate) fn content_md5(&self) -> String {
        STANDARD.encode(self.md5.as_bytes())
    }

    /// Value of the `X-Authorization` header: `key:base64(hex(hmac))`
    pub(crate) fn authorization(
        &self,
        api_key: &str,
        api_secret: &str,
    ) -> Result<String, InvalidLength> {
        let mut mac = Hmac::<Sha256>::new_from_slice(api_secret.as_bytes())?;
        mac.update(self.to_string().as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}:{}", api_key, STANDARD.encode(digest.as_bytes())))
    }
}

impl std::fmt::Display for HmacContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}\n{}\n",
            self.method, self.path, self.md5, self.content_type, self.nonce
        )
    }
}
