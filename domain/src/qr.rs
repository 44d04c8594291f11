//! Short-URL and QR request-URL construction.
//!
//! Only the request URL for the image service is computed here; fetching the
//! image and laying out sticker sheets happen elsewhere.

use crate::Slug;

pub const DEFAULT_SHORT_DOMAIN: &str = "https://aws3.link";
pub const DEFAULT_QR_PROVIDER: &str = "https://quickchart.io";
pub const DEFAULT_QR_SIZE: u32 = 100;

/// Where short links live and how QR images are requested for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSettings {
    pub short_domain: String,
    pub qr_provider: String,
    pub qr_size: u32,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            short_domain: DEFAULT_SHORT_DOMAIN.to_string(),
            qr_provider: DEFAULT_QR_PROVIDER.to_string(),
            qr_size: DEFAULT_QR_SIZE,
        }
    }
}

impl LinkSettings {
    /// `<short_domain>/<key>`.
    pub fn short_url(&self, key: &Slug) -> String {
        format!("{}/{}", self.short_domain.trim_end_matches('/'), key.as_str())
    }

    /// `<provider>/qr?size=<n>&text=<text>` with the configured size.
    pub fn qr_url(&self, text: &str) -> String {
        self.qr_url_sized(text, self.qr_size)
    }

    pub fn qr_url_sized(&self, text: &str, size: u32) -> String {
        format!(
            "{}/qr?size={}&text={}",
            self.qr_provider.trim_end_matches('/'),
            size,
            text
        )
    }
}

/// A key plus everything needed to print it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrLink {
    pub url_key: Slug,
    pub short_url: String,
    pub qr_url: String,
}

/// One sticker of a numbered run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrSticker {
    pub index: u64,
    /// The text encoded in the QR image, `<base><index>`.
    pub text: String,
    pub qr_url: String,
}

/// QR request URLs for the numbered run `base+start .. base+start+count`,
/// e.g. `aws3.link/llqrv` with indices 100..148 for one letter-size sheet.
pub fn qr_range(settings: &LinkSettings, base: &str, start: u64, count: u64) -> Vec<QrSticker> {
    (start..start.saturating_add(count))
        .map(|index| {
            let text = format!("{base}{index}");
            QrSticker {
                index,
                qr_url: settings.qr_url(&text),
                text,
            }
        })
        .collect()
}
