use serde::{Deserialize, Serialize};

/// Shown when a feed row has no image, and swapped in when an image fails to load.
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/400x220?text=No+Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Shopee,
    /// Tokopedia and TikTok Shop links share one category.
    Tiktok,
    Other,
}

impl Platform {
    /// Classify an outbound link. Plain substring match, the link itself is left alone.
    pub fn classify(link: &str) -> Self {
        match link {
            l if l.contains("shopee") => Platform::Shopee,
            l if l.contains("tokopedia") || l.contains("tiktok") => Platform::Tiktok,
            _ => Platform::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Shopee => "shopee",
            Platform::Tiktok => "tiktok",
            Platform::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Shopee => "Shopee",
            Platform::Tiktok => "TikTok",
            Platform::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub title: String,
    pub link: String,
    pub image: String,
    pub platform: Platform,
}

impl Product {
    pub fn new(code: &str, title: &str, link: &str, image: &str) -> Self {
        let image = if image.is_empty() { DEFAULT_IMAGE } else { image };
        Self {
            code: code.to_string(),
            title: title.to_string(),
            link: link.to_string(),
            image: image.to_string(),
            platform: Platform::classify(link),
        }
    }

    /// Case-insensitive match on code or title. `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.code.to_lowercase().contains(needle) || self.title.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shopee_link() {
        assert_eq!(Platform::classify("https://shopee.co.id/item/123"), Platform::Shopee);
    }

    #[test]
    fn tokopedia_and_tiktok_unified() {
        assert_eq!(Platform::classify("https://www.tokopedia.com/shop/x"), Platform::Tiktok);
        assert_eq!(Platform::classify("https://shop.tiktok.com/view/1"), Platform::Tiktok);
    }

    #[test]
    fn unknown_link_is_other() {
        assert_eq!(Platform::classify("https://example.com/p/1"), Platform::Other);
        assert_eq!(Platform::classify(""), Platform::Other);
    }

    #[test]
    fn classification_is_case_sensitive() {
        assert_eq!(Platform::classify("https://SHOPEE.co.id"), Platform::Other);
    }

    #[test]
    fn empty_image_gets_placeholder() {
        let p = Product::new("A1", "Mug", "https://shopee.co.id/a", "");
        assert_eq!(p.image, DEFAULT_IMAGE);
        assert_eq!(p.platform, Platform::Shopee);
        assert_eq!(p.link, "https://shopee.co.id/a");
    }

    #[test]
    fn platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Tiktok).unwrap();
        assert_eq!(json, "\"tiktok\"");
    }
}
