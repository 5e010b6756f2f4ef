use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::product::Product;

pub const DEFAULT_FEED_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQTc9JpCGgKdNK_bjag5W5VuF7XdrdfekxI7VFKH8-PAyzakBWpmL7sdwPFUv5ElxVhhHGqMiYoHGrG/pub?output=csv";

const DELIMITER: char = ',';
const MIN_FIELDS: usize = 4;

/// Anything that can hand back the raw feed document.
#[async_trait]
pub trait FeedSource {
    async fn fetch(&self) -> Result<String>;
}

pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String> {
        info!("Fetching product feed: {}", self.url);
        let text = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
            .context("Failed to fetch product feed")?;
        Ok(text)
    }
}

/// Parse the feed into products. The first line is a header.
///
/// Rows with fewer than four fields are dropped. Quoting is not understood:
/// a field that itself contains a comma shifts every column after it.
pub fn parse_feed(text: &str) -> Vec<Product> {
    let mut dropped = 0usize;
    let products: Vec<Product> = text
        .split('\n')
        .skip(1)
        .filter_map(|row| {
            let cols: Vec<&str> = row.split(DELIMITER).collect();
            if cols.len() < MIN_FIELDS {
                dropped += 1;
                return None;
            }
            Some(Product::new(
                cols[0].trim(),
                cols[1].trim(),
                cols[2].trim(),
                cols[3].trim(),
            ))
        })
        .collect();

    debug!("Parsed {} products, dropped {} short rows", products.len(), dropped);
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Platform, DEFAULT_IMAGE};

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/products.csv").unwrap()
    }

    #[test]
    fn header_is_skipped() {
        let products = parse_feed("code,title,link,image\nA1,Mug,https://x.com,img.png");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].code, "A1");
    }

    #[test]
    fn rows_keep_order_and_ignore_extra_fields() {
        let text = "h\n1,One,l1,i1,extra,more\n2,Two,l2,i2\n3,Three,l3,i3";
        let products = parse_feed(text);
        let codes: Vec<&str> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["1", "2", "3"]);
        assert_eq!(products[0].image, "i1");
    }

    #[test]
    fn short_rows_are_dropped() {
        let text = "h\n1,One,l1,i1\n2,Two,l2\n\n3,Three,l3,i3\nonly";
        let products = parse_feed(text);
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].code, "3");
    }

    #[test]
    fn fields_are_trimmed_and_crlf_tolerated() {
        let products = parse_feed("h\r\n  7 , Blue Shirt ,https://shopee.co.id/7 , pic.jpg \r\n");
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.code, "7");
        assert_eq!(p.title, "Blue Shirt");
        assert_eq!(p.image, "pic.jpg");
        assert_eq!(p.platform, Platform::Shopee);
    }

    #[test]
    fn blank_image_gets_placeholder() {
        let products = parse_feed("h\n1,One,l1,   \n2,Two,l2,real.png");
        assert_eq!(products[0].image, DEFAULT_IMAGE);
        assert_eq!(products[1].image, "real.png");
    }

    #[test]
    fn quoted_comma_misaligns_row() {
        let products = parse_feed("h\n1,\"Shirt, blue\",https://shopee.co.id/1,img.png");
        assert_eq!(products[0].title, "\"Shirt");
        assert_eq!(products[0].link, "blue\"");
    }

    #[test]
    fn empty_document() {
        assert!(parse_feed("").is_empty());
        assert!(parse_feed("code,title,link,image").is_empty());
    }

    #[test]
    fn fixture_feed() {
        let products = parse_feed(&fixture());
        assert_eq!(products.len(), 17);
        assert_eq!(products[0].platform, Platform::Shopee);
        assert_eq!(products[1].platform, Platform::Tiktok);
        assert!(products.iter().any(|p| p.image == DEFAULT_IMAGE));
    }
}
