use serde::{Deserialize, Serialize};

/// Platform label stamped on every record pulled from the G2 API.
pub const PLATFORM_G2: &str = "G2";

/// Canonical review record written to the output file.
///
/// Field names follow the downstream consumer's JSON contract, which is why a
/// few of them are not snake_case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: u32,
    #[serde(rename = "reviewID")]
    pub review_id: i64,
    pub author: String,
    pub platform: String,
    #[serde(rename = "Title", alias = "title")]
    pub title: String,
    #[serde(rename = "Postcontent")]
    pub post_content: String,
    #[serde(rename = "replyContents")]
    pub reply_contents: String,
    pub timestamp: String,
    pub tags: Vec<String>,
    pub rating: i32,
}

impl Review {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Append `product` to the tag set unless it is already there.
    pub fn ensure_tag(&mut self, product: &str) {
        if !self.has_tag(product) {
            self.tags.push(product.to_string());
        }
    }
}
