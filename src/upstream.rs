use serde::{Deserialize, Deserializer};

use crate::normalize::normalize_content;
use crate::review::{PLATFORM_G2, Review};

// ---------------------------------------------------------------------------
// G2 response types
// ---------------------------------------------------------------------------

/// Treat an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct G2Reviewer {
    #[serde(alias = "reviewer_name", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(alias = "reviewer_job_title", deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(alias = "reviewer_link", deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(alias = "reviewer_company_size", deserialize_with = "null_as_default")]
    pub company_size: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct G2QuestionAnswer {
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct G2ReviewItem {
    #[serde(deserialize_with = "null_as_default")]
    pub review_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub review_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub review_content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub review_question_answers: Vec<G2QuestionAnswer>,
    #[serde(deserialize_with = "null_as_default")]
    pub review_rating: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub reviewer: G2Reviewer,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub review_link: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct G2Category {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct G2Response {
    pub product_id: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<G2Category>,
    #[serde(deserialize_with = "null_as_default")]
    pub initial_reviews: Vec<G2ReviewItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub all_reviews: Vec<G2ReviewItem>,
}

impl G2Response {
    /// The review items to translate.
    ///
    /// `initial_reviews` and `all_reviews` usually repeat each other, so the
    /// two are never merged: `all_reviews` is only used when `initial_reviews`
    /// is empty.
    pub fn review_items(&self) -> &[G2ReviewItem] {
        if self.initial_reviews.is_empty() {
            &self.all_reviews
        } else {
            &self.initial_reviews
        }
    }

    /// Non-empty category names, in response order.
    pub fn category_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| !c.name.is_empty())
            .map(|c| c.name.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Map one upstream item into a canonical `Review`.
///
/// Tags are the product identifier followed by the response's category
/// names. G2 does not separate vendor replies, so `reply_contents` is empty.
pub fn translate_item(id: u32, item: &G2ReviewItem, product: &str, categories: &[String]) -> Review {
    let mut tags = Vec::with_capacity(categories.len() + 1);
    tags.push(product.to_string());
    tags.extend(categories.iter().filter(|c| !c.is_empty()).cloned());

    Review {
        id,
        review_id: item.review_id,
        author: item.reviewer.name.clone(),
        platform: PLATFORM_G2.to_string(),
        title: item.review_title.clone(),
        post_content: normalize_content(&item.review_content),
        reply_contents: String::new(),
        timestamp: item.publish_date.clone(),
        tags,
        // `as` truncates toward zero: 4.9 -> 4
        rating: item.review_rating as i32,
    }
}

/// Translate every selected item of a response, numbering them from 1.
pub fn translate_response(response: &G2Response, product: &str) -> Vec<Review> {
    let categories = response.category_names();
    response
        .review_items()
        .iter()
        .enumerate()
        .map(|(i, item)| translate_item(i as u32 + 1, item, product, &categories))
        .collect()
}
