use crate::review::{PLATFORM_G2, Review};

/// Create a `Review` with sensible defaults for tests.
pub fn make_review(id: u32, tags: &[&str]) -> Review {
    Review {
        id,
        review_id: 1000 + i64::from(id),
        author: format!("Reviewer {id}"),
        platform: PLATFORM_G2.to_string(),
        title: format!("Review {id}"),
        post_content: "Solid DNS management.".to_string(),
        reply_contents: String::new(),
        timestamp: "2025-04-20T15:32:00Z".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        rating: 4,
    }
}

/// One upstream review item as the G2 API returns it.
pub fn upstream_item(review_id: i64, title: &str, rating: f64) -> serde_json::Value {
    serde_json::json!({
        "review_id": review_id,
        "review_title": title,
        "review_content": format!("What do you like best about it?\nAnswer for {title}\n\n"),
        "review_question_answers": [],
        "review_rating": rating,
        "reviewer": {
            "name": format!("Author {review_id}"),
            "job_title": "Network Engineer",
            "link": "",
            "company_size": "Enterprise"
        },
        "publish_date": "2025-03-01T00:00:00Z",
        "review_link": format!("https://www.g2.com/survey_responses/{review_id}")
    })
}

/// A full upstream response body with the given categories and item arrays.
pub fn upstream_body(
    categories: &[&str],
    initial: Vec<serde_json::Value>,
    all: Vec<serde_json::Value>,
) -> String {
    serde_json::json!({
        "product_id": 42,
        "product_name": "BloxOne DDI",
        "categories": categories.iter().map(|c| serde_json::json!({ "name": c })).collect::<Vec<_>>(),
        "initial_reviews": initial,
        "all_reviews": all,
    })
    .to_string()
}
