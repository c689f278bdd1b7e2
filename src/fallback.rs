use chrono::{DateTime, Months, SecondsFormat, Utc};
use tracing::info;

use crate::normalize::normalize_content;
use crate::review::{PLATFORM_G2, Review};

/// Synthetic records for `product`, stamped relative to the current time.
pub fn generate(product: &str) -> Vec<Review> {
    generate_at(product, Utc::now())
}

/// Two fixed-shape records: one dated `now`, one a month earlier.
pub fn generate_at(product: &str, now: DateTime<Utc>) -> Vec<Review> {
    info!(product, "creating fallback reviews");

    let month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now);

    let first_body = format!(
        "What do you like best about {product}?\n\
         Great DNS tool and all core network services are centrally managed\n\
         \n\
         What do you dislike about {product}?\n\
         The license price is very high and the feeds are limited for threat intel\n\
         \n\
         What problems is {product} solving and how is that benefiting you?\n\
         Assists us in protecting the DNS service"
    );

    vec![
        Review {
            id: 1,
            review_id: 101,
            author: "John Doe".to_string(),
            platform: PLATFORM_G2.to_string(),
            title: format!("Great experience with {product}"),
            post_content: normalize_content(&first_body),
            reply_contents: "Thank you for your review! We're glad you're enjoying our product."
                .to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            tags: vec!["Enterprise".to_string(), "Easy to use".to_string(), product.to_string()],
            rating: 5,
        },
        Review {
            id: 2,
            review_id: 102,
            author: "Jane Smith".to_string(),
            platform: PLATFORM_G2.to_string(),
            title: format!("Mixed feelings about {product}"),
            post_content: normalize_content(&format!(
                "The {product} product has good features but the UI needs improvement."
            )),
            reply_contents: String::new(),
            timestamp: month_ago.to_rfc3339_opts(SecondsFormat::Secs, true),
            tags: vec!["Mid-market".to_string(), product.to_string()],
            rating: 3,
        },
    ]
}
