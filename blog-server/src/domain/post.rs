use std::fmt;

use chrono::{DateTime, Utc};

use super::error::DomainError;

pub(crate) const TITLE_MAX_CHARS: usize = 200;

/// A blog post. `published_date == None` means the post is still a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) created_date: DateTime<Utc>,
    pub(crate) published_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
        })
    }
}

impl Post {
    /// Rebuilds a post from stored fields, rejecting rows that break the model.
    pub(crate) fn new(
        id: i64,
        author_id: i64,
        title: impl Into<String>,
        text: impl Into<String>,
        created_date: DateTime<Utc>,
        published_date: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;

        let title = title.into();
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(DomainError::Validation {
                field: "title",
                message: "must be at most 200 chars",
            });
        }

        Ok(Self {
            id,
            author_id,
            title,
            text: text.into(),
            created_date,
            published_date,
        })
    }

    /// Moves the post to the published state at `now`.
    ///
    /// Calling it again on a published post moves the timestamp to the new `now`.
    pub(crate) fn publish(&mut self, now: DateTime<Utc>) {
        self.published_date = Some(now);
    }

    pub(crate) fn is_draft(&self) -> bool {
        self.published_date.is_none()
    }

    /// Whether an anonymous reader sees the post at `now`.
    pub(crate) fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.published_date, Some(published) if published <= now)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..200 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{CreatePostRequest, DomainError, Post, UpdatePostRequest};

    fn draft() -> Post {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        Post::new(1, 10, "Test", "superText", created, None).expect("post should be valid")
    }

    #[test]
    fn post_renders_as_its_title() {
        let post = draft();
        assert_eq!(post.to_string(), "Test");
    }

    #[test]
    fn publish_sets_published_date_to_given_instant() {
        let mut post = draft();
        assert!(post.is_draft());

        let now = Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap();
        post.publish(now);

        assert_eq!(post.published_date, Some(now));
        assert!(!post.is_draft());
    }

    #[test]
    fn republish_resets_published_date() {
        let mut post = draft();
        let first = Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap();
        let second = first + Duration::days(3);

        post.publish(first);
        post.publish(second);

        assert_eq!(post.published_date, Some(second));
    }

    #[test]
    fn visibility_follows_published_date() {
        let mut post = draft();
        let now = Utc.with_ymd_and_hms(2020, 4, 1, 0, 0, 0).unwrap();
        assert!(!post.is_visible_at(now));

        post.publish(now);
        assert!(post.is_visible_at(now));
        assert!(post.is_visible_at(now + Duration::seconds(1)));
        assert!(!post.is_visible_at(now - Duration::seconds(1)));
    }

    #[test]
    fn post_new_rejects_long_title() {
        let err = Post::new(1, 10, "x".repeat(201), "text", Utc::now(), None)
            .expect_err("title over 200 chars must fail");
        assert_validation_field(err, "title");
    }

    #[test]
    fn post_new_rejects_non_positive_author_id() {
        let err = Post::new(1, 0, "Title", "Text", Utc::now(), None)
            .expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    #[test]
    fn post_new_accepts_published_before_created() {
        let created = Utc::now();
        let published = created - Duration::days(1);

        let post = Post::new(1, 10, "Title", "Text", created, Some(published))
            .expect("created/published order is not enforced");
        assert_eq!(post.published_date, Some(published));
    }

    #[test]
    fn create_post_request_validate_trims_title_and_keeps_text() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            text: "line one\nline two\n".to_string(),
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.text, "line one\nline two\n");
    }

    #[test]
    fn create_post_request_validate_counts_chars_not_bytes() {
        let req = CreatePostRequest {
            title: "ё".repeat(200),
            text: "text".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_post_request_validate_rejects_blank_text() {
        let req = UpdatePostRequest {
            title: "valid title".to_string(),
            text: "   ".to_string(),
        };

        let err = req.validate().expect_err("text must be rejected");
        assert_validation_field(err, "text");
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
