//! Decides whether a request payload is a well-formed bookmark create or update.
//!
//! Payloads are inspected as raw JSON rather than deserialized into a struct: the
//! rules depend on JavaScript-style truthiness (`""`, `0`, `false` and `null` count
//! as absent) and on ratings that may arrive either as numbers or numeric strings.

use serde_json::{Map, Value};
use url::Url;

use crate::error::ValidationError;
use crate::model::{BookmarkPatch, NewBookmark, Rating};

pub type Payload = Map<String, Value>;

/// Older clients send the description under this name.
const DESCRIPTION_ALIAS: &str = "desc";

#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkValidator {
    check_urls: bool,
}

impl BookmarkValidator {
    pub fn new(check_urls: bool) -> Self {
        Self { check_urls }
    }

    /// `title`, `url` and `rating` are required and truthy, `description` is optional.
    pub fn create(&self, payload: &Payload) -> Result<NewBookmark, ValidationError> {
        let title = required_text(payload, "title")?;
        let url = required_text(payload, "url")?;

        // A rating that parses to 0 is as absent as a falsy one.
        let rating = match payload.get("rating").filter(|v| is_truthy(v)) {
            Some(value) => parse_rating(value)?,
            None => return Err(ValidationError::MissingField("rating")),
        };
        if rating.get() == 0 {
            return Err(ValidationError::MissingField("rating"));
        }

        self.check_url(&url)?;

        let description = match description_of(payload) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ValidationError::InvalidType("description")),
        };

        Ok(NewBookmark {
            title,
            url,
            rating,
            description,
        })
    }

    /// Any subset of the four fields; falsy values are dropped and unknown keys ignored.
    /// A rating of `0` is falsy too, so it can't be set through an update.
    pub fn update(&self, payload: &Payload) -> Result<BookmarkPatch, ValidationError> {
        let title = truthy_text(payload.get("title"), "title")?;
        let url = truthy_text(payload.get("url"), "url")?;
        let description = truthy_text(description_of(payload), "description")?;
        let rating = match payload.get("rating").filter(|v| is_truthy(v)) {
            Some(value) => Some(parse_rating(value)?),
            None => None,
        };

        if let Some(url) = &url {
            self.check_url(url)?;
        }

        let patch = BookmarkPatch {
            title,
            url,
            rating,
            description,
        };

        if patch.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }

        Ok(patch)
    }

    fn check_url(&self, url: &str) -> Result<(), ValidationError> {
        if !self.check_urls {
            return Ok(());
        }

        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
            _ => Err(ValidationError::InvalidUrl),
        }
    }
}

fn description_of(payload: &Payload) -> Option<&Value> {
    payload
        .get("description")
        .filter(|v| !v.is_null())
        .or_else(|| payload.get(DESCRIPTION_ALIAS))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn required_text(payload: &Payload, field: &'static str) -> Result<String, ValidationError> {
    truthy_text(payload.get(field), field)?.ok_or(ValidationError::MissingField(field))
}

fn truthy_text(value: Option<&Value>, field: &'static str) -> Result<Option<String>, ValidationError> {
    match value {
        Some(v) if !is_truthy(v) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::InvalidType(field)),
        None => Ok(None),
    }
}

/// Integers and integer strings only: `4` and `"4"` pass, `4.5`, `"4.5"` and `"abc"` don't.
fn parse_rating(value: &Value) -> Result<Rating, ValidationError> {
    let number = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() <= Rating::MAX as f64 => f as i64,
            _ => return Err(ValidationError::InvalidRating),
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| ValidationError::InvalidRating)?,
        _ => return Err(ValidationError::InvalidRating),
    };

    Rating::new(number).ok_or(ValidationError::InvalidRating)
}
