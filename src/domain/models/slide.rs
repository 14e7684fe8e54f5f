#[cfg(test)]
#[path = "slide_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Backend handle for one uploaded deck. The client only ever holds the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSession {
    pub id: String,
}

impl DeckSession {
    pub fn new(id: &str) -> DeckSession {
        return DeckSession { id: id.to_string() };
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub page: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// Result of extracting a deck: a fresh session plus its slides in deck order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    pub session: DeckSession,
    pub slides: Vec<Slide>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSummary {
    pub page: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSlide {
    page: Option<u32>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    bullets: Vec<String>,
}

/// Rendered form of one slide in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideCard {
    pub page: Option<u32>,
    pub title: String,
    pub bullets: Vec<String>,
    pub error: Option<String>,
}

impl SlideCard {
    pub fn from_summary(summary: &SlideSummary) -> SlideCard {
        return SlideCard {
            page: Some(summary.page),
            title: summary.title.to_string(),
            bullets: summary.bullets.clone(),
            error: None,
        };
    }

    /// Card shown in place of a slide whose summary request failed.
    pub fn failed(slide: &Slide, reason: &str) -> SlideCard {
        return SlideCard {
            page: Some(slide.page),
            title: slide.title.to_string(),
            bullets: vec![],
            error: Some(reason.to_string()),
        };
    }

    /// Builds one card per entry of a stored slides payload. Entries that do not
    /// look like slides still produce a card so counts line up with the payload.
    pub fn from_payload(payload: &serde_json::Value) -> Vec<SlideCard> {
        let entries = match payload.as_array() {
            Some(entries) => entries,
            None => return vec![],
        };

        return entries
            .iter()
            .map(|entry| {
                let stored =
                    serde_json::from_value::<StoredSlide>(entry.clone()).unwrap_or_default();
                return SlideCard {
                    page: stored.page,
                    title: stored.title.unwrap_or_default(),
                    bullets: stored.bullets,
                    error: None,
                };
            })
            .collect();
    }

    pub fn heading(&self) -> String {
        let page = match self.page {
            Some(page) => page.to_string(),
            None => "-".to_string(),
        };

        if self.title.is_empty() {
            return format!("Slide {page}");
        }

        return format!("Slide {page}: {}", self.title);
    }
}
