/// Data structures for boards and cards
use serde::{Deserialize, Serialize};

use crate::domain::extract_domain;

/// A named collection of cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub id: String,
    pub name: String,
}

/// Free-form label attached to a card when it is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Tag {
        Tag {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

/// Tags come back from the API either as bare names or as `{id, name}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CardTag {
    Name(String),
    Tag(Tag),
}

impl CardTag {
    pub fn name(&self) -> &str {
        match self {
            CardTag::Name(name) => name,
            CardTag::Tag(tag) => &tag.name,
        }
    }
}

/// A saved card as returned by the board endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<CardTag>,
    #[serde(default)]
    pub board_name: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl Card {
    /// Images to show: `images`, or the single `img` when the list is empty
    pub fn display_images(&self) -> Vec<String> {
        if !self.images.is_empty() {
            return self.images.clone();
        }
        self.img
            .as_ref()
            .filter(|img| !img.trim().is_empty())
            .map(|img| vec![img.clone()])
            .unwrap_or_default()
    }

    /// Domain reported by the API, or derived from the URL
    pub fn display_domain(&self) -> Option<String> {
        self.domain
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| self.url.as_deref().and_then(extract_domain))
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(CardTag::name).collect()
    }

    /// Demo card shown on empty boards
    pub fn placeholder(index: usize) -> Card {
        Card {
            id: format!("placeholder-{index}"),
            title: Some("Title".to_string()),
            url: Some("title.com".to_string()),
            text: "Select text on any page and save it to a board.".to_string(),
            ..Card::default()
        }
    }
}

/// Body of the card creation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCard {
    pub text: String,
    pub note: String,
    pub tags: Vec<Tag>,
    pub img: String,
    pub images: Vec<String>,
    pub url: String,
    pub date: String,
    pub board_name: String,
}

/// Response of the board detail endpoint
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BoardDetail {
    #[serde(default)]
    pub cards: Option<Vec<Card>>,
}

impl BoardDetail {
    pub fn into_cards(self) -> Vec<Card> {
        self.cards.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_from_api_with_string_tags() {
        let json = r#"{
            "id": "c1",
            "title": null,
            "url": "https://news.bbc.co.uk/story",
            "text": "Quoted text",
            "img": "",
            "board_name": "reading",
            "tags": ["rust", "wasm"]
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();

        assert_eq!(card.id, "c1");
        assert_eq!(card.title, None);
        assert_eq!(card.tag_names(), vec!["rust", "wasm"]);
        assert_eq!(card.display_domain(), Some("bbc.co.uk".to_string()));
        assert!(card.display_images().is_empty());
    }

    #[test]
    fn test_card_from_api_with_tag_objects() {
        let json = r#"{
            "id": "c2",
            "text": "t",
            "board_name": "b",
            "domain": "example.org",
            "tags": [{"id": "1", "name": "design"}, "misc"]
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();

        assert_eq!(card.tag_names(), vec!["design", "misc"]);
        assert_eq!(card.display_domain(), Some("example.org".to_string()));
    }

    #[test]
    fn test_display_images_prefers_list() {
        let card = Card {
            img: Some("https://a/1.png".to_string()),
            images: vec!["https://a/2.png".to_string(), "https://a/3.png".to_string()],
            ..Card::default()
        };
        assert_eq!(card.display_images().len(), 2);

        let single = Card {
            img: Some("https://a/1.png".to_string()),
            ..Card::default()
        };
        assert_eq!(single.display_images(), vec!["https://a/1.png".to_string()]);
    }

    #[test]
    fn test_board_detail_missing_cards() {
        let detail: BoardDetail = serde_json::from_str(r#"{"name": "empty"}"#).unwrap();
        assert!(detail.into_cards().is_empty());

        let detail: BoardDetail = serde_json::from_str(r#"{"cards": null}"#).unwrap();
        assert!(detail.into_cards().is_empty());
    }

    #[test]
    fn test_new_card_wire_shape() {
        let card = NewCard {
            text: "hello".to_string(),
            note: String::new(),
            tags: vec![Tag {
                id: "t1".to_string(),
                name: "later".to_string(),
            }],
            img: String::new(),
            images: vec![],
            url: "panoramix.cc".to_string(),
            date: "2024-05-01T10:00:00.000Z".to_string(),
            board_name: "inbox".to_string(),
        };

        let value = serde_json::to_value(&card).unwrap();

        assert_eq!(value["board_name"], "inbox");
        assert_eq!(value["tags"][0]["name"], "later");
        assert_eq!(value["img"], "");
    }

    #[test]
    fn test_tag_new_has_unique_ids() {
        let a = Tag::new("x");
        let b = Tag::new("x");
        assert_eq!(a.name, b.name);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_placeholder_card() {
        let card = Card::placeholder(3);
        assert_eq!(card.id, "placeholder-3");
        assert_eq!(card.display_domain(), Some("title.com".to_string()));
    }
}
