/// Card editing operations: tags, images, board choice, submission body
use std::sync::LazyLock;

use regex::Regex;

use crate::card::{Board, Card, NewCard, Tag};

/// Image sources accepted in the editor: web URLs and inline image data
static IMAGE_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:https?://\S+|data:image/[a-z0-9.+-]+[;,]\S*)$")
        .expect("image source pattern is valid")
});

/// Number of demo cards shown on an empty board
pub const PLACEHOLDER_COUNT: usize = 5;

/// Everything the editor collects before a card is sent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardDraft {
    pub text: String,
    pub note: String,
    pub tags: Vec<Tag>,
    pub images: Vec<String>,
    pub url: String,
    pub board_name: String,
}

impl CardDraft {
    /// Append a tag by trimmed name. Empty names are ignored; duplicates are kept.
    pub fn add_tag(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.tags.push(Tag::new(name));
        true
    }

    pub fn remove_tag(&mut self, tag_id: &str) -> bool {
        let original_len = self.tags.len();
        self.tags.retain(|t| t.id != tag_id);
        self.tags.len() < original_len
    }

    /// Append an image by trimmed source, if it looks like an image reference
    pub fn add_image(&mut self, src: &str) -> bool {
        let src = src.trim();
        if !is_image_source(src) {
            return false;
        }
        self.images.push(src.to_string());
        true
    }

    pub fn remove_image(&mut self, src: &str) -> bool {
        let original_len = self.images.len();
        self.images.retain(|i| i != src);
        self.images.len() < original_len
    }

    /// Choose a board by name; blank names leave the choice unchanged
    pub fn choose_board(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.board_name = name.to_string();
        true
    }

    pub fn can_send(&self, sending: bool) -> bool {
        !sending && !self.board_name.trim().is_empty()
    }

    /// Request body for the card endpoint, stamped with `date` (ISO-8601)
    pub fn to_new_card(&self, date: String) -> NewCard {
        NewCard {
            text: self.text.clone(),
            note: self.note.clone(),
            tags: self.tags.clone(),
            img: self.images.first().cloned().unwrap_or_default(),
            images: self.images.clone(),
            url: self.url.clone(),
            date,
            board_name: self.board_name.clone(),
        }
    }
}

pub fn is_image_source(src: &str) -> bool {
    IMAGE_SOURCE.is_match(src)
}

/// Board preselected after the list loads: the first one
pub fn default_board(boards: &[Board]) -> Option<String> {
    boards.first().map(|b| b.name.clone())
}

/// Cards to render: the fetched ones, or placeholders when there are none
pub fn cards_or_placeholders(cards: &[Card]) -> Vec<Card> {
    if cards.is_empty() {
        (0..PLACEHOLDER_COUNT).map(Card::placeholder).collect()
    } else {
        cards.to_vec()
    }
}

/// Previous image index in a gallery of `len`, wrapping around
pub fn previous_index(current: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if current == 0 || current >= len {
        len - 1
    } else {
        current - 1
    }
}

/// Next image index in a gallery of `len`, wrapping around
pub fn next_index(current: usize, len: usize) -> usize {
    if len == 0 || current + 1 >= len {
        0
    } else {
        current + 1
    }
}
