use scraper::Html;

use crate::gameday::locator::GameLocator;

/// Parses a response body leniently, the way a browser would. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn parse_html(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

/// A game's `inning_all.xml`, parsed, along with where it came from when known.
pub struct GameDocument {
    pub locator: Option<GameLocator>,
    pub html: Html,
}

impl GameDocument {
    pub fn parse(bytes: &[u8], locator: Option<GameLocator>) -> Self {
        Self {
            locator,
            html: parse_html(bytes),
        }
    }
}
