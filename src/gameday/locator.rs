use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::gameday::document::parse_html;
use crate::gameday::fetch::Fetch;

pub const DEFAULT_BASE_URL: &str = "http://gd2.mlb.com/components/game/mlb/";
pub const GAME_DOCUMENT_SUFFIX: &str = "inning/inning_all.xml";

lazy_static! {
    static ref GID_REGEX: Regex = Regex::new(r"gid_[0-9]{4}_[0-9]{2}_[0-9]{2}_*").unwrap();
}

/// One game on one day, along with where its play-by-play lives.
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct GameLocator {
    /// Exactly as listed on the day's index page, e.g. `gid_2016_04_03_nyamlb_bosmlb_1/`
    pub id: String,
    pub day: NaiveDate,
    pub url: String,
}

impl GameLocator {
    pub fn new(day_path: &str, id: &str, day: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            day,
            url: format!("{day_path}{id}{GAME_DOCUMENT_SUFFIX}"),
        }
    }

    /// The identifier without the directory slash.
    pub fn game_id(&self) -> &str {
        self.id.trim_end_matches('/')
    }
}

pub fn day_path(base_url: &str, day: NaiveDate) -> String {
    let sep = if base_url.ends_with('/') { "" } else { "/" };
    format!(
        "{}{}year_{}/month_{:02}/day_{:02}/",
        base_url,
        sep,
        day.year(),
        day.month(),
        day.day()
    )
}

/// Every text node on the index page that looks like a game directory, trimmed.
pub fn extract_game_ids(index: &Html) -> Vec<String> {
    index
        .root_element()
        .text()
        .filter(|t| GID_REGEX.is_match(t))
        .map(|t| t.trim().to_string())
        .unique()
        .collect()
}

pub fn locators_for_day<F: Fetch>(fetcher: &F, base_url: &str, day: NaiveDate) -> Result<Vec<GameLocator>> {
    let path = day_path(base_url, day);
    let body = fetcher
        .fetch(&path)
        .with_context(|| format!("Failed to fetch game listing for {day}"))?;
    let index = parse_html(&body);
    let locators = extract_game_ids(&index)
        .iter()
        .map(|id| GameLocator::new(&path, id, day))
        .collect_vec();
    debug!("Found {} games on {}", locators.len(), day);
    Ok(locators)
}
