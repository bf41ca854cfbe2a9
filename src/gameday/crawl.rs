use std::collections::VecDeque;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::gameday::document::GameDocument;
use crate::gameday::fetch::Fetch;
use crate::gameday::locator::{locators_for_day, GameLocator};

pub struct Crawler<F: Fetch> {
    fetcher: F,
    base_url: String,
}

impl<F: Fetch> Crawler<F> {
    pub fn new(fetcher: F, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.to_string(),
        }
    }

    /// Every game played on `days`, fetched one at a time as the caller asks
    /// for it. A day or game that can't be fetched is logged and skipped.
    pub fn games<D>(&self, days: D) -> Games<'_, F, D>
    where
        D: Iterator<Item = NaiveDate>,
    {
        Games {
            crawler: self,
            days,
            pending: VecDeque::new(),
            stats: CrawlStats::default(),
        }
    }

    pub fn fetch_game(&self, locator: GameLocator) -> Result<GameDocument> {
        let body = self
            .fetcher
            .fetch(&locator.url)
            .with_context(|| format!("Failed to fetch game {}", locator.game_id()))?;
        Ok(GameDocument::parse(&body, Some(locator)))
    }
}

#[derive(Debug, Default, Eq, PartialEq, Copy, Clone)]
pub struct CrawlStats {
    pub days: usize,
    pub days_skipped: usize,
    pub games: usize,
    pub games_skipped: usize,
}

pub struct Games<'a, F: Fetch, D> {
    crawler: &'a Crawler<F>,
    days: D,
    pending: VecDeque<GameLocator>,
    stats: CrawlStats,
}

impl<F: Fetch, D> Games<'_, F, D> {
    pub fn stats(&self) -> CrawlStats {
        self.stats
    }
}

impl<F, D> Iterator for Games<'_, F, D>
where
    F: Fetch,
    D: Iterator<Item = NaiveDate>,
{
    type Item = GameDocument;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(locator) = self.pending.pop_front() {
                match self.crawler.fetch_game(locator) {
                    Ok(game) => {
                        self.stats.games += 1;
                        return Some(game);
                    }
                    Err(e) => {
                        self.stats.games_skipped += 1;
                        warn!("{:#}", e);
                        continue;
                    }
                }
            }
            let day = self.days.next()?;
            self.stats.days += 1;
            match locators_for_day(&self.crawler.fetcher, &self.crawler.base_url, day) {
                Ok(locators) if locators.is_empty() => debug!("No games on {}", day),
                Ok(locators) => {
                    info!("Crawling {} games on {}", locators.len(), day);
                    self.pending.extend(locators);
                }
                Err(e) => {
                    self.stats.days_skipped += 1;
                    warn!("{:#}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::gameday::fetch::testing::StaticFetcher;
    use crate::gameday::flatten::flatten;
    use crate::gameday::locator::day_path;
    use crate::gameday::season::SeasonDays;

    const BASE: &str = "http://gd2.test/components/game/mlb/";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn index(gids: &[&str]) -> String {
        let items = gids
            .iter()
            .map(|g| format!("<li><a href=\"{g}\"> {g}</a></li>"))
            .join("\n");
        format!("<html><body><ul><li><a href=\"batters/\"> batters/</a></li>\n{items}</ul></body></html>")
    }

    fn game(batter: &str) -> String {
        format!(
            r#"<game><inning num="1"><top><atbat num="1" batter="{batter}" pitcher="202" event="Single">
            <pitch des="Ball" type="B"/><pitch des="In play, no out" type="X"/></atbat></top></inning></game>"#
        )
    }

    fn fixture() -> StaticFetcher {
        let day_4 = day_path(BASE, ymd(2016, 4, 4));
        let day_5 = day_path(BASE, ymd(2016, 4, 5));
        let day_6 = day_path(BASE, ymd(2016, 4, 6));
        StaticFetcher::default()
            // April 2nd and 3rd have no index at all
            .with_page(&day_4, &index(&["gid_2016_04_04_nyamlb_bosmlb_1/", "gid_2016_04_04_seamlb_texmlb_1/"]))
            .with_page(
                &format!("{day_4}gid_2016_04_04_nyamlb_bosmlb_1/inning/inning_all.xml"),
                &game("101"),
            )
            // The Mariners game is listed but missing
            .with_page(&day_5, &index(&[]))
            .with_page(&day_6, &index(&["gid_2016_04_06_nyamlb_bosmlb_1/"]))
            .with_page(
                &format!("{day_6}gid_2016_04_06_nyamlb_bosmlb_1/inning/inning_all.xml"),
                &game("102"),
            )
    }

    #[test]
    fn failures_are_skipped() {
        let crawler = Crawler::new(fixture(), BASE);
        let days = SeasonDays::new(ymd(2016, 4, 1), ymd(2016, 4, 6)).unwrap();
        let mut games = crawler.games(days);
        let ids = games
            .by_ref()
            .map(|g| g.locator.unwrap().game_id().to_string())
            .collect_vec();
        assert_eq!(
            ids,
            vec!["gid_2016_04_04_nyamlb_bosmlb_1", "gid_2016_04_06_nyamlb_bosmlb_1"]
        );
        assert_eq!(
            games.stats(),
            CrawlStats {
                days: 5,
                days_skipped: 2,
                games: 2,
                games_skipped: 1
            }
        );
    }

    #[test]
    fn records_flow_through_the_crawl() {
        let crawler = Crawler::new(fixture(), BASE);
        let days = SeasonDays::new(ymd(2016, 4, 1), ymd(2016, 4, 6)).unwrap();
        let mut batters = vec![];
        for game in crawler.games(days) {
            for record in flatten(&game) {
                let record = record.unwrap();
                assert_eq!(record.game_date, game.locator.as_ref().map(|l| l.day));
                batters.push(record.batter_id.unwrap());
            }
        }
        assert_eq!(batters, vec!["101", "101", "102", "102"]);
    }

    #[test]
    fn stopping_early_stops_fetching() {
        let crawler = Crawler::new(fixture(), BASE);
        let days = SeasonDays::new(ymd(2016, 4, 1), ymd(2016, 4, 30)).unwrap();
        let first = crawler.games(days).next().unwrap();
        assert_eq!(first.locator.unwrap().day, ymd(2016, 4, 4));
        let requests = crawler.fetcher.requests.borrow();
        // Three index pages and one game, nothing past April 4th
        assert_eq!(requests.len(), 4);
        assert!(requests.iter().all(|u| u.contains("day_02") || u.contains("day_03") || u.contains("day_04")));
    }
}
