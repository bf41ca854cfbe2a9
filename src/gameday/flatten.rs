use std::str::FromStr;

use anyhow::{anyhow, Context as _, Error, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use scraper::element_ref::Select;
use scraper::{ElementRef, Selector};

use crate::gameday::context::Context;
use crate::gameday::document::GameDocument;
use crate::gameday::locator::GameLocator;
use crate::gameday::pitch::{is_hit, Count, PitchCall};
use crate::gameday::schemas::{InningHalf, PitchRecord, PitchSource};

lazy_static! {
    static ref INNING: Selector = Selector::parse("inning").unwrap();
    static ref AT_BAT: Selector = Selector::parse("atbat").unwrap();
    static ref PITCH: Selector = Selector::parse("pitch").unwrap();
}

const AT_BAT_REQUIRED: [&str; 3] = ["batter", "pitcher", "event"];

/// Walks innings, then at-bats, then pitches in document order, yielding one
/// record per pitch. Nothing is read ahead of what the caller pulls.
///
/// A pitch or at-bat missing one of its required attributes yields an `Err`.
pub fn flatten(game: &GameDocument) -> impl Iterator<Item = Result<PitchRecord>> + '_ {
    let game_id = game.locator.as_ref().map(GameLocator::game_id);
    let game_date = game.locator.as_ref().map(|l| l.day);
    game.html.select(&INNING).flat_map(move |inning| {
        let inning_context = Context::from_attrs(inning.value().attrs());
        inning
            .select(&AT_BAT)
            .flat_map(move |at_bat| AtBatPitches::new(&inning_context, at_bat, game_id, game_date))
    })
}

fn inning_half(at_bat: ElementRef<'_>) -> Option<InningHalf> {
    at_bat
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find_map(|el| InningHalf::from_str(el.value().name()).ok())
}

struct AtBatPitches<'a> {
    game_id: Option<&'a str>,
    game_date: Option<NaiveDate>,
    inning: Option<String>,
    inning_half: Option<InningHalf>,
    at_bat_num: Option<String>,
    context: Context,
    pitches: Option<Select<'a, 'static>>,
    error: Option<Error>,
    pitch_idx: usize,
    count: Count,
}

impl<'a> AtBatPitches<'a> {
    fn new(
        inning: &Context,
        at_bat: ElementRef<'a>,
        game_id: Option<&'a str>,
        game_date: Option<NaiveDate>,
    ) -> Self {
        let own = Context::from_attrs(at_bat.value().attrs());
        let error = AT_BAT_REQUIRED
            .iter()
            .find_map(|key| own.require(key, "atbat").err())
            .map(|e| {
                e.context(format!(
                    "Malformed at-bat {} in inning {} of {}",
                    own.get("num").unwrap_or("?"),
                    inning.get("num").unwrap_or("?"),
                    game_id.unwrap_or("game")
                ))
            });
        let pitches = if error.is_some() {
            None
        } else {
            Some(at_bat.select(&PITCH))
        };
        Self {
            game_id,
            game_date,
            inning: inning.get("num").map(String::from),
            inning_half: inning_half(at_bat),
            at_bat_num: own.get("num").map(String::from),
            context: inning.merged(at_bat.value().attrs()),
            pitches,
            error,
            pitch_idx: 0,
            count: Count::default(),
        }
    }

    fn record(&mut self, pitch: ElementRef<'a>) -> Result<PitchRecord> {
        let own = Context::from_attrs(pitch.value().attrs());
        let description = own.require("des", "pitch")?;
        let type_code = own.require("type", "pitch")?;
        self.count = self.count.after(PitchCall::classify(type_code, description));
        let context = self.context.merged(pitch.value().attrs());
        let record = PitchRecord::from(PitchSource {
            game_id: self.game_id,
            game_date: self.game_date,
            inning: self.inning.as_deref(),
            inning_half: self.inning_half,
            at_bat_num: self.at_bat_num.as_deref(),
            context: &context,
            pitch_idx: self.pitch_idx,
            count: self.count,
            is_hit: is_hit(description),
        });
        self.pitch_idx += 1;
        Ok(record)
    }
}

impl<'a> Iterator for AtBatPitches<'a> {
    type Item = Result<PitchRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.error.take() {
            return Some(Err(e));
        }
        let pitch = self.pitches.as_mut()?.next()?;
        let idx = self.pitch_idx;
        Some(self.record(pitch).with_context(|| {
            format!(
                "Malformed pitch {} of at-bat {} in {}",
                idx,
                self.at_bat_num.as_deref().unwrap_or("?"),
                self.game_id.unwrap_or("game")
            )
        }))
    }
}

/// Flattens a single game read from disk or elsewhere, outside of a crawl.
pub fn flatten_all(game: &GameDocument) -> Result<Vec<PitchRecord>> {
    let records = flatten(game).collect::<Result<Vec<_>>>()?;
    if records.is_empty() {
        return Err(anyhow!("No pitches found; is this an inning_all.xml document?"));
    }
    Ok(records)
}
