#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::gameday::crawl::Crawler;
use crate::gameday::document::GameDocument;
use crate::gameday::fetch::HttpFetcher;
use crate::gameday::flatten::{flatten, flatten_all};
use crate::gameday::locator::DEFAULT_BASE_URL;
use crate::gameday::schemas::PitchField;
use crate::gameday::season::SeasonBounds;
use crate::gameday::writer::{open_output, PitchWriter};
use crate::util::single_byte;

mod gameday;
mod util;

const ABOUT: &str = "Creates flat pitch-level datasets from MLB Gameday play-by-play files.";

#[derive(Parser, Debug)]
#[command(name = "gameday-pitches", about = ABOUT)]
struct Opt {
    /// First day to crawl (YYYY-MM-DD); defaults to the season start
    #[arg(short, long)]
    start: Option<NaiveDate>,

    /// Last day to crawl (YYYY-MM-DD); defaults to November 1st of this year or today, whichever is earlier
    #[arg(short, long)]
    end: Option<NaiveDate>,

    /// Earliest date crawled when no start is given
    #[arg(long)]
    season_start: Option<NaiveDate>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Output file; standard output when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma separated output columns; all columns when absent
    #[arg(short, long)]
    fields: Option<String>,

    /// Single character column delimiter, or `tab`
    #[arg(short, long, default_value = ",")]
    delimiter: String,

    /// Flatten a single downloaded inning_all.xml instead of crawling
    #[arg(long, conflicts_with_all = ["start", "end", "season_start"])]
    game_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn crawl<W: Write>(opt: &Opt, writer: &mut PitchWriter<W>) -> Result<()> {
    let today = Local::now().date_naive();
    let bounds = SeasonBounds::new(opt.season_start, today)?;
    let days = bounds.crawl_range(opt.start, opt.end)?;
    let crawler = Crawler::new(HttpFetcher::new()?, &opt.base_url);

    info!("Crawling {}", opt.base_url);
    let mut games = crawler.games(days);
    for game in games.by_ref() {
        for record in flatten(&game) {
            writer.write(&record?)?;
        }
    }
    let stats = games.stats();
    info!(
        "Crawled {} days ({} skipped) and {} games ({} skipped)",
        stats.days, stats.days_skipped, stats.games, stats.games_skipped
    );
    Ok(())
}

fn flatten_game_file<W: Write>(path: &Path, writer: &mut PitchWriter<W>) -> Result<()> {
    info!("Parsing {}", path.display());
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let game = GameDocument::parse(&bytes, None);
    for record in flatten_all(&game)? {
        writer.write(&record)?;
    }
    Ok(())
}

fn run(opt: &Opt) -> Result<()> {
    let fields = match &opt.fields {
        Some(list) => PitchField::parse_list(list)?,
        None => PitchField::all(),
    };
    let delimiter = single_byte(&opt.delimiter)?;
    let output = open_output(opt.output.as_deref())?;
    let mut writer = PitchWriter::new(output, fields, delimiter)?;

    match &opt.game_file {
        Some(path) => flatten_game_file(path, &mut writer)?,
        None => crawl(opt, &mut writer)?,
    }

    let rows = writer.rows();
    writer.finish()?;
    info!("Wrote {} pitches", rows);
    Ok(())
}

#[allow(clippy::expect_used)]
fn main() {
    let opt: Opt = Opt::parse();
    let level = if opt.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to initialize trace");

    let start = Instant::now();
    if let Err(e) = run(&opt) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    let end = start.elapsed();
    info!("Elapsed: {:?}", end);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Opt::command().debug_assert();
    }

    #[test]
    fn parses_dates_and_fields() {
        let opt = Opt::parse_from([
            "gameday-pitches",
            "--start",
            "2016-04-01",
            "--end",
            "2016-04-30",
            "--fields",
            "batter_id,pitcher_id",
            "-d",
            "tab",
        ]);
        assert_eq!(opt.start, NaiveDate::from_ymd_opt(2016, 4, 1));
        assert_eq!(opt.end, NaiveDate::from_ymd_opt(2016, 4, 30));
        assert_eq!(opt.base_url, DEFAULT_BASE_URL);
        assert_eq!(single_byte(&opt.delimiter).unwrap(), b'\t');
    }

    #[test]
    fn game_file_conflicts_with_dates() {
        let res = Opt::try_parse_from(["gameday-pitches", "--game-file", "x.xml", "--start", "2016-04-01"]);
        assert!(res.is_err());
    }

    #[test]
    fn inverted_range_fails_before_fetching() {
        let opt = Opt::parse_from([
            "gameday-pitches",
            "--start",
            "2016-05-01",
            "--end",
            "2016-04-01",
            "--base-url",
            "http://127.0.0.1:9/",
        ]);
        let mut writer = PitchWriter::new(Vec::<u8>::new(), PitchField::all(), b',').unwrap();
        let err = crawl(&opt, &mut writer).unwrap_err();
        assert!(format!("{err:#}").contains("is before start date"));
        assert_eq!(writer.rows(), 0);
    }

    #[test]
    fn flattens_game_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inning_all.xml");
        fs::write(
            &path,
            r#"<game><inning num="1"><top><atbat num="1" batter="101" pitcher="202" event="Single">
            <pitch des="Ball" type="B"/><pitch des="In play, no out" type="X"/></atbat></top></inning></game>"#,
        )
        .unwrap();
        let fields = vec![PitchField::BatterId, PitchField::Balls, PitchField::IsHit];
        let mut writer = PitchWriter::new(Vec::<u8>::new(), fields, b',').unwrap();
        flatten_game_file(&path, &mut writer).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out, "batter_id,balls,is_hit\n101,1,false\n101,1,true\n");
    }
}
