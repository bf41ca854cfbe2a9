use std::str::FromStr;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::gameday::context::Context;
use crate::gameday::pitch::Count;
use crate::util::ascii_opt;

#[derive(Debug, Eq, PartialEq, Copy, Clone, EnumString, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum InningHalf {
    Top,
    Bottom,
}

/// Declares the document attribute columns once. Each entry is
/// `Variant(record_field, "column", "attribute")`; the generated `PitchField`
/// and `PitchRecord` put them between the derived leading columns and the
/// derived count columns.
macro_rules! pitch_schema {
    ($($variant:ident($field:ident, $column:tt, $key:tt)),* $(,)?) => {
        /// Output columns, in default header order.
        #[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, EnumString, Display, AsRefStr, EnumIter)]
        #[strum(serialize_all = "snake_case")]
        pub enum PitchField {
            GameId,
            GameDate,
            Inning,
            InningHalf,
            AtBatNum,
            PitchIdx,
            $(
                #[strum(serialize = $column)]
                $variant,
            )*
            Balls,
            Strikes,
            IsHit,
        }

        #[derive(Debug, Eq, PartialEq, Clone)]
        pub struct PitchRecord {
            pub game_id: Option<String>,
            pub game_date: Option<NaiveDate>,
            pub inning: Option<String>,
            pub inning_half: Option<InningHalf>,
            pub at_bat_num: Option<String>,
            pub pitch_idx: usize,
            $(pub $field: Option<String>,)*
            pub balls: u8,
            pub strikes: u8,
            pub is_hit: bool,
        }

        impl From<PitchSource<'_>> for PitchRecord {
            fn from(src: PitchSource<'_>) -> Self {
                let ctx = src.context;
                Self {
                    game_id: ascii_opt(src.game_id),
                    game_date: src.game_date,
                    inning: ascii_opt(src.inning),
                    inning_half: src.inning_half,
                    at_bat_num: ascii_opt(src.at_bat_num),
                    pitch_idx: src.pitch_idx,
                    $($field: ascii_opt(ctx.get($key)),)*
                    balls: src.count.balls(),
                    strikes: src.count.strikes(),
                    is_hit: src.is_hit,
                }
            }
        }

        impl PitchRecord {
            pub fn cell(&self, field: PitchField) -> Cell<'_> {
                type F = PitchField;
                match field {
                    F::GameId => Cell::Text(self.game_id.as_deref()),
                    F::GameDate => Cell::Date(self.game_date),
                    F::Inning => Cell::Text(self.inning.as_deref()),
                    F::InningHalf => Cell::Text(self.inning_half.map(|h| -> &'static str { h.into() })),
                    F::AtBatNum => Cell::Text(self.at_bat_num.as_deref()),
                    F::PitchIdx => Cell::Index(self.pitch_idx),
                    $(F::$variant => Cell::Text(self.$field.as_deref()),)*
                    F::Balls => Cell::Count(self.balls),
                    F::Strikes => Cell::Count(self.strikes),
                    F::IsHit => Cell::Flag(self.is_hit),
                }
            }
        }
    };
}

// Standard inning_all.xml attributes. Where an at-bat and its pitches share a
// name (`des`, `des_es`, `event_num`, `play_guid`) the pitch's value is kept.
pitch_schema! {
    // <inning>
    AwayTeam(away_team, "away_team", "away_team"),
    HomeTeam(home_team, "home_team", "home_team"),
    Next(next, "next", "next"),
    // <atbat>
    B(b, "b", "b"),
    S(s, "s", "s"),
    O(o, "o", "o"),
    StartTfs(start_tfs, "start_tfs", "start_tfs"),
    StartTfsZulu(start_tfs_zulu, "start_tfs_zulu", "start_tfs_zulu"),
    EndTfsZulu(end_tfs_zulu, "end_tfs_zulu", "end_tfs_zulu"),
    BatterId(batter_id, "batter_id", "batter"),
    Stand(stand, "stand", "stand"),
    BHeight(b_height, "b_height", "b_height"),
    PitcherId(pitcher_id, "pitcher_id", "pitcher"),
    PThrows(p_throws, "p_throws", "p_throws"),
    Event(event, "event", "event"),
    EventEs(event_es, "event_es", "event_es"),
    HomeTeamRuns(home_team_runs, "home_team_runs", "home_team_runs"),
    AwayTeamRuns(away_team_runs, "away_team_runs", "away_team_runs"),
    Score(score, "score", "score"),
    // <pitch>
    PitchId(pitch_id, "pitch_id", "id"),
    Des(des, "des", "des"),
    DesEs(des_es, "des_es", "des_es"),
    Type(type_code, "type", "type"),
    Code(code, "code", "code"),
    EventNum(event_num, "event_num", "event_num"),
    PlayGuid(play_guid, "play_guid", "play_guid"),
    Tfs(tfs, "tfs", "tfs"),
    TfsZulu(tfs_zulu, "tfs_zulu", "tfs_zulu"),
    X(x, "x", "x"),
    Y(y, "y", "y"),
    SvId(sv_id, "sv_id", "sv_id"),
    StartSpeed(start_speed, "start_speed", "start_speed"),
    EndSpeed(end_speed, "end_speed", "end_speed"),
    SzTop(sz_top, "sz_top", "sz_top"),
    SzBot(sz_bot, "sz_bot", "sz_bot"),
    PfxX(pfx_x, "pfx_x", "pfx_x"),
    PfxZ(pfx_z, "pfx_z", "pfx_z"),
    Px(px, "px", "px"),
    Pz(pz, "pz", "pz"),
    X0(x0, "x0", "x0"),
    Y0(y0, "y0", "y0"),
    Z0(z0, "z0", "z0"),
    Vx0(vx0, "vx0", "vx0"),
    Vy0(vy0, "vy0", "vy0"),
    Vz0(vz0, "vz0", "vz0"),
    Ax(ax, "ax", "ax"),
    Ay(ay, "ay", "ay"),
    Az(az, "az", "az"),
    BreakY(break_y, "break_y", "break_y"),
    BreakAngle(break_angle, "break_angle", "break_angle"),
    BreakLength(break_length, "break_length", "break_length"),
    PitchType(pitch_type, "pitch_type", "pitch_type"),
    TypeConfidence(type_confidence, "type_confidence", "type_confidence"),
    Zone(zone, "zone", "zone"),
    Nasty(nasty, "nasty", "nasty"),
    SpinDir(spin_dir, "spin_dir", "spin_dir"),
    SpinRate(spin_rate, "spin_rate", "spin_rate"),
    Cc(cc, "cc", "cc"),
    Mt(mt, "mt", "mt"),
    On1b(on_1b, "on_1b", "on_1b"),
    On2b(on_2b, "on_2b", "on_2b"),
    On3b(on_3b, "on_3b", "on_3b"),
}

impl PitchField {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Parses a comma separated column list such as `batter_id,pitcher_id,des`.
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Self::from_str(s).with_context(|| {
                    format!(
                        "Unknown field `{}`, expected one of: {}",
                        s,
                        Self::iter().join(", ")
                    )
                })
            })
            .collect()
    }
}

/// A single value in an output row. Absent values serialize as empty cells.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell<'a> {
    Text(Option<&'a str>),
    Date(Option<NaiveDate>),
    Index(usize),
    Count(u8),
    Flag(bool),
}

/// Everything the flattener knows about one pitch, before normalization.
pub struct PitchSource<'a> {
    pub game_id: Option<&'a str>,
    pub game_date: Option<NaiveDate>,
    pub inning: Option<&'a str>,
    pub inning_half: Option<InningHalf>,
    pub at_bat_num: Option<&'a str>,
    /// Inning, at-bat and pitch attributes merged in that order
    pub context: &'a Context,
    pub pitch_idx: usize,
    pub count: Count,
    pub is_hit: bool,
}
