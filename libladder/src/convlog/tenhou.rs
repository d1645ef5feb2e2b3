//! tenhou.net/6 JSON game logs.

use super::SeatIdentity;
use super::yaku::display_name;
use crate::error::{DecodeError, IngestError, IngestResult};
use crate::game::kind::{MAJSOUL_EAST, MAJSOUL_SOUTH};
use crate::ladder::ExternalId;
use crate::meld::Meld;
use crate::score::{
    AbortiveDraw, RoundDetail, RoundHeader, RoundOutcome, RoundResult, ScoringConfig, WinRecord,
    Wind, Yaku,
};
use crate::state::{Discard, Draw, RoundReplay, RoundSimulator, SeatLog};
use crate::tile::Tile;
use std::fmt;

use chrono::NaiveDateTime;
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const TSUMOGIRI: u32 = 60;
const KAN_PLACEHOLDER: u32 = 0;
const ROUND_LEN: usize = 17;
const TIMESTAMP_FORMATS: [&str; 2] = ["%m/%d/%Y, %I:%M:%S %p", "%Y/%m/%d %H:%M:%S"];

#[derive(Debug, Clone, Deserialize)]
pub struct TenhouLog {
    #[serde(default)]
    pub title: Vec<String>,
    pub name: [String; 4],
    pub rule: Rule,
    pub log: Vec<RawRound>,
    /// Final scores in hundreds, each followed by the uma-adjusted result.
    #[serde(default)]
    pub sc: Vec<f64>,
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub disp: String,
}

/// Either a tile id or a token with a marker letter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ActionItem {
    Tile(u32),
    Naki(String),
}

#[derive(Debug, Clone, Default)]
pub struct RawSeat {
    pub haipai: Vec<u32>,
    pub takes: Vec<ActionItem>,
    pub discards: Vec<ActionItem>,
}

/// One round, stored in the log as a 17-element array.
#[derive(Debug, Clone)]
pub struct RawRound {
    pub meta: (u8, u8, u8),
    pub scores: [i32; 4],
    pub dora: Vec<u32>,
    pub uradora: Vec<u32>,
    pub seats: [RawSeat; 4],
    pub result: Vec<Value>,
}

struct Parsed {
    outcome: RoundOutcome,
    wins: Vec<WinRecord>,
    recorded: Vec<[i32; 4]>,
}

impl TenhouLog {
    #[inline]
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.reference
    }

    pub fn timestamp(&self) -> IngestResult<NaiveDateTime> {
        let raw = self
            .title
            .get(1)
            .ok_or_else(|| IngestError::malformed("title has no timestamp"))?;
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| IngestError::malformed(format!("unparsable timestamp {raw:?}")))
    }

    /// Name of the game kind the rule line maps to.
    pub fn kind_name(&self) -> IngestResult<&'static str> {
        match self.rule.disp.as_str() {
            "Friendly South" | "友人戦南喰赤" => Ok(MAJSOUL_SOUTH),
            "Friendly East" | "友人戦東喰赤" => Ok(MAJSOUL_EAST),
            other => Err(IngestError::UnknownGameKind(other.to_owned())),
        }
    }

    #[must_use]
    pub fn seats(&self) -> [SeatIdentity; 4] {
        self.name.clone().map(|name| SeatIdentity::External {
            id: ExternalId::Tenhou(name.clone()),
            name,
        })
    }

    /// Final points per seat, falling back to the last round when the log
    /// carries no score line.
    pub fn final_points(&self, rounds: &[RoundResult]) -> IngestResult<[i32; 4]> {
        if self.sc.is_empty() {
            return rounds
                .last()
                .map(RoundResult::final_points)
                .ok_or_else(|| IngestError::malformed("no score line and no rounds"));
        }
        if self.sc.len() < 8 {
            return Err(IngestError::malformed(format!("score line has {} entries", self.sc.len())));
        }
        let mut points = [0; 4];
        for (p, sc) in points.iter_mut().zip(self.sc.iter().step_by(2)) {
            *p = (sc * 100.).round() as i32;
        }
        Ok(points)
    }

    pub fn rounds(&self, config: &ScoringConfig) -> IngestResult<Vec<RoundResult>> {
        self.log
            .iter()
            .enumerate()
            .map(|(idx, round)| {
                let label = format!("{} round {idx}", self.reference);
                round
                    .decode(config, &label)
                    .inspect_err(|e| log::warn!("{label}: {e}"))
            })
            .collect()
    }
}

impl RawRound {
    #[must_use]
    pub const fn header(&self) -> RoundHeader {
        let (kyoku, honba, kyotaku) = self.meta;
        RoundHeader {
            dealer: kyoku % 4,
            wind: Wind::from_index(kyoku / 4),
            honba,
            riichi_bank: kyotaku,
            initial_points: self.scores,
        }
    }

    /// Scores the round. A replay failure only drops the reconstruction; an
    /// unknown ending keeps the round with no points moved.
    pub fn decode(&self, config: &ScoringConfig, label: &str) -> IngestResult<RoundResult> {
        let header = self.header();
        let Parsed {
            outcome,
            wins,
            recorded,
        } = match parse_result(&self.result) {
            Err(IngestError::Decode(DecodeError::UnrecognizedOutcomeKind(kind))) => {
                log::warn!("{label}: unrecognized outcome {kind:?}, round kept without transfers");
                Parsed {
                    outcome: RoundOutcome::Unrecognized,
                    wins: vec![],
                    recorded: vec![],
                }
            }
            parsed => parsed?,
        };

        let mut detail = RoundDetail {
            recorded_deltas: recorded,
            ..Default::default()
        };
        match self.reconstruct() {
            Ok((mut replay, dora, uradora)) => {
                for win in &wins {
                    replay.mark_winner(win.winner);
                }
                if outcome == RoundOutcome::Ron {
                    replay.withdraw_last_riichi();
                }
                detail.dora = dora;
                detail.uradora = uradora;
                detail.reconstruction = Some(replay);
            }
            Err(e) => log::warn!(
                "{label} ({}{}-{}): keeping outcome only, replay failed: {e}",
                header.wind,
                header.dealer + 1,
                header.honba,
            ),
        }

        let riichi = detail.reconstruction.as_ref().map(|r| r.riichi);
        let result = RoundResult::score(header, outcome, wins, riichi, config)?;
        Ok(result.with_detail(detail))
    }

    fn reconstruct(&self) -> IngestResult<(RoundReplay, Vec<Tile>, Vec<Tile>)> {
        let dora = tiles(&self.dora)?;
        let uradora = tiles(&self.uradora)?;
        let mut logs: [SeatLog; 4] = Default::default();
        for (log, raw) in logs.iter_mut().zip(&self.seats) {
            *log = seat_log(raw)?;
        }
        let replay = RoundSimulator::new(self.header().dealer, logs).run()?;
        Ok((replay, dora, uradora))
    }
}

fn tiles(ids: &[u32]) -> Result<Vec<Tile>, DecodeError> {
    ids.iter().map(|&id| Tile::try_from(id)).collect()
}

fn seat_log(raw: &RawSeat) -> Result<SeatLog, DecodeError> {
    let draws = raw
        .takes
        .iter()
        .map(|item| match item {
            ActionItem::Tile(id) => Tile::try_from(*id).map(Draw::Tile),
            ActionItem::Naki(token) => Meld::decode(token).map(Draw::Call),
        })
        .collect::<Result<_, _>>()?;
    let discards = raw
        .discards
        .iter()
        .map(|item| match item {
            ActionItem::Tile(TSUMOGIRI) => Ok(Discard::Tsumogiri),
            ActionItem::Tile(KAN_PLACEHOLDER) => Ok(Discard::Placeholder),
            ActionItem::Tile(id) => Tile::try_from(*id).map(Discard::Tile),
            ActionItem::Naki(token) => match token.strip_prefix('r') {
                Some(rest) => {
                    let id: u32 = rest
                        .parse()
                        .map_err(|_| DecodeError::InvalidTileText(token.clone()))?;
                    if id == TSUMOGIRI {
                        Ok(Discard::Riichi(None))
                    } else {
                        Tile::try_from(id).map(|t| Discard::Riichi(Some(t)))
                    }
                }
                None => Meld::decode(token).map(Discard::Kan),
            },
        })
        .collect::<Result<_, _>>()?;
    Ok(SeatLog {
        haipai: tiles(&raw.haipai)?,
        draws,
        discards,
    })
}

fn parse_result(result: &[Value]) -> IngestResult<Parsed> {
    let kind = result
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| IngestError::malformed("round result has no kind"))?;
    let recorded = result
        .iter()
        .skip(1)
        .filter(|v| v.as_array().is_some_and(|a| a.iter().all(Value::is_number)))
        .map(deltas)
        .collect::<IngestResult<Vec<_>>>()?;

    let outcome = match kind {
        "和了" | "Agari" | "Ron" | "Tsumo" => return parse_wins(result),
        "流局" | "Ryuukyoku" => RoundOutcome::ExhaustiveDraw {
            tenpai: recorded.first().map_or([false; 4], |d| d.map(|v| v > 0)),
        },
        "全員聴牌" | "All Tenpai" => RoundOutcome::ExhaustiveDraw { tenpai: [true; 4] },
        "全員不聴" | "No Tenpai" => RoundOutcome::ExhaustiveDraw { tenpai: [false; 4] },
        "流し満貫" | "Nagashi Mangan" => {
            let holder = recorded
                .first()
                .and_then(|d| (0..4).max_by_key(|&i| d[i as usize]))
                .ok_or_else(|| IngestError::malformed("mangan at draw without payments"))?;
            RoundOutcome::DrawWithMangan { holder }
        }
        "四風連打" | "Suufon Renda" => RoundOutcome::Abortive(AbortiveDraw::FourWinds),
        "九種九牌" | "Kyuushu Kyuuhai" => RoundOutcome::Abortive(AbortiveDraw::NineTerminals),
        "四家立直" | "Suucha Riichi" => RoundOutcome::Abortive(AbortiveDraw::FourRiichi),
        "四槓散了" | "四開槓" | "Suukaikan" => RoundOutcome::Abortive(AbortiveDraw::FourKans),
        "三家和" | "Sanchahou" => RoundOutcome::Abortive(AbortiveDraw::TripleRon),
        other => return Err(DecodeError::UnrecognizedOutcomeKind(other.to_owned()).into()),
    };
    Ok(Parsed {
        outcome,
        wins: vec![],
        recorded,
    })
}

fn deltas(v: &Value) -> IngestResult<[i32; 4]> {
    let arr = v
        .as_array()
        .filter(|a| a.len() == 4)
        .ok_or_else(|| IngestError::malformed(format!("expected 4 point deltas, got {v}")))?;
    let mut ret = [0; 4];
    for (r, v) in ret.iter_mut().zip(arr) {
        *r = v
            .as_f64()
            .ok_or_else(|| IngestError::malformed(format!("non-numeric delta {v}")))?
            as i32;
    }
    Ok(ret)
}

/// `["和了", deltas, info, deltas, info, ...]`, one pair per winner.
fn parse_wins(result: &[Value]) -> IngestResult<Parsed> {
    let mut wins = vec![];
    let mut recorded = vec![];
    for pair in result[1..].chunks(2) {
        let [delta, info] = pair else {
            return Err(IngestError::malformed("win without its detail array"));
        };
        recorded.push(deltas(delta)?);
        wins.push(parse_win(info)?);
    }
    if wins.is_empty() {
        return Err(IngestError::malformed("win without a winner"));
    }
    let outcome = if wins.iter().any(WinRecord::is_self_draw) {
        RoundOutcome::Tsumo
    } else {
        RoundOutcome::Ron
    };
    Ok(Parsed {
        outcome,
        wins,
        recorded,
    })
}

/// `[winner, loser, pao, "30符1飜1000点", "立直(1飜)", ...]`
fn parse_win(info: &Value) -> IngestResult<WinRecord> {
    let info = info
        .as_array()
        .ok_or_else(|| IngestError::malformed(format!("win detail is not an array: {info}")))?;
    let seat = |idx: usize| {
        info.get(idx)
            .and_then(Value::as_u64)
            .filter(|&s| s < 4)
            .map(|s| s as u8)
            .ok_or_else(|| IngestError::malformed(format!("bad seat at {idx} in win detail")))
    };
    let winner = seat(0)?;
    let loser = seat(1)?;
    let fu = info.get(3).and_then(Value::as_str).map_or(40, parse_fu);

    let mut han = 0;
    let mut yakuman = 0;
    let mut yaku = vec![];
    for item in info.iter().skip(4).filter_map(Value::as_str) {
        match parse_yaku(item) {
            Some(y) => {
                han += y.han;
                yakuman += y.yakuman;
                if y.han > 0 || y.yakuman > 0 {
                    yaku.push(y);
                }
            }
            None => log::warn!("skipping unreadable yaku {item:?}"),
        }
    }
    Ok(WinRecord::new(winner, loser, han, fu, yakuman, yaku))
}

/// Fu from a descriptor such as `30符1飜1000点` or `30fu 1han`. Limit hands
/// carry no fu and count as 40.
fn parse_fu(desc: &str) -> u16 {
    ["符", "fu", "Fu"]
        .iter()
        .find_map(|marker| {
            let head = desc[..desc.find(marker)?].trim_end();
            let start = head
                .rfind(|c: char| !c.is_ascii_digit())
                .map_or(0, |i| i + head[i..].chars().next().map_or(1, char::len_utf8));
            head[start..].parse().ok()
        })
        .unwrap_or(40)
}

/// `Name(2飜)`, `Name(役満)`, `Name(倍役満)` and their English spellings.
fn parse_yaku(s: &str) -> Option<Yaku> {
    let open = s.rfind('(')?;
    let close = open + s[open..].find(')')?;
    let name = display_name(s[..open].trim());
    let size = &s[open + 1..close];
    let lower = size.to_ascii_lowercase();

    if size.contains("役満") || lower.contains("yakuman") {
        let yakuman = if size.contains('倍') || lower.contains("double") {
            2
        } else {
            1
        };
        return Some(Yaku {
            name,
            han: 0,
            yakuman,
        });
    }
    let digits: String = size.trim().chars().take_while(char::is_ascii_digit).collect();
    let han = digits.parse().ok()?;
    Some(Yaku {
        name,
        han,
        yakuman: 0,
    })
}

// ---------------------------------------------------------------------------
// Array-shaped round deserialization

fn element<'de, A, T>(seq: &mut A, idx: usize) -> Result<T, A::Error>
where
    A: SeqAccess<'de>,
    T: Deserialize<'de>,
{
    seq.next_element()?
        .ok_or_else(|| de::Error::invalid_length(idx, &"a 17-element round array"))
}

struct RoundVisitor;

impl<'de> Visitor<'de> for RoundVisitor {
    type Value = RawRound;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {ROUND_LEN}-element round array")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<RawRound, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let meta = element(&mut seq, 0)?;
        let scores = element(&mut seq, 1)?;
        let dora = element(&mut seq, 2)?;
        let uradora = element(&mut seq, 3)?;
        let mut seats: [RawSeat; 4] = Default::default();
        for (i, seat) in seats.iter_mut().enumerate() {
            seat.haipai = element(&mut seq, 4 + 3 * i)?;
            seat.takes = element(&mut seq, 5 + 3 * i)?;
            seat.discards = element(&mut seq, 6 + 3 * i)?;
        }
        let result = element(&mut seq, ROUND_LEN - 1)?;
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawRound {
            meta,
            scores,
            dora,
            uradora,
            seats,
            result,
        })
    }
}

impl<'de> Deserialize<'de> for RawRound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(RoundVisitor)
    }
}
