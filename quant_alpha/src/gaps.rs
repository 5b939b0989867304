//! Per-session statistics and opening gap analysis
//!
//! Each session is compared with the previous close: an open above it is a
//! gap up (`Alta`), below it a gap down (`Baixa`), equal to it no gap (`Sem
//! Gap`). [`GapSummary`] aggregates the sessions by gap type and by weekday.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use trade_math::stats::{mean, Quartiles};

use crate::error::{QuantError, Result};
use crate::series::PriceSeries;

/// Opening gap against the previous close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GapType {
    #[serde(rename = "Alta")]
    Up,
    #[serde(rename = "Baixa")]
    Down,
    #[serde(rename = "Sem Gap")]
    Flat,
}

impl GapType {
    pub const ALL: [GapType; 3] = [GapType::Up, GapType::Down, GapType::Flat];

    pub fn classify(previous_close: f64, open: f64) -> Self {
        if open > previous_close {
            GapType::Up
        } else if open < previous_close {
            GapType::Down
        } else {
            GapType::Flat
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GapType::Up => "Alta",
            GapType::Down => "Baixa",
            GapType::Flat => "Sem Gap",
        }
    }
}

impl fmt::Display for GapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Portuguese weekday name as used in the metrics files
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Segunda",
        Weekday::Tue => "Terça",
        Weekday::Wed => "Quarta",
        Weekday::Thu => "Quinta",
        Weekday::Fri => "Sexta",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// Derived figures for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Close - Open, in currency
    pub variation: f64,
    /// (Close - Open) / Open * 100
    pub variation_pct: f64,
    /// (High - Low) / Open * 100
    pub range_pct: f64,
    /// `None` on the first session
    pub gap: Option<GapType>,
}

/// Compute [`SessionStats`] for every bar of `series`
pub fn session_stats(series: &PriceSeries) -> Vec<SessionStats> {
    let bars = series.bars();

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let gap = i
                .checked_sub(1)
                .map(|prev| GapType::classify(bars[prev].close, bar.open));
            let variation = bar.close - bar.open;

            SessionStats {
                date: bar.date,
                weekday: bar.date.weekday(),
                variation,
                variation_pct: variation / bar.open * 100.0,
                range_pct: (bar.high - bar.low) / bar.open * 100.0,
                gap,
            }
        })
        .collect()
}

/// Variation statistics of the sessions sharing one gap type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GapGroup {
    pub gap: GapType,
    pub sessions: usize,
    pub mean_variation_pct: f64,
    pub quartiles: Quartiles,
}

/// Number of sessions for one (weekday, gap type) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekdayGapCount {
    pub weekday: Weekday,
    pub gap: GapType,
    pub count: usize,
}

/// Gap statistics of a whole series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSummary {
    pub ticker: String,
    /// One entry per gap type that occurred, in `Alta, Baixa, Sem Gap` order
    pub groups: Vec<GapGroup>,
    /// Non-zero counts ordered by weekday then gap type
    pub frequency: Vec<WeekdayGapCount>,
}

impl GapSummary {
    /// Aggregate the sessions of `series`; needs at least two bars
    pub fn from_series(series: &PriceSeries) -> Result<Self> {
        let sessions = session_stats(series);

        let mut by_gap: BTreeMap<GapType, Vec<f64>> = BTreeMap::new();
        let mut counts: BTreeMap<(u32, GapType), (Weekday, usize)> = BTreeMap::new();

        for session in &sessions {
            let Some(gap) = session.gap else { continue };
            by_gap.entry(gap).or_default().push(session.variation_pct);
            counts
                .entry((session.weekday.num_days_from_monday(), gap))
                .or_insert((session.weekday, 0))
                .1 += 1;
        }

        if by_gap.is_empty() {
            return Err(QuantError::InsufficientData(format!(
                "{}: gap analysis needs at least two sessions",
                series.ticker()
            )));
        }

        let groups = by_gap
            .into_iter()
            .map(|(gap, variations)| {
                Ok(GapGroup {
                    gap,
                    sessions: variations.len(),
                    mean_variation_pct: mean(&variations)?,
                    quartiles: Quartiles::from_sample(&variations)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let frequency = counts
            .into_iter()
            .map(|((_, gap), (weekday, count))| WeekdayGapCount { weekday, gap, count })
            .collect();

        Ok(Self {
            ticker: series.ticker().to_string(),
            groups,
            frequency,
        })
    }

    pub fn group(&self, gap: GapType) -> Option<&GapGroup> {
        self.groups.iter().find(|g| g.gap == gap)
    }

    /// Sessions with `gap` that fell on `weekday`
    pub fn count(&self, weekday: Weekday, gap: GapType) -> usize {
        self.frequency
            .iter()
            .find(|c| c.weekday == weekday && c.gap == gap)
            .map_or(0, |c| c.count)
    }
}
