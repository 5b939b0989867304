//! Quick profile evaluation of a backtest
//!
//! Three criteria are graded: hit rate, profit factor and maximum drawdown.
//! Each grade adds 0 to 2 points; the total (0..=6) maps to a verdict.

use std::fmt;

use serde::Serialize;

use crate::backtest::BacktestResult;

/// Grade of a single criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Strong,
    Moderate,
    Weak,
}

impl Grade {
    pub fn points(self) -> u8 {
        match self {
            Grade::Strong => 2,
            Grade::Moderate => 1,
            Grade::Weak => 0,
        }
    }

    // NaN compares false everywhere and grades as weak
    fn above(value: f64, strong: f64, moderate: f64) -> Self {
        if value > strong {
            Grade::Strong
        } else if value > moderate {
            Grade::Moderate
        } else {
            Grade::Weak
        }
    }
}

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfileVerdict {
    Attractive,
    Moderate,
    HighRisk,
}

impl ProfileVerdict {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 5 => ProfileVerdict::Attractive,
            s if s >= 3 => ProfileVerdict::Moderate,
            _ => ProfileVerdict::HighRisk,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ProfileVerdict::Attractive => "PERFIL ATRATIVO para estratégias quantitativas",
            ProfileVerdict::Moderate => "PERFIL MODERADO - requer análise adicional",
            ProfileVerdict::HighRisk => "PERFIL DE RISCO ELEVADO",
        }
    }
}

impl fmt::Display for ProfileVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Graded criteria and the resulting verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileScore {
    pub hit_rate: Grade,
    pub profit_factor: Grade,
    pub drawdown: Grade,
    pub score: u8,
    pub verdict: ProfileVerdict,
}

impl ProfileScore {
    pub fn evaluate(backtest: &BacktestResult) -> Self {
        let hit_rate = backtest
            .hit_rate
            .map_or(Grade::Weak, |h| Grade::above(h, 0.6, 0.5));
        let profit_factor = Grade::above(backtest.profit_factor, 1.5, 1.2);
        let drawdown = Grade::above(backtest.max_drawdown, -0.15, -0.25);

        let score = hit_rate.points() + profit_factor.points() + drawdown.points();

        Self {
            hit_rate,
            profit_factor,
            drawdown,
            score,
            verdict: ProfileVerdict::from_score(score),
        }
    }

    /// One comment line per criterion
    pub fn comments(&self) -> [&'static str; 3] {
        [
            match self.hit_rate {
                Grade::Strong => "Alta taxa de acerto histórica",
                Grade::Moderate => "Taxa de acerto moderada",
                Grade::Weak => "Taxa de acerto baixa",
            },
            match self.profit_factor {
                Grade::Strong => "Fator de lucro robusto",
                Grade::Moderate => "Fator de lucro moderado",
                Grade::Weak => "Fator de lucro insuficiente",
            },
            match self.drawdown {
                Grade::Strong => "Drawdown controlado",
                Grade::Moderate => "Drawdown moderado",
                Grade::Weak => "Drawdown elevado",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn result(hit_rate: Option<f64>, profit_factor: f64, max_drawdown: f64) -> BacktestResult {
        BacktestResult {
            total_return: 0.0,
            hit_rate,
            max_drawdown,
            profit_factor,
            avg_win: 0.0,
            avg_loss: 0.0,
            payoff_ratio: 0.0,
            expectancy: 0.0,
            num_trades: 10,
        }
    }

    #[rstest]
    #[case(Some(0.65), 1.6, -0.10, 6, ProfileVerdict::Attractive)]
    #[case(Some(0.65), 1.3, -0.10, 5, ProfileVerdict::Attractive)]
    #[case(Some(0.55), 1.3, -0.20, 3, ProfileVerdict::Moderate)]
    #[case(Some(0.50), 1.2, -0.25, 0, ProfileVerdict::HighRisk)]
    #[case(None, f64::NAN, -0.40, 0, ProfileVerdict::HighRisk)]
    #[case(Some(0.45), f64::INFINITY, -0.05, 4, ProfileVerdict::Moderate)]
    fn test_profile_score(
        #[case] hit_rate: Option<f64>,
        #[case] profit_factor: f64,
        #[case] drawdown: f64,
        #[case] score: u8,
        #[case] verdict: ProfileVerdict,
    ) {
        let profile = ProfileScore::evaluate(&result(hit_rate, profit_factor, drawdown));
        assert_eq!(profile.score, score);
        assert_eq!(profile.verdict, verdict);
    }

    #[test]
    fn test_comments_follow_grades() {
        let profile = ProfileScore::evaluate(&result(Some(0.55), 2.0, -0.3));
        assert_eq!(
            profile.comments(),
            ["Taxa de acerto moderada", "Fator de lucro robusto", "Drawdown elevado"]
        );
    }
}
