//! Text rendering of an analysis
//!
//! Section order is fixed; only the bullet lists of the positive and
//! negative context depend on thresholds. Percentages carry one decimal,
//! ratios and prices two, expectancy three. An infinite ratio prints as
//! `∞` and an undefined one (including a hit rate without trades) as `n/d`.

use std::fmt;

use crate::analysis::{AnalysisOutcome, AssetAnalysis};
use crate::persona::{AnalystPersona, QUANTALPHA};
use crate::scoring::ProfileScore;

pub const HIGH_HIT_RATE: f64 = 0.60;
pub const ROBUST_PROFIT_FACTOR: f64 = 1.5;
/// Percent distance to MA20 below which the price is at a discount
pub const DISCOUNT_DIST_MA20: f64 = -2.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const SIGNIFICANT_DRAWDOWN: f64 = -0.15;
pub const LIMITED_PAYOFF: f64 = 1.5;
/// Percent distance to MA50 below which the long-term trend is negative
pub const NEGATIVE_DIST_MA50: f64 = -5.0;

const UNDEFINED: &str = "n/d";

/// Fraction as a percentage with `decimals` places
fn percent(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        UNDEFINED.to_string()
    } else {
        format!("{:.*}%", decimals, value * 100.0)
    }
}

fn ratio(value: f64) -> String {
    if value.is_nan() {
        UNDEFINED.to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "∞" } else { "-∞" }).to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn hit_rate(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |h| percent(h, 1))
}

fn price(value: f64) -> String {
    format!("R$ {:.2}", value)
}

/// Daily report of one analysis
pub struct DailyReport<'a> {
    analysis: &'a AssetAnalysis,
    persona: &'a AnalystPersona,
}

impl<'a> DailyReport<'a> {
    pub fn new(analysis: &'a AssetAnalysis) -> Self {
        Self {
            analysis,
            persona: &QUANTALPHA,
        }
    }

    fn positive_signals(&self) -> Vec<String> {
        let a = self.analysis;
        let bt = &a.backtest;
        let mut signals = Vec::new();

        if let Some(h) = bt.hit_rate.filter(|h| *h > HIGH_HIT_RATE) {
            signals.push(format!(
                "**Alta Taxa de Acerto:** {} de assertividade histórica",
                percent(h, 1)
            ));
        }
        if bt.profit_factor > ROBUST_PROFIT_FACTOR {
            signals.push(format!(
                "**Fator de Lucro Robusto:** {} (cada R$1 perdido gera R${})",
                ratio(bt.profit_factor),
                ratio(bt.profit_factor)
            ));
        }
        if a.trends.dist_ma20 < DISCOUNT_DIST_MA20 {
            signals.push(format!(
                "**Desconto Estatístico:** Ativo {:.1}% abaixo da média de 20 períodos",
                a.trends.dist_ma20.abs()
            ));
        }
        if a.current_rsi < RSI_OVERSOLD {
            signals.push(format!(
                "**RSI Oversold:** {:.1} indica possível reversão de alta",
                a.current_rsi
            ));
        }

        signals
    }

    fn negative_signals(&self) -> Vec<String> {
        let a = self.analysis;
        let bt = &a.backtest;
        let mut signals = Vec::new();

        if bt.max_drawdown < SIGNIFICANT_DRAWDOWN {
            signals.push(format!(
                "**Drawdown Significativo:** Máximo histórico de {}",
                percent(bt.max_drawdown, 1)
            ));
        }
        if bt.payoff_ratio < LIMITED_PAYOFF {
            signals.push(format!(
                "**Payoff Limitado:** Razão ganho/perda de apenas {}",
                ratio(bt.payoff_ratio)
            ));
        }
        if a.trends.dist_ma50 < NEGATIVE_DIST_MA50 {
            signals.push(format!(
                "**Tendência de Longo Prazo Negativa:** {:.1}% abaixo da média de 50 períodos",
                a.trends.dist_ma50.abs()
            ));
        }
        if a.current_rsi > RSI_OVERBOUGHT {
            signals.push(format!(
                "**RSI Overbought:** {:.1} indica possível correção",
                a.current_rsi
            ));
        }

        signals
    }
}

fn write_bullets(f: &mut fmt::Formatter<'_>, bullets: &[String]) -> fmt::Result {
    if bullets.is_empty() {
        return writeln!(f, "- Nenhum sinal relevante nos limiares atuais");
    }
    for bullet in bullets {
        writeln!(f, "- {}", bullet)?;
    }
    Ok(())
}

impl fmt::Display for DailyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        let bt = &a.backtest;
        let bands = &a.volatility_ranges;
        let levels = &a.technical_levels;
        let profile = ProfileScore::evaluate(bt);

        writeln!(f, "# ANÁLISE QUANTALPHA - {}", a.ticker)?;
        writeln!(
            f,
            "*Análise para o próximo pregão baseada em dados estatísticos e backtests ({} pregões até {})*",
            a.data_points, a.as_of
        )?;
        writeln!(f, "\n---\n")?;

        writeln!(f, "## 1. RESUMO QUANTITATIVO DO ATIVO\n")?;
        writeln!(f, "**Ativo em Foco:** {}", a.ticker)?;
        writeln!(f, "**Preço Atual:** {}", price(a.current_price))?;
        writeln!(
            f,
            "**Volatilidade Anualizada (20d):** {} | **RSI(14):** {:.1}\n",
            percent(a.current_volatility, 1),
            a.current_rsi
        )?;
        writeln!(
            f,
            "**Métrica Principal:** O backtest de estratégia de retorno à média de 20 períodos em {} mostrou:",
            a.ticker
        )?;
        writeln!(f, "- **Taxa de Acerto:** {}", hit_rate(bt.hit_rate))?;
        writeln!(f, "- **Fator de Lucro:** {}", ratio(bt.profit_factor))?;
        writeln!(
            f,
            "- **Expectativa Matemática por Operação:** {}\n",
            percent(bt.expectancy, 3)
        )?;
        writeln!(f, "**Volatilidade Esperada para o Próximo Pregão:**")?;
        writeln!(
            f,
            "- **68% de probabilidade (1σ):** {} - {}",
            price(bands.lower_1std),
            price(bands.upper_1std)
        )?;
        writeln!(
            f,
            "- **95% de probabilidade (2σ):** {} - {}",
            price(bands.lower_2std),
            price(bands.upper_2std)
        )?;
        writeln!(f, "\n---\n")?;

        writeln!(f, "## 2. CONTEXTO POSITIVO (Argumentos para COMPRA)\n")?;
        writeln!(f, "**Sinais Matemáticos:**")?;
        write_bullets(f, &self.positive_signals())?;
        writeln!(f, "\n**Argumento Subjetivo Derivado:**")?;
        writeln!(
            f,
            "Matematicamente, a combinação de taxa de acerto de {} com fator de lucro de {} \
             indica se os compradores podem encontrar oportunidade neste nível de preço, \
             assumindo que o padrão histórico se mantenha.",
            hit_rate(bt.hit_rate),
            ratio(bt.profit_factor)
        )?;
        writeln!(f, "\n---\n")?;

        writeln!(f, "## 3. CONTEXTO NEGATIVO (Argumentos para CAUTELA/VENDA)\n")?;
        writeln!(f, "**Sinais Matemáticos:**")?;
        write_bullets(f, &self.negative_signals())?;
        writeln!(f, "\n**Argumento Subjetivo Derivado:**")?;
        writeln!(
            f,
            "O drawdown máximo de {} indica o risco que a estratégia já enfrentou. Uma mudança \
             súbita no humor do mercado pode levar a perdas significativas, exigindo gestão \
             rigorosa de risco.",
            percent(bt.max_drawdown, 1)
        )?;
        writeln!(f, "\n---\n")?;

        writeln!(f, "## 4. SOLUÇÕES E ESTRATÉGIAS ACIONÁVEIS\n")?;
        writeln!(f, "**Níveis de Preço Chave:**")?;
        writeln!(
            f,
            "- **Entrada Estatística:** {} (suporte de 1σ)",
            price(bands.lower_1std)
        )?;
        writeln!(
            f,
            "- **Stop Loss Matemático:** {} (mínima de 20 períodos)",
            price(levels.support)
        )?;
        writeln!(
            f,
            "- **Alvo Primário:** {} (retorno à média)",
            price(levels.ma20)
        )?;
        writeln!(
            f,
            "- **Alvo Secundário:** {} (resistência de 1σ)",
            price(bands.upper_1std)
        )?;
        writeln!(f, "\n**Cenário Mais Provável:**")?;
        writeln!(
            f,
            "Abertura próxima à estabilidade ({}), com teste do suporte estatístico em {}.",
            price(a.current_price),
            price(bands.lower_1std)
        )?;
        writeln!(f, "\n**Condição de Invalidação:**")?;
        writeln!(
            f,
            "A tese de compra será invalidada se o preço negociar abaixo de {}.",
            price(levels.support)
        )?;
        writeln!(f, "\n---\n")?;

        writeln!(f, "## RESUMO EXECUTIVO\n")?;
        writeln!(
            f,
            "- **Expectativa Matemática:** {} por operação",
            percent(bt.expectancy, 3)
        )?;
        writeln!(f, "- **Risco/Retorno:** Payoff de {}:1", ratio(bt.payoff_ratio))?;
        writeln!(f, "- **Probabilidade de Sucesso:** {}", hit_rate(bt.hit_rate))?;
        writeln!(f, "- **Retorno Total do Backtest:** {}", percent(bt.total_return, 1))?;
        writeln!(f, "- **Operações:** {}", bt.num_trades)?;
        writeln!(
            f,
            "- **Avaliação:** {} ({}/6)",
            profile.verdict, profile.score
        )?;
        writeln!(f, "- **Capital de Risco Sugerido:** Máximo 2% do capital por posição\n")?;
        writeln!(f, "{}", self.persona.signature())
    }
}

/// Render the daily report of a complete analysis
pub fn render_report(analysis: &AssetAnalysis) -> String {
    DailyReport::new(analysis).to_string()
}

/// Render an outcome; a failure becomes a single error line
pub fn render_outcome(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Complete(analysis) => render_report(analysis),
        AnalysisOutcome::Failed(failure) => format!("Erro: {}\n", failure.error),
    }
}

/// Render an outcome wrapped in the analyst introduction and footer
pub fn render_response(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Complete(analysis) => format!(
            "{}\n{}\n{}",
            QUANTALPHA.introduction(),
            render_report(analysis),
            QUANTALPHA.footer()
        ),
        AnalysisOutcome::Failed(_) => render_outcome(outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisFailure, TechnicalLevels, Trends};
    use crate::backtest::BacktestResult;
    use crate::bands::VolatilityBands;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn analysis() -> AssetAnalysis {
        AssetAnalysis {
            ticker: "PETR4".to_string(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            data_points: 504,
            current_price: 35.5,
            current_volatility: 0.3,
            current_rsi: 25.0,
            volatility_ranges: VolatilityBands::from_price(35.5, 0.3),
            trends: Trends::new(35.5, 36.5, 38.0),
            backtest: BacktestResult {
                total_return: 0.125,
                hit_rate: Some(0.625),
                max_drawdown: -0.2,
                profit_factor: 1.75,
                avg_win: 0.012,
                avg_loss: 0.01,
                payoff_ratio: 1.2,
                expectancy: 0.00045,
                num_trades: 480,
            },
            technical_levels: TechnicalLevels {
                ma20: 36.5,
                ma50: 38.0,
                support: 34.1,
                resistance: 37.9,
            },
        }
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(percent(0.625, 1), "62.5%");
        assert_eq!(percent(0.00045, 3), "0.045%");
        assert_eq!(ratio(1.754), "1.75");
        assert_eq!(ratio(f64::INFINITY), "∞");
        assert_eq!(ratio(f64::NAN), "n/d");
        assert_eq!(hit_rate(None), "n/d");
        assert_eq!(price(8.2), "R$ 8.20");
    }

    #[test]
    fn test_conditional_bullets() {
        let a = analysis();
        let report = DailyReport::new(&a);

        // dist_ma20 = -2.74%, dist_ma50 = -6.58%
        assert_eq!(
            report.positive_signals(),
            vec![
                "**Alta Taxa de Acerto:** 62.5% de assertividade histórica".to_string(),
                "**Fator de Lucro Robusto:** 1.75 (cada R$1 perdido gera R$1.75)".to_string(),
                "**Desconto Estatístico:** Ativo 2.7% abaixo da média de 20 períodos".to_string(),
                "**RSI Oversold:** 25.0 indica possível reversão de alta".to_string(),
            ]
        );
        assert_eq!(
            report.negative_signals(),
            vec![
                "**Drawdown Significativo:** Máximo histórico de -20.0%".to_string(),
                "**Payoff Limitado:** Razão ganho/perda de apenas 1.20".to_string(),
                "**Tendência de Longo Prazo Negativa:** 6.6% abaixo da média de 50 períodos"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_report_sections() {
        let text = render_report(&analysis());
        let headings: Vec<&str> = text.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(
            headings,
            vec![
                "# ANÁLISE QUANTALPHA - PETR4",
                "## 1. RESUMO QUANTITATIVO DO ATIVO",
                "## 2. CONTEXTO POSITIVO (Argumentos para COMPRA)",
                "## 3. CONTEXTO NEGATIVO (Argumentos para CAUTELA/VENDA)",
                "## 4. SOLUÇÕES E ESTRATÉGIAS ACIONÁVEIS",
                "## RESUMO EXECUTIVO",
            ]
        );
        assert!(text.contains("- **Taxa de Acerto:** 62.5%"));
        assert!(text.contains("- **Expectativa Matemática por Operação:** 0.045%"));
        assert!(text.contains("- **Stop Loss Matemático:** R$ 34.10"));
        assert!(text.contains(
            "- **Avaliação:** PERFIL ATRATIVO para estratégias quantitativas (5/6)"
        ));
    }

    #[test]
    fn test_degenerate_statistics_render() {
        let mut a = analysis();
        a.current_rsi = 50.0;
        a.backtest.hit_rate = None;
        a.backtest.profit_factor = f64::NAN;
        a.backtest.payoff_ratio = f64::INFINITY;
        a.backtest.num_trades = 0;

        let text = render_report(&a);
        assert!(text.contains("- **Taxa de Acerto:** n/d"));
        assert!(text.contains("- **Fator de Lucro:** n/d"));
        assert!(text.contains("Payoff de ∞:1"));
        assert!(!text.contains("Alta Taxa de Acerto"));
        assert!(!text.contains("Payoff Limitado"));
    }

    #[test]
    fn test_failure_renders_single_line() {
        let outcome = AnalysisOutcome::Failed(AnalysisFailure {
            ticker: "XPTO3".to_string(),
            error: "Analysis of XPTO3 failed: boom".to_string(),
        });
        assert_eq!(render_response(&outcome), "Erro: Analysis of XPTO3 failed: boom\n");
        assert_eq!(render_outcome(&outcome).lines().count(), 1);
    }

    #[test]
    fn test_response_wraps_report() {
        let outcome = AnalysisOutcome::Complete(Box::new(analysis()));
        let text = render_response(&outcome);
        assert!(text.starts_with("**QuantAlpha aqui!**"));
        assert!(text.contains("# ANÁLISE QUANTALPHA - PETR4"));
        assert!(text.trim_end().ends_with("Posso aprofundar qualquer métrica ou cenário!**"));
    }
}
