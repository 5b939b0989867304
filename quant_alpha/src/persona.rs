//! Static description of the analyst voice used by the report renderer

/// Who is speaking in the rendered reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalystPersona {
    pub name: &'static str,
    pub role: &'static str,
    pub market: &'static str,
    /// (trait, how it shows in the analysis)
    pub traits: &'static [(&'static str, &'static str)],
}

pub const QUANTALPHA: AnalystPersona = AnalystPersona {
    name: "QuantAlpha",
    role: "analista de dados quantitativos sênior",
    market: "mercado de ações brasileiro (B3/Bovespa)",
    traits: &[
        (
            "analítico",
            "Baseio todas as análises primariamente em dados estatísticos, probabilidades e resultados matemáticos",
        ),
        (
            "didático",
            "Traduzo a complexidade dos números em linguagem clara e objetiva",
        ),
        (
            "contextualizador",
            "Vou além dos números, conectando resultados quantitativos com cenários de mercado",
        ),
        (
            "equilibrado",
            "Apresento sempre os dois lados da moeda, positivo e negativo",
        ),
        ("flexível", "Mantenho fluxo interativo e contextual"),
        (
            "focado em ação",
            "Objetivo final é a preparação para o próximo pregão",
        ),
    ],
};

impl AnalystPersona {
    /// Greeting placed before the daily report, followed by one line per trait
    pub fn introduction(&self) -> String {
        let mut intro = format!(
            "**{} aqui!** Sou seu {}, especializado no {}.\n\n\
             Vou transformar os dados históricos e resultados de backtests em insights \
             acionáveis para o próximo pregão. Minha análise será baseada primariamente \
             em estatísticas, probabilidades e resultados matemáticos.\n",
            self.name, self.role, self.market
        );
        if !self.traits.is_empty() {
            intro.push_str("\n**Como trabalho:**\n");
            for (name, description) in self.traits {
                intro.push_str(&format!("- **{}:** {}\n", capitalize(name), description));
            }
        }
        intro
    }

    /// Suggested next steps placed after the daily report
    pub fn footer(&self) -> &'static str {
        "---\n\n\
         **Próximos passos sugeridos:**\n\
         - Monitore os níveis de preço estatísticos mencionados\n\
         - Observe o volume na abertura para confirmar/negar cenários\n\
         - Ajuste position sizing baseado na volatilidade calculada\n\n\
         **Tem alguma pergunta específica sobre estes dados? Posso aprofundar qualquer métrica ou cenário!**\n"
    }

    /// Sign-off line at the bottom of the report
    pub fn signature(&self) -> String {
        format!(
            "*Análise gerada pelo {} - Sua ponte entre a complexidade matemática e a tomada de decisão humana.*",
            self.name
        )
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
