//! Localized feedback text, looked up by locale and outcome.
use qcm_schema::Locale;

/// Overall performance band for a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl Tier {
    /// Bands are inclusive at their lower bound: 80 is excellent, 79 is good.
    pub fn from_score(score_percent: u8) -> Self {
        match score_percent {
            80.. => Tier::Excellent,
            60..=79 => Tier::Good,
            40..=59 => Tier::Average,
            _ => Tier::Poor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

pub fn overall_template(locale: Locale, tier: Tier) -> &'static str {
    match (locale, tier) {
        (Locale::En, Tier::Excellent) => {
            "Excellent performance! You have mastered the subject competencies well."
        }
        (Locale::En, Tier::Good) => "Good performance, but some areas need improvement.",
        (Locale::En, Tier::Average) => {
            "Average performance. It's recommended to review some competencies."
        }
        (Locale::En, Tier::Poor) => "Poor performance. Thorough review is needed.",
        (Locale::Fr, Tier::Excellent) => {
            "Excellente performance! Vous maîtrisez bien les compétences du sujet."
        }
        (Locale::Fr, Tier::Good) => "Bonne performance, mais quelques points à améliorer.",
        (Locale::Fr, Tier::Average) => {
            "Performance moyenne. Il est recommandé de réviser certaines compétences."
        }
        (Locale::Fr, Tier::Poor) => "Performance faible. Une révision approfondie est nécessaire.",
    }
}

pub fn overall_feedback(locale: Locale, score_percent: u8) -> String {
    overall_template(locale, Tier::from_score(score_percent)).to_string()
}

/// `number` is 1-based. Competency and option text are inserted verbatim.
pub fn question_feedback(
    locale: Locale,
    number: usize,
    competency: &str,
    outcome: Outcome,
    correct_option: &str,
) -> String {
    match (locale, outcome) {
        (Locale::En, Outcome::Correct) => {
            format!("Question {number}: Correct! You understand \"{competency}\" well.")
        }
        (Locale::En, Outcome::Incorrect) => format!(
            "Question {number}: Incorrect. The right answer was \"{correct_option}\". Review: {competency}."
        ),
        (Locale::Fr, Outcome::Correct) => {
            format!("Question {number}: Correct! Vous maîtrisez la compétence \"{competency}\".")
        }
        (Locale::Fr, Outcome::Incorrect) => format!(
            "Question {number}: Incorrect. La bonne réponse était \"{correct_option}\". Réviser: {competency}."
        ),
    }
}
