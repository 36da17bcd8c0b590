use rand::Rng;
use regex::Regex;
use serde::Serialize;

/// Structured result of one image scan. `confidence` is always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanVerdict {
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    pub confidence: f64,
    pub raw: String,
}

const AI_PHRASES: &[&str] = &[
    "ai generated",
    "artificial",
    "synthetic",
    "generated by ai",
    "created by ai",
    "ai-generated",
    "not authentic",
    "fake",
    "midjourney",
    "dalle",
    "stable diffusion",
];

const REAL_PHRASES: &[&str] = &[
    "definitely real",
    "clearly authentic",
    "genuine photograph",
    "natural image",
    "camera-captured",
    "authentic image",
];

/// Parse the model's free-text forensic report into a verdict.
///
/// First looks for the verdict line the prompt asks for (`AI 99%` / `REAL 95%`,
/// leftmost occurrence wins). When that pattern is absent, falls back to a
/// phrase scan and defaults to AI when the text is inconclusive. Never fails:
/// any input, including the empty string, yields a concrete verdict.
pub fn extract_verdict(raw_text: &str) -> ScanVerdict {
    // The class token must not sit inside a larger word ("said 99" is not "AI 99").
    let pattern = Regex::new(r"(?i)(?:^|[^\w])(AI|REAL)\s*(\d{1,3})(?:%|\s*percent)?")
        .unwrap();

    if let Some(caps) = pattern.captures(raw_text) {
        let is_ai = caps[1].eq_ignore_ascii_case("ai");
        let number: f64 = caps[2].parse().unwrap_or(0.0);
        return ScanVerdict {
            is_ai,
            confidence: (number / 100.0).clamp(0.0, 1.0),
            raw: raw_text.to_string(),
        };
    }

    let lower = raw_text.to_lowercase();
    let ai_hit = AI_PHRASES.iter().any(|p| lower.contains(p));
    let real_hit = REAL_PHRASES.iter().any(|p| lower.contains(p));

    ScanVerdict {
        // Skeptical default: only a real-indicator with no AI-indicator reads as REAL.
        is_ai: ai_hit || !real_hit,
        confidence: if ai_hit || real_hit { 0.9 } else { 0.7 },
        raw: raw_text.to_string(),
    }
}

/// Placeholder verdict for the upstream-outage path. The caller still answers
/// 200 with a well-formed verdict; the failure reason stays visible in `raw`.
pub fn mock_verdict(error: &str) -> ScanVerdict {
    let mut rng = rand::rng();
    ScanVerdict {
        is_ai: rng.random_bool(0.5),
        confidence: rng.random_range(70..=99) as f64 / 100.0,
        raw: format!("API call failed, using mock response. Error: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_line_ai_with_percent() {
        let v = extract_verdict("Lighting is inconsistent.\n\nVerdict: AI 99%");
        assert!(v.is_ai);
        assert_eq!(v.confidence, 0.99);
    }

    #[test]
    fn verdict_line_real_with_percent() {
        let v = extract_verdict("Shadows check out.\n\nVerdict: REAL 95%");
        assert!(!v.is_ai);
        assert_eq!(v.confidence, 0.95);
    }

    #[test]
    fn verdict_accepts_percent_word_and_case() {
        let v = extract_verdict("verdict: real 80 percent");
        assert!(!v.is_ai);
        assert_eq!(v.confidence, 0.8);
    }

    #[test]
    fn first_match_wins_over_later_ones() {
        let v = extract_verdict("Verdict: AI 85%. A second pass might say REAL 60%.");
        assert!(v.is_ai);
        assert_eq!(v.confidence, 0.85);
    }

    #[test]
    fn token_inside_a_word_does_not_match() {
        // "said 99" must not be read as "AI 99"; no phrases either, so the
        // skeptical default applies.
        let v = extract_verdict("the photographer said 99 frames were taken");
        assert!(v.is_ai);
        assert_eq!(v.confidence, 0.7);
    }

    #[test]
    fn out_of_range_number_clamps_to_one() {
        let v = extract_verdict("Verdict: AI 150%");
        assert!(v.is_ai);
        assert_eq!(v.confidence, 1.0);
    }

    #[test]
    fn fallback_ai_phrase() {
        let v = extract_verdict("This looks like stable diffusion output to me.");
        assert!(v.is_ai);
        assert_eq!(v.confidence, 0.9);
    }

    #[test]
    fn fallback_real_phrase() {
        let v = extract_verdict("All cues point to a genuine photograph.");
        assert!(!v.is_ai);
        assert_eq!(v.confidence, 0.9);
    }

    #[test]
    fn fallback_contradictory_phrases_lean_ai() {
        let v = extract_verdict("A genuine photograph? No - this is fake.");
        assert!(v.is_ai);
        assert_eq!(v.confidence, 0.9);
    }

    #[test]
    fn empty_text_defaults_to_low_confidence_ai() {
        let v = extract_verdict("");
        assert!(v.is_ai);
        assert_eq!(v.confidence, 0.7);
        assert_eq!(v.raw, "");
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "Verdict: REAL 92%";
        assert_eq!(extract_verdict(text), extract_verdict(text));
    }

    #[test]
    fn mock_verdict_shape() {
        for _ in 0..50 {
            let v = mock_verdict("connection refused");
            assert!((0.70..=0.99).contains(&v.confidence));
            assert!(v.raw.contains("API call failed, using mock response."));
            assert!(v.raw.contains("connection refused"));
        }
    }
}
