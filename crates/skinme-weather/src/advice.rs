//! Rule-based skincare advice from current weather.

use skinme_core::Language;

use crate::types::CurrentCondition;

/// Advice rules, in the order their messages are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceRule {
    /// Above 30°C
    Hot,
    /// Below 10°C
    Cold,
    /// Humidity below 30%
    Dry,
    /// Humidity above 80%
    Humid,
    /// Description mentions sun or clear sky
    Sunny,
}

impl AdviceRule {
    pub const ALL: [AdviceRule; 5] = [Self::Hot, Self::Cold, Self::Dry, Self::Humid, Self::Sunny];

    fn applies(&self, temp: Option<i64>, humidity: Option<i64>, desc: &str) -> bool {
        match self {
            Self::Hot => temp.is_some_and(|t| t > 30),
            Self::Cold => temp.is_some_and(|t| t < 10),
            Self::Dry => humidity.is_some_and(|h| h < 30),
            Self::Humid => humidity.is_some_and(|h| h > 80),
            Self::Sunny => desc.contains("sun") || desc.contains("clear"),
        }
    }

    pub fn message(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Hot, Language::Zh) => "🌡️ 高温天气，注意防晒和补水",
            (Self::Hot, Language::En) => "🌡️ Hot weather, remember sunscreen and hydration",
            (Self::Cold, Language::Zh) => "❄️ 气温较低，加强保湿防护",
            (Self::Cold, Language::En) => "❄️ Cold weather, boost moisturizing protection",
            (Self::Dry, Language::Zh) => "💧 空气干燥，使用保湿精华",
            (Self::Dry, Language::En) => "💧 Dry air, use moisturizing serum",
            (Self::Humid, Language::Zh) => "💦 湿度较高，使用清爽型产品",
            (Self::Humid, Language::En) => "💦 High humidity, use lightweight products",
            (Self::Sunny, Language::Zh) => "☀️ 晴朗天气，务必涂抹防晒",
            (Self::Sunny, Language::En) => "☀️ Sunny weather, apply sunscreen",
        }
    }
}

/// Message used when no rule fires.
pub fn default_message(language: Language) -> &'static str {
    match language {
        Language::Zh => "天气适宜，正常护肤即可",
        Language::En => "Weather is suitable, normal skincare routine",
    }
}

/// Rules that fire for the given readings, in emission order.
///
/// `None` readings never trigger their rules. `desc` is matched
/// case-insensitively.
pub fn matching_rules(temp: Option<i64>, humidity: Option<i64>, desc: &str) -> Vec<AdviceRule> {
    let desc = desc.to_lowercase();
    AdviceRule::ALL
        .into_iter()
        .filter(|rule| rule.applies(temp, humidity, &desc))
        .collect()
}

/// Newline-joined advice for the given readings.
pub fn advice_for(temp: Option<i64>, humidity: Option<i64>, desc: &str, language: Language) -> String {
    let rules = matching_rules(temp, humidity, desc);
    if rules.is_empty() {
        return default_message(language).to_string();
    }
    rules
        .iter()
        .map(|rule| rule.message(language))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Advice for a wttr.in current-conditions block.
pub fn derive_advice(condition: &CurrentCondition, language: Language) -> String {
    advice_for(
        parse_leading_int(&condition.temp_c),
        parse_leading_int(&condition.humidity),
        condition.description(),
        language,
    )
}

/// Parse the leading integer of `s` the way lenient web parsers do:
/// leading whitespace, an optional sign, then digits; anything after is
/// ignored. `"--"`, `""` and `"abc"` yield `None`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}
