use regex::Regex;

/// Memo prefixes for payment aggregators that bury the real merchant in a
/// fixed-width field after the aggregator name.
const AGGREGATORS: &[&str] = &["PAYPAL", "VENMO", "CASH APP", "ZELLE"];

// ---------------------------------------------------------------------------
// Rule chain: ordered, enum-dispatched; terminal rules short-circuit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum RuleKind {
    /// Drop a trailing " MM/DD" posting-date suffix.
    StripTrailingDate,
    /// A `*` immediately followed by an NNN-NNN-NNNN phone number ends the
    /// useful part of the memo; keep everything before the `*`.
    PhoneSuffix,
    /// Aggregator memo lines: the merchant sits in the 3rd fixed-width field
    /// of the original string.
    Aggregator,
    /// Amazon digital orders carry random order codes that would fragment
    /// the vendor; collapse them all to one canonical name.
    AmazonDigital,
    /// Generic cleanup of ticket numbers, phone numbers, long digit runs,
    /// and stray `*` tokens.
    ScrubNoise,
}

const RULE_CHAIN: &[RuleKind] = &[
    RuleKind::StripTrailingDate,
    RuleKind::PhoneSuffix,
    RuleKind::Aggregator,
    RuleKind::AmazonDigital,
    RuleKind::ScrubNoise,
];

impl RuleKind {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::PhoneSuffix | Self::Aggregator | Self::AmazonDigital
        )
    }

    /// Returns the rule's output when it fires. `current` is the working
    /// string after earlier rewrites; `original` is the upper-cased input,
    /// which the aggregator rule needs because date-stripping can disturb
    /// the fixed-width field layout.
    fn apply(self, n: &PayeeNormalizer, current: &str, original: &str) -> Option<String> {
        match self {
            Self::StripTrailingDate => {
                Some(n.trailing_date.replace(current, "").into_owned())
            }
            Self::PhoneSuffix => {
                let m = n.star_phone.find(current)?;
                Some(current[..m.start()].trim().to_string())
            }
            Self::Aggregator => {
                let keyword = AGGREGATORS.iter().find(|k| current.starts_with(*k))?;
                let fields: Vec<&str> = n.spaces.split(original).collect();
                if fields.len() >= 3 {
                    let merchant = n.trailing_date.replace(fields[2], "");
                    Some(merchant.trim().to_string())
                } else {
                    Some((*keyword).to_string())
                }
            }
            Self::AmazonDigital => {
                if current.starts_with("AMZN DIGITAL") || current.starts_with("AMAZON DIGITAL") {
                    Some("AMZN DIGITAL".to_string())
                } else {
                    None
                }
            }
            Self::ScrubNoise => {
                let s = n.ticket.replace_all(current, " ");
                let s = n.phone_dashed.replace_all(&s, " ");
                let s = n.phone_compact.replace_all(&s, " ");
                let s = n.digit_run.replace_all(&s, " ");
                let s = n.lone_star.replace_all(&s, " ");
                let s = n.spaces.replace_all(&s, " ");
                Some(s.trim().to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PayeeNormalizer
// ---------------------------------------------------------------------------

/// Rule-based canonicalizer for raw bank memo strings. Pure and total: any
/// input yields some string, worst case an over-long but harmless one.
pub struct PayeeNormalizer {
    trailing_date: Regex,
    star_phone: Regex,
    ticket: Regex,
    phone_dashed: Regex,
    phone_compact: Regex,
    digit_run: Regex,
    lone_star: Regex,
    spaces: Regex,
}

impl PayeeNormalizer {
    pub fn new() -> Self {
        Self {
            trailing_date: Regex::new(r"\s+\d{2}/\d{2}\s*$").unwrap(),
            star_phone: Regex::new(r"\*\d{3}-\d{3}-\d{4}").unwrap(),
            ticket: Regex::new(r"#\d+").unwrap(),
            phone_dashed: Regex::new(r"\d{3}-\d{3}-\d{4}").unwrap(),
            phone_compact: Regex::new(r"\d{3}-\d{7}").unwrap(),
            digit_run: Regex::new(r"\d{5,}").unwrap(),
            lone_star: Regex::new(r"(?:^|\s)\*(?:\s|$)").unwrap(),
            spaces: Regex::new(r" {2,}").unwrap(),
        }
    }

    pub fn normalize(&self, raw: &str) -> String {
        let original = raw.trim().to_uppercase();
        let mut current = original.clone();
        for rule in RULE_CHAIN {
            match rule.apply(self, &current, &original) {
                Some(out) if rule.is_terminal() => return out,
                Some(out) => current = out,
                None => {}
            }
        }
        current
    }
}

impl Default for PayeeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
