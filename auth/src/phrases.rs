/// Fixed, immutable collection of trigger phrases.
///
/// A transcript matches when, case-insensitively, it contains one of the
/// phrases or is itself contained by one (the recognizer may return either
/// a superset or a truncation of the spoken phrase). Matching a phrase is
/// necessary but not sufficient for authentication: the voiceprint
/// comparison still has to pass.
#[derive(Debug, Clone)]
pub struct PassphraseSet {
    phrases: Vec<String>,
}

impl PassphraseSet {
    /// Builds a set from the given phrases. Comparison is case-insensitive,
    /// so phrases are folded once here.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    /// Bidirectional case-insensitive substring test against every phrase.
    /// Empty transcripts never match.
    pub fn matches(&self, transcript: &str) -> bool {
        let t = transcript.trim().to_lowercase();
        if t.is_empty() {
            return false;
        }
        self.phrases
            .iter()
            .any(|p| t.contains(p.as_str()) || p.contains(&t))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Default for PassphraseSet {
    /// The built-in developer-mode trigger phrases.
    fn default() -> Self {
        Self::new([
            "Dr Danger developer mode activate",
            "Theodore Pridemore admin access",
            "KTP Contracting owner authentication",
            "Teddy Dangers master key",
            "Construction AI developer unlock",
        ])
    }
}
