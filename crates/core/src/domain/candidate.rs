use serde::{Deserialize, Serialize};

/// One dictionary entry as reported by the upstream API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionCandidate {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, rename = "thumbs_up")]
    pub approval_count: i64,
    #[serde(default, rename = "thumbs_down")]
    pub disapproval_count: i64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defid: Option<u64>,
}

impl DefinitionCandidate {
    pub fn has_definition(&self) -> bool {
        !self.definition.trim().is_empty()
    }
}

/// Envelope shared by the `define` and `random` upstream endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateList {
    pub list: Vec<DefinitionCandidate>,
}

/// Picks the candidate with the strictly greatest approval count.
///
/// Ties keep the earliest candidate. Returns `None` when the list is empty or
/// when the winner carries no definition text.
pub fn select_top_voted(candidates: &[DefinitionCandidate]) -> Option<&DefinitionCandidate> {
    let mut best: Option<&DefinitionCandidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.approval_count <= current.approval_count => {}
            _ => best = Some(candidate),
        }
    }

    best.filter(|candidate| candidate.has_definition())
}

/// Returns the first candidate in the batch whose approval count is strictly
/// above `threshold` and which carries definition text.
pub fn first_above_threshold(
    candidates: &[DefinitionCandidate],
    threshold: i64,
) -> Option<&DefinitionCandidate> {
    candidates
        .iter()
        .find(|candidate| candidate.approval_count > threshold && candidate.has_definition())
}

#[cfg(test)]
mod tests {
    use super::{first_above_threshold, select_top_voted, CandidateList, DefinitionCandidate};

    fn candidate(definition: &str, approval_count: i64) -> DefinitionCandidate {
        DefinitionCandidate {
            word: "hello".to_owned(),
            definition: definition.to_owned(),
            approval_count,
            ..DefinitionCandidate::default()
        }
    }

    #[test]
    fn selects_highest_approval_count() {
        let candidates =
            vec![candidate("A greeting", 5), candidate("Slang for goodbye", 42), candidate("x", 7)];

        let selected = select_top_voted(&candidates).expect("candidate selected");

        assert_eq!(selected.definition, "Slang for goodbye");
        assert!(candidates.iter().all(|other| selected.approval_count >= other.approval_count));
    }

    #[test]
    fn ties_keep_first_seen_candidate() {
        let candidates = vec![candidate("first", 10), candidate("second", 10), candidate("low", 3)];

        let selected = select_top_voted(&candidates).expect("candidate selected");

        assert_eq!(selected.definition, "first");
    }

    #[test]
    fn zero_and_negative_scores_still_select_a_winner() {
        let candidates = vec![candidate("only", 0)];
        assert_eq!(select_top_voted(&candidates).map(|c| c.definition.as_str()), Some("only"));

        let candidates = vec![candidate("worse", -4), candidate("better", -1)];
        assert_eq!(select_top_voted(&candidates).map(|c| c.definition.as_str()), Some("better"));
    }

    #[test]
    fn empty_list_selects_nothing() {
        assert!(select_top_voted(&[]).is_none());
    }

    #[test]
    fn blank_definitions_select_nothing() {
        let candidates = vec![candidate("", 12), candidate("   ", 40)];

        assert!(select_top_voted(&candidates).is_none());
    }

    #[test]
    fn threshold_match_is_strict_and_first_wins() {
        let candidates = vec![
            candidate("at threshold", 13_000),
            candidate("first above", 13_001),
            candidate("second above", 90_000),
        ];

        let selected = first_above_threshold(&candidates, 13_000).expect("candidate selected");

        assert_eq!(selected.definition, "first above");
    }

    #[test]
    fn threshold_match_skips_blank_definitions() {
        let candidates = vec![candidate("", 50_000), candidate("kept", 20_000)];

        let selected = first_above_threshold(&candidates, 13_000).expect("candidate selected");

        assert_eq!(selected.definition, "kept");
        assert!(first_above_threshold(&candidates[..1], 13_000).is_none());
    }

    #[test]
    fn candidate_list_decodes_upstream_field_names() {
        let raw = r#"{"list":[{"word":"hello","definition":"A greeting","thumbs_up":5,
            "thumbs_down":2,"author":"someone","permalink":"http://hello.urbanup.com/1",
            "defid":1,"current_vote":"","written_on":"2004-01-01T00:00:00.000Z"}]}"#;

        let decoded: CandidateList = serde_json::from_str(raw).expect("decode");

        assert_eq!(decoded.list.len(), 1);
        assert_eq!(decoded.list[0].approval_count, 5);
        assert_eq!(decoded.list[0].disapproval_count, 2);
        assert_eq!(decoded.list[0].defid, Some(1));
        assert_eq!(decoded.list[0].example, "");
    }

    #[test]
    fn candidate_list_requires_list_field() {
        assert!(serde_json::from_str::<CandidateList>(r#"{"results":[]}"#).is_err());
    }
}
