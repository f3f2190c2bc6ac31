use chat_widget_model::ModelRequest;
use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Takes out the text of the first part of the first candidate.
    ///
    /// Only that one field counts as the reply. Any other parts or
    /// candidates are ignored.
    #[inline]
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Part {
    text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &ModelRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: req.prompt.clone(),
            }],
        }],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_request() {
        let request = ModelRequest::with_prompt("Hello");
        let expected = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "Hello".to_owned(),
                }],
            }],
        };
        let created = create_request(&request);
        assert_eq!(created, expected);
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            json!({ "contents": [{ "parts": [{ "text": "Hello" }] }] })
        );
    }

    #[test]
    fn test_parse_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            include_str!("../fixtures/generate_content.json"),
        )
        .unwrap();
        assert_eq!(resp.into_text().unwrap(), "Hello! How can I help?");
    }

    #[test]
    fn test_parse_blocked_response() {
        let resp: GenerateContentResponse = serde_json::from_str(
            include_str!("../fixtures/blocked_prompt.json"),
        )
        .unwrap();
        assert_eq!(resp.into_text(), None);
    }

    #[test]
    fn test_missing_text_field() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{}], "role": "model" } }]
        }))
        .unwrap();
        assert_eq!(resp.into_text(), None);

        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert_eq!(resp.into_text(), None);
    }
}
