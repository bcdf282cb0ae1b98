//! Consumer-driven contract between the Thing client and the Thing server.
//!
//! # Overview
//! A contract is a list of interactions, each an expected request paired with
//! the response the provider must give when it is in a named state. The
//! consumer replays the interactions against its client; the provider puts
//! itself into each state and replays them against its router. Both sides
//! read the same file, so neither can change the wire shape alone.
//!
//! # Matching
//! Bodies are compared field by field. A field with an entry in
//! `matchingRules` (keyed by JSON path, e.g. `$.name`) is checked against the
//! rule instead of the example value. Requests must not carry unexpected
//! body keys; responses may.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("invalid contract document")]
    Parse(#[from] serde_json::Error),

    #[error("invalid regex `{pattern}` in matching rule")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pacticipant {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub consumer: Pacticipant,
    pub provider: Pacticipant,
    pub interactions: Vec<Interaction>,
}

impl Contract {
    /// Parse a contract and compile every regex rule it contains, so a bad
    /// pattern fails here rather than in the middle of verification.
    pub fn from_json(raw: &str) -> Result<Self, ContractError> {
        let contract: Contract = serde_json::from_str(raw)?;
        for interaction in &contract.interactions {
            let rules = interaction
                .request
                .matching_rules
                .values()
                .chain(interaction.response.matching_rules.values());
            for rule in rules {
                rule.validate()?;
            }
        }
        Ok(contract)
    }

    pub fn interaction(&self, description: &str) -> Option<&Interaction> {
        self.interactions
            .iter()
            .find(|interaction| interaction.description == description)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub description: String,
    pub provider_state: String,
    pub request: ContractRequest,
    pub response: ContractResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRequest {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default)]
    pub matching_rules: BTreeMap<String, Matcher>,
}

impl ContractRequest {
    /// Compare an actual request against this expectation.
    ///
    /// `path` is the request path without scheme and authority.
    pub fn verify(
        &self,
        method: &str,
        path: &str,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();
        if !method.eq_ignore_ascii_case(&self.method) {
            mismatches.push(Mismatch::new("method", format!("expected {}, got {method}", self.method)));
        }
        if path != self.path {
            mismatches.push(Mismatch::new("path", format!("expected {}, got {path}", self.path)));
        }
        verify_headers(&self.headers, headers, &mut mismatches);
        verify_body(self.body.as_ref(), body, &self.matching_rules, false, &mut mismatches);
        mismatches
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default)]
    pub matching_rules: BTreeMap<String, Matcher>,
}

impl ContractResponse {
    pub fn verify(&self, status: u16, headers: &[(String, String)], body: Option<&str>) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();
        if status != self.status {
            mismatches.push(Mismatch::new("status", format!("expected {}, got {status}", self.status)));
        }
        verify_headers(&self.headers, headers, &mut mismatches);
        verify_body(self.body.as_ref(), body, &self.matching_rules, true, &mut mismatches);
        mismatches
    }

    /// The example body as the provider would send it; empty when the
    /// interaction has none.
    pub fn body_text(&self) -> String {
        self.body.as_ref().map(Value::to_string).unwrap_or_default()
    }
}

/// A rule that replaces exact comparison for one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "lowercase")]
pub enum Matcher {
    /// String fully matching the pattern. The shorthand classes `\w`, `\d`
    /// and `\s` (and their negations) are ASCII-only, as in the JVM pact
    /// verifier.
    Regex { regex: String },
    /// Number with a fractional representation.
    Decimal,
    /// Whole number.
    Integer,
    /// String that parses with `format` and prints back identically.
    Date { format: String },
    /// Any value of the same JSON type as the example.
    Type,
}

impl Matcher {
    fn validate(&self) -> Result<(), ContractError> {
        if let Matcher::Regex { regex } = self {
            anchored(regex)?;
        }
        Ok(())
    }

    pub fn matches(&self, example: &Value, actual: &Value) -> bool {
        match self {
            Matcher::Regex { regex } => match (anchored(regex), actual.as_str()) {
                (Ok(re), Some(text)) => re.is_match(text),
                _ => false,
            },
            Matcher::Decimal => actual.is_f64(),
            Matcher::Integer => actual.is_i64() || actual.is_u64(),
            Matcher::Date { format } => actual
                .as_str()
                .and_then(|text| {
                    NaiveDate::parse_from_str(text, format)
                        .ok()
                        .map(|date| date.format(format).to_string() == text)
                })
                .unwrap_or(false),
            Matcher::Type => same_type(example, actual),
        }
    }
}

fn anchored(pattern: &str) -> Result<regex::Regex, ContractError> {
    let anchored = format!("^(?:{})$", ascii_shorthands(pattern));
    regex::Regex::new(&anchored).map_err(|source| ContractError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Rewrite `\w \W \d \D \s \S` into explicit ASCII classes. The regex
/// crate reads them as Unicode classes; `(?-u)` would also change `.` and
/// negated classes, so only the shorthands are replaced.
fn ascii_shorthands(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('w') => out.push_str("[0-9A-Za-z_]"),
            Some('W') => out.push_str("[^0-9A-Za-z_]"),
            Some('d') => out.push_str("[0-9]"),
            Some('D') => out.push_str("[^0-9]"),
            Some('s') => out.push_str(r"[\t\n\x0B\x0C\r ]"),
            Some('S') => out.push_str(r"[^\t\n\x0B\x0C\r ]"),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn same_type(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// One way in which an actual exchange departs from the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub location: String,
    pub message: String,
}

impl Mismatch {
    fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

fn media_type(value: &str) -> &str {
    value.split(';').next().unwrap_or(value).trim()
}

fn verify_headers(expected: &BTreeMap<String, String>, actual: &[(String, String)], out: &mut Vec<Mismatch>) {
    for (name, want) in expected {
        let got = actual
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str());
        let location = format!("header {name}");
        match got {
            None => out.push(Mismatch::new(location, "missing")),
            Some(got) => {
                let equal = if name.eq_ignore_ascii_case("content-type") {
                    media_type(got).eq_ignore_ascii_case(media_type(want))
                } else {
                    got == want
                };
                if !equal {
                    out.push(Mismatch::new(location, format!("expected {want}, got {got}")));
                }
            }
        }
    }
}

fn verify_body(
    expected: Option<&Value>,
    actual: Option<&str>,
    rules: &BTreeMap<String, Matcher>,
    allow_extra_keys: bool,
    out: &mut Vec<Mismatch>,
) {
    let actual = actual.filter(|text| !text.trim().is_empty());
    let Some(expected) = expected else {
        // No expected body: anything goes.
        return;
    };
    let Some(actual) = actual else {
        out.push(Mismatch::new("$", "expected a body, got none"));
        return;
    };
    match serde_json::from_str::<Value>(actual) {
        Ok(actual) => compare("$", expected, &actual, rules, allow_extra_keys, out),
        Err(err) => out.push(Mismatch::new("$", format!("body is not JSON: {err}"))),
    }
}

fn compare(
    path: &str,
    expected: &Value,
    actual: &Value,
    rules: &BTreeMap<String, Matcher>,
    allow_extra_keys: bool,
    out: &mut Vec<Mismatch>,
) {
    if let Some(rule) = rules.get(path) {
        if !rule.matches(expected, actual) {
            out.push(Mismatch::new(path, format!("{actual} does not satisfy {rule:?}")));
        }
        return;
    }
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, value) in want {
                let child = format!("{path}.{key}");
                match got.get(key) {
                    Some(actual) => compare(&child, value, actual, rules, allow_extra_keys, out),
                    None => out.push(Mismatch::new(child, "missing")),
                }
            }
            if !allow_extra_keys {
                for key in got.keys().filter(|key| !want.contains_key(*key)) {
                    out.push(Mismatch::new(format!("{path}.{key}"), "unexpected key"));
                }
            }
        }
        (Value::Array(want), Value::Array(got)) => {
            if want.len() != got.len() {
                out.push(Mismatch::new(
                    path,
                    format!("expected {} elements, got {}", want.len(), got.len()),
                ));
                return;
            }
            for (index, (want, got)) in want.iter().zip(got).enumerate() {
                compare(&format!("{path}[{index}]"), want, got, rules, allow_extra_keys, out);
            }
        }
        _ if expected == actual => {}
        _ => out.push(Mismatch::new(path, format!("expected {expected}, got {actual}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rules() -> BTreeMap<String, Matcher> {
        BTreeMap::from([
            ("$.name".to_string(), Matcher::Regex { regex: r"\w+".to_string() }),
            ("$.value".to_string(), Matcher::Decimal),
            ("$.date".to_string(), Matcher::Date { format: "%Y-%m-%d".to_string() }),
        ])
    }

    fn request() -> ContractRequest {
        ContractRequest {
            method: "POST".to_string(),
            path: "/thing".to_string(),
            headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body: Some(json!({"name": "Foo", "value": 123.45, "date": "2022-10-13"})),
            matching_rules: rules(),
        }
    }

    fn json_header() -> Vec<(String, String)> {
        vec![("content-type".to_string(), "application/json; charset=utf-8".to_string())]
    }

    #[test]
    fn request_matching_by_rules() {
        let body = r#"{"name":"Bar","value":0.5,"date":"1999-01-31"}"#;
        let mismatches = request().verify("POST", "/thing", &json_header(), Some(body));
        assert!(mismatches.is_empty(), "{mismatches:?}");
    }

    #[test]
    fn request_rule_violations_are_reported() {
        let body = r#"{"name":"two words","value":7,"date":"31/01/1999"}"#;
        let mismatches = request().verify("POST", "/thing", &json_header(), Some(body));
        let locations: Vec<_> = mismatches.iter().map(|m| m.location.as_str()).collect();
        assert_eq!(locations, ["$.date", "$.name", "$.value"]);
    }

    #[test]
    fn request_rejects_unexpected_keys() {
        let body = r#"{"name":"Foo","value":1.5,"date":"2022-10-13","extra":true}"#;
        let mismatches = request().verify("POST", "/thing", &json_header(), Some(body));
        assert_eq!(mismatches, vec![Mismatch::new("$.extra", "unexpected key")]);
    }

    #[test]
    fn request_method_path_and_header_mismatches() {
        let mismatches = request().verify("GET", "/things", &[], None);
        let locations: Vec<_> = mismatches.iter().map(|m| m.location.as_str()).collect();
        assert_eq!(locations, ["method", "path", "header Content-Type", "$"]);
    }

    #[test]
    fn response_allows_extra_keys() {
        let response = ContractResponse {
            status: 201,
            headers: BTreeMap::new(),
            body: Some(json!({"id": 123})),
            matching_rules: BTreeMap::from([("$.id".to_string(), Matcher::Integer)]),
        };
        assert!(response.verify(201, &[], Some(r#"{"id":9,"self":"/thing/9"}"#)).is_empty());
        let mismatches = response.verify(201, &[], Some(r#"{"id":"9"}"#));
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].location, "$.id");
    }

    #[test]
    fn response_without_body_ignores_actual_body() {
        let response = ContractResponse {
            status: 404,
            headers: BTreeMap::new(),
            body: None,
            matching_rules: BTreeMap::new(),
        };
        assert!(response.verify(404, &[], Some("")).is_empty());
        assert_eq!(response.body_text(), "");
        assert_eq!(response.verify(200, &[], None).len(), 1);
    }

    #[test]
    fn date_matcher_requires_exact_layout() {
        let matcher = Matcher::Date { format: "%Y-%m-%d".to_string() };
        assert!(matcher.matches(&json!(""), &json!("2022-10-13")));
        assert!(!matcher.matches(&json!(""), &json!("2022-10-13T10:00:00")));
        assert!(!matcher.matches(&json!(""), &json!(20221013)));
    }

    #[test]
    fn regex_word_class_is_ascii_only() {
        let matcher = Matcher::Regex { regex: r"\w+".to_string() };
        assert!(matcher.matches(&json!(""), &json!("Foo_1")));
        assert!(!matcher.matches(&json!(""), &json!("Föö")));
        assert!(!matcher.matches(&json!(""), &json!("١٢٣")));
    }

    #[test]
    fn regex_rewrite_leaves_other_syntax_alone() {
        let inside_class = Matcher::Regex { regex: r"[\w.]+".to_string() };
        assert!(inside_class.matches(&json!(""), &json!("a.b_c")));

        let escaped_backslash = Matcher::Regex { regex: r"a\\w".to_string() };
        assert!(escaped_backslash.matches(&json!(""), &json!(r"a\w")));
        assert!(!escaped_backslash.matches(&json!(""), &json!("ab")));

        let any = Matcher::Regex { regex: ".+".to_string() };
        assert!(any.matches(&json!(""), &json!("Föö")));

        let digits = Matcher::Regex { regex: r"\d{3}\s\S".to_string() };
        assert!(digits.matches(&json!(""), &json!("123 x")));
        assert!(!digits.matches(&json!(""), &json!("١٢٣ x")));
    }

    #[test]
    fn type_matcher_compares_json_kinds() {
        assert!(Matcher::Type.matches(&json!("a"), &json!("b")));
        assert!(!Matcher::Type.matches(&json!("a"), &json!(1)));
    }

    #[test]
    fn invalid_regex_is_rejected_on_load() {
        let raw = r#"{
            "consumer": {"name": "c"},
            "provider": {"name": "p"},
            "interactions": [{
                "description": "d",
                "providerState": "s",
                "request": {"method": "GET", "path": "/", "matchingRules": {"$.x": {"match": "regex", "regex": "("}}},
                "response": {"status": 200}
            }]
        }"#;
        assert!(matches!(Contract::from_json(raw), Err(ContractError::InvalidRegex { .. })));
    }

    #[test]
    fn shipped_contract_loads() {
        let contract =
            Contract::from_json(include_str!("../../contracts/thing-client-thing-server.json")).unwrap();
        assert_eq!(contract.consumer.name, "Thing Client");
        assert_eq!(contract.provider.name, "Thing Server");
        assert_eq!(contract.interactions.len(), 3);
        assert!(contract.interaction("Create Thing").is_some());
        assert!(contract.interaction("Delete Thing").is_none());
    }
}
