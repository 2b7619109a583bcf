//! Request Validation
//!
//! 每个接口一份声明式规则集（[`RuleSet`]），在进入 handler 之前
//! 检查请求的 body / query / params。所有违规项一次性收集为
//! `{path, message}` 列表，序列化后作为 400 错误信息返回。

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Query, RawPathParams, Request},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::error::ApiError;
use crate::application::{CreatePost, CreateUser, Role, UpdatePost, UpdateUser};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_+'-](?:[A-Za-z0-9_+'.-]*[A-Za-z0-9_+'-])?@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .expect("compile email regex")
});

const EMAIL_MAX: usize = 254;

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= EMAIL_MAX
        && !email.contains("..")
        && EMAIL_REGEX.is_match(email)
}

// ============================================================================
// Rules
// ============================================================================

/// 字段约束
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// 字符串，`min_len` 按字符计
    Text {
        min_len: usize,
        message: &'static str,
    },
    Email {
        message: &'static str,
    },
    Boolean,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: true,
            kind,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: false,
            kind,
        }
    }
}

/// 一个接口的完整规则集
#[derive(Debug)]
pub struct RuleSet {
    pub name: &'static str,
    pub body: &'static [FieldRule],
    pub query: &'static [FieldRule],
    pub params: &'static [FieldRule],
}

/// 单条违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// 待校验的请求内容
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub body: Value,
    pub query: Value,
    pub params: Value,
}

impl RequestInput {
    pub fn from_body(body: Value) -> Self {
        Self {
            body,
            query: Value::Object(Map::new()),
            params: Value::Object(Map::new()),
        }
    }
}

impl RuleSet {
    pub fn validate(&self, input: &RequestInput) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        check_section("body", &input.body, self.body, &mut issues);
        check_section("query", &input.query, self.query, &mut issues);
        check_section("params", &input.params, self.params, &mut issues);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn check_section(
    section: &str,
    value: &Value,
    rules: &[FieldRule],
    issues: &mut Vec<ValidationIssue>,
) {
    if rules.is_empty() {
        return;
    }

    let Some(fields) = value.as_object() else {
        issues.push(ValidationIssue {
            path: section.to_string(),
            message: format!("Expected object, received {}", type_name(value)),
        });
        return;
    };

    for rule in rules {
        let path = format!("{}.{}", section, rule.name);
        match fields.get(rule.name) {
            None if rule.required => issues.push(ValidationIssue {
                path,
                message: "Required".to_string(),
            }),
            None => {}
            Some(value) => {
                if let Some(message) = check_value(&rule.kind, value) {
                    issues.push(ValidationIssue { path, message });
                }
            }
        }
    }
}

fn check_value(kind: &FieldKind, value: &Value) -> Option<String> {
    match kind {
        FieldKind::Text { min_len, message } => match value.as_str() {
            Some(s) if s.chars().count() < *min_len => Some(message.to_string()),
            Some(_) => None,
            None => Some(expected("string", value)),
        },
        FieldKind::Email { message } => match value.as_str() {
            Some(s) if !is_valid_email(s) => Some(message.to_string()),
            Some(_) => None,
            None => Some(expected("string", value)),
        },
        FieldKind::Boolean => (!value.is_boolean()).then(|| expected("boolean", value)),
        FieldKind::OneOf(allowed) => {
            let options = allowed
                .iter()
                .map(|v| format!("'{}'", v))
                .collect::<Vec<_>>()
                .join(" | ");
            match value.as_str() {
                Some(s) if allowed.contains(&s) => None,
                Some(s) => Some(format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    options, s
                )),
                None => Some(format!("Expected {}, received {}", options, type_name(value))),
            }
        }
    }
}

fn expected(kind: &str, value: &Value) -> String {
    format!("Expected {}, received {}", kind, type_name(value))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ApiError {
    /// 违规列表序列化为错误信息
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        match serde_json::to_string_pretty(&issues) {
            Ok(message) => ApiError::BadRequest(message),
            Err(e) => ApiError::Internal(format!("Failed to serialize validation issues: {}", e)),
        }
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// 绑定了规则集的请求体类型
pub trait Validated: DeserializeOwned {
    const RULES: &'static RuleSet;
}

/// 校验通过后反序列化出的请求体
///
/// 消费请求体，必须是 handler 的最后一个参数
#[derive(Debug)]
pub struct Valid<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: Validated,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let params: Map<String, Value> = RawPathParams::from_request_parts(&mut parts, state)
            .await
            .map(|raw| {
                raw.iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        let query: Map<String, Value> = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
            .unwrap_or_default();

        let Json(body) = Json::<Value>::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(ApiError::from)?;

        let input = RequestInput {
            body,
            query: Value::Object(query),
            params: Value::Object(params),
        };

        if let Err(issues) = T::RULES.validate(&input) {
            tracing::debug!(rule_set = T::RULES.name, issues = issues.len(), "Validation failed");
            return Err(ApiError::validation(issues));
        }

        let value = serde_json::from_value(input.body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

        Ok(Valid(value))
    }
}

// ============================================================================
// Rule sets
// ============================================================================

const EMAIL: FieldKind = FieldKind::Email {
    message: "Invalid email address",
};
const NAME: FieldKind = FieldKind::Text {
    min_len: 2,
    message: "Name must be at least 2 characters",
};
const PASSWORD: FieldKind = FieldKind::Text {
    min_len: 6,
    message: "Password must be at least 6 characters",
};
const ROLE: FieldKind = FieldKind::OneOf(Role::ALL);
const TITLE: FieldKind = FieldKind::Text {
    min_len: 3,
    message: "Title must be at least 3 characters",
};
const CONTENT: FieldKind = FieldKind::Text {
    min_len: 0,
    message: "",
};
const AUTHOR_ID: FieldKind = FieldKind::Text {
    min_len: 1,
    message: "Author ID is required",
};

pub const CREATE_USER_RULES: RuleSet = RuleSet {
    name: "create_user",
    body: &[
        FieldRule::required("email", EMAIL),
        FieldRule::optional("name", NAME),
        FieldRule::required("password", PASSWORD),
        FieldRule::optional("role", ROLE),
    ],
    query: &[],
    params: &[],
};

pub const UPDATE_USER_RULES: RuleSet = RuleSet {
    name: "update_user",
    body: &[
        FieldRule::optional("email", EMAIL),
        FieldRule::optional("name", NAME),
        FieldRule::optional("password", PASSWORD),
        FieldRule::optional("role", ROLE),
    ],
    query: &[],
    params: &[],
};

pub const CREATE_POST_RULES: RuleSet = RuleSet {
    name: "create_post",
    body: &[
        FieldRule::required("title", TITLE),
        FieldRule::optional("content", CONTENT),
        FieldRule::optional("published", FieldKind::Boolean),
        FieldRule::required("authorId", AUTHOR_ID),
    ],
    query: &[],
    params: &[],
};

pub const UPDATE_POST_RULES: RuleSet = RuleSet {
    name: "update_post",
    body: &[
        FieldRule::optional("title", TITLE),
        FieldRule::optional("content", CONTENT),
        FieldRule::optional("published", FieldKind::Boolean),
    ],
    query: &[],
    params: &[],
};

impl Validated for CreateUser {
    const RULES: &'static RuleSet = &CREATE_USER_RULES;
}

impl Validated for UpdateUser {
    const RULES: &'static RuleSet = &UPDATE_USER_RULES;
}

impl Validated for CreatePost {
    const RULES: &'static RuleSet = &CREATE_POST_RULES;
}

impl Validated for UpdatePost {
    const RULES: &'static RuleSet = &UPDATE_POST_RULES;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues(rules: &RuleSet, body: Value) -> Vec<ValidationIssue> {
        rules
            .validate(&RequestInput::from_body(body))
            .err()
            .unwrap_or_default()
    }

    fn issue(path: &str, message: &str) -> ValidationIssue {
        ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("nada_neutho"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a..b@x.com"));
        assert!(!is_valid_email("a b@x.com"));
        // 本地部分不能以点开头或结尾
        assert!(!is_valid_email("a.@x.com"));
        assert!(!is_valid_email(".a@x.com"));
        assert!(is_valid_email("a.b@x.com"));
    }

    #[test]
    fn test_create_user_accepts_minimal_body() {
        let body = json!({ "email": "a@x.com", "password": "secret1" });
        assert!(issues(&CREATE_USER_RULES, body).is_empty());
    }

    #[test]
    fn test_create_user_collects_every_issue() {
        let body = json!({ "email": "nope", "name": "A", "role": "ROOT" });
        assert_eq!(
            issues(&CREATE_USER_RULES, body),
            vec![
                issue("body.email", "Invalid email address"),
                issue("body.name", "Name must be at least 2 characters"),
                issue("body.password", "Required"),
                issue(
                    "body.role",
                    "Invalid enum value. Expected 'USER' | 'ADMIN', received 'ROOT'"
                ),
            ]
        );
    }

    #[test]
    fn test_short_password_and_wrong_types() {
        let body = json!({ "email": 42, "password": "12345" });
        assert_eq!(
            issues(&CREATE_USER_RULES, body),
            vec![
                issue("body.email", "Expected string, received number"),
                issue("body.password", "Password must be at least 6 characters"),
            ]
        );
    }

    #[test]
    fn test_update_user_fields_are_optional() {
        assert!(issues(&UPDATE_USER_RULES, json!({})).is_empty());
        assert_eq!(
            issues(&UPDATE_USER_RULES, json!({ "name": null })),
            vec![issue("body.name", "Expected string, received null")]
        );
    }

    #[test]
    fn test_create_post_rules() {
        assert!(issues(&CREATE_POST_RULES, json!({ "title": "Hi There", "authorId": "x" })).is_empty());
        assert_eq!(
            issues(
                &CREATE_POST_RULES,
                json!({ "title": "Hi", "published": "yes", "authorId": "" })
            ),
            vec![
                issue("body.title", "Title must be at least 3 characters"),
                issue("body.published", "Expected boolean, received string"),
                issue("body.authorId", "Author ID is required"),
            ]
        );
    }

    #[test]
    fn test_update_post_ignores_author_id() {
        let body = json!({ "authorId": 7, "content": "" });
        assert!(issues(&UPDATE_POST_RULES, body.clone()).is_empty());

        let command: UpdatePost = serde_json::from_value(body).unwrap();
        assert_eq!(command.content.as_deref(), Some(""));
        assert!(command.title.is_none());
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(
            issues(&CREATE_POST_RULES, json!([1, 2])),
            vec![issue("body", "Expected object, received array")]
        );
    }

    #[test]
    fn test_validation_error_message_is_serialized_issue_list() {
        let err = ApiError::validation(vec![issue("body.email", "Required")]);
        match err {
            ApiError::BadRequest(msg) => {
                let parsed: Value = serde_json::from_str(&msg).unwrap();
                assert_eq!(parsed, json!([{ "path": "body.email", "message": "Required" }]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
