//! Generic daily sign-in driven entirely by the site's config table.
//!
//! Recognised keys under `[sites.<name>]`:
//! `signin_url`, `signin_method` (GET/POST/PUT, default GET),
//! `signin_payload` (table), `signin_body` ("json" or "form", default json),
//! `success_keyword`, `check_url`, `check_keyword`.

use crate::adapters::http::Body;
use crate::core::session::SiteContext;
use crate::domain::model::TaskOutput;
use crate::domain::ports::{Site, Task};
use crate::utils::error::{Result, TaskerError};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;

pub struct SignInSite;

impl Site for SignInSite {
    fn name(&self) -> &str {
        "signin"
    }

    fn build_task_sequence(&self, ctx: &SiteContext) -> Vec<Box<dyn Task>> {
        let mut tasks: Vec<Box<dyn Task>> = vec![Box::new(SignInTask)];
        if ctx.site.get_str("check_url").is_some() {
            tasks.push(Box::new(CheckTask));
        }
        tasks
    }
}

fn signin_method(ctx: &SiteContext) -> Result<Method> {
    match ctx
        .site
        .get_str("signin_method")
        .map(str::to_uppercase)
        .as_deref()
    {
        None | Some("GET") => Ok(Method::GET),
        Some("POST") => Ok(Method::POST),
        Some("PUT") => Ok(Method::PUT),
        Some(other) => Err(TaskerError::InvalidConfigValueError {
            field: format!("sites.{}.signin_method", ctx.site_name),
            value: other.to_string(),
            reason: "Supported methods: GET, POST, PUT".to_string(),
        }),
    }
}

fn signin_body(ctx: &SiteContext) -> Result<Option<Body>> {
    let payload = match ctx.site.get("signin_payload") {
        None | Some(Value::Null) => return Ok(None),
        Some(payload) => payload,
    };

    match ctx.site.get_str("signin_body").unwrap_or("json") {
        "json" => Ok(Some(Body::Json(payload.clone()))),
        "form" => {
            let Value::Object(table) = payload else {
                return Err(TaskerError::InvalidConfigValueError {
                    field: format!("sites.{}.signin_payload", ctx.site_name),
                    value: payload.to_string(),
                    reason: "Form payloads must be a table".to_string(),
                });
            };
            let fields: BTreeMap<String, String> = table
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect();
            Ok(Some(Body::Form(fields)))
        }
        other => Err(TaskerError::InvalidConfigValueError {
            field: format!("sites.{}.signin_body", ctx.site_name),
            value: other.to_string(),
            reason: "Expected \"json\" or \"form\"".to_string(),
        }),
    }
}

/// Fails the task when `keyword` is configured and missing from `body`.
fn expect_keyword(task: &str, keyword: Option<&str>, body: &str) -> Result<String> {
    match keyword {
        Some(keyword) if !body.contains(keyword) => Err(TaskerError::TaskFailed {
            task: task.to_string(),
            reason: format!("response does not contain '{}'", keyword),
        }),
        Some(keyword) => Ok(format!("found '{}'", keyword)),
        None => Ok("request accepted".to_string()),
    }
}

pub struct SignInTask;

#[async_trait]
impl Task for SignInTask {
    fn name(&self) -> &str {
        "signin"
    }

    async fn run(&self, ctx: &SiteContext) -> Result<TaskOutput> {
        let url = validate_required_field(
            &format!("sites.{}.signin_url", ctx.site_name),
            &ctx.site.signin_url,
        )?;
        let method = signin_method(ctx)?;
        let body = signin_body(ctx)?;

        let response = ctx.http.request(method, url, body.as_ref()).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let detail = expect_keyword(self.name(), ctx.site.get_str("success_keyword"), &text)?;
        Ok(TaskOutput::new(Some(status), detail))
    }
}

pub struct CheckTask;

#[async_trait]
impl Task for CheckTask {
    fn name(&self) -> &str {
        "check"
    }

    async fn run(&self, ctx: &SiteContext) -> Result<TaskOutput> {
        let url = ctx
            .site
            .get_str("check_url")
            .ok_or_else(|| TaskerError::MissingConfigError {
                field: format!("sites.{}.check_url", ctx.site_name),
            })?;

        let response = ctx.http.get(url).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let detail = expect_keyword(self.name(), ctx.site.get_str("check_keyword"), &text)?;
        Ok(TaskOutput::new(Some(status), detail))
    }
}
