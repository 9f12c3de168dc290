use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Settings;
use crate::http_client::http_client;

/// Blocking client for the stats service and the media host.
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: &'static Client,
    stats_base_url: String,
    video_base_url: String,
}

impl StatsClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            stats_base_url: settings.stats_base_url.clone(),
            video_base_url: settings.video_base_url.clone(),
        })
    }

    pub fn video_base_url(&self) -> &str {
        &self.video_base_url
    }

    pub fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{endpoint}", self.stats_base_url);
        debug!(%url, ?params, "stats request");
        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .with_context(|| format!("{endpoint} request failed"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("{endpoint}: http {}: {}", status, body));
        }
        Ok(body)
    }

    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "binary request");
        let resp = self.client.get(url).send().context("request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("http {status} for {url}"));
        }
        let bytes = resp.bytes().context("failed reading body")?;
        Ok(bytes.to_vec())
    }
}

/// One table of a stats response: column names plus positional rows.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResultSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| anyhow!("result set `{}` has no {name} column", self.name))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "resultSets", default)]
    result_sets: Vec<ResultSet>,
    #[serde(rename = "resultSet", default)]
    result_set: Option<ResultSet>,
}

pub fn parse_result_sets(raw: &str) -> Result<Vec<ResultSet>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let env: Envelope = serde_json::from_str(trimmed).context("invalid stats json")?;
    let mut sets = env.result_sets;
    if let Some(single) = env.result_set {
        sets.push(single);
    }
    Ok(sets)
}

/// The named set, or the first one when no set carries that name.
pub fn primary_set(sets: Vec<ResultSet>, name: &str) -> Option<ResultSet> {
    let idx = sets.iter().position(|s| s.name == name).unwrap_or(0);
    sets.into_iter().nth(idx)
}

pub fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn value_as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

pub fn cell<'a>(row: &'a [Value], idx: usize) -> &'a Value {
    row.get(idx).unwrap_or(&Value::Null)
}
