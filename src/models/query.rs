//! List/read query parameters. The structured parameters arrive JSON-encoded
//! in the query string; a supplied but malformed one is a typed parse failure
//! naming the parameter, never a silent default.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "where")]
    pub where_: Option<String>,
    pub sort: Option<String>,
    pub select: Option<String>,
    // Legacy alias for select, kept for compatibility; select wins if both given
    pub filter: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Default)]
pub struct ListOptions {
    pub filter: Option<Value>,
    pub sort: Option<Value>,
    pub select: Option<Value>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub count: bool,
}

impl ListQuery {
    pub fn parse(&self) -> AppResult<ListOptions> {
        let filter = parse_json_param(&self.where_, "where")?;
        let sort = parse_json_param(&self.sort, "sort")?;
        let select = match parse_json_param(&self.select, "select")? {
            Some(spec) => Some(spec),
            None => parse_json_param(&self.filter, "filter")?,
        };
        let skip = parse_int_param(&self.skip, "skip")?;
        let limit = parse_int_param(&self.limit, "limit")?;
        let count = self
            .count
            .as_deref()
            .map_or(false, |c| c.trim().eq_ignore_ascii_case("true"));

        Ok(ListOptions {
            filter,
            sort,
            select,
            skip,
            limit,
            count,
        })
    }
}

// Item reads only take a projection, under either parameter name
#[derive(Debug, Default, Deserialize)]
pub struct SelectQuery {
    pub select: Option<String>,
    pub filter: Option<String>,
}

impl SelectQuery {
    pub fn parse(&self) -> AppResult<Option<Value>> {
        match parse_json_param(&self.select, "select")? {
            Some(spec) => Ok(Some(spec)),
            None => parse_json_param(&self.filter, "filter"),
        }
    }
}

// Empty-string parameters count as absent; anything else must be a JSON object
fn parse_json_param(raw: &Option<String>, name: &str) -> AppResult<Option<Value>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(Some(Value::Object(map))),
            _ => Err(AppError::InvalidParam(name.to_string())),
        },
    }
}

fn parse_int_param(raw: &Option<String>, name: &str) -> AppResult<Option<usize>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => match text.parse::<i64>() {
            Ok(n) => Ok(Some(n.max(0) as usize)),
            Err(_) => Err(AppError::InvalidParam(name.to_string())),
        },
    }
}
