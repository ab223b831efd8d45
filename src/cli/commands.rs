//! CLI command implementations
//!
//! Each command builds a [`Client`] from the global flags, performs one
//! request and prints the resulting envelope as JSON. An envelope carrying
//! an error is still printed, then reported as a failure.

use std::io::Write;

use serde_json::{Map, Value};

use crate::auth::{Credentials, SignUpRequest};
use crate::client::{Client, ClientConfig};
use crate::errors::ErrorDescriptor;
use crate::fixtures::TableName;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Build the client configuration from `--config` and `--latency-ms`
pub fn load_config(cli: &Cli) -> CliResult<ClientConfig> {
    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };

    Ok(match cli.latency_ms {
        Some(ms) => config.with_latency(ms),
        None => config,
    })
}

/// Run a parsed command, writing its output to `out`
pub async fn run_command<W: Write>(cli: Cli, out: &mut W) -> CliResult<()> {
    let client = Client::new(load_config(&cli)?);

    match cli.command {
        Command::Tables => tables(&client, out),
        Command::Query {
            table,
            select,
            eq,
            in_,
            order,
            range,
            single,
        } => {
            let request = QueryArgs {
                table,
                select,
                eq,
                in_,
                order,
                range,
                single,
            };
            query(&client, request, out).await
        }
        Command::SignIn { email, password } => sign_in(&client, email, password, out).await,
        Command::SignUp {
            email,
            password,
            display_name,
        } => sign_up(&client, email, password, display_name, out).await,
    }
}

/// `tables`: row counts of every queryable table
pub fn tables<W: Write>(client: &Client, out: &mut W) -> CliResult<()> {
    let mut counts = Map::new();
    for table in TableName::ALL.iter().filter(|t| t.is_queryable()) {
        let count = client
            .store()
            .row_count(*table)
            .map_err(|e| CliError::request_failed(e.to_string()))?;
        counts.insert(table.as_str().to_string(), Value::from(count));
    }
    write_json(out, &Value::Object(counts))
}

/// Arguments of the `query` command
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub table: String,
    pub select: String,
    pub eq: Vec<String>,
    pub in_: Vec<String>,
    pub order: Vec<String>,
    pub range: Option<String>,
    pub single: bool,
}

/// `query`: build a read request from flags and resolve it
pub async fn query<W: Write>(client: &Client, args: QueryArgs, out: &mut W) -> CliResult<()> {
    let mut builder = client.table(&args.table).select(&args.select);

    for assignment in &args.eq {
        let (column, value) = split_assignment(assignment)?;
        builder = builder.eq(column, parse_value(value));
    }

    for assignment in &args.in_ {
        let (column, values) = split_assignment(assignment)?;
        let values = split_list(values).into_iter().map(|v| parse_value(v.trim()));
        builder = builder.in_(column, values);
    }

    for spec in &args.order {
        let (column, ascending) = parse_order(spec)?;
        builder = builder.order(column, ascending);
    }

    if let Some(range) = &args.range {
        let (from, to) = parse_range(range)?;
        builder = builder.range(from, to);
    }

    if args.single {
        builder = builder.single();
    }

    let envelope = builder.await;
    write_json(out, &envelope)?;
    check(envelope.error.as_ref())
}

/// `sign-in`
pub async fn sign_in<W: Write>(
    client: &Client,
    email: String,
    password: String,
    out: &mut W,
) -> CliResult<()> {
    let envelope = client
        .auth()
        .sign_in_with_password(Credentials::new(email, password))
        .await;
    write_json(out, &envelope)?;
    check(envelope.error.as_ref())
}

/// `sign-up`
pub async fn sign_up<W: Write>(
    client: &Client,
    email: String,
    password: String,
    display_name: Option<String>,
    out: &mut W,
) -> CliResult<()> {
    let mut request = SignUpRequest::new(email, password);
    if let Some(name) = display_name {
        request = request.with_display_name(name);
    }

    let envelope = client.auth().sign_up(request).await;
    write_json(out, &envelope)?;
    check(envelope.error.as_ref())
}

fn check(error: Option<&ErrorDescriptor>) -> CliResult<()> {
    match error {
        Some(error) => Err(CliError::request_failed(error.to_string())),
        None => Ok(()),
    }
}

/// Split `column=value` at the first `=`
fn split_assignment(assignment: &str) -> CliResult<(&str, &str)> {
    match assignment.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => Ok((column.trim(), value)),
        _ => Err(CliError::invalid_argument(format!(
            "Expected COLUMN=VALUE, got '{}'",
            assignment
        ))),
    }
}

/// Split a membership list on commas outside double-quoted strings
fn split_list(values: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in values.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => {
                items.push(&values[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&values[start..]);
    items
}

/// Parse a filter value.
///
/// `null`, booleans, numbers and quoted strings are JSON; anything else is
/// taken as a bare string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|v| !v.is_array() && !v.is_object())
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Parse `column`, `column.asc` or `column.desc`
fn parse_order(spec: &str) -> CliResult<(&str, bool)> {
    let (column, ascending) = match spec.rsplit_once('.') {
        Some((column, "asc")) => (column, true),
        Some((column, "desc")) => (column, false),
        _ => (spec, true),
    };

    if column.trim().is_empty() {
        return Err(CliError::invalid_argument(format!(
            "Invalid order '{}'",
            spec
        )));
    }
    Ok((column, ascending))
}

/// Parse an inclusive `from-to` range
fn parse_range(range: &str) -> CliResult<(usize, usize)> {
    let invalid = || CliError::invalid_argument(format!("Expected FROM-TO, got '{}'", range));

    let (from, to) = range.split_once('-').ok_or_else(invalid)?;
    let from = from.trim().parse::<usize>().map_err(|_| invalid())?;
    let to = to.trim().parse::<usize>().map_err(|_| invalid())?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use serde_json::json;

    fn client() -> Client {
        Client::new(ClientConfig::instant())
    }

    fn output(out: Vec<u8>) -> Value {
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("156"), json!(156));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("published"), json!("published"));
        assert_eq!(parse_value("\"1\""), json!("1"));
        assert_eq!(parse_value("[1]"), json!("[1]"));
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("created_at.desc").unwrap(), ("created_at", false));
        assert_eq!(parse_order("created_at.asc").unwrap(), ("created_at", true));
        assert_eq!(parse_order("title").unwrap(), ("title", true));
        assert!(parse_order(".desc").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("0-9").unwrap(), (0, 9));
        assert!(parse_range("9").is_err());
        assert!(parse_range("a-b").is_err());
    }

    #[test]
    fn test_split_assignment() {
        assert_eq!(split_assignment("status=published").unwrap(), ("status", "published"));
        assert_eq!(split_assignment("title=a=b").unwrap(), ("title", "a=b"));
        assert!(split_assignment("=x").is_err());
        assert!(split_assignment("status").is_err());
    }

    #[test]
    fn test_split_list_respects_quotes() {
        assert_eq!(split_list("1,2, 3"), vec!["1", "2", " 3"]);
        assert_eq!(
            split_list(r#""Hello, world",draft"#),
            vec![r#""Hello, world""#, "draft"]
        );
        assert_eq!(split_list(r#""a\",b",c"#), vec![r#""a\",b""#, "c"]);
        assert_eq!(parse_value(split_list(r#""x,y",z"#)[0]), json!("x,y"));
    }

    #[test]
    fn test_tables_lists_queryable() {
        let mut out = Vec::new();
        tables(&client(), &mut out).unwrap();

        let json = output(out);
        assert_eq!(json["posts"], 4);
        assert_eq!(json["comments"], 4);
        assert!(json.get("users").is_none());
    }

    #[tokio::test]
    async fn test_query_command() {
        let args = QueryArgs {
            table: "posts".to_string(),
            select: "id, profiles(username)".to_string(),
            eq: vec!["status=published".to_string()],
            order: vec!["view_count.desc".to_string()],
            range: Some("0-1".to_string()),
            ..Default::default()
        };

        let mut out = Vec::new();
        query(&client(), args, &mut out).await.unwrap();

        let json = output(out);
        assert_eq!(json["count"], 3);
        assert_eq!(json["data"][0]["id"], "3");
        assert_eq!(json["data"][0]["profiles"]["username"], "Wang Wu");
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_in_filter_with_quoted_ids() {
        let args = QueryArgs {
            table: "comments".to_string(),
            select: "*".to_string(),
            in_: vec![r#"post_id="2","3""#.to_string()],
            ..Default::default()
        };

        let mut out = Vec::new();
        query(&client(), args, &mut out).await.unwrap();
        assert_eq!(output(out)["count"], 2);
    }

    #[tokio::test]
    async fn test_query_in_filter_with_comma_in_string() {
        let client = client();
        client
            .table("posts")
            .update(json!({"title": "Hello, world"}))
            .eq("id", "1")
            .await;

        let args = QueryArgs {
            table: "posts".to_string(),
            select: "id".to_string(),
            in_: vec![r#"title="Hello, world",other"#.to_string()],
            ..Default::default()
        };

        let mut out = Vec::new();
        query(&client, args, &mut out).await.unwrap();
        let json = output(out);
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"][0]["id"], "1");
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_reported() {
        let mut out = Vec::new();
        let err = sign_in(&client(), "zhangsan@example.com".into(), "wrong".into(), &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.code(), &CliErrorCode::RequestFailed);
        assert_eq!(output(out)["error"]["code"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_sign_up_command() {
        let mut out = Vec::new();
        sign_up(
            &client(),
            "cli@example.com".into(),
            "pw".into(),
            Some("Cli User".into()),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(output(out)["data"]["user"]["display_name"], "Cli User");
    }
}
