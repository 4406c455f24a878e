use serde_json::{Value, json};
use technitium_api::catalog;
use technitium_api::{ApiCallOptions, HttpMethod, Query, QueryValue, RequestBody, ResponseKind};

use crate::cli::CallArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{Renderer, write_raw};

pub(crate) async fn handle_call(ctx: &AppContext, args: CallArgs) -> CliResult<()> {
    let options = call_options(&args)?;
    let result = ctx.api.call(&args.endpoint, options).await?;
    if args.raw {
        let bytes = result.data.into_bytes().unwrap_or_default();
        return write_raw(&bytes, None);
    }
    ctx.renderer.value(&result.into_json())
}

pub(crate) fn handle_endpoints(renderer: &Renderer) -> CliResult<()> {
    let endpoints: Vec<Value> = catalog::all()
        .into_iter()
        .map(|endpoint| {
            json!({
                "id": endpoint.id,
                "method": endpoint.method.as_str(),
                "path": endpoint.path,
                "requiresToken": endpoint.requires_token,
            })
        })
        .collect();
    renderer.value(&Value::Array(endpoints))
}

fn call_options(args: &CallArgs) -> CliResult<ApiCallOptions> {
    let mut options = ApiCallOptions::new().with_query(group_query(&args.query));
    if let Some(method) = &args.method {
        let method = HttpMethod::parse(method)
            .ok_or_else(|| CliError::validation(format!("unsupported method '{method}'")))?;
        options = options.method(method);
    }
    if let Some(body) = &args.body {
        let value: Value = serde_json::from_str(body)
            .map_err(|err| CliError::validation(format!("--body is not valid JSON: {err}")))?;
        options = options.body(RequestBody::Json(value));
    }
    if args.raw {
        options = options.response(ResponseKind::Bytes);
    }
    Ok(options)
}

/// Repeated keys become list values, preserving first-seen key order.
fn group_query(pairs: &[(String, String)]) -> Query {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for (key, value) in pairs {
        match grouped.iter_mut().find(|(existing, _)| *existing == key.as_str()) {
            Some((_, values)) => values.push(value.as_str()),
            None => grouped.push((key.as_str(), vec![value.as_str()])),
        }
    }
    grouped
        .into_iter()
        .map(|(key, values)| {
            let value = match values.as_slice() {
                [single] => QueryValue::from(*single),
                many => QueryValue::from(many.to_vec()),
            };
            (key, value)
        })
        .collect()
}
