use technitium_api::DomainList;

use crate::cli::{CacheCommand, DomainListCommand};
use crate::client::{AppContext, CliResult};

pub(crate) async fn handle_cache(ctx: &AppContext, command: CacheCommand) -> CliResult<()> {
    match command {
        CacheCommand::List { domain } => {
            let entries = ctx.api.list_cache(domain.as_deref()).await?;
            ctx.renderer.value(&entries)
        }
        CacheCommand::Delete { domain } => {
            ctx.api.delete_cache(&domain).await?;
            ctx.renderer.done(&format!("{domain} evicted from cache"))
        }
        CacheCommand::Flush => {
            ctx.api.flush_cache().await?;
            ctx.renderer.done("cache flushed")
        }
    }
}

pub(crate) async fn handle_domain_list(
    ctx: &AppContext,
    list: DomainList,
    command: DomainListCommand,
) -> CliResult<()> {
    match command {
        DomainListCommand::List { domain } => {
            let entries = ctx.api.list_domains(list, domain.as_deref()).await?;
            ctx.renderer.value(&entries)
        }
        DomainListCommand::Add { domain } => {
            ctx.api.add_domain(list, &domain).await?;
            ctx.renderer.done(&format!("{domain} added to {list} list"))
        }
        DomainListCommand::Delete { domain } => {
            ctx.api.delete_domain(list, &domain).await?;
            ctx.renderer
                .done(&format!("{domain} removed from {list} list"))
        }
        DomainListCommand::Flush => {
            ctx.api.flush_domains(list).await?;
            ctx.renderer.done(&format!("{list} list flushed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context_with;
    use httpmock::prelude::*;
    use serde_json::json;
    use technitium_test_support::envelopes::ok_envelope;

    #[tokio::test]
    async fn blocked_add_targets_blocked_endpoint() {
        let server = MockServer::start_async().await;
        let blocked = server.mock(|when, then| {
            when.method(GET)
                .path("/api/blocked/add")
                .query_param("domain", "ads.example");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(ok_envelope(json!({})));
        });
        let allowed = server.mock(|when, then| {
            when.method(GET).path("/api/allowed/add");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(ok_envelope(json!({})));
        });

        handle_domain_list(
            &context_with(&server, Some("T")),
            DomainList::Blocked,
            DomainListCommand::Add {
                domain: "ads.example".into(),
            },
        )
        .await
        .expect("add succeeds");
        blocked.assert();
        assert_eq!(allowed.hits(), 0);
    }

    #[tokio::test]
    async fn cache_flush_calls_flush() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/cache/flush");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(ok_envelope(json!({})));
        });

        handle_cache(&context_with(&server, Some("T")), CacheCommand::Flush)
            .await
            .expect("flush succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn http_failure_maps_to_exit_code_three() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/allowed/list");
            then.status(503);
        });

        let err = handle_domain_list(
            &context_with(&server, Some("T")),
            DomainList::Allowed,
            DomainListCommand::List { domain: None },
        )
        .await
        .expect_err("service unavailable");
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("HTTP 503"));
    }
}
