use anyhow::Result;
use technitium_config::store::{parse_document, render_document};
use technitium_config::{ConfigDiagnostic, ConfigResolver, ConfigStore, Configuration, defaults};
use technitium_test_support::fixtures::{TempConfigHome, env_vars};

fn resolver_for(home: &TempConfigHome, env: &[(&str, &str)]) -> ConfigResolver {
    ConfigResolver::new(ConfigStore::new(home.config_path())).with_env(env_vars(env))
}

#[test]
fn defaults_apply_without_file_or_env_overrides() -> Result<()> {
    let home = TempConfigHome::new()?;
    let config = resolver_for(&home, &[]).resolve();
    assert_eq!(config.api.timeout_ms, 15_000);
    assert_eq!(config.api.base_url, defaults::DEFAULT_BASE_URL);
    Ok(())
}

#[test]
fn file_overrides_defaults() -> Result<()> {
    let home = TempConfigHome::new()?;
    home.write_config("[api]\ntimeoutMs = 12000\n")?;
    let config = resolver_for(&home, &[]).resolve();
    assert_eq!(config.api.timeout_ms, 12_000);
    assert!(config.api.verify_tls);
    Ok(())
}

#[test]
fn environment_overrides_file_and_defaults() -> Result<()> {
    let home = TempConfigHome::new()?;
    home.write_config("[api]\ntimeoutMs = 12000\n")?;
    let config = resolver_for(&home, &[("TECHNITIUMDNS_CLI_API__TIMEOUTMS", "9000")]).resolve();
    assert_eq!(config.api.timeout_ms, 9000);
    Ok(())
}

#[test]
fn unparsable_environment_value_uses_the_embedded_default() -> Result<()> {
    let home = TempConfigHome::new()?;
    home.write_config("[api]\ntimeoutMs = 12000\n")?;
    let resolution = resolver_for(&home, &[("TECHNITIUMDNS_CLI_API__TIMEOUTMS", "soon")])
        .resolve_with_diagnostics();
    assert_eq!(resolution.config.api.timeout_ms, defaults::DEFAULT_TIMEOUT_MS);
    assert!(resolution.diagnostics.iter().any(|diagnostic| matches!(
        diagnostic,
        ConfigDiagnostic::InvalidEnvValue { variable, .. }
            if variable == "TECHNITIUMDNS_CLI_API__TIMEOUTMS"
    )));
    Ok(())
}

#[test]
fn layers_merge_field_by_field() -> Result<()> {
    let home = TempConfigHome::new()?;
    home.write_config(
        "[api]\nbaseUrl = \"https://dns.internal:53443\"\n\n[auth]\nusername = \"ops\"\npassword = \"from-file\"\n",
    )?;
    let config = resolver_for(
        &home,
        &[
            ("TECHNITIUMDNS_CLI_AUTH__PASSWORD", "from-env"),
            ("TECHNITIUMDNS_CLI_CLI__COLORIZEJSON", "no"),
        ],
    )
    .resolve();
    assert_eq!(config.api.base_url, "https://dns.internal:53443");
    assert_eq!(config.api.timeout_ms, 15_000);
    assert_eq!(config.auth.username, "ops");
    assert_eq!(config.auth.password.as_deref(), Some("from-env"));
    assert!(!config.cli.colorize_json);
    assert!(config.cli.pretty_print_json);
    Ok(())
}

#[test]
fn unreadable_file_falls_back_with_diagnostic() -> Result<()> {
    let home = TempConfigHome::new()?;
    let path = home.write_config("[api]\ntimeoutMs = \"fast\"\n")?;
    let resolution = resolver_for(&home, &[]).resolve_with_diagnostics();
    assert_eq!(resolution.config, defaults::embedded());
    assert!(matches!(
        resolution.diagnostics.as_slice(),
        [ConfigDiagnostic::FileInvalid { path: reported, .. }] if *reported == path
    ));
    Ok(())
}

#[test]
fn environment_is_never_written_back_with_the_token() -> Result<()> {
    let home = TempConfigHome::new()?;
    home.write_config("[api]\ntimeoutMs = 12000\n")?;
    let resolver = resolver_for(&home, &[("TECHNITIUMDNS_CLI_API__TIMEOUTMS", "9000")]);
    assert_eq!(resolver.resolve().api.timeout_ms, 9000);

    let store = resolver.store().expect("store configured");
    assert!(store.update_stored_token(Some("persisted")));

    let persisted = store.load_persisted()?;
    assert_eq!(persisted.api.timeout_ms, 12_000);
    assert_eq!(persisted.auth.token.as_deref(), Some("persisted"));
    Ok(())
}

#[test]
fn persisted_document_round_trips() -> Result<()> {
    let mut config = Configuration::default();
    config.api.timeout_ms = 1_234_567;
    config.api.verify_tls = false;
    config.auth.password = Some("p@ss = word".into());
    config.auth.token = Some("0123456789abcdef".into());
    config.cli.default_output_format = "table".into();

    let document = render_document(&config)?;
    assert!(!document.contains("1_234_567"));
    let reparsed = Configuration::default().merged(parse_document(&document)?);
    assert_eq!(reparsed, config);
    Ok(())
}

#[test]
fn grouped_numbers_in_a_hand_edited_file_round_trip() -> Result<()> {
    let home = TempConfigHome::new()?;
    home.write_config("[api]\ntimeoutMs = 15_000\n")?;
    let store = ConfigStore::new(home.config_path());
    let loaded = store.load_persisted()?;
    assert_eq!(loaded.api.timeout_ms, 15_000);

    store.write(&loaded)?;
    let text = home.read_config()?;
    assert!(text.contains("timeoutMs = 15000"));
    assert_eq!(store.load_persisted()?, loaded);
    Ok(())
}

#[test]
fn multi_line_strings_survive_a_write() -> Result<()> {
    let home = TempConfigHome::new()?;
    let store = ConfigStore::new(home.config_path());
    let mut config = defaults::embedded();
    config.app.description = "line one\ncount = 1_000\nend".into();
    config.auth.password = Some("first\nretries = 2_500".into());

    let reparsed = Configuration::default().merged(parse_document(&render_document(&config)?)?);
    assert_eq!(reparsed.app.description, "line one\ncount = 1_000\nend");
    assert_eq!(reparsed.auth.password.as_deref(), Some("first\nretries = 2_500"));

    store.write(&config)?;
    assert_eq!(store.load_persisted()?, config);
    Ok(())
}
