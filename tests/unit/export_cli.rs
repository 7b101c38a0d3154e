//! Unit tests for export command parsing

use crate::support::TRACKED;
use clap::Parser;
use tx_history_exporter::cli::{Cli, Commands, ExportArgs, OutputFormat};
use tx_history_exporter::registry::NetworkRegistry;
use tx_history_exporter::BlockNumber;

fn export_args(cli: &Cli) -> &ExportArgs {
    match &cli.command {
        Commands::Export(args) => args,
        other => panic!("expected export command, got {other:?}"),
    }
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from(["tx-history-exporter", "export", "--address", TRACKED]);

    assert_eq!(cli.max_retries, 5);
    assert_eq!(cli.calls_per_second, 5);
    assert_eq!(cli.output_format, OutputFormat::Human);
    assert!(cli.metrics_addr.is_none());

    let args = export_args(&cli);
    assert_eq!(args.address.as_str(), TRACKED);
    assert_eq!(args.network, "ethereum");
    assert_eq!(args.start_block, BlockNumber::Number(0));
    assert_eq!(args.end_block, BlockNumber::Latest);
    assert_eq!(args.tokens, vec!["USDC", "USDT"]);
    assert!(args.custom_tokens.is_empty());
    assert!(!args.no_native);
    assert_eq!(args.output_dir.to_str(), Some("temp"));
    assert!(args.base_url.is_none());
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "tx-history-exporter",
        "export",
        "--address",
        TRACKED,
        "--max-retries",
        "10",
        "--calls-per-second",
        "2",
        "--output-format",
        "json",
    ]);

    assert_eq!(cli.max_retries, 10);
    assert_eq!(cli.calls_per_second, 2);
    assert_eq!(cli.output_format, OutputFormat::Json);
}

#[test]
fn test_cli_rejects_invalid_address() {
    let result = Cli::try_parse_from(["tx-history-exporter", "export", "--address", "0x1234"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_out_of_range_retries() {
    let result = Cli::try_parse_from([
        "tx-history-exporter",
        "--max-retries",
        "0",
        "export",
        "--address",
        TRACKED,
    ]);
    assert!(result.is_err());

    let result = Cli::try_parse_from([
        "tx-history-exporter",
        "--max-retries",
        "21",
        "export",
        "--address",
        TRACKED,
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_block_range() {
    let cli = Cli::parse_from([
        "tx-history-exporter",
        "export",
        "--address",
        TRACKED,
        "--start-block",
        "15000000",
        "--end-block",
        "LATEST",
    ]);

    let args = export_args(&cli);
    assert_eq!(args.start_block, BlockNumber::Number(15_000_000));
    assert_eq!(args.end_block, BlockNumber::Latest);

    let result = Cli::try_parse_from([
        "tx-history-exporter",
        "export",
        "--address",
        TRACKED,
        "--start-block",
        "-1",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_custom_tokens() {
    let cli = Cli::parse_from([
        "tx-history-exporter",
        "export",
        "--address",
        TRACKED,
        "--tokens",
        "USDC",
        "--token",
        "dai=0x6B175474E89094C44Da98b954EedeAC495271d0F",
        "--no-native",
    ]);

    let args = export_args(&cli);
    assert_eq!(args.tokens, vec!["USDC"]);
    assert_eq!(args.custom_tokens.len(), 1);
    assert_eq!(args.custom_tokens[0].symbol, "DAI");
    assert!(args.no_native);

    let result = Cli::try_parse_from([
        "tx-history-exporter",
        "export",
        "--address",
        TRACKED,
        "--token",
        "DAI",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_resolve_tokens_against_registry() {
    let registry = NetworkRegistry::load_embedded().unwrap();
    let network = registry.network("ethereum").unwrap();

    let cli = Cli::parse_from([
        "tx-history-exporter",
        "export",
        "--address",
        TRACKED,
        "--tokens",
        "usdc,WBTC",
        "--token",
        "USDC=0x0000000000000000000000000000000000000001",
        "--token",
        "DAI=0x6B175474E89094C44Da98b954EedeAC495271d0F",
    ]);

    let tokens = export_args(&cli).resolve_tokens(network);
    let symbols: Vec<&str> = tokens.iter().map(|t| t.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["USDC", "WBTC", "DAI"]);

    // custom contract replaces the registry one
    assert_eq!(tokens[0].contract, "0x0000000000000000000000000000000000000001");
    // unknown registry symbol has no contract
    assert!(!tokens[1].has_contract());
    assert!(tokens[2].has_contract());
}

#[test]
fn test_to_config_uses_network_defaults() {
    let registry = NetworkRegistry::load_embedded().unwrap();
    let cli = Cli::parse_from([
        "tx-history-exporter",
        "--max-retries",
        "3",
        "export",
        "--address",
        TRACKED,
        "--api-key",
        "KEY",
    ]);

    let config = export_args(&cli).to_config(&cli, &registry).unwrap();
    assert_eq!(config.base_url, "https://api.etherscan.io/api");
    assert_eq!(config.api_key, "KEY");
    assert_eq!(config.native_symbol, "ETH");
    assert_eq!(config.native_decimals, 18);
    assert_eq!(config.settings.max_transport_retries, 3);
    assert!(config.include_native);
    assert_eq!(config.tokens.len(), 2);
}

#[test]
fn test_to_config_rejects_unknown_network() {
    let registry = NetworkRegistry::load_embedded().unwrap();
    let cli = Cli::parse_from([
        "tx-history-exporter",
        "export",
        "--address",
        TRACKED,
        "--network",
        "nowhere",
    ]);

    assert!(export_args(&cli).to_config(&cli, &registry).is_err());
}
