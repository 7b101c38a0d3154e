//! Integration tests for the validate command

use crate::support::TRACKED;
use tx_history_exporter::cli::{validate::ValidateTarget, CliError, ValidateCommand};

#[test]
fn test_validate_valid_address() {
    let cmd = ValidateCommand {
        target: ValidateTarget::Address {
            address: TRACKED.to_string(),
        },
    };

    assert!(cmd.execute().is_ok());
}

#[test]
fn test_validate_address_without_prefix() {
    let cmd = ValidateCommand {
        target: ValidateTarget::Address {
            address: TRACKED.trim_start_matches("0x").to_string(),
        },
    };

    assert!(matches!(cmd.execute(), Err(CliError::AddressError(_))));
}

#[test]
fn test_validate_short_address() {
    let cmd = ValidateCommand {
        target: ValidateTarget::Address {
            address: "0xe11a3c".to_string(),
        },
    };

    assert!(cmd.execute().is_err());
}

#[test]
fn test_validate_block_numbers() {
    for block in ["0", "15000000", "latest", "LATEST"] {
        let cmd = ValidateCommand {
            target: ValidateTarget::Block {
                block: block.to_string(),
            },
        };
        assert!(cmd.execute().is_ok(), "block should be valid: {block}");
    }

    for block in ["", "-5", "1.5", "head"] {
        let cmd = ValidateCommand {
            target: ValidateTarget::Block {
                block: block.to_string(),
            },
        };
        assert!(cmd.execute().is_err(), "block should be invalid: {block}");
    }
}
