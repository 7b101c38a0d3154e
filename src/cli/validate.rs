//! Validation subcommand

use super::CliError;
use crate::address::{BlockNumber, WalletAddress};
use clap::Parser;
use std::str::FromStr;

/// Validate command for checking addresses and block numbers
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// What to validate
    #[command(subcommand)]
    pub target: ValidateTarget,
}

/// Target type for validation
#[derive(clap::Subcommand, Debug)]
pub enum ValidateTarget {
    /// Validate a wallet or contract address
    Address {
        /// Address to validate (e.g., 0xe11a3c6d20B464c77ca7dBe8cF9E83c91Dd337Be)
        address: String,
    },
    /// Validate a block number ("latest" accepted)
    Block {
        /// Block number to validate
        block: String,
    },
}

impl ValidateCommand {
    /// Execute the validation command
    pub fn execute(&self) -> Result<(), CliError> {
        match &self.target {
            ValidateTarget::Address { address } => self.validate_address(address),
            ValidateTarget::Block { block } => self.validate_block(block),
        }
    }

    fn validate_address(&self, address: &str) -> Result<(), CliError> {
        match WalletAddress::parse(address) {
            Ok(addr) => {
                println!("Valid address: {}", addr);
                println!("  Native file suffix: {}", addr.short_suffix());
                println!("  Token file prefix: {}", addr.short_prefix());
                Ok(())
            }
            Err(e) => {
                eprintln!("Invalid address: {}", e);
                Err(e.into())
            }
        }
    }

    fn validate_block(&self, block: &str) -> Result<(), CliError> {
        match BlockNumber::from_str(block) {
            Ok(number) => {
                println!("Valid block: {}", number);
                println!("  Query value: {}", number.to_query_value());
                Ok(())
            }
            Err(e) => {
                eprintln!("Invalid block: {}", e);
                Err(e.into())
            }
        }
    }
}
