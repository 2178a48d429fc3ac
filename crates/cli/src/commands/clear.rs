//! clear command - Remove every key under a prefix

use clap::Args;
use serde::Serialize;

use super::StorageArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove every key under a prefix
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Key prefix to clear
    pub prefix: String,
}

#[derive(Debug, Serialize)]
struct ClearOutput {
    prefix: String,
}

/// Execute the clear command
pub async fn execute(
    args: ClearArgs,
    storage: &StorageArgs,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.prefix.is_empty() {
        formatter.warning("Empty prefix: every item in the bucket will be removed");
    }

    let proxy = match storage.connect() {
        Ok(proxy) => proxy,
        Err(e) => return formatter.config_failure(&e),
    };

    let outcome = proxy.clear(&args.prefix).await;
    match formatter.settle(outcome, "clearing items") {
        Ok(prefix) => {
            let human = format!("Cleared items under '{prefix}'");
            formatter.done(&ClearOutput { prefix }, &human);
            ExitCode::Success
        }
        Err(code) => code,
    }
}
