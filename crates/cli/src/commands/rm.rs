//! rm command - Remove a single key

use clap::Args;
use serde::Serialize;

use super::StorageArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove a single key
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Key to remove
    pub key: String,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    key: String,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let proxy = match storage.connect() {
        Ok(proxy) => proxy,
        Err(e) => return formatter.config_failure(&e),
    };

    let outcome = proxy.delete_one(&args.key).await;
    match formatter.settle(outcome, "removing the item") {
        Ok(key) => {
            let human = format!("Removed '{key}'");
            formatter.done(&RmOutput { key }, &human);
            ExitCode::Success
        }
        Err(code) => code,
    }
}
