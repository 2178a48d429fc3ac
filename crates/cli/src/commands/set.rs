//! set command - Store a value under a key

use clap::Args;
use serde::Serialize;

use super::StorageArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Store a value under a key, replacing any previous value
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Key to write
    pub key: String,

    /// Value to store
    pub value: String,
}

#[derive(Debug, Serialize)]
struct SetOutput {
    key: String,
}

/// Execute the set command
pub async fn execute(args: SetArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let proxy = match storage.connect() {
        Ok(proxy) => proxy,
        Err(e) => return formatter.config_failure(&e),
    };

    let outcome = proxy.put(&args.key, &args.value).await;
    match formatter.settle(outcome, "writing the item") {
        Ok(key) => {
            let human = format!("Stored '{key}'");
            formatter.done(&SetOutput { key }, &human);
            ExitCode::Success
        }
        Err(code) => code,
    }
}
