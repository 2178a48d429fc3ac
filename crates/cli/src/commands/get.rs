//! get command - Print the value stored under a key

use clap::Args;
use serde::Serialize;

use super::StorageArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Print the value stored under a key
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Key to read
    pub key: String,
}

#[derive(Debug, Serialize)]
struct GetOutput<'a> {
    key: &'a str,
    value: &'a str,
}

/// Execute the get command
pub async fn execute(args: GetArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let proxy = match storage.connect() {
        Ok(proxy) => proxy,
        Err(e) => return formatter.config_failure(&e),
    };

    let outcome = proxy.get(&args.key).await;
    match formatter.settle(outcome, "reading the item") {
        Ok(value) => {
            let output = GetOutput {
                key: &args.key,
                value: &value,
            };
            formatter.value(&output, &value);
            ExitCode::Success
        }
        Err(code) => code,
    }
}
