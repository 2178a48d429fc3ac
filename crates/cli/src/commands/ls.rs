//! ls command - List keys under a prefix
//!
//! Lists every stored item whose key starts with the prefix. The limit
//! bounds pagination; it is not an exact cap on the result length.

use clap::Args;
use kv_core::ObjectSummary;
use serde::Serialize;

use super::StorageArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, summary_table};

/// List keys under a prefix
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Key prefix; lists everything when omitted
    #[arg(default_value = "")]
    pub prefix: String,

    /// Stop requesting pages once more than this many items were collected
    #[arg(short = 'n', long, default_value = "1000")]
    pub limit: usize,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    items: Vec<ObjectSummary>,
    count: usize,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let proxy = match storage.connect() {
        Ok(proxy) => proxy,
        Err(e) => return formatter.config_failure(&e),
    };

    let outcome = proxy.list(&args.prefix, args.limit).await;
    let items = match formatter.settle(outcome, "listing items") {
        Ok(items) => items,
        Err(code) => return code,
    };

    let human = if items.is_empty() {
        format!("No items under '{}'", args.prefix)
    } else {
        let table = summary_table(&items, formatter.colors_enabled());
        format!("{table}\nTotal: {} items", items.len())
    };

    let count = items.len();
    formatter.value(&LsOutput { items, count }, &human);

    ExitCode::Success
}
