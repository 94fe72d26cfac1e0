use anyhow::Result;
use clap::Parser;

use crate::{
    insights::history::{aggregate, Timeframe},
    storage::record_storage::RecordStorage,
};

use super::AppContext;

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(short, long, default_value_t = Timeframe::Daily, help = "Size of averaged buckets")]
    timeframe: Timeframe,
    #[arg(short, long, default_value_t = 30, help = "Number of most recent buckets to show")]
    limit: usize,
}

/// Command to process `history` command. Prints averaged weights from the oldest bucket to the
/// newest.
pub async fn process_history_command(
    context: &AppContext,
    HistoryCommand { timeframe, limit }: HistoryCommand,
) -> Result<()> {
    let profile = context.profiles.load().await?;
    let entries = context.records.get_all().await?;

    let buckets = aggregate(&entries, timeframe, &profile.utc_offset);
    if buckets.is_empty() {
        println!("No measurements yet");
        return Ok(());
    }

    let skip = buckets.len().saturating_sub(limit);
    for bucket in buckets.iter().skip(skip) {
        println!("{}\t{:.1} kg\t{}", bucket.label, bucket.average, bucket.count);
    }
    Ok(())
}
