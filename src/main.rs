use anyhow::Result;

use fintrack::config::Config;
use fintrack::processor::Processor;
use fintrack::sheets::SheetsReader;
use fintrack::{logging, server};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::load()?;

    let reader = SheetsReader::new(
        config.credentials_file.clone(),
        config.spreadsheet_id.clone(),
        config.sheet_range.clone(),
    )?;
    let table = reader.read_or_empty().await;
    let processor = Processor::new(table);

    server::run(processor, &config.bind_address).await
}
