//! Build the two postcode shard blobs from the raw CSV downloads.
//!
//! Sources:
//! - <http://www.freemaptools.com/download-uk-postcode-lat-lng.htm>
//! - <http://www.doogal.co.uk/UKPostcodes.php>

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use postcode_server::dataset::{
    DatasetError, PostcodeRecord, ShardedDataset, read_doogal, read_freemaptools,
};
use postcode_server::store::Shard;

#[derive(Parser)]
#[command(name = "build-shards")]
#[command(about = "Build postcode shard blobs from CSV sources")]
struct Cli {
    /// freemaptools CSV export
    #[arg(long, default_value = "freemaptools_postcodes.csv")]
    freemaptools: PathBuf,

    /// doogal CSV export; its rows override freemaptools
    #[arg(long, default_value = "doogle_postcodes.csv")]
    doogal: PathBuf,

    /// Directory to write the shard blobs into
    #[arg(long, default_value = "data")]
    out: PathBuf,
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn build(cli: &Cli) -> Result<(), DatasetError> {
    let mut records: Vec<PostcodeRecord> = read_freemaptools(open(&cli.freemaptools)?)?;
    info!(count = records.len(), path = %cli.freemaptools.display(), "read freemaptools");

    let doogal = read_doogal(open(&cli.doogal)?)?;
    info!(count = doogal.len(), path = %cli.doogal.display(), "read doogal");
    records.extend(doogal);

    let dataset = ShardedDataset::from_records(&records)?;
    if dataset.is_empty() {
        warn!("no postcodes in either source, writing empty shards");
    }

    let summary = dataset.write(&cli.out)?;
    for shard in Shard::ALL {
        info!(
            %shard,
            count = summary.count(shard),
            path = %summary.paths().path(shard).display(),
            "shard written"
        );
    }
    println!("{summary}");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match build(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
