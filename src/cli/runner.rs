//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::{EventLogTransform, SongCatalogTransform};
use crate::storage::StorageRoot;
use crate::warehouse::FactLoadOperator;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run => {
                let (input, output) = self.storage_roots()?;
                let catalog = SongCatalogTransform::new(input.clone(), output.clone());
                let summary = catalog.run().await?;
                println!(
                    "songs: {} rows in {} files, artists: {} rows",
                    summary.songs.rows, summary.songs.files, summary.artists.rows
                );

                // The catalog writes above are durable before this starts.
                let events = EventLogTransform::new(input, output);
                let summary = events.run().await?;
                println!(
                    "users: {} rows, time: {} rows, songplays: {} rows",
                    summary.users.rows, summary.time.rows, summary.songplays.rows
                );
                Ok(())
            }

            Commands::Songs => {
                let (input, output) = self.storage_roots()?;
                let summary = SongCatalogTransform::new(input, output).run().await?;
                println!(
                    "songs: {} rows in {} files, artists: {} rows",
                    summary.songs.rows, summary.songs.files, summary.artists.rows
                );
                Ok(())
            }

            Commands::Events => {
                let (input, output) = self.storage_roots()?;
                let summary = EventLogTransform::new(input, output).run().await?;
                println!(
                    "users: {} rows, time: {} rows, songplays: {} rows",
                    summary.users.rows, summary.time.rows, summary.songplays.rows
                );
                Ok(())
            }

            Commands::LoadFact {
                database,
                table,
                select,
            } => {
                let operator = FactLoadOperator::connect(database, table, select)?;
                let summary = operator.execute()?;
                println!(
                    "loaded {}, sampled {} rows",
                    summary.destination, summary.sampled
                );
                Ok(())
            }

            Commands::Validate => {
                let config = self.load_config()?;
                println!("{config:#?}");
                Ok(())
            }
        }
    }

    /// Load configuration from the file flag or the environment
    fn load_config(&self) -> Result<PipelineConfig> {
        match &self.cli.config {
            Some(path) => PipelineConfig::from_file(path),
            None => PipelineConfig::from_env(),
        }
    }

    /// Build the input and output storage roots
    fn storage_roots(&self) -> Result<(StorageRoot, StorageRoot)> {
        let config = self.load_config()?;
        let input = StorageRoot::parse(&config.input_root, config.credentials.as_ref())?;
        let output = StorageRoot::parse(&config.output_root, config.credentials.as_ref())?;
        Ok((input, output))
    }
}
