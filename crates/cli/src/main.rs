use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use futurebattles_core::AppConfig;
use futurebattles_storage::{MemoryStorage, StorageBackend};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "futurebattles")]
#[command(about = "Vote on future battles between emcees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(short, long, env = "PORT", default_value_t = 3002)]
        port: u16,
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Keep everything in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
        /// Emcee to register in the in-memory store (repeatable)
        #[arg(long = "emcee", requires = "in_memory")]
        emcees: Vec<String>,
        /// Past battle between two registered emcees, as `A:B` (repeatable)
        #[arg(long = "pairing", requires = "in_memory")]
        pairings: Vec<String>,
    },
    /// Print aggregate vote statistics
    Stats,
    /// Print the top of the future-matchup leaderboard
    Leaderboard {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Check whether two emcees have already battled
    CheckMatchup { first: String, second: String },
}

async fn connect_storage(config: &AppConfig) -> Result<StorageBackend> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow!("DATABASE_URL or PGHOST environment variable must be set"))?;
    Ok(StorageBackend::new_postgres(url).await?)
}

/// Seed an in-memory store; pairings name emcees given with `--emcee`.
fn memory_storage(emcees: &[String], pairings: &[String]) -> Result<StorageBackend> {
    let names: Vec<&str> = emcees.iter().map(|n| n.trim()).collect();
    let id_of = |name: &str| -> Result<i32> {
        let name = name.trim();
        let pos = names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("pairing names unknown emcee {name:?}"))?;
        Ok(i32::try_from(pos)? + 1)
    };
    let mut battles = Vec::with_capacity(pairings.len());
    for raw in pairings {
        let Some((first, second)) = raw.split_once(':') else {
            bail!("pairing {raw:?} must look like A:B");
        };
        let (a, b) = (id_of(first)?, id_of(second)?);
        if a == b {
            bail!("pairing {raw:?} pits an emcee against themselves");
        }
        battles.push((a, b));
    }
    Ok(StorageBackend::new_memory(MemoryStorage::seeded(&names, &battles)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Serve { port, host, in_memory, emcees, pairings } => {
            let storage = if in_memory {
                tracing::warn!(
                    emcees = emcees.len(),
                    pairings = pairings.len(),
                    "using in-memory storage, votes are not persisted"
                );
                memory_storage(&emcees, &pairings)?
            } else {
                connect_storage(&config).await?
            };
            commands::serve::run(storage, &config, &host, port).await?;
        },
        Commands::Stats => {
            commands::query::run_stats(connect_storage(&config).await?, &config).await?;
        },
        Commands::Leaderboard { limit } => {
            commands::query::run_leaderboard(connect_storage(&config).await?, &config, limit)
                .await?;
        },
        Commands::CheckMatchup { first, second } => {
            commands::query::run_check_matchup(connect_storage(&config).await?, &first, &second)
                .await?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "futurebattles",
            "serve",
            "--port",
            "8080",
            "--in-memory",
            "--emcee",
            "Loonie",
            "--emcee",
            "Abra",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { port, in_memory, emcees, .. } => {
                assert_eq!(port, 8080);
                assert!(in_memory);
                assert_eq!(emcees, vec!["Loonie", "Abra"]);
            },
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn emcee_requires_in_memory() {
        assert!(Cli::try_parse_from(["futurebattles", "serve", "--emcee", "Loonie"]).is_err());
    }

    #[test]
    fn parses_repeated_pairings() {
        let cli = Cli::try_parse_from([
            "futurebattles",
            "serve",
            "--in-memory",
            "--pairing",
            "Loonie:Abra",
            "--pairing",
            "Abra:Shehyee",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { pairings, .. } => {
                assert_eq!(pairings, vec!["Loonie:Abra", "Abra:Shehyee"]);
            },
            _ => panic!("expected serve"),
        }
    }

    #[tokio::test]
    async fn seeded_pairings_leave_the_leaderboard() {
        use futurebattles_storage::traits::PairingStore;

        let emcees = ["Loonie".to_owned(), "Abra".to_owned(), "Shehyee".to_owned()];
        let storage = memory_storage(&emcees, &["loonie: Abra".to_owned()]).unwrap();
        let pairings = storage.list_pairings().await.unwrap();
        assert_eq!(pairings.len(), 1);
        assert!(storage.is_paired(futurebattles_core::MatchupId::new(2, 1).unwrap()).await.unwrap());
        assert!(!storage.is_paired(futurebattles_core::MatchupId::new(1, 3).unwrap()).await.unwrap());
    }

    #[test]
    fn rejects_malformed_pairings() {
        let emcees = ["Loonie".to_owned(), "Abra".to_owned()];
        assert!(memory_storage(&emcees, &["Loonie-Abra".to_owned()]).is_err());
        assert!(memory_storage(&emcees, &["Loonie:Nobody".to_owned()]).is_err());
        assert!(memory_storage(&emcees, &["Loonie:loonie".to_owned()]).is_err());
    }

    #[test]
    fn parses_check_matchup() {
        let cli = Cli::try_parse_from(["futurebattles", "check-matchup", "Loonie", "Abra"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::CheckMatchup { ref first, ref second } if first == "Loonie" && second == "Abra"
        ));
    }
}
