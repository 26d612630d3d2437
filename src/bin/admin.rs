use std::collections::VecDeque;
use std::path::PathBuf;

use agri_anchor::anchor::AnchorService;
use agri_anchor::crypto::{commit, parse_digest_hex};
use agri_anchor::telemetry::{init_telemetry, TelemetryConfig};
use agri_anchor::Hash256;

fn print_help() {
    eprintln!(
        "\
agri-anchor-admin

USAGE:
  agri-anchor-admin <command> [options]

COMMANDS:
  hash                            Print the canonical JSON and digest of a record
  verify                          Ask the contract whether a digest is anchored
  status                          Connect to the chain and print adapter status

hash OPTIONS:
  --file <path>                   (required) JSON record to hash

verify OPTIONS:
  --hash <hex>                    Digest to look up (0x prefix optional)
  --file <path>                   JSON record; its digest is looked up
                                  (exactly one of --hash / --file)

ENV (chain access, verify/status):
  POLYGON_AMOY_RPC_URL / PROOF_STORAGE_CONTRACT_ADDRESS / BACKEND_WALLET_PRIVATE_KEY
  AMOY_CHAIN_ID (default 80002)
"
    );
}

fn read_record(path: &PathBuf) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {e}", path.display()))
}

fn digest_of_file(path: &PathBuf) -> anyhow::Result<Hash256> {
    let record = read_record(path)?;
    Ok(*commit(&record)?.digest())
}

async fn connect() -> anyhow::Result<AnchorService> {
    let anchor = AnchorService::from_env().await;
    if !anchor.is_enabled() {
        let reason = anchor.status().reason.unwrap_or_default();
        anyhow::bail!("anchor service unavailable: {reason}");
    }
    Ok(anchor)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    match command.as_str() {
        "hash" => {
            let mut file: Option<PathBuf> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--file" => {
                        file = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --file"))?
                                .into(),
                        );
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let file = file.ok_or_else(|| anyhow::anyhow!("--file is required"))?;
            let commitment = commit(&read_record(&file)?)?;

            println!("canonical: {}", commitment.canonical_json());
            println!("digest:    {}", commitment.digest_hex());
            Ok(())
        }
        "verify" => {
            let mut hash: Option<String> = None;
            let mut file: Option<PathBuf> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--hash" => {
                        hash = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --hash"))?,
                        );
                    }
                    "--file" => {
                        file = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --file"))?
                                .into(),
                        );
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let digest = match (hash, file) {
                (Some(hash), None) => parse_digest_hex(&hash)?,
                (None, Some(file)) => digest_of_file(&file)?,
                _ => anyhow::bail!("exactly one of --hash or --file is required"),
            };

            init_telemetry(&TelemetryConfig::from_env())?;
            let anchor = connect().await?;
            let exists = anchor.exists(&digest).await?;

            println!("digest:   {}", hex::encode(digest));
            println!("anchored: {exists}");
            Ok(())
        }
        "status" => {
            if let Some(other) = args.pop_front() {
                if matches!(other.as_str(), "-h" | "--help") {
                    print_help();
                    return Ok(());
                }
                anyhow::bail!("unexpected argument: {other}");
            }

            init_telemetry(&TelemetryConfig::from_env())?;
            let anchor = AnchorService::from_env().await;
            let status = anchor.status();
            println!("{}", serde_json::to_string_pretty(&status)?);

            if anchor.is_enabled() {
                let owner = anchor.owner().await?;
                println!("contract owner: {owner}");
            }
            Ok(())
        }
        other => {
            print_help();
            anyhow::bail!("unknown command: {other}")
        }
    }
}
