use anyhow::{Context, Result};
use ethers::types::transaction::eip712::{Eip712, TypedData};
use ethers::types::{Signature, H256};
use ethers::utils::to_checksum;
use std::str::FromStr;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(path), Some(signature)) = (args.next(), args.next()) else {
        anyhow::bail!("Usage: cargo run --bin verify_signature <TYPED_DATA_JSON> <SIGNATURE>");
    };

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let typed: TypedData = serde_json::from_str(&raw).context("parsing typed data")?;

    let digest = typed.encode_eip712().context("hashing typed data")?;
    let signature = Signature::from_str(signature.trim()).context("parsing signature")?;
    let recovered = signature.recover(H256::from(digest))?;

    println!("\n=== TYPED DATA SIGNATURE CHECK ===");
    println!("PRIMARY TYPE: {}", typed.primary_type);
    println!("DIGEST:       0x{}", hex::encode(digest));
    println!("SIGNER:       {}", to_checksum(&recovered, None));

    if let Some(claimed) = typed.message.get("address").and_then(|v| v.as_str()) {
        let matches = claimed.eq_ignore_ascii_case(&format!("{:?}", recovered));
        println!("CLAIMED:      {} ({})", claimed, if matches { "match" } else { "MISMATCH" });
    }
    println!("==================================\n");

    Ok(())
}
