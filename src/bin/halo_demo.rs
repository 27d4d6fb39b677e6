use halo_signer::halo::{CancelToken, SessionStatus, SoftTag};
use halo_signer::prelude::Result;
use halo_signer::{encode_signed, Config, Demo, DemoState, DeviceMode, NodeClient};
use log::{error, info};
use std::env;
use std::sync::Arc;
use tokio::sync::mpsc;

const USAGE: &str = "usage: halo_demo [--desktop | --mobile] [--simulate] [--dry-run]";

#[derive(Debug, Default)]
struct Args {
    mode: DeviceMode,
    simulate: bool,
    dry_run: bool,
}

fn parse_args() -> Option<Args> {
    let mut args = Args::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--desktop" => args.mode = DeviceMode::Desktop,
            "--mobile" => args.mode = DeviceMode::Mobile,
            "--simulate" => args.simulate = true,
            "--dry-run" => args.dry_run = true,
            _ => return None,
        }
    }
    Some(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Some(args) = parse_args() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = Config::from_env()?;
    info!("Using RPC {} and gateway {}", config.rpc_url, config.gateway_url);

    // Without NFC hardware on this machine, mobile mode runs against an
    // emulated tag.
    let tag = args.simulate.then(|| Arc::new(SoftTag::random(2)));
    let rpc = NodeClient::new(None, config.rpc_url.clone());
    let demo = Demo::new(config, rpc, args.mode, tag);

    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(status) = status_rx.recv().await {
            match status {
                SessionStatus::PairingReady { exec_url } => {
                    println!("Open this link on your smartphone (or scan it as a QR code):");
                    println!("  {exec_url}");
                }
                other => println!("{other}"),
            }
        }
    });

    let mut state = DemoState::default();
    let cancel = CancelToken::new();

    let address = demo.get_address(&mut state, &status_tx, &cancel).await?;
    println!("Address: {address:?}");
    println!("{}", state.status_text);

    demo.sign_transaction(&mut state, &status_tx, &cancel).await?;
    println!("Signature: {}", state.signature_display);

    if args.dry_run {
        if let (Some(transaction), Some(signature)) = (&state.transaction, &state.signature) {
            println!("Signed transaction (not sent): {}", encode_signed(transaction, signature));
        }
        return Ok(());
    }

    match demo.send_transaction(&mut state).await {
        Ok(hash) => {
            println!("Transaction hash: {hash:#x}");
            println!("{}", state.status_text);
            Ok(())
        }
        Err(e) => {
            error!("{}", state.status_text);
            Err(e)
        }
    }
}
