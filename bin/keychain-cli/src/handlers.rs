//! Command handlers.

use anyhow::{Context, Result, bail};
use hdkeychain::{
    BufferSignature, ExportOptions, KeySource, MultiSeedKeychain, SignBuffer, SignBufferRequest,
    WalletAccount, crypto::SignatureOutput,
};
use hdkeychain_key_identifier::{KeyIdentifier, wallet_keys};

use crate::cli::{ExportKeyArgs, KeyArgs, SignArgs};

fn key_source(args: KeyArgs) -> Result<KeySource> {
    let key_id = match (args.wallet_key, args.path) {
        (Some(name), _) => wallet_keys::wallet_key(&name)?.clone(),
        (None, Some(path)) => KeyIdentifier::new(
            args.algorithm,
            &path,
            args.asset.as_deref(),
            args.key_type,
        )?,
        (None, None) => bail!("either --wallet-key or --path is required"),
    };

    Ok(match args.seed_id {
        Some(seed_id) => KeySource::new(seed_id, key_id),
        None => KeySource::new(WalletAccount::primary(0), key_id),
    })
}

fn hex32(name: &str, value: Option<String>) -> Result<Option<[u8; 32]>> {
    value
        .map(|value| {
            let bytes = hex::decode(&value).with_context(|| format!("{name} is not hex"))?;
            <[u8; 32]>::try_from(bytes.as_slice())
                .with_context(|| format!("{name} must be 32 bytes"))
        })
        .transpose()
}

pub(crate) fn handle_seed_ids(keychain: &MultiSeedKeychain) {
    let primary = keychain.primary_seed_id();
    for seed_id in keychain.seed_ids() {
        if primary.as_ref() == Some(&seed_id) {
            println!("{seed_id} (primary)");
        } else {
            println!("{seed_id}");
        }
    }
}

pub(crate) async fn handle_export_key(
    keychain: &MultiSeedKeychain,
    args: ExportKeyArgs,
) -> Result<()> {
    let options = if args.private {
        ExportOptions::PRIVATE
    } else {
        ExportOptions::PUBLIC
    };
    let exported = keychain.export_key(&key_source(args.key)?, options).await?;

    println!("public key: {}", hex::encode(&exported.public_key));
    if let Some(xpub) = &exported.xpub {
        println!("xpub:       {xpub}");
    }
    if let Some(private_key) = &exported.private_key {
        println!("private key: {}", hex::encode(private_key.as_slice()));
    }
    if let Some(xpriv) = &exported.xpriv {
        println!("xpriv:      {xpriv}");
    }
    Ok(())
}

pub(crate) fn handle_sign(keychain: &MultiSeedKeychain, args: SignArgs) -> Result<()> {
    let data = hex::decode(&args.data).context("data is not hex")?;
    let mut request = SignBufferRequest::new(args.signature_type, data);
    request.enc = args.enc;
    request.tweak = hex32("tweak", args.tweak)?;
    request.extra_entropy = hex32("extra entropy", args.extra_entropy)?;

    match keychain.sign_buffer(&key_source(args.key)?, &request)? {
        BufferSignature::Ecdsa(SignatureOutput::SigRec {
            signature,
            recovery,
        }) => println!("signature: {}\nrecovery:  {recovery}", hex::encode(signature)),
        BufferSignature::Ecdsa(SignatureOutput::Raw {
            r,
            s,
            recovery_param,
        }) => println!(
            "r: {}\ns: {}\nrecovery: {recovery_param}",
            hex::encode(r),
            hex::encode(s)
        ),
        signature => {
            let bytes = signature
                .as_bytes()
                .context("signature has no flat encoding")?;
            println!("signature: {}", hex::encode(bytes));
        }
    }
    Ok(())
}
