use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

use certflow::api::{
    CertificateTemplate, ChainOption, CsrArtifact, CsrOrigin, KeyType, ProviderTemplate, Request,
    ServerPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "certflow")]
#[command(about = "Certificate policy, CSR and chain tooling", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a zone template (JSON) and print the canonical policy
    Policy {
        template: PathBuf,

        /// Template is an on-premises server policy instead of a cloud issuing template
        #[arg(long)]
        on_prem: bool,
    },

    /// Apply zone defaults to a request and synthesize key and CSR
    Csr {
        template: PathBuf,

        #[arg(long)]
        on_prem: bool,

        /// Subject common name
        #[arg(long)]
        cn: String,

        /// DNS subject alternative name, repeatable
        #[arg(long = "dns")]
        dns_names: Vec<String>,

        /// IP subject alternative name, repeatable
        #[arg(long = "ip")]
        ip_addresses: Vec<IpAddr>,

        /// Key type; the zone's default is used when omitted
        #[arg(long)]
        key_type: Option<KeyTypeArg>,

        /// Who generates key and CSR (local, service, user)
        #[arg(long, default_value = "local")]
        origin: OriginArg,

        /// Existing private key (PEM or DER), for `--origin user`
        #[arg(long)]
        key: Option<PathBuf>,

        /// Existing CSR (PEM or DER), for `--origin user`
        #[arg(long)]
        csr: Option<PathBuf>,
    },

    /// Order a PEM bundle and print subject and fingerprint of each certificate
    Chain {
        bundle: PathBuf,

        /// Root placement (as-received, root-first, root-last, ignore-root)
        #[arg(long, default_value = "as-received")]
        order: ChainOption,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeyTypeArg {
    Rsa,
    Ecdsa,
    Ed25519,
}

impl From<KeyTypeArg> for KeyType {
    fn from(arg: KeyTypeArg) -> Self {
        match arg {
            KeyTypeArg::Rsa => KeyType::Rsa,
            KeyTypeArg::Ecdsa => KeyType::Ecdsa,
            KeyTypeArg::Ed25519 => KeyType::Ed25519,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OriginArg {
    Local,
    Service,
    User,
}

impl From<OriginArg> for CsrOrigin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Local => CsrOrigin::LocalGenerated,
            OriginArg::Service => CsrOrigin::ServiceGenerated,
            OriginArg::User => CsrOrigin::UserProvided,
        }
    }
}

fn read_template(path: &Path, on_prem: bool) -> anyhow::Result<ProviderTemplate> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read template {}", path.display()))?;

    let template = if on_prem {
        serde_json::from_str::<ServerPolicy>(&json)
            .context("failed to decode on-premises server policy")?
            .into()
    } else {
        serde_json::from_str::<CertificateTemplate>(&json)
            .context("failed to decode cloud issuing template")?
            .into()
    };
    Ok(template)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Policy { template, on_prem } => {
            let template = read_template(&template, on_prem)?;
            let policy = certflow::translate_policy(&template);
            println!("{}", serde_json::to_string_pretty(&policy)?);
        }

        Commands::Csr {
            template,
            on_prem,
            cn,
            dns_names,
            ip_addresses,
            key_type,
            origin,
            key,
            csr,
        } => {
            let zone = certflow::zone_configuration(&read_template(&template, on_prem)?);

            let mut request = Request::with_common_name(cn);
            request.sans.dns_names = dns_names;
            request.sans.ip_addresses = ip_addresses;
            request.key_type = key_type.map(Into::into);
            request.csr_origin = origin.into();
            if let Some(path) = key {
                let bytes = fs::read(&path)
                    .with_context(|| format!("failed to read key {}", path.display()))?;
                request.private_key = Some(bytes.into());
            }
            if let Some(path) = csr {
                let bytes = fs::read(&path)
                    .with_context(|| format!("failed to read CSR {}", path.display()))?;
                request.csr = Some(bytes.into());
            }

            zone.update_certificate_request(&mut request);
            info!("Request after zone defaults: {:?}", request);

            let artifact =
                certflow::generate_request(&request).context("failed to synthesize request")?;
            match &artifact {
                CsrArtifact::AuthorityGenerated {
                    key_type,
                    key_length,
                    key_curve,
                } => {
                    println!("service-generated key_type={key_type}");
                    if let Some(bits) = key_length {
                        println!("key_length={bits}");
                    }
                    if let Some(curve) = key_curve {
                        println!("key_curve={curve}");
                    }
                }
                CsrArtifact::Local { .. } | CsrArtifact::UserProvided { .. } => {
                    if let Some(key) = artifact.key() {
                        print!("{}", key.private_key_pem().as_str());
                    }
                    if let Some(csr) = artifact.csr() {
                        print!("{}", csr.to_pem());
                    }
                }
            }
        }

        Commands::Chain { bundle, order } => {
            let pem = fs::read(&bundle)
                .with_context(|| format!("failed to read bundle {}", bundle.display()))?;
            let chain = certflow::assemble_chain(pem, order)
                .context("failed to assemble chain")?;
            for certificate in chain.certificates() {
                let marker = if certificate.is_self_signed() { " (root)" } else { "" };
                println!("{} {}{}", certificate.fingerprint(), certificate.subject(), marker);
            }
        }
    }

    Ok(())
}
