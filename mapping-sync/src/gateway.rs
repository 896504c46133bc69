//! Download directories from an IPFS HTTP gateway.
use std::path::{Component, Path, PathBuf};

use error_stack::{Report, Result, ResultExt};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_GATEWAY_URL: &str = "https://ipfs.io";

#[derive(Debug)]
pub enum GatewayError {
    /// The CID is empty or is not a single file name.
    InvalidArgument,
    /// The gateway answered with a non-success status.
    Retrieval { status: u16, reason: String },
    /// The request could not be sent or the body could not be read.
    Transport,
    /// The archive could not be written to disk.
    Io,
    /// The gateway URL is invalid.
    Configuration,
}

#[derive(Clone)]
pub struct IpfsGateway {
    client: Client,
    base_url: Url,
}

impl IpfsGateway {
    pub fn new(base_url: Url) -> Result<Self, GatewayError> {
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Configuration)
                .attach_printable("gateway URL cannot be a base URL")
                .attach_printable_lazy(|| format!("url: {base_url}"));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn from_url_str(url: &str) -> Result<Self, GatewayError> {
        let base_url = url
            .parse::<Url>()
            .change_context(GatewayError::Configuration)
            .attach_printable("failed to parse gateway URL")
            .attach_printable_lazy(|| format!("url: {url}"))?;
        Self::new(base_url)
    }

    /// URL that serves the directory `cid` as a tar archive.
    pub fn directory_url(&self, cid: &str) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Report::new(GatewayError::Configuration))
            .attach_printable("gateway URL cannot be a base URL")?
            .pop_if_empty()
            .push("ipfs")
            .push(cid);
        url.query_pairs_mut()
            .append_pair("download", "true")
            .append_pair("format", "tar")
            .append_pair("filename", &format!("{cid}.tar"));
        Ok(url)
    }

    /// Download the directory `cid` to `{output_dir}/{cid}.tar`.
    ///
    /// An existing file with the same name is overwritten. If the transfer
    /// fails midway the file is left truncated.
    #[instrument(skip(self), err(Debug))]
    pub async fn fetch_directory(
        &self,
        cid: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, GatewayError> {
        if cid.is_empty() {
            return Err(GatewayError::InvalidArgument).attach_printable("CID is required");
        }

        if !is_file_name(cid) {
            return Err(GatewayError::InvalidArgument)
                .attach_printable("CID must be a single path component")
                .attach_printable_lazy(|| format!("cid: {cid}"));
        }

        let url = self.directory_url(cid)?;
        info!(cid, "downloading IPFS directory");

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .change_context(GatewayError::Transport)
            .attach_printable("failed to GET directory archive")
            .attach_printable_lazy(|| format!("url: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Retrieval {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            })
            .attach_printable_lazy(|| format!("url: {url}"));
        }

        let path = output_dir.join(format!("{cid}.tar"));
        let mut file = tokio::fs::File::create(&path)
            .await
            .change_context(GatewayError::Io)
            .attach_printable("failed to create archive file")
            .attach_printable_lazy(|| format!("path: {}", path.display()))?;

        while let Some(chunk) = response
            .chunk()
            .await
            .change_context(GatewayError::Transport)
            .attach_printable("failed to read response body")?
        {
            file.write_all(&chunk)
                .await
                .change_context(GatewayError::Io)
                .attach_printable_lazy(|| format!("path: {}", path.display()))?;
        }

        file.flush()
            .await
            .change_context(GatewayError::Io)
            .attach_printable_lazy(|| format!("path: {}", path.display()))?;

        info!(path = %path.display(), "downloaded directory");

        Ok(path)
    }
}

/// The archive is written to `{output_dir}/{cid}.tar`, so the CID must not
/// leave `output_dir`.
fn is_file_name(cid: &str) -> bool {
    if cid.contains(['/', '\\']) {
        return false;
    }

    let mut components = Path::new(cid).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl error_stack::Context for GatewayError {}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::InvalidArgument => write!(f, "invalid argument"),
            GatewayError::Retrieval { status, reason } => {
                write!(f, "failed to download: {status} {reason}")
            }
            GatewayError::Transport => write!(f, "gateway request failed"),
            GatewayError::Io => write!(f, "failed to write archive"),
            GatewayError::Configuration => write!(f, "gateway configuration error"),
        }
    }
}
