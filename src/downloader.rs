use std::{io::Write, ops::ControlFlow};

use reqwest::{Client, redirect::Policy};
use tracing::{debug, info};

use crate::{TransferError, models::TransferProgress};

/// What to fetch and how to identify ourselves.
#[derive(Debug, Clone)]
pub struct TransferRequest<'a> {
    pub url: &'a str,
    pub user_agent: &'a str,
    pub follow_redirects: bool,
}

/// Progress hook: `Break` asks the transport to abort.
pub type ProgressHook<'a> = dyn FnMut(TransferProgress) -> ControlFlow<()> + 'a;

/// Moves a payload into `sink`, reporting progress along the way.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn perform(
        &mut self,
        request: &TransferRequest<'_>,
        sink: &mut dyn Write,
        on_progress: &mut ProgressHook<'_>,
    ) -> Result<(), TransferError>;
}

/// Streams a GET response over HTTP(S) with `reqwest`.
pub struct HttpTransport {
    max_redirects: usize,
    use_system_proxy: bool,
}

impl HttpTransport {
    pub fn new(max_redirects: usize) -> Self {
        Self {
            max_redirects,
            use_system_proxy: true,
        }
    }

    /// Connects directly, ignoring proxy settings from the environment.
    pub fn direct(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    fn client(&self, request: &TransferRequest<'_>) -> Result<Client, TransferError> {
        let redirect = if request.follow_redirects {
            Policy::limited(self.max_redirects)
        } else {
            Policy::none()
        };

        let mut builder = Client::builder()
            .user_agent(request.user_agent)
            .redirect(redirect);
        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }
        builder
            .build()
            .map_err(|e| TransferError::Init(e.to_string()))
    }
}

impl Transport for HttpTransport {
    async fn perform(
        &mut self,
        request: &TransferRequest<'_>,
        sink: &mut dyn Write,
        on_progress: &mut ProgressHook<'_>,
    ) -> Result<(), TransferError> {
        let client = self.client(request)?;

        info!("requesting {}", request.url);
        let mut response = client.get(request.url).send().await?.error_for_status()?;

        let total = response.content_length().unwrap_or(0);
        debug!("content length: {}", total);

        let mut downloaded: u64 = 0;
        if on_progress(TransferProgress::download(total, downloaded)).is_break() {
            return Err(TransferError::Aborted);
        }

        while let Some(chunk) = response.chunk().await? {
            sink.write_all(&chunk)
                .map_err(|e| TransferError::Runtime(format!("failed writing payload: {}", e)))?;
            downloaded += chunk.len() as u64;

            if on_progress(TransferProgress::download(total, downloaded)).is_break() {
                return Err(TransferError::Aborted);
            }
        }

        sink.flush()
            .map_err(|e| TransferError::Runtime(format!("failed writing payload: {}", e)))?;
        info!("received {} bytes", downloaded);
        Ok(())
    }
}
