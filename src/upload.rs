//! File-hosting client for gofile.io: the "sink" collaborator that makes a
//! finished document retrievable.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::UploadConfig;
use crate::docx::DOCX_MIME;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServerResponse {
    data: ServerData,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServerData {
    server: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct UploadResponse {
    status: String,
    data: UploadData,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct UploadData {
    #[serde(rename = "downloadPage")]
    download_page: String,
}

#[derive(Clone)]
pub struct GofileClient {
    http: Client,
    api_base: String,
    upload_timeout: Duration,
}

impl GofileClient {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let http = Client::builder().build().context("build http client")?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Upload a finished document and return its public download page.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let server = self.pick_server().await?;
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(DOCX_MIME)
            .context("set upload mime type")?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("https://{server}.gofile.io/uploadFile"))
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .context("upload file")?;
        let upload: UploadResponse = response.json().await.context("decode upload response")?;
        if upload.status != "ok" {
            bail!("hosting service rejected the upload (status {:?})", upload.status);
        }
        Ok(upload.data.download_page)
    }

    /// Ask the API which storage server accepts uploads right now.
    async fn pick_server(&self) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/getServer", self.api_base))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .context("request upload server")?;
        let server: ServerResponse = response.json().await.context("decode server response")?;
        if server.data.server.is_empty() {
            bail!("hosting service returned no upload server");
        }
        Ok(server.data.server)
    }
}
