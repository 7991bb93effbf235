use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ToolsError;

/// GET `url` and decode a JSON body, treating any non-2xx status as an error.
pub(crate) async fn get_json<T, Q>(client: &Client, url: &str, query: &Q) -> Result<T, ToolsError>
where
    T: DeserializeOwned,
    Q: Serialize + ?Sized,
{
    log::debug!("GET {}", url);
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| ToolsError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ToolsError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| ToolsError::Request {
        url: url.to_string(),
        source,
    })?;

    serde_json::from_str(&body).map_err(|e| ToolsError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
